//! 日志初始化
//!
//! 库本身只通过 `log` 门面输出，由调用方决定后端。
//! 这里提供基于 env_logger 的便捷初始化，重复调用安全。

use env_logger::Env;

/// 初始化 env_logger
///
/// `RUST_LOG` 环境变量优先，否则使用 `default_filter` (如 "info,qastream=debug")。
/// 返回是否为本次调用完成的初始化。
pub fn init_logger(default_filter: &str) -> bool {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// 测试用初始化，输出交给 libtest 捕获
pub fn init_test_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
