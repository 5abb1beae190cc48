//! 工具模块
//!
//! - config: 统计参数配置 (toml)
//! - logging: env_logger 初始化
//! - validate: 算子参数的即时校验

pub mod config;
pub mod logging;
pub mod validate;
