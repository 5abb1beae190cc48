//! # QASTREAM-RS
//!
//! 惰性单遍序列处理引擎 + 流式统计算子
//!
//! ## 核心能力
//!
//! - **惰性流水线**: map/filter/take/window/chunk/distinct/sort/group 任意组合，
//!   终结操作之前不拉取任何元素，源序列至多被遍历一次
//! - **窗口引擎**: 环形缓冲区滑动窗口 + 单调双端队列窗口极值 (摊还 O(1))
//! - **流式统计**: Welford 方差/协方差、EWMA、滚动 z-score、增量相关系数
//! - **多源组合**: zip / chain / interleave / k 路归并 (二叉堆)
//! - **异步镜像**: 基于 `futures::Stream` 的同构算子集
//!
//! ## 架构设计
//!
//! ```text
//! 终结操作 (to_vec / sum / median / ...)
//!     ↓ pull
//! Pipeline (pipeline/)  ← Seq<I> 句柄
//!     ↓ pull
//! Stage (pipeline/stage.rs, window/, stats/)
//!     ↓ pull
//! Sequence Source (Iterator / Stream)
//! ```
//!
//! ## 示例
//!
//! ```
//! use qastream::seq;
//!
//! let lows = seq([100.0, 90.0, 95.0, 80.0, 105.0])
//!     .windowed_min(3)
//!     .unwrap()
//!     .to_vec();
//! assert_eq!(lows, vec![90.0, 80.0, 80.0]);
//! ```

// ============================================================================
// 外部依赖
// ============================================================================

// 异步
pub use futures;

// 序列化
pub use serde;
pub use serde_json;

// 日志
pub use log;

// 错误处理
pub use thiserror;

// ============================================================================
// 内部模块
// ============================================================================

/// 流水线 - Seq 句柄、Stage 抽象、数据源
pub mod pipeline;

/// 窗口引擎 - 环形缓冲区、单调队列
pub mod window;

/// 流式统计 - Welford、EWMA、z-score、次序统计量
pub mod stats;

/// 多源组合算子
pub mod combinators;

/// 异步流水线
pub mod async_seq;

/// 工具模块 (配置 / 日志 / 参数校验)
pub mod utils;

// ============================================================================
// 重导出常用类型
// ============================================================================

pub use async_seq::AsyncSeq;
pub use combinators::{chain, interleave, merge, merge_by, zip, zip_all, zip_with};
pub use pipeline::source::{range, range_to, repeat, ToF64, TryToF64};
pub use pipeline::stage::Stage;
pub use pipeline::{seq, Seq};
pub use stats::{EwmaState, RunningCovariance, RunningStats, Summary};
pub use utils::config::{StatsConfig, VarianceKind};
pub use window::{MonotonicDeque, RingBuffer};

// ============================================================================
// 全局错误类型
// ============================================================================

/// 序列处理错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeqError {
    /// 参数非法 (窗口大小为 0、alpha 越界、百分位越界、range 步长为 0)
    #[error("Validation error: {0}")]
    Validation(String),

    /// 需要至少一个元素的操作作用在空序列上
    #[error("Empty sequence: {0}")]
    EmptySequence(String),

    #[error("Index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 数值转换失败
    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SeqError>;

// ============================================================================
// 测试模块
// ============================================================================
