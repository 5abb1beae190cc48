//! 窗口引擎
//!
//! @yutiansut @quantaxis
//!
//! - 环形缓冲区 (ring_buffer) - 通用滑动窗口
//! - 单调双端队列 (monotonic) - O(1) 摊还窗口极值
//! - 窗口 Stage (stages) - window / chunk / windowed_min / windowed_max

pub mod monotonic;
pub mod ring_buffer;
pub mod stages;

pub use monotonic::{Extremum, MonotonicDeque};
pub use ring_buffer::RingBuffer;
pub use stages::{ChunkStage, ExtremumStage, WindowStage};
