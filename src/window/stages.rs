//! 窗口类 Stage
//!
//! @yutiansut @quantaxis
//!
//! - WindowStage: 滑动窗口，窗口填满后每个输入输出一个窗口快照
//! - ChunkStage: 不重叠分块，最后一块可以不满
//! - ExtremumStage: 基于单调队列的窗口最小/最大值

use super::monotonic::{Extremum, MonotonicDeque};
use super::ring_buffer::RingBuffer;
use crate::pipeline::stage::Stage;
use crate::utils::validate;
use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// WindowStage - 滑动窗口
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct WindowStage<T> {
    buffer: RingBuffer<T>,
}

impl<T> WindowStage<T> {
    pub fn new(size: usize) -> Result<Self> {
        let size = validate::positive_size("window", size)?;
        Ok(Self {
            buffer: RingBuffer::new(size),
        })
    }
}

impl<T: Clone> Stage for WindowStage<T> {
    type In = T;
    type Out = Vec<T>;

    fn feed(&mut self, input: T) -> Option<Vec<T>> {
        self.buffer.push(input);
        if self.buffer.is_full() {
            Some(self.buffer.to_vec())
        } else {
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ChunkStage - 分块
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ChunkStage<T> {
    size: usize,
    pending: Vec<T>,
}

impl<T> ChunkStage<T> {
    pub fn new(size: usize) -> Result<Self> {
        let size = validate::positive_size("chunk", size)?;
        Ok(Self {
            size,
            pending: Vec::with_capacity(size),
        })
    }
}

impl<T> Stage for ChunkStage<T> {
    type In = T;
    type Out = Vec<T>;

    fn feed(&mut self, input: T) -> Option<Vec<T>> {
        self.pending.push(input);
        if self.pending.len() == self.size {
            Some(std::mem::replace(
                &mut self.pending,
                Vec::with_capacity(self.size),
            ))
        } else {
            None
        }
    }

    fn flush(&mut self) -> Option<Vec<T>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ExtremumStage - 窗口极值
// ═══════════════════════════════════════════════════════════════════════════

/// 窗口最小/最大值，总计 O(n)
#[derive(Debug, Clone)]
pub struct ExtremumStage<T> {
    size: usize,
    index: usize,
    deque: MonotonicDeque<T>,
}

impl<T: PartialOrd> ExtremumStage<T> {
    pub fn new(kind: Extremum, size: usize) -> Result<Self> {
        let op = match kind {
            Extremum::Min => "windowed_min",
            Extremum::Max => "windowed_max",
        };
        let size = validate::positive_size(op, size)?;
        Ok(Self {
            size,
            index: 0,
            deque: MonotonicDeque::new(kind),
        })
    }

    /// 队列当前长度 (用于观察内存占用)
    pub fn retained(&self) -> usize {
        self.deque.len()
    }
}

impl<T: PartialOrd + Clone> Stage for ExtremumStage<T> {
    type In = T;
    type Out = T;

    fn feed(&mut self, input: T) -> Option<T> {
        let i = self.index;
        self.index += 1;

        self.deque.push(i, input);
        // 下标 <= i - size 的元素已滑出窗口
        if let Some(window_start) = (i + 1).checked_sub(self.size) {
            self.deque.expire_before(window_start);
        }

        if i + 1 >= self.size {
            self.deque.front().cloned()
        } else {
            None
        }
    }
}
