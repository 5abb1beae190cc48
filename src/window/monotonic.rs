//! 单调双端队列 - 滑动窗口极值
//!
//! @yutiansut @quantaxis
//!
//! 队列中保存 (下标, 值)，值按单调顺序排列：
//! - Min: 值弱递增，队首是窗口最小值
//! - Max: 值弱递减，队首是窗口最大值
//!
//! 新元素入队前从队尾弹出所有"不可能再成为极值"的元素，
//! 下标滑出窗口的元素从队首弹出。每个元素至多入队一次、出队一次，
//! 摊还 O(1)。

use std::collections::VecDeque;

/// 极值方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// 单调双端队列
#[derive(Debug, Clone)]
pub struct MonotonicDeque<T> {
    entries: VecDeque<(usize, T)>,
    kind: Extremum,
}

impl<T: PartialOrd> MonotonicDeque<T> {
    pub fn new(kind: Extremum) -> Self {
        Self {
            entries: VecDeque::new(),
            kind,
        }
    }

    pub fn min() -> Self {
        Self::new(Extremum::Min)
    }

    pub fn max() -> Self {
        Self::new(Extremum::Max)
    }

    /// 队尾元素被新值支配 (Min: back >= new, Max: back <= new)
    fn dominated(&self, back: &T, incoming: &T) -> bool {
        match self.kind {
            Extremum::Min => back >= incoming,
            Extremum::Max => back <= incoming,
        }
    }

    /// 压入第 index 个元素
    pub fn push(&mut self, index: usize, value: T) {
        while let Some((_, back)) = self.entries.back() {
            if self.dominated(back, &value) {
                self.entries.pop_back();
            } else {
                break;
            }
        }
        self.entries.push_back((index, value));
    }

    /// 弹出所有下标 < `window_start` 的队首元素
    pub fn expire_before(&mut self, window_start: usize) {
        while let Some((index, _)) = self.entries.front() {
            if *index < window_start {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// 当前窗口极值
    pub fn front(&self) -> Option<&T> {
        self.entries.front().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kind(&self) -> Extremum {
        self.kind
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_deque_keeps_increasing_order() {
        let mut deque = MonotonicDeque::min();
        deque.push(0, 5);
        deque.push(1, 3);
        deque.push(2, 4);
        // 5 被 3 支配弹出
        assert_eq!(deque.len(), 2);
        assert_eq!(deque.front(), Some(&3));

        deque.expire_before(2);
        assert_eq!(deque.front(), Some(&4));
    }

    #[test]
    fn test_max_deque_equal_values() {
        let mut deque = MonotonicDeque::max();
        deque.push(0, 2);
        deque.push(1, 2);
        // 相等值也被支配，只保留较新的
        assert_eq!(deque.len(), 1);
        deque.expire_before(1);
        assert_eq!(deque.front(), Some(&2));
    }

    #[test]
    fn test_expire_empties_deque() {
        let mut deque = MonotonicDeque::max();
        deque.push(0, 1.0);
        deque.push(1, 0.5);
        deque.expire_before(5);
        assert!(deque.is_empty());
        assert_eq!(deque.front(), None);
    }
}
