//! 环形缓冲区 - 定长滑动窗口的存储
//!
//! @yutiansut @quantaxis
//!
//! 固定容量的循环数组：
//! - O(1) 插入，满时覆盖最旧元素并返回它
//! - 填满后不再分配内存
//! - 按时间顺序 (旧 → 新) 迭代

#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// 底层存储，未满时按顺序增长，填满后原地覆盖
    slots: Vec<T>,
    /// 最旧元素所在位置 (仅在填满后有意义)
    head: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// 创建指定容量的环形缓冲区 (容量需为正，由调用方校验)
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    /// 推入新元素，如果已满则覆盖最旧的元素
    /// 返回被覆盖的元素（如果有）
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
            return None;
        }
        let expired = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(expired)
    }

    /// 按时间顺序取第 index 个元素，0 为最旧
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.slots.len() {
            return None;
        }
        self.slots.get((self.head + index) % self.slots.len())
    }

    /// 最新元素
    pub fn latest(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|last| self.get(last))
    }

    /// 最旧元素
    pub fn oldest(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }

    /// 旧 → 新
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }
}

impl<T: Clone> RingBuffer<T> {
    /// 按时间顺序复制出窗口内容
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
