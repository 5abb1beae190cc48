//! k 路归并 - 二叉堆
//!
//! @yutiansut @quantaxis
//!
//! 假设每个源各自有序，堆中只保存每个源的当前头部 (至多 k 个元素)：
//! - 每输出一个元素 O(log k) 次比较
//! - 比较相等时按源下标升序，保证输出确定
//! - 被弹出元素所在源的下一个元素在下次拉取时才补充

use crate::pipeline::Seq;
use std::cmp::Ordering;

/// 堆条目
#[derive(Debug, Clone)]
struct HeapEntry<T> {
    value: T,
    source: usize,
}

/// 以比较器为键的二叉最小堆
pub struct MergeHeap<T, F> {
    entries: Vec<HeapEntry<T>>,
    compare: F,
}

impl<T, F> MergeHeap<T, F>
where
    F: FnMut(&T, &T) -> Ordering,
{
    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            compare,
        }
    }

    /// entries[a] 应排在 entries[b] 之前
    fn precedes(&mut self, a: usize, b: usize) -> bool {
        let (ea, eb) = (&self.entries[a], &self.entries[b]);
        match (self.compare)(&ea.value, &eb.value) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => ea.source < eb.source,
        }
    }

    pub fn push(&mut self, value: T, source: usize) {
        self.entries.push(HeapEntry { value, source });
        let mut child = self.entries.len() - 1;
        while child > 0 {
            let parent = (child - 1) / 2;
            if !self.precedes(child, parent) {
                break;
            }
            self.entries.swap(child, parent);
            child = parent;
        }
    }

    /// 弹出最小元素及其源下标
    pub fn pop(&mut self) -> Option<(T, usize)> {
        if self.entries.is_empty() {
            return None;
        }
        let top = self.entries.swap_remove(0);
        let len = self.entries.len();
        let mut parent = 0;
        loop {
            let left = 2 * parent + 1;
            let right = left + 1;
            let mut first = parent;
            if left < len && self.precedes(left, first) {
                first = left;
            }
            if right < len && self.precedes(right, first) {
                first = right;
            }
            if first == parent {
                break;
            }
            self.entries.swap(parent, first);
            parent = first;
        }
        Some((top.value, top.source))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// k 路归并迭代器
pub struct Merge<I: Iterator, F> {
    sources: Vec<I>,
    heap: MergeHeap<I::Item, F>,
    primed: bool,
    /// 上一次输出元素的来源，下次拉取时先补充
    refill: Option<usize>,
}

impl<I, F> Merge<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> Ordering,
{
    pub fn new(sources: Vec<I>, compare: F) -> Self {
        let k = sources.len();
        log::trace!("k-way merge over {} sources", k);
        Self {
            heap: MergeHeap::with_capacity(k, compare),
            sources,
            primed: false,
            refill: None,
        }
    }

    fn pull_from(&mut self, source: usize) {
        if let Some(value) = self.sources[source].next() {
            self.heap.push(value, source);
        }
    }
}

impl<I, F> Iterator for Merge<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> Ordering,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if !self.primed {
            self.primed = true;
            for source in 0..self.sources.len() {
                self.pull_from(source);
            }
        }
        if let Some(source) = self.refill.take() {
            self.pull_from(source);
        }
        let (value, source) = self.heap.pop()?;
        self.refill = Some(source);
        Some(value)
    }
}

/// 按自然顺序归并多个有序源
pub fn merge<S>(sources: impl IntoIterator<Item = S>) -> Seq<Merge<S::IntoIter, fn(&S::Item, &S::Item) -> Ordering>>
where
    S: IntoIterator,
    S::Item: Ord,
{
    merge_by(sources, <S::Item as Ord>::cmp as fn(&S::Item, &S::Item) -> Ordering)
}

/// 按自定义比较器归并多个有序源
pub fn merge_by<S, F>(sources: impl IntoIterator<Item = S>, compare: F) -> Seq<Merge<S::IntoIter, F>>
where
    S: IntoIterator,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
{
    let sources: Vec<S::IntoIter> = sources.into_iter().map(IntoIterator::into_iter).collect();
    Seq::new(Merge::new(sources, compare))
}
