//! Stage 抽象 - 流水线中的单个变换环节
//!
//! @yutiansut @quantaxis
//!
//! 每个 Stage 只做一件事: 吃进一个上游元素，吐出零个或一个下游元素。
//! 上游耗尽时 `flush` 给出残留输出 (例如最后一个不满的分块)。
//! 同一个 Stage 既可以挂在同步 `Iterator` 上 ([`Staged`])，
//! 也可以挂在异步 `Stream` 上 (`async_seq::StagedStream`)。

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

/// 增量变换 Trait
///
/// 设计原则:
/// 1. 状态封装: 每个 Stage 管理自己的窗口/累加器
/// 2. 惰性: 只在下游请求时被喂入元素，不主动拉取上游
/// 3. 单写者: 状态只被驱动它的那条拉取链修改
pub trait Stage {
    /// 输入类型
    type In;

    /// 输出类型
    type Out;

    /// 喂入一个元素，可能产生一个输出
    fn feed(&mut self, input: Self::In) -> Option<Self::Out>;

    /// 上游耗尽后调用一次，输出残留状态
    fn flush(&mut self) -> Option<Self::Out> {
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Staged - 把 Stage 接到同步迭代器上
// ═══════════════════════════════════════════════════════════════════════════

/// 由 Stage 驱动的迭代器
#[derive(Debug, Clone)]
pub struct Staged<I, S> {
    upstream: I,
    stage: S,
    done: bool,
}

impl<I, S> Staged<I, S> {
    pub fn new(upstream: I, stage: S) -> Self {
        Self {
            upstream,
            stage,
            done: false,
        }
    }

    /// 当前 Stage 状态
    pub fn stage(&self) -> &S {
        &self.stage
    }
}

impl<I, S> Iterator for Staged<I, S>
where
    I: Iterator,
    S: Stage<In = I::Item>,
{
    type Item = S::Out;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for input in self.upstream.by_ref() {
            if let Some(out) = self.stage.feed(input) {
                return Some(out);
            }
        }
        // 上游一旦返回 None 就不再拉取
        self.done = true;
        self.stage.flush()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Distinct - 去重 (保留首次出现顺序)
// ═══════════════════════════════════════════════════════════════════════════

/// 按值去重
#[derive(Debug, Clone)]
pub struct Distinct<T> {
    seen: HashSet<T>,
}

impl<T> Distinct<T> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }
}

impl<T> Default for Distinct<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Stage for Distinct<T> {
    type In = T;
    type Out = T;

    fn feed(&mut self, input: T) -> Option<T> {
        if self.seen.contains(&input) {
            None
        } else {
            self.seen.insert(input.clone());
            Some(input)
        }
    }
}

/// 按键去重
pub struct DistinctBy<T, K, F> {
    key_fn: F,
    seen: HashSet<K>,
    _marker: PhantomData<fn(T)>,
}

impl<T, K, F> DistinctBy<T, K, F> {
    pub fn new(key_fn: F) -> Self {
        Self {
            key_fn,
            seen: HashSet::new(),
            _marker: PhantomData,
        }
    }
}

impl<T, K, F> Stage for DistinctBy<T, K, F>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    type In = T;
    type Out = T;

    fn feed(&mut self, input: T) -> Option<T> {
        let key = (self.key_fn)(&input);
        if self.seen.insert(key) {
            Some(input)
        } else {
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Pairwise - 相邻元素配对
// ═══════════════════════════════════════════════════════════════════════════

/// 相邻配对: [a, b, c] -> (a, b), (b, c)
#[derive(Debug, Clone)]
pub struct Pairwise<T> {
    prev: Option<T>,
}

impl<T> Pairwise<T> {
    pub fn new() -> Self {
        Self { prev: None }
    }
}

impl<T> Default for Pairwise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Stage for Pairwise<T> {
    type In = T;
    type Out = (T, T);

    fn feed(&mut self, input: T) -> Option<(T, T)> {
        self.prev.replace(input.clone()).map(|prev| (prev, input))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Scan - 逐元素输出累积值
// ═══════════════════════════════════════════════════════════════════════════

/// 前缀累积: 每个输入输出一次 `acc = f(acc, x)`
pub struct Scan<A, T, F> {
    acc: A,
    f: F,
    _marker: PhantomData<fn(T)>,
}

impl<A, T, F> Scan<A, T, F> {
    pub fn new(init: A, f: F) -> Self {
        Self {
            acc: init,
            f,
            _marker: PhantomData,
        }
    }
}

impl<A, T, F> Stage for Scan<A, T, F>
where
    A: Clone,
    F: FnMut(&A, T) -> A,
{
    type In = T;
    type Out = A;

    fn feed(&mut self, input: T) -> Option<A> {
        self.acc = (self.f)(&self.acc, input);
        Some(self.acc.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Sorted - 排序 (唯一需要物化全部输入的非终结算子)
// ═══════════════════════════════════════════════════════════════════════════

/// 首次拉取时吸干上游并稳定排序
pub struct Sorted<I: Iterator, F> {
    upstream: Option<I>,
    compare: F,
    sorted: std::vec::IntoIter<I::Item>,
}

impl<I: Iterator, F> Sorted<I, F> {
    pub fn new(upstream: I, compare: F) -> Self {
        Self {
            upstream: Some(upstream),
            compare,
            sorted: Vec::new().into_iter(),
        }
    }
}

impl<I, F> Iterator for Sorted<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> Ordering,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if let Some(upstream) = self.upstream.take() {
            let mut buffer: Vec<I::Item> = upstream.collect();
            buffer.sort_by(&mut self.compare);
            log::trace!("sort stage materialized {} elements", buffer.len());
            self.sorted = buffer.into_iter();
        }
        self.sorted.next()
    }
}
