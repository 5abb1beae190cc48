//! 多源组合算子
//!
//! @yutiansut @quantaxis
//!
//! - zip / zip_with / zip_all: 同步拉取，任一源耗尽即停止
//! - chain: 依次耗尽每个源
//! - interleave: 轮询拉取，跳过已耗尽的源
//! - merge / merge_by: k 路有序归并 (merge.rs)

pub mod merge;

pub use merge::{merge, merge_by, Merge, MergeHeap};

use crate::pipeline::Seq;
use std::collections::VecDeque;
use std::iter::{Flatten, Zip};

/// 两两配对
pub fn zip<A, B>(a: A, b: B) -> Seq<Zip<A::IntoIter, B::IntoIter>>
where
    A: IntoIterator,
    B: IntoIterator,
{
    Seq::new(a.into_iter().zip(b))
}

/// 配对后立即合成
pub fn zip_with<A, B, F, R>(a: A, b: B, f: F) -> Seq<ZipWith<A::IntoIter, B::IntoIter, F>>
where
    A: IntoIterator,
    B: IntoIterator,
    F: FnMut(A::Item, B::Item) -> R,
{
    Seq::new(ZipWith {
        a: a.into_iter(),
        b: b.into_iter(),
        f,
    })
}

pub struct ZipWith<A, B, F> {
    a: A,
    b: B,
    f: F,
}

impl<A, B, F, R> Iterator for ZipWith<A, B, F>
where
    A: Iterator,
    B: Iterator,
    F: FnMut(A::Item, B::Item) -> R,
{
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let x = self.a.next()?;
        let y = self.b.next()?;
        Some((self.f)(x, y))
    }
}

/// 任意多个同类型源逐步配对成 Vec
pub fn zip_all<S>(sources: impl IntoIterator<Item = S>) -> Seq<ZipAll<S::IntoIter>>
where
    S: IntoIterator,
{
    Seq::new(ZipAll {
        sources: sources.into_iter().map(IntoIterator::into_iter).collect(),
        done: false,
    })
}

pub struct ZipAll<I> {
    sources: Vec<I>,
    done: bool,
}

impl<I: Iterator> Iterator for ZipAll<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Vec<I::Item>> {
        if self.done || self.sources.is_empty() {
            return None;
        }
        let mut row = Vec::with_capacity(self.sources.len());
        for source in self.sources.iter_mut() {
            match source.next() {
                Some(value) => row.push(value),
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
        Some(row)
    }
}

/// 依次连接
pub fn chain<S>(sources: impl IntoIterator<Item = S>) -> Seq<Flatten<std::vec::IntoIter<S>>>
where
    S: IntoIterator,
{
    let sources: Vec<S> = sources.into_iter().collect();
    Seq::new(sources.into_iter().flatten())
}

/// 轮询交错
pub fn interleave<S>(sources: impl IntoIterator<Item = S>) -> Seq<Interleave<S::IntoIter>>
where
    S: IntoIterator,
{
    Seq::new(Interleave {
        active: sources.into_iter().map(IntoIterator::into_iter).collect(),
    })
}

pub struct Interleave<I> {
    /// 队首是下一个轮到的源，耗尽的源直接移除
    active: VecDeque<I>,
}

impl<I: Iterator> Iterator for Interleave<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        while let Some(mut source) = self.active.pop_front() {
            if let Some(value) = source.next() {
                self.active.push_back(source);
                return Some(value);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_zip_stops_at_shortest() {
        let pairs = zip(vec![1, 2, 3], vec!['a', 'b']).to_vec();
        assert_eq!(pairs, vec![(1, 'a'), (2, 'b')]);
    }

    #[test]
    fn test_zip_with() {
        let sums = zip_with(vec![1, 2, 3], vec![10, 20, 30], |a, b| a + b).to_vec();
        assert_eq!(sums, vec![11, 22, 33]);
    }

    #[test]
    fn test_zip_all() {
        let rows = zip_all(vec![vec![1, 2], vec![3, 4, 5], vec![6, 7]]).to_vec();
        assert_eq!(rows, vec![vec![1, 3, 6], vec![2, 4, 7]]);
        assert!(zip_all(Vec::<Vec<i32>>::new()).to_vec().is_empty());
    }

    #[test]
    fn test_chain_drains_in_order() {
        let pulled_second = Cell::new(false);
        let first = vec![1, 2];
        let second = (3..5).inspect(|_| pulled_second.set(true));
        let mut chained = chain(vec![
            Box::new(first.into_iter()) as Box<dyn Iterator<Item = i32> + '_>,
            Box::new(second),
        ]);
        assert_eq!(chained.next(), Some(1));
        assert_eq!(chained.next(), Some(2));
        assert!(!pulled_second.get());
        assert_eq!(chained.to_vec(), vec![3, 4]);
    }

    #[test]
    fn test_interleave_skips_exhausted() {
        let out = interleave(vec![vec![1, 4, 7, 8], vec![2], vec![3, 5]]).to_vec();
        assert_eq!(out, vec![1, 2, 3, 4, 5, 7, 8]);
    }
}
