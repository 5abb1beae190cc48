//! 异步多源组合
//!
//! @yutiansut @quantaxis
//!
//! 与同步 `combinators` 语义一致，数据源是任意 `Stream + Unpin`
//! (包括 `AsyncSeq` 自身)。某个源挂起时整个组合挂起，下次 poll 从同一个源继续，
//! 不会跳过或重排。

use super::AsyncSeq;
use crate::combinators::MergeHeap;
use futures::stream::{self, Stream, StreamExt};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

// ═══════════════════════════════════════════════════════════════════════════
// zip
// ═══════════════════════════════════════════════════════════════════════════

/// 两两配对，任一源结束即结束
pub fn zip<A, B>(a: A, b: B) -> AsyncSeq<impl Stream<Item = (A::Item, B::Item)> + Unpin>
where
    A: Stream + Unpin,
    B: Stream + Unpin,
{
    zip_with(a, b, |x, y| (x, y))
}

/// 配对后立即合成；左侧结束时不再 poll 右侧
pub fn zip_with<A, B, F, R>(a: A, b: B, f: F) -> AsyncSeq<ZipWithStream<A, B, F>>
where
    A: Stream + Unpin,
    B: Stream + Unpin,
    F: FnMut(A::Item, B::Item) -> R,
{
    AsyncSeq::new(ZipWithStream {
        a,
        b,
        f,
        left: None,
        done: false,
    })
}

pub struct ZipWithStream<A: Stream, B, F> {
    a: A,
    b: B,
    f: F,
    /// 左侧已到、右侧尚未到的元素
    left: Option<A::Item>,
    done: bool,
}

impl<A: Stream + Unpin, B: Unpin, F> Unpin for ZipWithStream<A, B, F> {}

impl<A, B, F, R> Stream for ZipWithStream<A, B, F>
where
    A: Stream + Unpin,
    B: Stream + Unpin,
    F: FnMut(A::Item, B::Item) -> R,
{
    type Item = R;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<R>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        let x = match this.left.take() {
            Some(x) => x,
            None => match futures::ready!(this.a.poll_next_unpin(cx)) {
                Some(x) => x,
                None => {
                    this.done = true;
                    return Poll::Ready(None);
                }
            },
        };
        match this.b.poll_next_unpin(cx) {
            Poll::Ready(Some(y)) => Poll::Ready(Some((this.f)(x, y))),
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => {
                this.left = Some(x);
                Poll::Pending
            }
        }
    }
}

/// 任意多个同类型源逐步配对成 Vec
pub fn zip_all<S>(sources: impl IntoIterator<Item = S>) -> AsyncSeq<ZipAllStream<S>>
where
    S: Stream + Unpin,
{
    let sources: Vec<S> = sources.into_iter().collect();
    AsyncSeq::new(ZipAllStream {
        row: Vec::with_capacity(sources.len()),
        sources,
        done: false,
    })
}

pub struct ZipAllStream<S: Stream> {
    sources: Vec<S>,
    /// 当前行已收到的部分，按源下标顺序填充
    row: Vec<S::Item>,
    done: bool,
}

impl<S: Stream + Unpin> Unpin for ZipAllStream<S> {}

impl<S: Stream + Unpin> Stream for ZipAllStream<S> {
    type Item = Vec<S::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Vec<S::Item>>> {
        let this = self.get_mut();
        if this.done || this.sources.is_empty() {
            return Poll::Ready(None);
        }
        while this.row.len() < this.sources.len() {
            let next = this.row.len();
            match futures::ready!(this.sources[next].poll_next_unpin(cx)) {
                Some(value) => this.row.push(value),
                None => {
                    this.done = true;
                    this.row.clear();
                    return Poll::Ready(None);
                }
            }
        }
        let row = std::mem::replace(&mut this.row, Vec::with_capacity(this.sources.len()));
        Poll::Ready(Some(row))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// chain / interleave
// ═══════════════════════════════════════════════════════════════════════════

/// 依次耗尽每个源，前一个结束前不 poll 后一个
pub fn chain<S>(sources: impl IntoIterator<Item = S>) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
where
    S: Stream + Unpin,
{
    let sources: Vec<S> = sources.into_iter().collect();
    AsyncSeq::new(stream::iter(sources).flatten())
}

/// 轮询交错，跳过已结束的源
pub fn interleave<S>(sources: impl IntoIterator<Item = S>) -> AsyncSeq<InterleaveStream<S>>
where
    S: Stream + Unpin,
{
    AsyncSeq::new(InterleaveStream {
        active: sources.into_iter().collect(),
    })
}

pub struct InterleaveStream<S> {
    /// 队首是当前轮到的源；挂起时保持在队首
    active: VecDeque<S>,
}

impl<S: Stream + Unpin> Stream for InterleaveStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let this = self.get_mut();
        loop {
            let Some(front) = this.active.front_mut() else {
                return Poll::Ready(None);
            };
            match futures::ready!(front.poll_next_unpin(cx)) {
                Some(value) => {
                    this.active.rotate_left(1);
                    return Poll::Ready(Some(value));
                }
                None => {
                    this.active.pop_front();
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// merge
// ═══════════════════════════════════════════════════════════════════════════

/// 按自然顺序归并多个有序流
pub fn merge<S>(
    sources: impl IntoIterator<Item = S>,
) -> AsyncSeq<MergeStream<S, fn(&S::Item, &S::Item) -> Ordering>>
where
    S: Stream + Unpin,
    S::Item: Ord,
{
    merge_by(sources, <S::Item as Ord>::cmp as fn(&S::Item, &S::Item) -> Ordering)
}

/// 按自定义比较器归并多个有序流，相等时按源下标
pub fn merge_by<S, F>(sources: impl IntoIterator<Item = S>, compare: F) -> AsyncSeq<MergeStream<S, F>>
where
    S: Stream + Unpin,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
{
    let sources: Vec<S> = sources.into_iter().collect();
    log::trace!("async k-way merge over {} sources", sources.len());
    AsyncSeq::new(MergeStream {
        heap: MergeHeap::with_capacity(sources.len(), compare),
        sources,
        primed: 0,
        refill: None,
    })
}

/// 异步 k 路归并
///
/// 首次 poll 时依次取每个源的头部；之后每输出一个元素，下次 poll 只补充它所在的源。
/// 补充中的源挂起时，记住待补充的下标，唤醒后从这里继续。
pub struct MergeStream<S: Stream, F> {
    sources: Vec<S>,
    heap: MergeHeap<S::Item, F>,
    /// 已完成首次拉取的源数量
    primed: usize,
    refill: Option<usize>,
}

impl<S: Stream + Unpin, F> Unpin for MergeStream<S, F> {}

impl<S, F> MergeStream<S, F>
where
    S: Stream + Unpin,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
{
    fn poll_source(&mut self, source: usize, cx: &mut Context<'_>) -> Poll<()> {
        if let Some(value) = futures::ready!(self.sources[source].poll_next_unpin(cx)) {
            self.heap.push(value, source);
        }
        Poll::Ready(())
    }
}

impl<S, F> Stream for MergeStream<S, F>
where
    S: Stream + Unpin,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let this = self.get_mut();
        while this.primed < this.sources.len() {
            futures::ready!(this.poll_source(this.primed, cx));
            this.primed += 1;
        }
        if let Some(source) = this.refill {
            futures::ready!(this.poll_source(source, cx));
            this.refill = None;
        }
        match this.heap.pop() {
            Some((value, source)) => {
                this.refill = Some(source);
                Poll::Ready(Some(value))
            }
            None => Poll::Ready(None),
        }
    }
}
