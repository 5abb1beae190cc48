//! 异步流水线
//!
//! @yutiansut @quantaxis
//!
//! `AsyncSeq<S>` 是 `Seq` 的异步镜像，底层是 `futures::Stream`：
//! - 只有 poll 底层数据源时才会挂起，Stage 同步执行
//! - 每个算子至多持有一个在途拉取
//! - 与同步流水线共享同一套 Stage 实现 (窗口/去重/统计)
//!
//! 数据源可以是普通迭代器、任意 Stream，或 tokio mpsc 通道。
//! 多源组合 (zip / chain / interleave / merge) 见 `combinators`。

pub mod combinators;
pub mod stream_stage;

pub use combinators::{chain, interleave, merge, merge_by, zip, zip_all, zip_with};
pub use stream_stage::StagedStream;

use crate::pipeline::source::ToF64;
use crate::pipeline::stage::{Distinct, DistinctBy, Pairwise, Scan, Stage};
use crate::pipeline::{seq, Seq};
use crate::stats::{CorrelationStage, EwmaStage, RunningStats, ZScoreStage};
use crate::utils::config::StatsConfig;
use crate::window::{ChunkStage, Extremum, ExtremumStage, WindowStage};
use crate::{Result, SeqError};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use std::cmp::Ordering;
use std::hash::Hash;
use std::ops::Add;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// 异步流水线句柄
#[derive(Debug)]
#[must_use = "async pipelines are lazy and do nothing until a terminal operation is awaited"]
pub struct AsyncSeq<S> {
    inner: S,
}

// ═══════════════════════════════════════════════════════════════════════════
// 数据源
// ═══════════════════════════════════════════════════════════════════════════

/// 同步可迭代对象 -> 异步流水线
///
/// 迭代器需要是 `Unpin` 的 (标准库迭代器都是)。
pub fn from_iter<I: IntoIterator>(source: I) -> AsyncSeq<stream::Iter<I::IntoIter>> {
    AsyncSeq {
        inner: stream::iter(source),
    }
}

/// 任意 Stream -> 异步流水线 (装箱固定)
pub fn from_stream<St: Stream>(source: St) -> AsyncSeq<Pin<Box<St>>> {
    AsyncSeq {
        inner: Box::pin(source),
    }
}

/// 以 tokio mpsc 通道为生产者，所有发送端关闭后流结束
pub fn from_receiver<T>(receiver: mpsc::Receiver<T>) -> AsyncSeq<ReceiverStream<T>> {
    AsyncSeq {
        inner: ReceiverStream::new(receiver),
    }
}

impl<S: Stream + Unpin> AsyncSeq<S> {
    /// 包装一个已经 Unpin 的 Stream
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// 取回底层 Stream
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// 借用当前流水线，部分消费后原句柄可以继续使用
    pub fn by_ref(&mut self) -> AsyncSeq<&mut S> {
        AsyncSeq::new(&mut self.inner)
    }

    /// 挂接自定义 Stage
    pub fn stage<St>(self, stage: St) -> AsyncSeq<StagedStream<S, St>>
    where
        St: Stage<In = S::Item>,
    {
        AsyncSeq::new(StagedStream::new(self.inner, stage))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 逐元素变换
    // ───────────────────────────────────────────────────────────────────────

    /// 逐元素映射
    pub fn map<U, F>(self, f: F) -> AsyncSeq<impl Stream<Item = U> + Unpin>
    where
        F: FnMut(S::Item) -> U,
    {
        AsyncSeq::new(self.inner.map(f))
    }

    /// 保留满足条件的元素
    pub fn filter<P>(self, mut predicate: P) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
    where
        P: FnMut(&S::Item) -> bool,
    {
        AsyncSeq::new(self.inner.filter(move |x| future::ready(predicate(x))))
    }

    /// 每个元素展开为一个序列并依次输出
    pub fn flat_map<U, F>(self, mut f: F) -> AsyncSeq<impl Stream<Item = U::Item> + Unpin>
    where
        U: IntoIterator,
        U::IntoIter: Unpin,
        F: FnMut(S::Item) -> U,
    {
        AsyncSeq::new(self.inner.flat_map(move |x| stream::iter(f(x))))
    }

    /// 旁路观察每个元素
    pub fn tap<F>(self, f: F) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
    where
        F: FnMut(&S::Item),
    {
        AsyncSeq::new(self.inner.inspect(f))
    }

    /// 附带从 0 开始的位置
    pub fn enumerate(self) -> AsyncSeq<impl Stream<Item = (usize, S::Item)> + Unpin> {
        AsyncSeq::new(self.inner.enumerate())
    }

    /// 每个元素输出一次累积值
    pub fn scan<A, F>(self, init: A, f: F) -> AsyncSeq<StagedStream<S, Scan<A, S::Item, F>>>
    where
        A: Clone,
        F: FnMut(&A, S::Item) -> A,
    {
        self.stage(Scan::new(init, f))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 截取
    // ───────────────────────────────────────────────────────────────────────

    /// 取前 n 个，满足后不再 poll 上游
    pub fn take(self, n: usize) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin> {
        AsyncSeq::new(self.inner.take(n))
    }

    /// 条件首次不满足时结束
    pub fn take_while<P>(self, mut predicate: P) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
    where
        P: FnMut(&S::Item) -> bool,
    {
        AsyncSeq::new(self.inner.take_while(move |x| future::ready(predicate(x))))
    }

    /// 丢弃前 n 个
    pub fn drop(self, n: usize) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin> {
        AsyncSeq::new(self.inner.skip(n))
    }

    /// 丢弃开头满足条件的元素
    pub fn drop_while<P>(self, mut predicate: P) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
    where
        P: FnMut(&S::Item) -> bool,
    {
        AsyncSeq::new(self.inner.skip_while(move |x| future::ready(predicate(x))))
    }

    /// 当前流结束后接上另一条流水线
    pub fn concat<T>(self, other: AsyncSeq<T>) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
    where
        T: Stream<Item = S::Item> + Unpin,
    {
        AsyncSeq::new(self.inner.chain(other.inner))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 去重 / 排序
    // ───────────────────────────────────────────────────────────────────────

    /// 去掉重复元素，保留首次出现的顺序
    pub fn distinct(self) -> AsyncSeq<StagedStream<S, Distinct<S::Item>>>
    where
        S::Item: Eq + Hash + Clone,
    {
        self.stage(Distinct::new())
    }

    /// 按 key 去重
    pub fn distinct_by<K, F>(self, key: F) -> AsyncSeq<StagedStream<S, DistinctBy<S::Item, K, F>>>
    where
        K: Eq + Hash,
        F: FnMut(&S::Item) -> K,
    {
        self.stage(DistinctBy::new(key))
    }

    /// 首次 poll 时收齐上游后稳定排序
    pub fn sort_by<F>(self, mut compare: F) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
    where
        F: FnMut(&S::Item, &S::Item) -> Ordering,
    {
        let upstream = self.inner;
        let sorted = stream::once(async move {
            let mut buffer: Vec<S::Item> = upstream.collect().await;
            buffer.sort_by(&mut compare);
            stream::iter(buffer)
        })
        .flatten();
        AsyncSeq::new(Box::pin(sorted))
    }

    /// 自然顺序稳定排序
    pub fn sort(self) -> AsyncSeq<impl Stream<Item = S::Item> + Unpin>
    where
        S::Item: Ord,
    {
        self.sort_by(<S::Item as Ord>::cmp)
    }

    // ───────────────────────────────────────────────────────────────────────
    // 窗口
    // ───────────────────────────────────────────────────────────────────────

    /// 滑动窗口，前 size-1 个元素不产生输出
    pub fn window(self, size: usize) -> Result<AsyncSeq<StagedStream<S, WindowStage<S::Item>>>>
    where
        S::Item: Clone,
    {
        Ok(self.stage(WindowStage::new(size)?))
    }

    /// 不重叠分块，最后一块可以不满
    pub fn chunk(self, size: usize) -> Result<AsyncSeq<StagedStream<S, ChunkStage<S::Item>>>> {
        Ok(self.stage(ChunkStage::new(size)?))
    }

    /// 相邻元素成对输出
    pub fn pairwise(self) -> AsyncSeq<StagedStream<S, Pairwise<S::Item>>>
    where
        S::Item: Clone,
    {
        self.stage(Pairwise::new())
    }

    /// 滑动窗口最小值
    pub fn windowed_min(self, size: usize) -> Result<AsyncSeq<StagedStream<S, ExtremumStage<S::Item>>>>
    where
        S::Item: PartialOrd + Clone,
    {
        Ok(self.stage(ExtremumStage::new(Extremum::Min, size)?))
    }

    /// 滑动窗口最大值
    pub fn windowed_max(self, size: usize) -> Result<AsyncSeq<StagedStream<S, ExtremumStage<S::Item>>>>
    where
        S::Item: PartialOrd + Clone,
    {
        Ok(self.stage(ExtremumStage::new(Extremum::Max, size)?))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 流式统计
    // ───────────────────────────────────────────────────────────────────────

    /// 指数加权移动平均，0 < alpha <= 1
    pub fn ewma(self, alpha: f64) -> Result<AsyncSeq<StagedStream<S, EwmaStage<S::Item>>>>
    where
        S::Item: ToF64,
    {
        Ok(self.stage(EwmaStage::new(alpha)?))
    }

    /// 滚动 z-score，默认总体方差
    pub fn streaming_z_score(self) -> AsyncSeq<StagedStream<S, ZScoreStage<S::Item>>>
    where
        S::Item: ToF64,
    {
        self.stage(ZScoreStage::new())
    }

    /// 按配置计算 z-score
    pub fn streaming_z_score_with(
        self,
        config: &StatsConfig,
    ) -> AsyncSeq<StagedStream<S, ZScoreStage<S::Item>>>
    where
        S::Item: ToF64,
    {
        self.stage(ZScoreStage::with_config(config))
    }

    /// 成对流的增量相关系数
    pub fn streaming_correlation<X, Y>(self) -> AsyncSeq<StagedStream<S, CorrelationStage<X, Y>>>
    where
        S: Stream<Item = (X, Y)>,
        X: ToF64,
        Y: ToF64,
    {
        self.stage(CorrelationStage::new())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // 终结算子
    // ═══════════════════════════════════════════════════════════════════════

    /// 收集全部元素
    pub async fn to_vec(self) -> Vec<S::Item> {
        self.inner.collect().await
    }

    /// 物化为同步流水线，用于次序统计量等需要全部数据的操作
    pub async fn collect_seq(self) -> Seq<std::vec::IntoIter<S::Item>> {
        seq(self.to_vec().await)
    }

    pub async fn fold<A, F>(mut self, init: A, mut f: F) -> A
    where
        F: FnMut(A, S::Item) -> A,
    {
        let mut acc = init;
        while let Some(item) = self.inner.next().await {
            acc = f(acc, item);
        }
        acc
    }

    pub async fn reduce<F>(mut self, mut f: F) -> Option<S::Item>
    where
        F: FnMut(S::Item, S::Item) -> S::Item,
    {
        let mut acc = self.inner.next().await?;
        while let Some(item) = self.inner.next().await {
            acc = f(acc, item);
        }
        Some(acc)
    }

    /// 逐元素相加，空序列返回 None
    pub async fn sum(self) -> Option<S::Item>
    where
        S::Item: Add<Output = S::Item>,
    {
        self.reduce(|a, b| a + b).await
    }

    pub async fn count(self) -> usize {
        self.fold(0, |n, _| n + 1).await
    }

    pub async fn min(self) -> Option<S::Item>
    where
        S::Item: PartialOrd,
    {
        self.reduce(|best, x| if x < best { x } else { best }).await
    }

    pub async fn max(self) -> Option<S::Item>
    where
        S::Item: PartialOrd,
    {
        self.reduce(|best, x| if x > best { x } else { best }).await
    }

    async fn running_stats(self) -> RunningStats
    where
        S::Item: ToF64,
    {
        self.fold(RunningStats::new(), |mut stats, x| {
            stats.update(x.to_f64());
            stats
        })
        .await
    }

    pub async fn mean(self) -> Option<f64>
    where
        S::Item: ToF64,
    {
        self.running_stats().await.mean()
    }

    /// 总体方差
    pub async fn variance(self) -> Option<f64>
    where
        S::Item: ToF64,
    {
        self.running_stats().await.variance()
    }

    pub async fn std_dev(self) -> Option<f64>
    where
        S::Item: ToF64,
    {
        self.running_stats().await.std_dev()
    }

    pub async fn first(mut self) -> Result<S::Item> {
        self.inner
            .next()
            .await
            .ok_or_else(|| SeqError::EmptySequence("first() on empty stream".to_string()))
    }

    pub async fn last(self) -> Result<S::Item> {
        self.fold(None, |_, x| Some(x))
            .await
            .ok_or_else(|| SeqError::EmptySequence("last() on empty stream".to_string()))
    }

    pub async fn find<P>(mut self, mut predicate: P) -> Option<S::Item>
    where
        P: FnMut(&S::Item) -> bool,
    {
        while let Some(item) = self.inner.next().await {
            if predicate(&item) {
                return Some(item);
            }
        }
        None
    }

    /// 短路: 找到第一个满足条件的元素后不再 poll
    pub async fn some<P>(mut self, mut predicate: P) -> bool
    where
        P: FnMut(S::Item) -> bool,
    {
        while let Some(item) = self.inner.next().await {
            if predicate(item) {
                return true;
            }
        }
        false
    }

    pub async fn every<P>(mut self, mut predicate: P) -> bool
    where
        P: FnMut(S::Item) -> bool,
    {
        while let Some(item) = self.inner.next().await {
            if !predicate(item) {
                return false;
            }
        }
        true
    }

    pub async fn includes<T>(self, value: &T) -> bool
    where
        S::Item: PartialEq<T>,
    {
        self.some(|x| x == *value).await
    }

    /// 至多 poll 出一个元素
    pub async fn is_empty(mut self) -> bool {
        self.inner.next().await.is_none()
    }
}

impl<S: Stream + Unpin> Stream for AsyncSeq<S> {
    type Item = S::Item;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<S::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
