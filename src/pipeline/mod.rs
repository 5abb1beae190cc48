//! 惰性流水线
//!
//! @yutiansut @quantaxis
//!
//! `Seq<I>` 是对任意迭代器的薄包装，提供链式算子：
//! - 非终结算子全部惰性，只返回新的 `Seq`，不拉取任何元素
//! - 终结算子 (terminal.rs) 消费句柄并拉取上游
//! - 参数非法的算子在构造时立即返回 `SeqError::Validation`
//!
//! 每个算子在被下游请求时才向上游拉取，且不多拉。

pub mod source;
pub mod stage;
mod terminal;

use crate::stats::{CorrelationStage, EwmaStage, ZScoreStage};
use crate::utils::config::StatsConfig;
use crate::window::{ChunkStage, Extremum, ExtremumStage, WindowStage};
use crate::Result;
use source::{ToF64, TryToF64};
use stage::{Distinct, DistinctBy, Pairwise, Scan, Sorted, Stage, Staged};
use std::cmp::Ordering;
use std::hash::Hash;
use std::iter::{Chain, Enumerate, Filter, FlatMap, Inspect, Map, Skip, SkipWhile, Take, TakeWhile};

/// 流水线句柄
#[derive(Debug, Clone)]
#[must_use = "pipelines are lazy and do nothing until a terminal operation pulls from them"]
pub struct Seq<I> {
    inner: I,
}

/// 把任意可迭代对象包装为流水线
pub fn seq<S: IntoIterator>(source: S) -> Seq<S::IntoIter> {
    Seq::new(source.into_iter())
}

impl<I: Iterator> Seq<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    /// 取回底层迭代器
    pub fn into_inner(self) -> I {
        self.inner
    }

    /// 借用当前流水线，部分消费后原句柄可以继续使用
    pub fn by_ref(&mut self) -> Seq<&mut I> {
        Seq::new(&mut self.inner)
    }

    /// 挂接自定义 Stage
    pub fn stage<S>(self, stage: S) -> Seq<Staged<I, S>>
    where
        S: Stage<In = I::Item>,
    {
        Seq::new(Staged::new(self.inner, stage))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 逐元素变换
    // ───────────────────────────────────────────────────────────────────────

    /// 逐元素映射
    pub fn map<U, F>(self, f: F) -> Seq<Map<I, F>>
    where
        F: FnMut(I::Item) -> U,
    {
        Seq::new(self.inner.map(f))
    }

    /// 保留满足条件的元素
    pub fn filter<P>(self, predicate: P) -> Seq<Filter<I, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Seq::new(self.inner.filter(predicate))
    }

    /// 每个元素展开为一个序列并依次输出
    pub fn flat_map<U, F>(self, f: F) -> Seq<FlatMap<I, U, F>>
    where
        U: IntoIterator,
        F: FnMut(I::Item) -> U,
    {
        Seq::new(self.inner.flat_map(f))
    }

    /// 旁路观察每个元素，不改变元素
    pub fn tap<F>(self, f: F) -> Seq<Inspect<I, F>>
    where
        F: FnMut(&I::Item),
    {
        Seq::new(self.inner.inspect(f))
    }

    /// 附带从 0 开始的位置
    pub fn enumerate(self) -> Seq<Enumerate<I>> {
        Seq::new(self.inner.enumerate())
    }

    /// 每个元素输出一次累积值
    pub fn scan<A, F>(self, init: A, f: F) -> Seq<Staged<I, Scan<A, I::Item, F>>>
    where
        A: Clone,
        F: FnMut(&A, I::Item) -> A,
    {
        self.stage(Scan::new(init, f))
    }

    /// 数值转换，非数值元素变为 `Err(SeqError::TypeConversion)`
    pub fn numeric(self) -> Seq<Map<I, fn(I::Item) -> Result<f64>>>
    where
        I::Item: TryToF64,
    {
        fn convert<T: TryToF64>(value: T) -> Result<f64> {
            value.try_to_f64()
        }
        Seq::new(self.inner.map(convert::<I::Item> as fn(I::Item) -> Result<f64>))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 截取
    // ───────────────────────────────────────────────────────────────────────

    /// 取前 n 个，满足后不再拉取上游
    pub fn take(self, n: usize) -> Seq<Take<I>> {
        Seq::new(self.inner.take(n))
    }

    /// 条件首次不满足时结束，之后不再拉取
    pub fn take_while<P>(self, predicate: P) -> Seq<TakeWhile<I, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Seq::new(self.inner.take_while(predicate))
    }

    /// 丢弃前 n 个
    pub fn drop(self, n: usize) -> Seq<Skip<I>> {
        Seq::new(self.inner.skip(n))
    }

    /// 丢弃开头满足条件的元素，之后原样输出
    pub fn drop_while<P>(self, predicate: P) -> Seq<SkipWhile<I, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Seq::new(self.inner.skip_while(predicate))
    }

    /// 当前序列耗尽后接上另一个序列
    pub fn concat<J>(self, other: J) -> Seq<Chain<I, J::IntoIter>>
    where
        J: IntoIterator<Item = I::Item>,
    {
        Seq::new(self.inner.chain(other))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 去重 / 排序
    // ───────────────────────────────────────────────────────────────────────

    /// 去掉重复元素，保留首次出现的顺序
    pub fn distinct(self) -> Seq<Staged<I, Distinct<I::Item>>>
    where
        I::Item: Eq + Hash + Clone,
    {
        self.stage(Distinct::new())
    }

    /// 按 key 去重
    pub fn distinct_by<K, F>(self, key: F) -> Seq<Staged<I, DistinctBy<I::Item, K, F>>>
    where
        K: Eq + Hash,
        F: FnMut(&I::Item) -> K,
    {
        self.stage(DistinctBy::new(key))
    }

    /// 稳定排序，首次拉取时物化整个上游
    pub fn sort_by<F>(self, compare: F) -> Seq<Sorted<I, F>>
    where
        F: FnMut(&I::Item, &I::Item) -> Ordering,
    {
        Seq::new(Sorted::new(self.inner, compare))
    }

    /// 按 key 稳定排序
    pub fn sort_by_key<K, F>(
        self,
        mut key: F,
    ) -> Seq<Sorted<I, impl FnMut(&I::Item, &I::Item) -> Ordering>>
    where
        K: Ord,
        F: FnMut(&I::Item) -> K,
    {
        self.sort_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// 自然顺序稳定排序
    pub fn sort(self) -> Seq<Sorted<I, fn(&I::Item, &I::Item) -> Ordering>>
    where
        I::Item: Ord,
    {
        self.sort_by(<I::Item as Ord>::cmp as fn(&I::Item, &I::Item) -> Ordering)
    }

    // ───────────────────────────────────────────────────────────────────────
    // 窗口
    // ───────────────────────────────────────────────────────────────────────

    /// 滑动窗口，前 size-1 个元素不产生输出
    pub fn window(self, size: usize) -> Result<Seq<Staged<I, WindowStage<I::Item>>>>
    where
        I::Item: Clone,
    {
        Ok(self.stage(WindowStage::new(size)?))
    }

    /// 不重叠分块，最后一块可以不满
    pub fn chunk(self, size: usize) -> Result<Seq<Staged<I, ChunkStage<I::Item>>>> {
        Ok(self.stage(ChunkStage::new(size)?))
    }

    /// 相邻元素成对输出
    pub fn pairwise(self) -> Seq<Staged<I, Pairwise<I::Item>>>
    where
        I::Item: Clone,
    {
        self.stage(Pairwise::new())
    }

    /// 滑动窗口最小值，单调队列实现
    pub fn windowed_min(self, size: usize) -> Result<Seq<Staged<I, ExtremumStage<I::Item>>>>
    where
        I::Item: PartialOrd + Clone,
    {
        Ok(self.stage(ExtremumStage::new(Extremum::Min, size)?))
    }

    /// 滑动窗口最大值
    pub fn windowed_max(self, size: usize) -> Result<Seq<Staged<I, ExtremumStage<I::Item>>>>
    where
        I::Item: PartialOrd + Clone,
    {
        Ok(self.stage(ExtremumStage::new(Extremum::Max, size)?))
    }

    // ───────────────────────────────────────────────────────────────────────
    // 流式统计
    // ───────────────────────────────────────────────────────────────────────

    /// 指数加权移动平均，0 < alpha <= 1
    pub fn ewma(self, alpha: f64) -> Result<Seq<Staged<I, EwmaStage<I::Item>>>>
    where
        I::Item: ToF64,
    {
        Ok(self.stage(EwmaStage::new(alpha)?))
    }

    /// 滚动 z-score，默认总体方差
    pub fn streaming_z_score(self) -> Seq<Staged<I, ZScoreStage<I::Item>>>
    where
        I::Item: ToF64,
    {
        self.stage(ZScoreStage::new())
    }

    /// 按配置的方差口径和预热长度计算 z-score
    pub fn streaming_z_score_with(
        self,
        config: &StatsConfig,
    ) -> Seq<Staged<I, ZScoreStage<I::Item>>>
    where
        I::Item: ToF64,
    {
        self.stage(ZScoreStage::with_config(config))
    }

    /// 成对序列的增量相关系数
    pub fn streaming_correlation<X, Y>(self) -> Seq<Staged<I, CorrelationStage<X, Y>>>
    where
        I: Iterator<Item = (X, Y)>,
        X: ToF64,
        Y: ToF64,
    {
        self.stage(CorrelationStage::new())
    }
}

impl<I: Iterator> Iterator for Seq<I> {
    type Item = I::Item;

    #[inline]
    fn next(&mut self) -> Option<I::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeqError;
    use std::cell::Cell;

    #[test]
    fn test_take_on_infinite_source() {
        let out = source::repeat(1i32, None).scan(0i32, |acc, x| acc + x).take(5).to_vec();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_take_pulls_exactly_n() {
        let pulled = Cell::new(0);
        let out = seq(0..)
            .tap(|_| pulled.set(pulled.get() + 1))
            .map(|x| x * 2)
            .take(3)
            .to_vec();
        assert_eq!(out, vec![0, 2, 4]);
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn test_nothing_pulled_before_terminal() {
        let pulled = Cell::new(0);
        let pipeline = seq(0..10)
            .tap(|_| pulled.set(pulled.get() + 1))
            .filter(|x| *x % 2 == 0)
            .distinct()
            .window(2)
            .unwrap();
        assert_eq!(pulled.get(), 0);
        assert_eq!(pipeline.count(), 4);
        assert_eq!(pulled.get(), 10);
    }

    #[test]
    fn test_validation_is_eager() {
        let pulled = Cell::new(0);
        let result = seq(0..10).tap(|_| pulled.set(pulled.get() + 1)).chunk(0);
        assert!(matches!(result, Err(SeqError::Validation(_))));
        assert!(seq([1.0]).ewma(0.0).is_err());
        assert!(seq([1, 2]).windowed_max(0).is_err());
        assert_eq!(pulled.get(), 0);
    }

    #[test]
    fn test_drop_and_while_variants() {
        assert_eq!(seq(1..=6).drop(4).to_vec(), vec![5, 6]);
        assert_eq!(seq(1..=6).take_while(|x| *x < 3).to_vec(), vec![1, 2]);
        assert_eq!(seq(1..=6).drop_while(|x| *x < 5).to_vec(), vec![5, 6]);
        assert!(seq(1..=3).take(2).drop(2).to_vec().is_empty());
    }

    #[test]
    fn test_flat_map_concat_enumerate() {
        let out = seq(vec![1, 2])
            .flat_map(|x| vec![x; x as usize])
            .concat(vec![9])
            .enumerate()
            .to_vec();
        assert_eq!(out, vec![(0, 1), (1, 2), (2, 2), (3, 9)]);
    }

    #[test]
    fn test_sort_variants() {
        assert_eq!(seq(vec![3, 1, 2]).sort().to_vec(), vec![1, 2, 3]);
        let words = seq(vec!["ccc", "a", "bb"]).sort_by_key(|w| w.len()).to_vec();
        assert_eq!(words, vec!["a", "bb", "ccc"]);
        let desc = seq(vec![1.5, 3.0, 2.0])
            .sort_by(|a: &f64, b: &f64| b.total_cmp(a))
            .to_vec();
        assert_eq!(desc, vec![3.0, 2.0, 1.5]);
    }

    #[test]
    fn test_pairwise_and_chunk() {
        assert_eq!(seq(1..=3).pairwise().to_vec(), vec![(1, 2), (2, 3)]);
        assert_eq!(
            seq(1..=7).chunk(3).unwrap().to_vec(),
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]
        );
    }

    #[test]
    fn test_windowed_extrema() {
        let data = [100, 90, 95, 80, 105];
        assert_eq!(seq(data).windowed_min(3).unwrap().to_vec(), vec![90, 80, 80]);
        assert_eq!(seq(data).windowed_max(3).unwrap().to_vec(), vec![100, 95, 105]);
    }

    #[test]
    fn test_ewma_stage() {
        assert_eq!(seq([42]).ewma(0.3).unwrap().to_vec(), vec![42.0]);
        let out = seq([10.0, 20.0, 30.0]).ewma(0.5).unwrap().to_vec();
        assert_eq!(out, vec![10.0, 15.0, 22.5]);
    }

    #[test]
    fn test_numeric_coercion() {
        let out = seq(vec!["1", "2.5", "x"]).numeric().to_vec();
        assert_eq!(out[0], Ok(1.0));
        assert_eq!(out[1], Ok(2.5));
        assert!(matches!(out[2], Err(SeqError::TypeConversion(_))));
    }

    #[test]
    fn test_by_ref_partial_consumption() {
        let mut pipeline = seq(1..=5);
        assert_eq!(pipeline.by_ref().take(2).to_vec(), vec![1, 2]);
        assert_eq!(pipeline.by_ref().to_vec(), vec![3, 4, 5]);
        // 已耗尽，不可重启
        assert!(pipeline.by_ref().to_vec().is_empty());
        assert_eq!(pipeline.by_ref().sum(), None);
    }

    #[test]
    fn test_streaming_correlation_on_pairs() {
        let out = seq(vec![(1, 1.0), (2, 2.0), (3, 3.5)])
            .streaming_correlation()
            .to_vec();
        assert_eq!(out.len(), 2);
        assert!((out[0] - 1.0).abs() < 1e-12);
    }
}
