//! 终结算子
//!
//! @yutiansut @quantaxis
//!
//! 终结算子消费 `Seq` 句柄并拉取上游直到耗尽或短路。
//! 数值类终结算子在空序列上返回 None，只有参数非法才返回错误。

use super::source::ToF64;
use super::Seq;
use crate::stats::{self, order, RunningStats, Summary};
use crate::utils::config::StatsConfig;
use crate::utils::validate;
use crate::{Result, SeqError};
use std::collections::HashMap;
use std::hash::Hash;
use std::iter::{Product, Sum};

impl<I: Iterator> Seq<I> {
    // ───────────────────────────────────────────────────────────────────────
    // 收集 / 归约
    // ───────────────────────────────────────────────────────────────────────

    pub fn to_vec(self) -> Vec<I::Item> {
        self.inner.collect()
    }

    /// 收集可失败元素，遇到第一个错误即停止拉取并返回该错误
    pub fn try_to_vec<T, E>(self) -> std::result::Result<Vec<T>, E>
    where
        I: Iterator<Item = std::result::Result<T, E>>,
    {
        self.inner.collect()
    }

    /// 无初值归约，空序列返回 None
    pub fn reduce<F>(self, f: F) -> Option<I::Item>
    where
        F: FnMut(I::Item, I::Item) -> I::Item,
    {
        self.inner.reduce(f)
    }

    pub fn fold<A, F>(self, init: A, f: F) -> A
    where
        F: FnMut(A, I::Item) -> A,
    {
        self.inner.fold(init, f)
    }

    pub fn count(self) -> usize {
        self.inner.count()
    }

    pub fn sum(self) -> Option<I::Item>
    where
        I::Item: Sum<I::Item>,
    {
        let mut inner = self.inner.peekable();
        inner.peek()?;
        Some(inner.sum())
    }

    pub fn product(self) -> Option<I::Item>
    where
        I::Item: Product<I::Item>,
    {
        let mut inner = self.inner.peekable();
        inner.peek()?;
        Some(inner.product())
    }

    /// 最小值，相等时保留最先出现的
    pub fn min(self) -> Option<I::Item>
    where
        I::Item: PartialOrd,
    {
        self.inner
            .reduce(|best, x| if x < best { x } else { best })
    }

    /// 最大值，相等时保留最先出现的
    pub fn max(self) -> Option<I::Item>
    where
        I::Item: PartialOrd,
    {
        self.inner
            .reduce(|best, x| if x > best { x } else { best })
    }

    // ───────────────────────────────────────────────────────────────────────
    // 查找 / 判定
    // ───────────────────────────────────────────────────────────────────────

    /// 第一个元素，空序列报错
    pub fn first(mut self) -> Result<I::Item> {
        self.inner
            .next()
            .ok_or_else(|| SeqError::EmptySequence("first() on empty sequence".to_string()))
    }

    /// 最后一个元素，空序列报错
    pub fn last(self) -> Result<I::Item> {
        self.inner
            .last()
            .ok_or_else(|| SeqError::EmptySequence("last() on empty sequence".to_string()))
    }

    pub fn find<P>(mut self, predicate: P) -> Option<I::Item>
    where
        P: FnMut(&I::Item) -> bool,
    {
        self.inner.find(predicate)
    }

    /// 第 index 个元素 (0 起)
    pub fn element_at(self, index: usize) -> Result<I::Item> {
        let mut len = 0;
        for item in self.inner {
            if len == index {
                return Ok(item);
            }
            len += 1;
        }
        Err(SeqError::IndexOutOfBounds { index, len })
    }

    /// 任一元素满足条件即返回 true (短路)
    pub fn some<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(I::Item) -> bool,
    {
        self.inner.any(predicate)
    }

    /// 全部元素满足条件 (短路)，空序列为 true
    pub fn every<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(I::Item) -> bool,
    {
        self.inner.all(predicate)
    }

    pub fn includes<T>(mut self, value: &T) -> bool
    where
        I::Item: PartialEq<T>,
    {
        self.inner.any(|x| x == *value)
    }

    /// 至多拉取一个元素
    pub fn is_empty(mut self) -> bool {
        self.inner.next().is_none()
    }

    // ───────────────────────────────────────────────────────────────────────
    // 分组
    // ───────────────────────────────────────────────────────────────────────

    /// 按键分组，组的顺序为键首次出现的顺序
    pub fn group_by<K, F>(self, mut key: F) -> Vec<(K, Vec<I::Item>)>
    where
        K: Eq + Hash + Clone,
        F: FnMut(&I::Item) -> K,
    {
        let mut slots: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<I::Item>)> = Vec::new();
        for item in self.inner {
            let k = key(&item);
            match slots.get(&k) {
                Some(&slot) => groups[slot].1.push(item),
                None => {
                    slots.insert(k.clone(), groups.len());
                    groups.push((k, vec![item]));
                }
            }
        }
        groups
    }

    /// (满足条件的, 不满足的)
    pub fn partition<P>(self, predicate: P) -> (Vec<I::Item>, Vec<I::Item>)
    where
        P: FnMut(&I::Item) -> bool,
    {
        self.inner.partition(predicate)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 数值终结算子
// ═══════════════════════════════════════════════════════════════════════════

impl<I> Seq<I>
where
    I: Iterator,
    I::Item: ToF64,
{
    fn into_f64_vec(self) -> Vec<f64> {
        self.inner.map(|x| x.to_f64()).collect()
    }

    fn running_stats(self) -> RunningStats {
        self.inner.map(|x| x.to_f64()).collect()
    }

    /// 单遍 Welford 均值
    pub fn mean(self) -> Option<f64> {
        self.running_stats().mean()
    }

    /// 总体方差
    pub fn variance(self) -> Option<f64> {
        self.running_stats().variance()
    }

    /// 总体标准差
    pub fn std_dev(self) -> Option<f64> {
        self.running_stats().std_dev()
    }

    /// 最大值与最小值之差
    pub fn span(self) -> Option<f64> {
        let (lo, hi) = self.inner.map(|x| x.to_f64()).fold(None, |acc, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((f64::min(lo, x), f64::max(hi, x))),
        })?;
        Some(hi - lo)
    }

    pub fn median(self) -> Option<f64> {
        order::median(self.into_f64_vec())
    }

    /// 线性插值百分位，p 必须在 [0, 100]
    pub fn percentile(self, p: f64) -> Result<Option<f64>> {
        let p = validate::percentile_rank(p)?;
        order::percentile(self.into_f64_vec(), p)
    }

    pub fn quartiles(self) -> Option<(f64, f64, f64)> {
        order::quartiles(self.into_f64_vec())
    }

    /// 所有出现次数最多的值，升序
    pub fn mode(self) -> Vec<f64> {
        order::mode(self.into_f64_vec())
    }

    /// 与另一个序列的总体协方差，长度不等或为空时返回 None
    pub fn covariance<J>(self, other: J) -> Option<f64>
    where
        J: IntoIterator,
        J::Item: ToF64,
    {
        stats::covariance(self.inner, other)
    }

    /// 与另一个序列的 Pearson 相关系数
    pub fn correlation<J>(self, other: J) -> Option<f64>
    where
        J: IntoIterator,
        J::Item: ToF64,
    {
        stats::correlation(self.inner, other)
    }

    pub fn describe(self) -> Option<Summary> {
        self.describe_with(&StatsConfig::default())
    }

    pub fn describe_with(self, config: &StatsConfig) -> Option<Summary> {
        Summary::from_values(self.into_f64_vec(), config)
    }
}
