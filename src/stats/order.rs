//! 次序统计量 - percentile / median / quartiles / mode
//!
//! @yutiansut @quantaxis
//!
//! 这些统计量无法在 O(1) 内存下增量计算，需要物化并排序整个序列。
//! 排序使用 `f64::total_cmp`，NaN 排在最后。

use crate::utils::validate;
use crate::Result;

/// 排序后的样本
pub fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// 在已排序样本上做线性插值百分位
///
/// rank = p / 100 * (n - 1)，非整数 rank 在相邻两个次序统计量之间插值。
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> Result<Option<f64>> {
    let p = validate::percentile_rank(p)?;
    if sorted.is_empty() {
        return Ok(None);
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Ok(Some(sorted[lower]));
    }
    let weight = rank - lower as f64;
    Ok(Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight))
}

pub fn percentile(values: Vec<f64>, p: f64) -> Result<Option<f64>> {
    // 参数先校验，空输入也要报错
    validate::percentile_rank(p)?;
    percentile_of_sorted(&sorted(values), p)
}

pub fn median(values: Vec<f64>) -> Option<f64> {
    median_of_sorted(&sorted(values))
}

pub(crate) fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    percentile_of_sorted(sorted, 50.0).ok().flatten()
}

/// (Q1, Q2, Q3)
pub fn quartiles(values: Vec<f64>) -> Option<(f64, f64, f64)> {
    quartiles_of_sorted(&sorted(values))
}

pub(crate) fn quartiles_of_sorted(sorted: &[f64]) -> Option<(f64, f64, f64)> {
    let q = |p| percentile_of_sorted(sorted, p).ok().flatten();
    Some((q(25.0)?, q(50.0)?, q(75.0)?))
}

/// 出现次数最多的所有值，升序
pub fn mode(values: Vec<f64>) -> Vec<f64> {
    let sorted = sorted(values);
    let mut modes = Vec::new();
    let mut best = 0usize;
    let mut start = 0usize;

    while start < sorted.len() {
        let value = sorted[start];
        // NaN 与自身不相等，单独成组
        let run = sorted[start..].iter().take_while(|x| **x == value).count().max(1);
        match run.cmp(&best) {
            std::cmp::Ordering::Greater => {
                best = run;
                modes.clear();
                modes.push(value);
            }
            std::cmp::Ordering::Equal => modes.push(value),
            std::cmp::Ordering::Less => {}
        }
        start += run;
    }
    modes
}
