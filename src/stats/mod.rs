//! 流式统计模块
//!
//! @yutiansut @quantaxis
//!
//! - Welford 累加器 (welford) - 均值/方差/协方差，O(1) 更新
//! - EWMA (ewma) - 指数加权移动平均
//! - 流式 Stage (streaming) - 滚动 z-score、增量相关系数
//! - 次序统计量 (order) - 百分位/中位数/四分位/众数

pub mod ewma;
pub mod order;
pub mod streaming;
pub mod welford;

pub use ewma::{EwmaStage, EwmaState};
pub use streaming::{CorrelationStage, ZScoreStage};
pub use welford::{RunningCovariance, RunningStats};

use crate::pipeline::source::ToF64;
use crate::utils::config::StatsConfig;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// 成对序列的整体统计
// ═══════════════════════════════════════════════════════════════════════════

/// 同步遍历两个序列，长度不等或为空时返回 None
pub fn paired_accumulator<X, Y>(xs: X, ys: Y) -> Option<RunningCovariance>
where
    X: IntoIterator,
    Y: IntoIterator,
    X::Item: ToF64,
    Y::Item: ToF64,
{
    let mut xs = xs.into_iter();
    let mut ys = ys.into_iter();
    let mut acc = RunningCovariance::new();
    loop {
        match (xs.next(), ys.next()) {
            (Some(x), Some(y)) => acc.update(x.to_f64(), y.to_f64()),
            (None, None) => break,
            _ => {
                log::debug!(
                    "paired statistics: inputs differ in length after {} pairs",
                    acc.count()
                );
                return None;
            }
        }
    }
    (acc.count() > 0).then_some(acc)
}

/// 总体协方差
pub fn covariance<X, Y>(xs: X, ys: Y) -> Option<f64>
where
    X: IntoIterator,
    Y: IntoIterator,
    X::Item: ToF64,
    Y::Item: ToF64,
{
    paired_accumulator(xs, ys)?.covariance()
}

/// Pearson 相关系数
pub fn correlation<X, Y>(xs: X, ys: Y) -> Option<f64>
where
    X: IntoIterator,
    Y: IntoIterator,
    X::Item: ToF64,
    Y::Item: ToF64,
{
    paired_accumulator(xs, ys)?.correlation()
}

// ═══════════════════════════════════════════════════════════════════════════
// Summary - 描述性统计
// ═══════════════════════════════════════════════════════════════════════════

/// 描述性统计汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    /// 空样本返回 None
    pub fn from_values(values: Vec<f64>, config: &StatsConfig) -> Option<Summary> {
        let stats: RunningStats = values.iter().copied().collect();
        let sorted = order::sorted(values);
        let (q1, median, q3) = order::quartiles_of_sorted(&sorted)?;
        let std_dev = config.variance_of(&stats).map(f64::sqrt).unwrap_or(0.0);

        Some(Summary {
            count: stats.count(),
            mean: stats.mean()?,
            std_dev,
            min: *sorted.first()?,
            q1: config.round_percentile(q1),
            median: config.round_percentile(median),
            q3: config.round_percentile(q3),
            max: *sorted.last()?,
        })
    }

    /// 序列化为 JSON，字段与结构体保持一致
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
