//! 流式统计 Stage - z-score 与增量相关系数
//!
//! @yutiansut @quantaxis

use super::welford::{RunningCovariance, RunningStats};
use crate::pipeline::source::ToF64;
use crate::pipeline::stage::Stage;
use crate::utils::config::{StatsConfig, VarianceKind};
use std::marker::PhantomData;

// ═══════════════════════════════════════════════════════════════════════════
// ZScoreStage
// ═══════════════════════════════════════════════════════════════════════════

/// 滚动 z-score
///
/// 第 i 个元素的得分只用它之前的元素计算：
/// `(x - mean_before) / std_before`。
/// 历史不足 `warmup` 个点时输出 NaN；标准差为 0 且 x 等于均值时输出 0。
#[derive(Debug, Clone)]
pub struct ZScoreStage<T> {
    history: RunningStats,
    warmup: u64,
    variance: VarianceKind,
    _marker: PhantomData<fn(T)>,
}

impl<T> ZScoreStage<T> {
    pub fn new() -> Self {
        Self::with_config(&StatsConfig::default())
    }

    pub fn with_config(config: &StatsConfig) -> Self {
        Self {
            history: RunningStats::new(),
            warmup: config.z_score_warmup.max(2) as u64,
            variance: config.variance,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ZScoreStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ToF64> Stage for ZScoreStage<T> {
    type In = T;
    type Out = f64;

    fn feed(&mut self, input: T) -> Option<f64> {
        let x = input.to_f64();
        let score = if self.history.count() < self.warmup {
            f64::NAN
        } else {
            let std = match self.variance {
                VarianceKind::Population => self.history.std_dev(),
                VarianceKind::Sample => self.history.sample_std_dev(),
            };
            match (self.history.mean(), std) {
                (Some(mean), Some(std)) if std == 0.0 && x == mean => 0.0,
                (Some(mean), Some(std)) => (x - mean) / std,
                _ => f64::NAN,
            }
        };
        self.history.update(x);
        Some(score)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CorrelationStage
// ═══════════════════════════════════════════════════════════════════════════

/// 增量相关系数: 从第二对开始，每对输出一次当前估计
///
/// 任一侧方差仍为 0 时输出 NaN。
#[derive(Debug, Clone)]
pub struct CorrelationStage<X, Y> {
    cov: RunningCovariance,
    _marker: PhantomData<fn(X, Y)>,
}

impl<X, Y> CorrelationStage<X, Y> {
    pub fn new() -> Self {
        Self {
            cov: RunningCovariance::new(),
            _marker: PhantomData,
        }
    }
}

impl<X, Y> Default for CorrelationStage<X, Y> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: ToF64, Y: ToF64> Stage for CorrelationStage<X, Y> {
    type In = (X, Y);
    type Out = f64;

    fn feed(&mut self, (x, y): (X, Y)) -> Option<f64> {
        self.cov.update(x.to_f64(), y.to_f64());
        if self.cov.count() < 2 {
            return None;
        }
        Some(self.cov.correlation().unwrap_or(f64::NAN))
    }
}
