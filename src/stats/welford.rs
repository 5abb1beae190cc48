//! Welford 在线累加器 - 单遍均值/方差/协方差
//!
//! @yutiansut @quantaxis
//!
//! Welford 递推避免了 Σx² - (Σx)²/n 这类大数相减带来的精度损失：
//! - 每个元素 O(1) 更新，只遍历一次
//! - 支持两个部分累加器合并 (Chan et al.)
//! - 单变量 (RunningStats) 与双变量 (RunningCovariance)

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// RunningStats - 单变量
// ═══════════════════════════════════════════════════════════════════════════

/// 在线均值/方差累加器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    /// M2 = Σ(x - mean)²
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 增量更新
    pub fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// 总体方差 M2 / n
    pub fn variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }

    /// 方差 (样本)，至少需要两个点
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    pub fn sample_std_dev(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }

    /// 合并两段独立统计的结果 (Chan 并行公式)
    pub fn merge(&self, other: &RunningStats) -> RunningStats {
        if self.count == 0 {
            return other.clone();
        }
        if other.count == 0 {
            return self.clone();
        }

        let n1 = self.count as f64;
        let n2 = other.count as f64;
        let n = n1 + n2;
        let delta = other.mean - self.mean;

        RunningStats {
            count: self.count + other.count,
            mean: self.mean + delta * n2 / n,
            m2: self.m2 + other.m2 + delta * delta * n1 * n2 / n,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.update(x);
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::new();
        stats.extend(iter);
        stats
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RunningCovariance - 双变量
// ═══════════════════════════════════════════════════════════════════════════

/// 在线协方差/相关系数累加器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningCovariance {
    count: u64,
    mean_x: f64,
    mean_y: f64,
    /// co-moment Σ(x - mean_x)(y - mean_y)
    c: f64,
    m2_x: f64,
    m2_y: f64,
}

impl RunningCovariance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, x: f64, y: f64) {
        self.count += 1;
        let n = self.count as f64;

        let dx = x - self.mean_x;
        let dy = y - self.mean_y;

        self.mean_x += dx / n;
        self.mean_y += dy / n;

        let dx2 = x - self.mean_x;
        let dy2 = y - self.mean_y;

        self.m2_x += dx * dx2;
        self.m2_y += dy * dy2;
        // 用旧的 dx 和新的 dy2，与单变量 M2 的递推对称
        self.c += dx * dy2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// 总体协方差 C / n
    pub fn covariance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.c / self.count as f64)
    }

    /// 样本协方差 C / (n - 1)
    pub fn sample_covariance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.c / (self.count - 1) as f64)
    }

    /// 相关系数，任一侧方差为 0 时无定义
    pub fn correlation(&self) -> Option<f64> {
        if self.count < 2 || self.m2_x <= 0.0 || self.m2_y <= 0.0 {
            return None;
        }
        let r = self.c / (self.m2_x * self.m2_y).sqrt();
        // 舍入误差可能让 |r| 略超过 1
        Some(r.clamp(-1.0, 1.0))
    }

    pub fn merge(&self, other: &Self) -> Self {
        if self.count == 0 {
            return other.clone();
        }
        if other.count == 0 {
            return self.clone();
        }

        let n1 = self.count as f64;
        let n2 = other.count as f64;
        let n = n1 + n2;

        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;

        Self {
            count: self.count + other.count,
            mean_x: self.mean_x + dx * n2 / n,
            mean_y: self.mean_y + dy * n2 / n,
            c: self.c + other.c + dx * dy * n1 * n2 / n,
            m2_x: self.m2_x + other.m2_x + dx * dx * n1 * n2 / n,
            m2_y: self.m2_y + other.m2_y + dy * dy * n1 * n2 / n,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
