//! 配置管理模块
//!
//! 统计算子的约定参数，可从 toml 文件加载：
//!
//! ```toml
//! variance = "sample"
//! z_score_warmup = 5
//! percentile_precision = 4
//! ```

use crate::{Result, SeqError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 方差口径
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceKind {
    /// 总体方差 (除以 n)
    #[default]
    Population,
    /// 样本方差 (除以 n - 1)
    Sample,
}

/// 统计配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub variance: VarianceKind,

    /// 滚动 z-score 的预热长度，不足时输出 NaN (最小为 2)
    #[serde(default = "default_z_score_warmup")]
    pub z_score_warmup: usize,

    /// 百分位结果保留的小数位数
    #[serde(default)]
    pub percentile_precision: Option<u32>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            variance: VarianceKind::Population,
            z_score_warmup: default_z_score_warmup(),
            percentile_precision: None,
        }
    }
}

impl StatsConfig {
    /// 从 toml 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StatsConfig = toml::from_str(content)
            .map_err(|e| SeqError::Config(format!("Failed to parse stats config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SeqError::Config(format!("Failed to read stats config file: {}", e))
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded stats config from {:?}: {:?}", path.as_ref(), config);
        Ok(config)
    }

    /// 加载默认配置文件
    pub fn load_default() -> Result<Self> {
        Self::load_from_file("config/stats.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.z_score_warmup < 2 {
            return Err(SeqError::Config(format!(
                "z_score_warmup must be >= 2, got {}",
                self.z_score_warmup
            )));
        }
        Ok(())
    }

    /// 按配置口径从累加器中取方差
    pub(crate) fn variance_of(&self, stats: &crate::RunningStats) -> Option<f64> {
        match self.variance {
            VarianceKind::Population => stats.variance(),
            VarianceKind::Sample => stats.sample_variance(),
        }
    }

    /// 按配置精度取整
    pub(crate) fn round_percentile(&self, value: f64) -> f64 {
        match self.percentile_precision {
            Some(digits) => {
                let scale = 10f64.powi(digits as i32);
                (value * scale).round() / scale
            }
            None => value,
        }
    }
}

fn default_z_score_warmup() -> usize {
    2
}
