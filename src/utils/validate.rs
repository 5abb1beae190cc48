//! 算子参数校验
//!
//! 所有校验都在构造阶段完成，失败时尚未拉取任何元素。

use crate::{Result, SeqError};

/// 窗口/分块大小必须为正
pub fn positive_size(op: &str, size: usize) -> Result<usize> {
    if size == 0 {
        log::debug!("{}: rejected size 0", op);
        return Err(SeqError::Validation(format!(
            "{} size must be a positive integer, got 0",
            op
        )));
    }
    Ok(size)
}

/// 平滑因子 0 < alpha <= 1
pub fn smoothing_factor(alpha: f64) -> Result<f64> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        log::debug!("ewma: rejected alpha {}", alpha);
        return Err(SeqError::Validation(format!(
            "ewma alpha must be in (0, 1], got {}",
            alpha
        )));
    }
    Ok(alpha)
}

/// 百分位 0 <= p <= 100
pub fn percentile_rank(p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        log::debug!("percentile: rejected p {}", p);
        return Err(SeqError::Validation(format!(
            "percentile must be between 0 and 100, got {}",
            p
        )));
    }
    Ok(p)
}

/// range 步长非零
pub fn non_zero_step(step: i64) -> Result<i64> {
    if step == 0 {
        return Err(SeqError::Validation("range step must not be zero".to_string()));
    }
    Ok(step)
}
