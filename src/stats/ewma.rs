//! EWMA - 指数加权移动平均
//!
//! @yutiansut @quantaxis
//!
//! EWMA_t = α * x_t + (1 - α) * EWMA_{t-1}
//!
//! 用第一个观测值做种子 (不从 0 起步，没有预热偏差)。

use crate::pipeline::source::ToF64;
use crate::pipeline::stage::Stage;
use crate::utils::validate;
use crate::Result;
use std::marker::PhantomData;

/// EWMA 状态
#[derive(Debug, Clone, PartialEq)]
pub struct EwmaState {
    alpha: f64,
    value: Option<f64>,
    count: u64,
}

impl EwmaState {
    /// 平滑因子需满足 0 < alpha <= 1
    pub fn new(alpha: f64) -> Result<Self> {
        Ok(Self {
            alpha: validate::smoothing_factor(alpha)?,
            value: None,
            count: 0,
        })
    }

    /// 按周期换算: α = 2 / (period + 1)
    pub fn from_period(period: usize) -> Result<Self> {
        validate::positive_size("ewma period", period)?;
        Self::new(2.0 / (period as f64 + 1.0))
    }

    /// 更新并返回最新值
    pub fn update(&mut self, x: f64) -> f64 {
        self.count += 1;
        let next = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn reset(&mut self) {
        self.value = None;
        self.count = 0;
    }
}

/// 每个输入输出一次 EWMA
#[derive(Debug, Clone)]
pub struct EwmaStage<T> {
    state: EwmaState,
    _marker: PhantomData<fn(T)>,
}

impl<T> EwmaStage<T> {
    pub fn new(alpha: f64) -> Result<Self> {
        Ok(Self {
            state: EwmaState::new(alpha)?,
            _marker: PhantomData,
        })
    }
}

impl<T: ToF64> Stage for EwmaStage<T> {
    type In = T;
    type Out = f64;

    fn feed(&mut self, input: T) -> Option<f64> {
        Some(self.state.update(input.to_f64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_by_first_value() {
        let mut ema = EwmaState::new(0.5).unwrap();
        assert_eq!(ema.value(), None);
        assert_eq!(ema.update(10.0), 10.0);
        assert_eq!(ema.update(20.0), 15.0);
        assert_eq!(ema.update(20.0), 17.5);
        assert_eq!(ema.count(), 3);
    }

    #[test]
    fn test_alpha_one_tracks_input() {
        let mut ema = EwmaState::new(1.0).unwrap();
        for x in [3.0, -1.0, 8.0] {
            assert_eq!(ema.update(x), x);
        }
    }

    #[test]
    fn test_from_period() {
        let ema = EwmaState::from_period(9).unwrap();
        assert!((ema.alpha() - 0.2).abs() < 1e-12);
        assert!(EwmaState::from_period(0).is_err());
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(EwmaState::new(0.0).is_err());
        assert!(EwmaState::new(-0.1).is_err());
        assert!(EwmaState::new(1.01).is_err());
    }

    #[test]
    fn test_trend_lags_input() {
        let mut ema = EwmaState::from_period(10).unwrap();
        for i in 1..=20 {
            ema.update(i as f64);
        }
        // EMA 应该接近但略低于最新值
        let val = ema.value().unwrap();
        assert!(val > 15.0 && val < 20.0);
    }
}
