//! 序列数据源
//!
//! @yutiansut @quantaxis
//!
//! - 静态构造: `range` / `range_to` / `repeat`
//! - 数值转换: `ToF64` (无损/有损数值类型) 与 `TryToF64` (动态值，可能失败)

use super::Seq;
use crate::utils::validate;
use crate::{Result, SeqError};

// ═══════════════════════════════════════════════════════════════════════════
// 数值转换
// ═══════════════════════════════════════════════════════════════════════════

/// 可直接转换为 f64 的数值类型
pub trait ToF64 {
    fn to_f64(&self) -> f64;
}

macro_rules! impl_to_f64 {
    ($($t:ty),*) => {
        $(
            impl ToF64 for $t {
                #[inline]
                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_to_f64!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToF64 + ?Sized> ToF64 for &T {
    #[inline]
    fn to_f64(&self) -> f64 {
        (**self).to_f64()
    }
}

/// 可能失败的数值转换 (字符串、JSON 等动态输入)
pub trait TryToF64 {
    fn try_to_f64(&self) -> Result<f64>;
}

macro_rules! impl_try_to_f64 {
    ($($t:ty),*) => {
        $(
            impl TryToF64 for $t {
                #[inline]
                fn try_to_f64(&self) -> Result<f64> {
                    Ok(self.to_f64())
                }
            }
        )*
    };
}

impl_try_to_f64!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl TryToF64 for str {
    fn try_to_f64(&self) -> Result<f64> {
        self.trim()
            .parse::<f64>()
            .map_err(|_| SeqError::TypeConversion(format!("'{}' is not numeric", self)))
    }
}

impl TryToF64 for String {
    fn try_to_f64(&self) -> Result<f64> {
        self.as_str().try_to_f64()
    }
}

impl TryToF64 for serde_json::Value {
    fn try_to_f64(&self) -> Result<f64> {
        match self {
            serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| {
                SeqError::TypeConversion(format!("JSON number {} does not fit in f64", n))
            }),
            serde_json::Value::String(s) => s.try_to_f64(),
            other => Err(SeqError::TypeConversion(format!(
                "JSON value {} is not numeric",
                other
            ))),
        }
    }
}

impl<T: TryToF64 + ?Sized> TryToF64 for &T {
    fn try_to_f64(&self) -> Result<f64> {
        (**self).try_to_f64()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// range
// ═══════════════════════════════════════════════════════════════════════════

/// 等差整数序列 [start, stop)
#[derive(Debug, Clone)]
pub struct Range {
    next: Option<i64>,
    stop: i64,
    step: i64,
}

impl Iterator for Range {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next?;
        let in_range = if self.step > 0 {
            current < self.stop
        } else {
            current > self.stop
        };
        if !in_range {
            self.next = None;
            return None;
        }
        // 溢出即视为到达终点
        self.next = current.checked_add(self.step);
        Some(current)
    }
}

/// `range(start, stop, step)`: 步长为 0 时返回校验错误
///
/// 步长方向与区间方向相反时得到空序列。
pub fn range(start: i64, stop: i64, step: i64) -> Result<Seq<Range>> {
    let step = validate::non_zero_step(step)?;
    Ok(Seq::new(Range {
        next: Some(start),
        stop,
        step,
    }))
}

/// `range(0, stop, 1)`
pub fn range_to(stop: i64) -> Seq<Range> {
    Seq::new(Range {
        next: Some(0),
        stop,
        step: 1,
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// repeat
// ═══════════════════════════════════════════════════════════════════════════

/// 重复同一个值，`times` 为 None 时无限
#[derive(Debug, Clone)]
pub struct Repeat<T> {
    value: T,
    remaining: Option<usize>,
}

impl<T: Clone> Iterator for Repeat<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.remaining.as_mut() {
            Some(0) => None,
            Some(n) => {
                *n -= 1;
                Some(self.value.clone())
            }
            None => Some(self.value.clone()),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

pub fn repeat<T: Clone>(value: T, times: Option<usize>) -> Seq<Repeat<T>> {
    Seq::new(Repeat {
        value,
        remaining: times,
    })
}
