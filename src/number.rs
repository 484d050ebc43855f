// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(
    clippy::float_cmp,
    clippy::as_conversions,
    clippy::option_if_let_else,
    clippy::pattern_type_mismatch
)]

use core::cmp::Ordering;
use core::fmt::{self, Debug, Display, Formatter};
use core::str::FromStr;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use serde::ser::Serializer;
use serde::Serialize;

const F64_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// A numeric value.
///
/// Integers keep an exact representation. Values that do not fit `i64`/`u64`
/// are held as arbitrary-precision integers so that the big integer formats
/// (`bigint`, `int64`, `uint64`, `long`) can be compared without going
/// through `f64`.
#[derive(Clone)]
pub enum Number {
    UInt(u64),
    Int(i64),
    Float(f64),
    BigInt(Arc<BigInt>),
}

impl Number {
    /// Builds a number from a big integer, picking the smallest exact representation.
    pub fn from_bigint(value: BigInt) -> Self {
        if value.is_zero() {
            return Number::Int(0);
        }
        if value.is_negative() {
            if let Some(i) = value.to_i64() {
                return Number::Int(i);
            }
        } else if let Some(u) = value.to_u64() {
            return Number::UInt(u);
        }
        Number::BigInt(Arc::new(value))
    }

    /// Parses a numeric literal. Integer literals of any size are exact.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Some(Number::Int(i));
        }
        if let Ok(u) = s.parse::<u64>() {
            return Some(Number::UInt(u));
        }
        let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return BigInt::from_str(s).ok().map(Number::from_bigint);
        }
        // Rust accepts "inf" and "nan"; numeric input never does.
        if !s.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(Number::Float(f)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::UInt(v) => *v as f64,
            Number::Int(v) => *v as f64,
            Number::Float(v) => *v,
            Number::BigInt(v) => v.to_f64().unwrap_or(f64::NAN),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(*v),
            Number::UInt(v) => i64::try_from(*v).ok(),
            Number::Float(f) if f.fract() == 0.0 && f.abs() <= F64_SAFE_INTEGER => {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    /// Exact integer view of the number. Fractional and non-finite values have none.
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Number::UInt(v) => Some(BigInt::from(*v)),
            Number::Int(v) => Some(BigInt::from(*v)),
            Number::BigInt(v) => Some((**v).clone()),
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 => BigInt::from_f64(*f),
            Number::Float(_) => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
            _ => true,
        }
    }

    /// `self mod divisor == 0`.
    ///
    /// With `exact` the remainder is computed on big integers; a divisor or
    /// dividend without an exact integer form falls back to `f64`.
    pub fn is_multiple_of(&self, divisor: &Number, exact: bool) -> bool {
        if exact {
            if let (Some(a), Some(b)) = (self.to_bigint(), divisor.to_bigint()) {
                if b.is_zero() {
                    return false;
                }
                return (a % b).is_zero();
            }
        }
        let d = divisor.as_f64();
        if d == 0.0 {
            return false;
        }
        self.as_f64() % d == 0.0
    }

    fn compare(&self, other: &Number) -> Option<Ordering> {
        use Number::*;
        match (self, other) {
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (UInt(a), UInt(b)) => Some(a.cmp(b)),
            (Int(a), UInt(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (UInt(a), Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Float(_), _) | (_, Float(_)) => {
                if let (Some(a), Some(b)) = (self.to_bigint(), other.to_bigint()) {
                    Some(a.cmp(&b))
                } else {
                    self.as_f64().partial_cmp(&other.as_f64())
                }
            }
            _ => match (self.to_bigint(), other.to_bigint()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            },
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Number::UInt(v) => write!(f, "{v}"),
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
            Number::BigInt(v) => write!(f, "{v}"),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Number::UInt(v) => serializer.serialize_u64(*v),
            Number::Int(v) => serializer.serialize_i64(*v),
            Number::Float(v) => serializer.serialize_f64(*v),
            Number::BigInt(v) => match v.to_i128() {
                Some(i) => serializer.serialize_i128(i),
                // Beyond 128 bits the decimal text is the only lossless form.
                None => serializer.serialize_str(&v.to_string()),
            },
        }
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::UInt(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::UInt(n as u64)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::UInt(u64::from(n))
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Int(i64::from(n))
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

impl From<BigInt> for Number {
    fn from(n: BigInt) -> Self {
        Number::from_bigint(n)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(u) = n.as_u64() {
            Number::UInt(u)
        } else if let Some(i) = n.as_i64() {
            Number::Int(i)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}
