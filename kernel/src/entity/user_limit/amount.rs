use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::error::KernelError;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// String-encoded numeric amount as carried on the wire (`"500"`, `"0.5"`).
/// Used for limit ceilings, accumulated progress and progress deltas.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln, Serialize, Deserialize)]
pub struct LimitAmount(String);

impl LimitAmount {
    pub fn new(amount: impl Into<String>) -> Self {
        Self(amount.into())
    }

    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Parses the amount as a non-negative number. `field` names the payload
    /// property reported on violation.
    pub fn as_non_negative(&self, field: &'static str) -> error_stack::Result<f64, KernelError> {
        let value = self
            .0
            .parse::<f64>()
            .map_err(|_| Report::new(KernelError::InvalidField { field }))?;
        if !value.is_finite() || value < 0.0 {
            return Err(Report::new(KernelError::InvalidField { field }));
        }
        Ok(value)
    }

    /// Encodes a computed number back into wire form. Integral values keep no
    /// fractional part, so `500 + 100` round-trips as `"600"`.
    pub fn from_number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
            Self(format!("{}", value as i64))
        } else {
            Self(value.to_string())
        }
    }
}
