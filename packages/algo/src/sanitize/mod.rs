//! Numeric guards applied at the engine boundary.

use crate::error::{EngineError, Result};
use crate::types::EPSILON;

/// Check whether a slice contains NaN or infinite values
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Reject a non-finite ability/difficulty before it reaches the rating model
pub fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFiniteInput { field, value })
    }
}

/// Validate every value of a slice, reporting the first offender
pub fn ensure_all_finite(field: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(EngineError::NonFiniteInput { field, value }),
        None => Ok(()),
    }
}

/// Keep a probability strictly inside (0, 1)
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        return 0.5;
    }
    p.clamp(EPSILON, 1.0 - EPSILON)
}
