//! # Thickness Scaling
//!
//! Rescales analysis results computed at a reference thickness to a
//! candidate thickness.
//!
//! ## Assumption
//!
//! This is a first-order linear-elastic approximation, **not** a
//! re-analysis. For membrane-dominated shells under a fixed load the stress
//! resultant is unchanged, so stress varies as `1 / t`:
//!
//! ```text
//! σ(t) = σ(t_ref) · t_ref / t
//! ```
//!
//! It ignores load redistribution through the structure, bending
//! (`1 / t²`) contributions and stability. Final designs need a fresh
//! analysis at the chosen thickness.

use crate::errors::{CalcResult, SizingError};

fn check_positive(thickness: f64, what: &str) -> CalcResult<()> {
    if !thickness.is_finite() || thickness <= 0.0 {
        return Err(SizingError::invalid_thickness(
            thickness,
            format!("{} thickness must be positive", what),
        ));
    }
    Ok(())
}

/// Stress scale factor `reference / candidate`.
///
/// # Errors
///
/// `InvalidThickness` if either thickness is not a positive finite number.
///
/// # Example
///
/// ```rust
/// use sizer_core::scaling::scale_factor;
///
/// assert_eq!(scale_factor(2.0, 1.0).unwrap(), 2.0);
/// assert!(scale_factor(2.0, 0.0).is_err());
/// ```
pub fn scale_factor(reference_thickness: f64, candidate_thickness: f64) -> CalcResult<f64> {
    check_positive(candidate_thickness, "candidate")?;
    check_positive(reference_thickness, "reference")?;
    Ok(reference_thickness / candidate_thickness)
}

/// Rescale a result array from the reference to the candidate thickness
pub fn rescale(values: &[f64], reference_thickness: f64, candidate_thickness: f64) -> CalcResult<Vec<f64>> {
    let factor = scale_factor(reference_thickness, candidate_thickness)?;
    Ok(values.iter().map(|v| v * factor).collect())
}
