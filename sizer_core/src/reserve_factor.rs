//! # Reserve Factor
//!
//! `RF = allowable / comparison_stress`, per row of a [`ResultBundle`].
//! An RF of 1.0 means the member is exactly at its allowable; above 1.0 it
//! has margin.
//!
//! The row with the lowest RF governs. Ties resolve to the first row, so the
//! governing member is stable for a given bundle.
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::criteria::FailureCriterion;
//! use sizer_core::extraction::ResultBundle;
//! use sizer_core::model::{LoadCaseId, ResultFamily};
//! use sizer_core::reserve_factor::reserve_factor;
//!
//! let bundle = ResultBundle {
//!     property_id: 1,
//!     load_case: LoadCaseId::Number(1),
//!     family: ResultFamily::Stress,
//!     scale_factor: 1.0,
//!     member_ids: vec![5, 6],
//!     primary: vec![150.0, 100.0],
//!     secondary: vec![0.0, 0.0],
//!     shear: vec![0.0, 0.0],
//!     dropped_members: 0,
//! };
//!
//! let rf = reserve_factor(&bundle, 300.0, FailureCriterion::VonMises).unwrap();
//! assert_eq!(rf.min_rf, 2.0);
//! assert_eq!(rf.governing_member_id, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::criteria::FailureCriterion;
use crate::errors::{CalcResult, SizingError};
use crate::extraction::ResultBundle;
use crate::model::MemberId;

/// Per-row reserve factors and their reductions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfSummary {
    /// Member of each RF, parallel to `per_member_rf`
    pub member_ids: Vec<MemberId>,
    /// RF of each row
    pub per_member_rf: Vec<f64>,
    /// Lowest RF
    pub min_rf: f64,
    /// Highest RF
    pub max_rf: f64,
    /// Arithmetic mean RF
    pub mean_rf: f64,
    /// Member with the lowest RF (first one on ties)
    pub governing_member_id: MemberId,
    /// Largest comparison stress over all rows (signed for the legacy criterion)
    pub max_comparison_stress: f64,
}

/// Statistic that decides which combination governs and whether a
/// thickness meets the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoverningMetric {
    /// Worst member RF
    #[default]
    MinRf,
    /// Mean RF over all rows
    MeanRf,
}

impl GoverningMetric {
    /// Read the metric from a summary
    pub fn value(&self, summary: &RfSummary) -> f64 {
        match self {
            GoverningMetric::MinRf => summary.min_rf,
            GoverningMetric::MeanRf => summary.mean_rf,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GoverningMetric::MinRf => "min_rf",
            GoverningMetric::MeanRf => "mean_rf",
        }
    }
}

impl std::fmt::Display for GoverningMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for GoverningMetric {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "min_rf" | "min" => Ok(GoverningMetric::MinRf),
            "mean_rf" | "mean" => Ok(GoverningMetric::MeanRf),
            _ => Err(SizingError::invalid_input(
                "metric",
                s,
                "Expected 'min_rf' or 'mean_rf'",
            )),
        }
    }
}

/// Compute reserve factors for every row of a bundle.
///
/// # Errors
///
/// - `EmptyResultBundle` if the bundle has no rows
/// - `ZeroStressDivision` if any comparison stress is exactly zero
pub fn reserve_factor(bundle: &ResultBundle, allowable: f64, criterion: FailureCriterion) -> CalcResult<RfSummary> {
    if bundle.is_empty() {
        return Err(SizingError::EmptyResultBundle);
    }

    let mut per_member_rf = Vec::with_capacity(bundle.len());
    let mut max_comparison_stress = f64::NEG_INFINITY;

    for i in 0..bundle.len() {
        let comparison = criterion.comparison_stress(bundle.primary[i], bundle.secondary[i], bundle.shear[i]);
        if comparison == 0.0 {
            return Err(SizingError::ZeroStressDivision {
                member_id: bundle.member_ids[i],
            });
        }
        max_comparison_stress = max_comparison_stress.max(comparison);
        per_member_rf.push(allowable / comparison);
    }

    let mut governing = 0;
    for (i, rf) in per_member_rf.iter().enumerate() {
        if *rf < per_member_rf[governing] {
            governing = i;
        }
    }

    let min_rf = per_member_rf[governing];
    let max_rf = per_member_rf.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean_rf = per_member_rf.iter().sum::<f64>() / per_member_rf.len() as f64;

    Ok(RfSummary {
        member_ids: bundle.member_ids.clone(),
        governing_member_id: bundle.member_ids[governing],
        per_member_rf,
        min_rf,
        max_rf,
        mean_rf,
        max_comparison_stress,
    })
}
