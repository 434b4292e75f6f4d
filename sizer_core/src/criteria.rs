//! # Failure Criteria
//!
//! A failure criterion turns the plane-stress components of one result row
//! into a single comparison stress, which is then checked against a
//! material allowable.
//!
//! | Criterion | Comparison stress |
//! |---|---|
//! | Von Mises | `sqrt(σ1² − σ1·σ2 + σ2² + 3τ²)` |
//! | Maximum Principal Stress | `max(|σ1|, |σ2|)` |
//! | Von Mises (legacy) | `σ1` as stored, no combination |
//!
//! The legacy criterion reproduces earlier tool output, which compared the
//! primary component alone. Use it only to reconcile old reports.
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::criteria::FailureCriterion;
//!
//! let vm: FailureCriterion = "Von Mises".parse().unwrap();
//! // Pure shear: sqrt(3) * tau
//! let s = vm.comparison_stress(0.0, 0.0, 100.0);
//! assert!((s - 173.205).abs() < 1e-3);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SizingError;

/// Named rule mapping stress components to a comparison stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCriterion {
    /// Plane-stress von Mises equivalent stress
    #[serde(rename = "Von Mises")]
    VonMises,
    /// Larger magnitude of the two normal components
    #[serde(rename = "Maximum Principal Stress")]
    MaxPrincipal,
    /// Primary component used directly (compatibility mode)
    #[serde(rename = "Von Mises (legacy)")]
    VonMisesLegacy,
}

impl FailureCriterion {
    /// All criteria for iteration
    pub const ALL: [FailureCriterion; 3] = [
        FailureCriterion::VonMises,
        FailureCriterion::MaxPrincipal,
        FailureCriterion::VonMisesLegacy,
    ];

    /// Display name (also the serialized form)
    pub fn name(&self) -> &'static str {
        match self {
            FailureCriterion::VonMises => "Von Mises",
            FailureCriterion::MaxPrincipal => "Maximum Principal Stress",
            FailureCriterion::VonMisesLegacy => "Von Mises (legacy)",
        }
    }

    /// Comparison stress of one row
    pub fn comparison_stress(&self, primary: f64, secondary: f64, shear: f64) -> f64 {
        match self {
            FailureCriterion::VonMises => {
                (primary * primary - primary * secondary + secondary * secondary + 3.0 * shear * shear).sqrt()
            }
            FailureCriterion::MaxPrincipal => primary.abs().max(secondary.abs()),
            FailureCriterion::VonMisesLegacy => primary,
        }
    }
}

impl fmt::Display for FailureCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FailureCriterion {
    type Err = SizingError;

    /// Case-insensitive; accepts the display names and short aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "vonmises" | "vm" | "mises" => Ok(FailureCriterion::VonMises),
            "maximumprincipalstress" | "maxprincipalstress" | "maxprincipal" | "principal" => {
                Ok(FailureCriterion::MaxPrincipal)
            }
            "vonmiseslegacy" | "legacyvonmises" | "vmlegacy" => Ok(FailureCriterion::VonMisesLegacy),
            _ => Err(SizingError::unknown_criterion(s)),
        }
    }
}
