//! # Error Types
//!
//! Structured error types for sizer_core. Every failure carries enough context
//! to explain which property, load case, member or thickness was involved, and
//! errors serialize to JSON so a caller can report them alongside results.
//!
//! Errors fall into three classes (see [`ErrorClass`]):
//!
//! - **Configuration** errors fail fast before any search begins.
//! - **Combination** errors are recovered by skipping one
//!   (material, criterion, load case) triple.
//! - **Thickness** errors are recovered by skipping one candidate thickness.
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::errors::{ErrorClass, SizingError, CalcResult};
//!
//! fn validate_target(target_rf: f64) -> CalcResult<()> {
//!     if target_rf <= 0.0 {
//!         return Err(SizingError::invalid_input(
//!             "target_rf",
//!             target_rf.to_string(),
//!             "Target reserve factor must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = validate_target(-1.0).unwrap_err();
//! assert_eq!(err.class(), ErrorClass::Configuration);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{LoadCaseId, MemberId, PropertyId, ResultFamily};

/// Result type alias for sizer_core operations
pub type CalcResult<T> = Result<T, SizingError>;

/// How a caller is expected to recover from a [`SizingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Bad request or reference data; surfaced before any search begins.
    Configuration,
    /// One (material, criterion, load case) triple is skipped.
    Combination,
    /// One candidate thickness is skipped.
    Thickness,
}

/// Structured error type for sizing operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SizingError {
    /// Material not present in the allowable table
    #[error("Material not found: {material}")]
    UnknownMaterial { material: String },

    /// Failure criterion name not recognised
    #[error("Unknown failure criterion: {name}")]
    UnknownCriterion { name: String },

    /// Design property not present in the structural model
    #[error("Property {property_id} not found in model")]
    UnknownProperty { property_id: PropertyId },

    /// Candidate or reference thickness is not usable
    #[error("Invalid thickness {thickness}: {reason}")]
    InvalidThickness { thickness: f64, reason: String },

    /// An input value is invalid (empty list, bad range, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The property owns no members
    #[error("No members found with property ID {property_id}")]
    NoMembersForProperty { property_id: PropertyId },

    /// No result table (or an empty one) for this load case
    #[error("No {family} results found for load case {load_case}")]
    NoResultsForLoadCase {
        family: ResultFamily,
        load_case: LoadCaseId,
    },

    /// The property's members have no rows in the result table
    #[error("No result data for members of property {property_id} in load case {load_case}")]
    NoStressDataForMembers {
        property_id: PropertyId,
        load_case: LoadCaseId,
    },

    /// Reserve factor requested over zero members
    #[error("Reserve factor is undefined for an empty member set")]
    EmptyResultBundle,

    /// A member's comparison stress is exactly zero
    #[error("Comparison stress is zero for member {member_id}; reserve factor is undefined")]
    ZeroStressDivision { member_id: MemberId },

    /// Every combination failed at this thickness
    #[error("No valid combination at thickness {thickness} ({attempted} attempted)")]
    NoValidCombination { thickness: f64, attempted: usize },
}

impl SizingError {
    /// Create an UnknownMaterial error
    pub fn unknown_material(material: impl Into<String>) -> Self {
        SizingError::UnknownMaterial {
            material: material.into(),
        }
    }

    /// Create an UnknownCriterion error
    pub fn unknown_criterion(name: impl Into<String>) -> Self {
        SizingError::UnknownCriterion { name: name.into() }
    }

    /// Create an InvalidThickness error
    pub fn invalid_thickness(thickness: f64, reason: impl Into<String>) -> Self {
        SizingError::InvalidThickness {
            thickness,
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        SizingError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error by the recovery it calls for
    pub fn class(&self) -> ErrorClass {
        match self {
            SizingError::UnknownMaterial { .. }
            | SizingError::UnknownCriterion { .. }
            | SizingError::UnknownProperty { .. }
            | SizingError::InvalidThickness { .. }
            | SizingError::InvalidInput { .. } => ErrorClass::Configuration,
            SizingError::NoMembersForProperty { .. }
            | SizingError::NoResultsForLoadCase { .. }
            | SizingError::NoStressDataForMembers { .. }
            | SizingError::EmptyResultBundle
            | SizingError::ZeroStressDivision { .. } => ErrorClass::Combination,
            SizingError::NoValidCombination { .. } => ErrorClass::Thickness,
        }
    }

    /// Check if a search can continue past this error
    pub fn is_recoverable(&self) -> bool {
        self.class() != ErrorClass::Configuration
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SizingError::UnknownMaterial { .. } => "UNKNOWN_MATERIAL",
            SizingError::UnknownCriterion { .. } => "UNKNOWN_CRITERION",
            SizingError::UnknownProperty { .. } => "UNKNOWN_PROPERTY",
            SizingError::InvalidThickness { .. } => "INVALID_THICKNESS",
            SizingError::InvalidInput { .. } => "INVALID_INPUT",
            SizingError::NoMembersForProperty { .. } => "NO_MEMBERS_FOR_PROPERTY",
            SizingError::NoResultsForLoadCase { .. } => "NO_RESULTS_FOR_LOAD_CASE",
            SizingError::NoStressDataForMembers { .. } => "NO_STRESS_DATA_FOR_MEMBERS",
            SizingError::EmptyResultBundle => "EMPTY_RESULT_BUNDLE",
            SizingError::ZeroStressDivision { .. } => "ZERO_STRESS_DIVISION",
            SizingError::NoValidCombination { .. } => "NO_VALID_COMBINATION",
        }
    }
}
