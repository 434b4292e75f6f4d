//! # sizer_core - Reserve-Factor Sizing Engine
//!
//! `sizer_core` finds the thinnest thickness of a structural design property
//! that keeps every (material, failure criterion, load case) combination at
//! or above a target reserve factor. It works from finite-element results
//! computed at the property's as-modelled thickness and rescales them to each
//! candidate thickness. No re-analysis is performed.
//!
//! ## Design Philosophy
//!
//! - **Read-only model**: a [`model::StructuralModel`] is passed in by reference and never mutated
//! - **JSON-First**: requests, reports and errors implement Serialize/Deserialize
//! - **Rich Errors**: structured error types classified by how a caller recovers
//! - **Deterministic**: parallel and sequential runs produce identical reports
//!
//! ## Quick Start
//!
//! ```rust
//! use sizer_core::{size, FailureCriterion, LoadCaseId, MaterialTable, SizingRequest, SizingStatus};
//! use sizer_core::model::{DesignProperty, Member, ModelSnapshot, PropertyKind, StressRow};
//!
//! let model = ModelSnapshot::new()
//!     .with_property(DesignProperty::new(10, PropertyKind::Shell { thickness: 2.0 }))
//!     .with_member(Member::new(101, 10))
//!     .with_member(Member::new(102, 10))
//!     .with_stress(
//!         LoadCaseId::Number(1),
//!         vec![StressRow::new(101, 240.0, 30.0, 15.0), StressRow::new(102, 120.0, 0.0, 0.0)],
//!     );
//!
//! let request = SizingRequest::new(10)
//!     .with_materials(["Aluminum 7075-T6", "Aluminum 6061-T6"])
//!     .with_criteria([FailureCriterion::VonMises])
//!     .with_all_stress_load_cases(&model);
//!
//! let report = size(&model, MaterialTable::builtin(), &request).unwrap();
//! assert_eq!(report.status, SizingStatus::Found);
//!
//! let point = report.design_point().unwrap();
//! assert_eq!(point.governing_material, "Aluminum 6061-T6");
//! assert!(point.min_rf >= 1.1);
//!
//! // Serialize for storage or transmission
//! let json = serde_json::to_string_pretty(&report).unwrap();
//! assert!(json.contains("\"status\": \"Found\""));
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Structural model interface and in-memory snapshot
//! - [`materials`] - Material allowables and the built-in table
//! - [`criteria`] - Failure criteria
//! - [`extraction`] - Per-property result extraction
//! - [`scaling`] - Thickness scaling of results
//! - [`reserve_factor`] - Reserve factor statistics
//! - [`search`] - Critical-combination search at one thickness
//! - [`sizing`] - Thickness scan against a target reserve factor
//! - [`errors`] - Structured error types

pub mod criteria;
pub mod errors;
pub mod extraction;
pub mod materials;
pub mod model;
pub mod reserve_factor;
pub mod scaling;
pub mod search;
pub mod sizing;

// Re-export commonly used types at crate root for convenience
pub use criteria::FailureCriterion;
pub use errors::{CalcResult, ErrorClass, SizingError};
pub use materials::{AllowableMode, MaterialTable};
pub use model::{LoadCaseId, ModelSnapshot, StructuralModel};
pub use reserve_factor::GoverningMetric;
pub use search::{search, CombinationResult, ExecutionMode, SearchInput};
pub use sizing::{size, size_single, SizingReport, SizingRequest, SizingResult, SizingStatus, ThicknessRange};
