//! # Structural Model Interface
//!
//! The sizing engine does not load analysis decks or result archives itself.
//! It consumes a read-only view of a structural model through the
//! [`StructuralModel`] trait: design properties, the members that reference
//! them, and per-load-case result tables for each [`ResultFamily`].
//!
//! [`ModelSnapshot`] is the in-memory implementation. A loader builds one
//! (or deserializes one from JSON) and passes it by reference into
//! extraction, search and sizing. Nothing in this crate mutates it.
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::model::{
//!     DesignProperty, LoadCaseId, Member, ModelSnapshot, PropertyKind, ResultFamily,
//!     StressRow, StructuralModel,
//! };
//!
//! let model = ModelSnapshot::new()
//!     .with_property(DesignProperty::new(10, PropertyKind::Shell { thickness: 2.0 }))
//!     .with_member(Member::new(101, 10))
//!     .with_stress(LoadCaseId::Number(1), vec![StressRow::new(101, 150.0, 20.0, 5.0)]);
//!
//! assert_eq!(model.available_load_cases(ResultFamily::Stress), vec![LoadCaseId::Number(1)]);
//! assert!(model.members_of(10).contains(&101));
//! ```

pub mod property;
pub mod snapshot;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub use property::{DesignProperty, Member, PropertyCategory, PropertyKind};
pub use snapshot::{DisplacementRow, ForceRow, ModelSnapshot, ResultSet, ResultTable, StressRow};

/// Design property identifier (e.g. a shell or bar property card id)
pub type PropertyId = u32;

/// Structural element identifier
pub type MemberId = u32;

/// Grid point identifier
pub type NodeId = u32;

/// Load case (subcase) identifier.
///
/// Analysis decks number their subcases, but labelled cases are also
/// accepted. Numbers order before labels. Numeric strings read as numbers
/// whether they come from the command line or from JSON, so `"3"` and `3`
/// name the same subcase.
///
/// ```rust
/// use sizer_core::model::LoadCaseId;
///
/// assert_eq!("3".parse::<LoadCaseId>().unwrap(), LoadCaseId::Number(3));
/// assert_eq!("GUST".parse::<LoadCaseId>().unwrap(), LoadCaseId::Label("GUST".to_string()));
/// assert!(LoadCaseId::Number(99) < LoadCaseId::Label("A".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum LoadCaseId {
    /// Numbered subcase
    Number(i64),
    /// Named load case
    Label(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLoadCaseId {
    Number(i64),
    Label(String),
}

impl<'de> Deserialize<'de> for LoadCaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawLoadCaseId::deserialize(deserializer)? {
            RawLoadCaseId::Number(n) => LoadCaseId::Number(n),
            RawLoadCaseId::Label(label) => match label.parse::<LoadCaseId>() {
                Ok(id) => id,
                Err(never) => match never {},
            },
        })
    }
}

impl fmt::Display for LoadCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadCaseId::Number(n) => write!(f, "{}", n),
            LoadCaseId::Label(label) => write!(f, "{}", label),
        }
    }
}

impl FromStr for LoadCaseId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => LoadCaseId::Number(n),
            Err(_) => LoadCaseId::Label(trimmed.to_string()),
        })
    }
}

impl From<i64> for LoadCaseId {
    fn from(n: i64) -> Self {
        LoadCaseId::Number(n)
    }
}

impl From<&str> for LoadCaseId {
    fn from(label: &str) -> Self {
        LoadCaseId::Label(label.to_string())
    }
}

/// Result families stored per load case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultFamily {
    /// Element stresses
    Stress,
    /// Element strains
    Strain,
    /// Element forces and moments
    Force,
    /// Nodal displacements
    Displacement,
}

impl ResultFamily {
    /// All result families for iteration
    pub const ALL: [ResultFamily; 4] = [
        ResultFamily::Stress,
        ResultFamily::Strain,
        ResultFamily::Force,
        ResultFamily::Displacement,
    ];

    /// Upper-case family name, as printed in result archives
    pub fn name(&self) -> &'static str {
        match self {
            ResultFamily::Stress => "STRESS",
            ResultFamily::Strain => "STRAIN",
            ResultFamily::Force => "FORCE",
            ResultFamily::Displacement => "DISPLACEMENT",
        }
    }

    /// Whether rows are keyed by node rather than by member
    pub fn is_nodal(&self) -> bool {
        matches!(self, ResultFamily::Displacement)
    }
}

impl fmt::Display for ResultFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Read-only access to a loaded structural model and its results.
///
/// Implementations must be safe to read from several threads at once; the
/// search evaluates combinations in parallel against one shared model.
pub trait StructuralModel: Sync {
    /// Look up a design property
    fn property(&self, id: PropertyId) -> Option<&DesignProperty>;

    /// Look up a member
    fn member(&self, id: MemberId) -> Option<&Member>;

    /// Members referencing the property
    fn members_of(&self, property_id: PropertyId) -> BTreeSet<MemberId>;

    /// Stress or strain rows for one load case, in archive order.
    ///
    /// Returns `None` for families that are not stored as component rows.
    fn component_table(&self, family: ResultFamily, load_case: &LoadCaseId) -> Option<&[StressRow]>;

    /// Element force rows for one load case
    fn force_table(&self, load_case: &LoadCaseId) -> Option<&[ForceRow]>;

    /// Nodal displacement rows for one load case
    fn displacement_table(&self, load_case: &LoadCaseId) -> Option<&[DisplacementRow]>;

    /// Load cases with results in this family, sorted
    fn available_load_cases(&self, family: ResultFamily) -> Vec<LoadCaseId>;

    /// Sorted union of load cases over every family
    fn available_load_cases_all(&self) -> Vec<LoadCaseId> {
        let all: BTreeSet<LoadCaseId> = ResultFamily::ALL
            .iter()
            .flat_map(|family| self.available_load_cases(*family))
            .collect();
        all.into_iter().collect()
    }
}
