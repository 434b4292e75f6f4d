//! In-memory, immutable model snapshot.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "properties": [{ "id": 10, "kind": "Shell", "thickness": 2.0 }],
//!   "members": [{ "id": 101, "property_id": 10, "element_type": "CQUAD4", "nodes": [1, 2, 3, 4] }],
//!   "results": {
//!     "stress": [
//!       { "load_case": 1, "rows": [{ "member_id": 101, "primary": 150.0, "secondary": 20.0, "shear": 5.0 }] }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    DesignProperty, LoadCaseId, Member, MemberId, NodeId, PropertyId, ResultFamily, StructuralModel,
};
use crate::errors::{CalcResult, SizingError};

/// Plane stress (or strain) components of one element result row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressRow {
    /// Element the row belongs to
    pub member_id: MemberId,
    /// Primary normal component (σ11)
    pub primary: f64,
    /// Secondary normal component (σ22)
    pub secondary: f64,
    /// In-plane shear (τ12)
    pub shear: f64,
}

impl StressRow {
    /// Create a row
    pub fn new(member_id: MemberId, primary: f64, secondary: f64, shear: f64) -> Self {
        StressRow {
            member_id,
            primary,
            secondary,
            shear,
        }
    }
}

/// Element force/moment components of one result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceRow {
    /// Element the row belongs to
    pub member_id: MemberId,
    /// Force and moment components in archive order
    pub components: Vec<f64>,
}

/// Nodal translations and rotations of one result row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplacementRow {
    /// Grid point
    pub node_id: NodeId,
    /// Translations T1, T2, T3
    pub translation: [f64; 3],
    /// Rotations R1, R2, R3
    #[serde(default)]
    pub rotation: [f64; 3],
}

/// Rows of one result family for one load case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable<R> {
    /// Load case the rows were computed for
    pub load_case: LoadCaseId,
    /// Rows in archive order
    pub rows: Vec<R>,
}

/// All result tables of a model, grouped by family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Element stresses
    #[serde(default)]
    pub stress: Vec<ResultTable<StressRow>>,
    /// Element strains
    #[serde(default)]
    pub strain: Vec<ResultTable<StressRow>>,
    /// Element forces
    #[serde(default)]
    pub force: Vec<ResultTable<ForceRow>>,
    /// Nodal displacements
    #[serde(default)]
    pub displacement: Vec<ResultTable<DisplacementRow>>,
}

fn find_rows<'a, R>(tables: &'a [ResultTable<R>], load_case: &LoadCaseId) -> Option<&'a [R]> {
    tables
        .iter()
        .find(|table| &table.load_case == load_case)
        .map(|table| table.rows.as_slice())
}

fn sorted_cases<R>(tables: &[ResultTable<R>]) -> Vec<LoadCaseId> {
    let cases: BTreeSet<LoadCaseId> = tables.iter().map(|table| table.load_case.clone()).collect();
    cases.into_iter().collect()
}

/// Immutable snapshot of a loaded model and its results.
///
/// Built once by a loader and shared by reference; every lookup is a read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Design properties
    #[serde(default)]
    pub properties: Vec<DesignProperty>,
    /// Members (elements)
    #[serde(default)]
    pub members: Vec<Member>,
    /// Result tables
    #[serde(default)]
    pub results: ResultSet,
}

impl ModelSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a design property (builder pattern)
    pub fn with_property(mut self, property: DesignProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a member (builder pattern)
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Add a stress table (builder pattern)
    pub fn with_stress(mut self, load_case: LoadCaseId, rows: Vec<StressRow>) -> Self {
        self.results.stress.push(ResultTable { load_case, rows });
        self
    }

    /// Add a strain table (builder pattern)
    pub fn with_strain(mut self, load_case: LoadCaseId, rows: Vec<StressRow>) -> Self {
        self.results.strain.push(ResultTable { load_case, rows });
        self
    }

    /// Add a force table (builder pattern)
    pub fn with_forces(mut self, load_case: LoadCaseId, rows: Vec<ForceRow>) -> Self {
        self.results.force.push(ResultTable { load_case, rows });
        self
    }

    /// Add a displacement table (builder pattern)
    pub fn with_displacements(mut self, load_case: LoadCaseId, rows: Vec<DisplacementRow>) -> Self {
        self.results.displacement.push(ResultTable { load_case, rows });
        self
    }

    /// Check referential integrity of the snapshot.
    ///
    /// Property and member ids must be unique, every member must reference an
    /// existing property, and a load case may appear only once per family.
    pub fn validate(&self) -> CalcResult<()> {
        let mut property_ids = BTreeSet::new();
        for property in &self.properties {
            if !property_ids.insert(property.id) {
                return Err(SizingError::invalid_input(
                    "properties",
                    property.id.to_string(),
                    "Duplicate property id",
                ));
            }
        }

        let mut member_ids = BTreeSet::new();
        for member in &self.members {
            if !member_ids.insert(member.id) {
                return Err(SizingError::invalid_input(
                    "members",
                    member.id.to_string(),
                    "Duplicate member id",
                ));
            }
            if !property_ids.contains(&member.property_id) {
                return Err(SizingError::invalid_input(
                    "members",
                    member.id.to_string(),
                    format!("Member references unknown property {}", member.property_id),
                ));
            }
        }

        check_unique_cases(&self.results.stress, ResultFamily::Stress)?;
        check_unique_cases(&self.results.strain, ResultFamily::Strain)?;
        check_unique_cases(&self.results.force, ResultFamily::Force)?;
        check_unique_cases(&self.results.displacement, ResultFamily::Displacement)?;
        Ok(())
    }
}

fn check_unique_cases<R>(tables: &[ResultTable<R>], family: ResultFamily) -> CalcResult<()> {
    let mut seen = BTreeSet::new();
    for table in tables {
        if !seen.insert(&table.load_case) {
            return Err(SizingError::invalid_input(
                format!("results.{}", family.name().to_lowercase()),
                table.load_case.to_string(),
                "Load case appears more than once",
            ));
        }
    }
    Ok(())
}

impl StructuralModel for ModelSnapshot {
    fn property(&self, id: PropertyId) -> Option<&DesignProperty> {
        self.properties.iter().find(|p| p.id == id)
    }

    fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    fn members_of(&self, property_id: PropertyId) -> BTreeSet<MemberId> {
        self.members
            .iter()
            .filter(|m| m.property_id == property_id)
            .map(|m| m.id)
            .collect()
    }

    fn component_table(&self, family: ResultFamily, load_case: &LoadCaseId) -> Option<&[StressRow]> {
        match family {
            ResultFamily::Stress => find_rows(&self.results.stress, load_case),
            ResultFamily::Strain => find_rows(&self.results.strain, load_case),
            ResultFamily::Force | ResultFamily::Displacement => None,
        }
    }

    fn force_table(&self, load_case: &LoadCaseId) -> Option<&[ForceRow]> {
        find_rows(&self.results.force, load_case)
    }

    fn displacement_table(&self, load_case: &LoadCaseId) -> Option<&[DisplacementRow]> {
        find_rows(&self.results.displacement, load_case)
    }

    fn available_load_cases(&self, family: ResultFamily) -> Vec<LoadCaseId> {
        match family {
            ResultFamily::Stress => sorted_cases(&self.results.stress),
            ResultFamily::Strain => sorted_cases(&self.results.strain),
            ResultFamily::Force => sorted_cases(&self.results.force),
            ResultFamily::Displacement => sorted_cases(&self.results.displacement),
        }
    }
}
