//! # Result Extraction
//!
//! Pulls the result rows belonging to one design property out of one load
//! case and rescales them to a candidate thickness.
//!
//! Extraction is a pure function of (model, property, load case, scale): the
//! model is only read, so the same bundle can be shared by every
//! (material, criterion) pair evaluated at a thickness.
//!
//! ## Steps
//!
//! 1. Resolve the property's member set.
//! 2. Fail with `NoMembersForProperty` if it is empty.
//! 3. Fetch the load case table; fail with `NoResultsForLoadCase` if it is
//!    missing or empty.
//! 4. Keep rows whose member belongs to the property, in row order. Members
//!    with no row at all are dropped and counted.
//! 5. Fail with `NoStressDataForMembers` if no row survived.
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::extraction::extract;
//! use sizer_core::model::{DesignProperty, LoadCaseId, Member, ModelSnapshot, PropertyKind, StressRow};
//!
//! let model = ModelSnapshot::new()
//!     .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
//!     .with_member(Member::new(7, 1))
//!     .with_stress(LoadCaseId::Number(1), vec![StressRow::new(7, 150.0, 0.0, 0.0)]);
//!
//! let bundle = extract(&model, 1, &LoadCaseId::Number(1), 2.0).unwrap();
//! assert_eq!(bundle.primary, vec![300.0]);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CalcResult, SizingError};
use crate::model::{LoadCaseId, MemberId, NodeId, PropertyId, ResultFamily, StructuralModel};

/// Scaled component rows of one property for one load case.
///
/// The four vectors are parallel: index `i` of each belongs to the same row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    /// Property the rows belong to
    pub property_id: PropertyId,
    /// Load case the rows were read from
    pub load_case: LoadCaseId,
    /// Family the rows were read from (stress or strain)
    pub family: ResultFamily,
    /// Factor every component was multiplied by
    pub scale_factor: f64,
    /// Member of each row
    pub member_ids: Vec<MemberId>,
    /// Primary normal component per row
    pub primary: Vec<f64>,
    /// Secondary normal component per row
    pub secondary: Vec<f64>,
    /// In-plane shear per row
    pub shear: Vec<f64>,
    /// Members of the property with no row in this load case
    pub dropped_members: usize,
}

impl ResultBundle {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    /// Whether the bundle holds no rows
    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

/// Scaled element force rows of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceBundle {
    pub property_id: PropertyId,
    pub load_case: LoadCaseId,
    pub scale_factor: f64,
    pub member_ids: Vec<MemberId>,
    /// Force/moment components per row
    pub components: Vec<Vec<f64>>,
    pub dropped_members: usize,
}

/// Scaled nodal displacements of the nodes connected to one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementBundle {
    pub property_id: PropertyId,
    pub load_case: LoadCaseId,
    pub scale_factor: f64,
    pub node_ids: Vec<NodeId>,
    /// Translations (x, y, z) per node
    pub translations: Vec<[f64; 3]>,
    /// Rotations (x, y, z) per node
    pub rotations: Vec<[f64; 3]>,
    /// Translation magnitude per node
    pub magnitudes: Vec<f64>,
}

impl DisplacementBundle {
    /// Largest translation magnitude and its node
    pub fn peak(&self) -> Option<(NodeId, f64)> {
        self.node_ids
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
            .fold(None, |best, (node, mag)| match best {
                Some((_, m)) if m >= mag => best,
                _ => Some((node, mag)),
            })
    }
}

fn property_members<M>(model: &M, property_id: PropertyId) -> CalcResult<BTreeSet<MemberId>>
where
    M: StructuralModel + ?Sized,
{
    let members = model.members_of(property_id);
    if members.is_empty() {
        return Err(SizingError::NoMembersForProperty { property_id });
    }
    Ok(members)
}

fn non_empty<'a, R>(rows: Option<&'a [R]>, family: ResultFamily, load_case: &LoadCaseId) -> CalcResult<&'a [R]> {
    match rows {
        Some(rows) if !rows.is_empty() => Ok(rows),
        _ => Err(SizingError::NoResultsForLoadCase {
            family,
            load_case: load_case.clone(),
        }),
    }
}

fn count_dropped(
    members: &BTreeSet<MemberId>,
    seen: &BTreeSet<MemberId>,
    property_id: PropertyId,
    load_case: &LoadCaseId,
    family: ResultFamily,
) -> usize {
    let dropped = members.difference(seen).count();
    if dropped > 0 {
        warn!(
            property_id,
            load_case = %load_case,
            family = %family,
            dropped,
            "members without result rows were dropped"
        );
    }
    dropped
}

/// Extract scaled stress rows for a property.
///
/// Shorthand for [`extract_family`] over [`ResultFamily::Stress`].
pub fn extract<M>(model: &M, property_id: PropertyId, load_case: &LoadCaseId, scale_factor: f64) -> CalcResult<ResultBundle>
where
    M: StructuralModel + ?Sized,
{
    extract_family(model, property_id, ResultFamily::Stress, load_case, scale_factor)
}

/// Extract scaled component rows (stress or strain) for a property.
///
/// # Errors
///
/// - `InvalidInput` for families not stored as component rows
/// - `NoMembersForProperty`, `NoResultsForLoadCase`, `NoStressDataForMembers`
///   as described in the module docs
pub fn extract_family<M>(
    model: &M,
    property_id: PropertyId,
    family: ResultFamily,
    load_case: &LoadCaseId,
    scale_factor: f64,
) -> CalcResult<ResultBundle>
where
    M: StructuralModel + ?Sized,
{
    if !matches!(family, ResultFamily::Stress | ResultFamily::Strain) {
        return Err(SizingError::invalid_input(
            "family",
            family.name(),
            "Only STRESS and STRAIN results have plane components",
        ));
    }

    let members = property_members(model, property_id)?;
    let rows = non_empty(model.component_table(family, load_case), family, load_case)?;

    let mut bundle = ResultBundle {
        property_id,
        load_case: load_case.clone(),
        family,
        scale_factor,
        member_ids: Vec::new(),
        primary: Vec::new(),
        secondary: Vec::new(),
        shear: Vec::new(),
        dropped_members: 0,
    };
    let mut seen = BTreeSet::new();

    for row in rows.iter().filter(|row| members.contains(&row.member_id)) {
        seen.insert(row.member_id);
        bundle.member_ids.push(row.member_id);
        bundle.primary.push(row.primary * scale_factor);
        bundle.secondary.push(row.secondary * scale_factor);
        bundle.shear.push(row.shear * scale_factor);
    }

    if bundle.is_empty() {
        return Err(SizingError::NoStressDataForMembers {
            property_id,
            load_case: load_case.clone(),
        });
    }

    bundle.dropped_members = count_dropped(&members, &seen, property_id, load_case, family);
    debug!(
        property_id,
        load_case = %load_case,
        family = %family,
        rows = bundle.len(),
        scale_factor,
        "extracted result rows"
    );
    Ok(bundle)
}

/// Extract scaled element forces for a property.
pub fn extract_forces<M>(
    model: &M,
    property_id: PropertyId,
    load_case: &LoadCaseId,
    scale_factor: f64,
) -> CalcResult<ForceBundle>
where
    M: StructuralModel + ?Sized,
{
    let members = property_members(model, property_id)?;
    let rows = non_empty(model.force_table(load_case), ResultFamily::Force, load_case)?;

    let mut member_ids = Vec::new();
    let mut components = Vec::new();
    let mut seen = BTreeSet::new();
    for row in rows.iter().filter(|row| members.contains(&row.member_id)) {
        seen.insert(row.member_id);
        member_ids.push(row.member_id);
        components.push(row.components.iter().map(|c| c * scale_factor).collect());
    }

    if member_ids.is_empty() {
        return Err(SizingError::NoStressDataForMembers {
            property_id,
            load_case: load_case.clone(),
        });
    }

    let dropped_members = count_dropped(&members, &seen, property_id, load_case, ResultFamily::Force);
    Ok(ForceBundle {
        property_id,
        load_case: load_case.clone(),
        scale_factor,
        member_ids,
        components,
        dropped_members,
    })
}

/// Extract scaled displacements of every node connected to a property.
///
/// Nodes are gathered from member connectivity; rows for other nodes are
/// ignored.
pub fn extract_displacements<M>(
    model: &M,
    property_id: PropertyId,
    load_case: &LoadCaseId,
    scale_factor: f64,
) -> CalcResult<DisplacementBundle>
where
    M: StructuralModel + ?Sized,
{
    let members = property_members(model, property_id)?;
    let nodes: BTreeSet<NodeId> = members
        .iter()
        .filter_map(|id| model.member(*id))
        .flat_map(|member| member.nodes.iter().copied())
        .collect();
    let rows = non_empty(model.displacement_table(load_case), ResultFamily::Displacement, load_case)?;

    let mut bundle = DisplacementBundle {
        property_id,
        load_case: load_case.clone(),
        scale_factor,
        node_ids: Vec::new(),
        translations: Vec::new(),
        rotations: Vec::new(),
        magnitudes: Vec::new(),
    };

    for row in rows.iter().filter(|row| nodes.contains(&row.node_id)) {
        let t = row.translation.map(|v| v * scale_factor);
        bundle.node_ids.push(row.node_id);
        bundle.magnitudes.push((t[0] * t[0] + t[1] * t[1] + t[2] * t[2]).sqrt());
        bundle.translations.push(t);
        bundle.rotations.push(row.rotation.map(|v| v * scale_factor));
    }

    if bundle.node_ids.is_empty() {
        return Err(SizingError::NoStressDataForMembers {
            property_id,
            load_case: load_case.clone(),
        });
    }
    Ok(bundle)
}
