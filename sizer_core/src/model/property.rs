//! Design properties and the members that reference them.
//!
//! The loader resolves each property card once into a [`PropertyKind`];
//! nothing downstream inspects raw card fields.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{MemberId, NodeId, PropertyId};
use crate::errors::{CalcResult, SizingError};

/// Reference thickness used for properties that carry no thickness at all
pub const FALLBACK_REFERENCE_THICKNESS: f64 = 1.0;

/// Broad family of a design property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyCategory {
    /// Plate/shell-like (thickness is the sizing variable)
    Shell,
    /// Beam/bar-like (a section dimension is the sizing variable)
    Bar,
    /// Anything else
    Other,
}

/// Thickness or section definition of a design property.
///
/// ## JSON Example
///
/// ```json
/// { "kind": "Shell", "thickness": 2.0 }
/// { "kind": "CompositeLaminate", "ply_thicknesses": [0.125, 0.125, 0.25] }
/// { "kind": "BarSection", "dimensions": [12.0, 4.0] }
/// { "kind": "Other" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PropertyKind {
    /// Homogeneous shell
    Shell { thickness: f64 },
    /// Layered composite shell
    CompositeLaminate { ply_thicknesses: Vec<f64> },
    /// Bar or beam cross-section; the first dimension governs sizing
    BarSection { dimensions: Vec<f64> },
    /// Property without a usable thickness
    Other,
}

impl PropertyKind {
    /// Get the property category
    pub fn category(&self) -> PropertyCategory {
        match self {
            PropertyKind::Shell { .. } | PropertyKind::CompositeLaminate { .. } => PropertyCategory::Shell,
            PropertyKind::BarSection { .. } => PropertyCategory::Bar,
            PropertyKind::Other => PropertyCategory::Other,
        }
    }

    /// As-modelled thickness, if the property defines one.
    ///
    /// A laminate is referenced by its first ply, the thickness the
    /// analysis deck lists first for the layup.
    pub fn modelled_thickness(&self) -> Option<f64> {
        match self {
            PropertyKind::Shell { thickness } => Some(*thickness),
            PropertyKind::CompositeLaminate { ply_thicknesses } => ply_thicknesses.first().copied(),
            PropertyKind::BarSection { dimensions } => dimensions.first().copied(),
            _ => None,
        }
    }

    /// Get display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            PropertyKind::Shell { .. } => "Shell",
            PropertyKind::CompositeLaminate { .. } => "Composite Laminate",
            PropertyKind::BarSection { .. } => "Bar Section",
            PropertyKind::Other => "Other",
        }
    }
}

/// A design property shared by a set of members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignProperty {
    /// Property identifier
    pub id: PropertyId,

    /// Thickness/section definition
    #[serde(flatten)]
    pub kind: PropertyKind,

    /// Optional user label (e.g. "Spar web")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DesignProperty {
    /// Create an unlabelled property
    pub fn new(id: PropertyId, kind: PropertyKind) -> Self {
        DesignProperty { id, kind, label: None }
    }

    /// Attach a label (builder pattern)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Thickness the analysis results were computed with.
    ///
    /// Properties without a thickness fall back to
    /// [`FALLBACK_REFERENCE_THICKNESS`], so candidate thicknesses act as
    /// plain stress divisors for them.
    pub fn reference_thickness(&self) -> CalcResult<f64> {
        let thickness = match self.kind.modelled_thickness() {
            Some(t) => t,
            None => {
                warn!(
                    property_id = self.id,
                    kind = self.kind.display_name(),
                    "property has no thickness; using reference thickness {}",
                    FALLBACK_REFERENCE_THICKNESS
                );
                FALLBACK_REFERENCE_THICKNESS
            }
        };

        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(SizingError::invalid_thickness(
                thickness,
                format!("reference thickness of property {} must be positive", self.id),
            ));
        }
        Ok(thickness)
    }
}

/// A structural element referencing exactly one design property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Element identifier
    pub id: MemberId,

    /// Owning design property
    pub property_id: PropertyId,

    /// Element type as written in the deck (e.g. "CQUAD4")
    #[serde(default)]
    pub element_type: String,

    /// Connected grid points
    #[serde(default)]
    pub nodes: Vec<NodeId>,
}

impl Member {
    /// Create a member without connectivity
    pub fn new(id: MemberId, property_id: PropertyId) -> Self {
        Member {
            id,
            property_id,
            element_type: String::new(),
            nodes: Vec::new(),
        }
    }

    /// Set connectivity (builder pattern)
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.nodes = nodes.into_iter().collect();
        self
    }

    /// Set element type (builder pattern)
    pub fn with_element_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = element_type.into();
        self
    }
}
