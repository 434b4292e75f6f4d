//! # Material Allowables
//!
//! Material definitions and allowable stress lookups for reserve-factor
//! checks. A material is immutable reference data: a name plus an ultimate
//! and a yield allowable. It is never derived from the structural model.
//!
//! ## Allowable Modes
//!
//! - **Ultimate**: ultimate tensile strength (default)
//! - **Yield**: yield strength
//!
//! Textual modes other than `ultimate`/`yield` fall back to ultimate.
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::materials::{allowable, AllowableMode, MaterialTable};
//!
//! // Built-in table
//! let fu = allowable("Aluminum 7075-T6", AllowableMode::Ultimate).unwrap();
//! assert_eq!(fu, 572.0);
//!
//! // Custom table
//! let table = MaterialTable::new().with_material("Plate A", 200.0, 150.0, 2700.0);
//! assert_eq!(table.allowable("Plate A", AllowableMode::Yield).unwrap(), 150.0);
//! ```

pub mod catalog;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcResult, SizingError};

pub use catalog::builtin_table;

/// Which allowable a reserve factor is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowableMode {
    /// Ultimate strength
    #[default]
    Ultimate,
    /// Yield strength
    Yield,
}

impl AllowableMode {
    /// Parse a mode name, falling back to [`AllowableMode::Ultimate`] for
    /// anything that is not `yield`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "yield" => AllowableMode::Yield,
            "ultimate" => AllowableMode::Ultimate,
            other => {
                debug!(mode = other, "unrecognised allowable mode; using ultimate");
                AllowableMode::Ultimate
            }
        }
    }

    /// Lower-case mode name
    pub fn name(&self) -> &'static str {
        match self {
            AllowableMode::Ultimate => "ultimate",
            AllowableMode::Yield => "yield",
        }
    }
}

impl FromStr for AllowableMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AllowableMode::parse_lenient(s))
    }
}

impl fmt::Display for AllowableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Strength data for one material (MPa, kg/m³)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAllowables {
    /// Material identifier (e.g. "Aluminum 7075-T6")
    pub name: String,
    /// Ultimate strength Ftu (MPa)
    pub ultimate_mpa: f64,
    /// Yield strength Fty (MPa)
    pub yield_mpa: f64,
    /// Density (kg/m³)
    #[serde(default)]
    pub density_kg_m3: f64,
}

impl MaterialAllowables {
    /// Create a material entry
    pub fn new(name: impl Into<String>, ultimate_mpa: f64, yield_mpa: f64, density_kg_m3: f64) -> Self {
        MaterialAllowables {
            name: name.into(),
            ultimate_mpa,
            yield_mpa,
            density_kg_m3,
        }
    }

    /// Allowable stress for the requested mode
    pub fn allowable(&self, mode: AllowableMode) -> f64 {
        match mode {
            AllowableMode::Ultimate => self.ultimate_mpa,
            AllowableMode::Yield => self.yield_mpa,
        }
    }

    /// Validate strength values.
    pub fn validate(&self) -> CalcResult<()> {
        if self.name.trim().is_empty() {
            return Err(SizingError::invalid_input("name", "", "Material name must not be empty"));
        }
        for (field, value) in [("ultimate_mpa", self.ultimate_mpa), ("yield_mpa", self.yield_mpa)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SizingError::invalid_input(
                    field,
                    value.to_string(),
                    format!("Allowable of '{}' must be positive", self.name),
                ));
            }
        }
        if self.density_kg_m3 < 0.0 {
            return Err(SizingError::invalid_input(
                "density_kg_m3",
                self.density_kg_m3.to_string(),
                "Density cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Ordered table of materials keyed by name.
///
/// Names are matched exactly. Inserting a name that already exists replaces
/// the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialTable {
    /// Materials in insertion order
    pub materials: Vec<MaterialAllowables>,
}

impl MaterialTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in material table
    pub fn builtin() -> &'static MaterialTable {
        builtin_table()
    }

    /// Add a material (builder pattern)
    pub fn with_material(mut self, name: impl Into<String>, ultimate_mpa: f64, yield_mpa: f64, density_kg_m3: f64) -> Self {
        self.insert(MaterialAllowables::new(name, ultimate_mpa, yield_mpa, density_kg_m3));
        self
    }

    /// Insert or replace a material
    pub fn insert(&mut self, material: MaterialAllowables) {
        match self.materials.iter_mut().find(|m| m.name == material.name) {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
    }

    /// Add every entry of `other`, replacing same-named materials
    pub fn merge(&mut self, other: &MaterialTable) {
        for material in &other.materials {
            self.insert(material.clone());
        }
    }

    /// Look up a material by name
    pub fn get(&self, name: &str) -> Option<&MaterialAllowables> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Allowable stress of a material
    ///
    /// # Errors
    ///
    /// `UnknownMaterial` if the name is not in the table.
    pub fn allowable(&self, name: &str, mode: AllowableMode) -> CalcResult<f64> {
        self.get(name)
            .map(|m| m.allowable(mode))
            .ok_or_else(|| SizingError::unknown_material(name))
    }

    /// Material names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.iter().map(|m| m.name.as_str())
    }

    /// Number of materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Validate every entry
    pub fn validate(&self) -> CalcResult<()> {
        for material in &self.materials {
            material.validate()?;
        }
        Ok(())
    }
}

/// Allowable stress from the built-in table.
///
/// # Errors
///
/// `UnknownMaterial` if `material_id` is not in the built-in table.
pub fn allowable(material_id: &str, mode: AllowableMode) -> CalcResult<f64> {
    builtin_table().allowable(material_id, mode)
}
