//! Built-in material catalog.
//!
//! Representative room-temperature values (MPa, kg/m³) for common airframe
//! materials. Projects with qualified allowables should supply their own
//! [`MaterialTable`].

use once_cell::sync::Lazy;

use super::{MaterialAllowables, MaterialTable};

/// (name, ultimate MPa, yield MPa, density kg/m³)
const CATALOG: [(&str, f64, f64, f64); 6] = [
    ("Aluminum 6061-T6", 310.0, 276.0, 2700.0),
    ("Steel AISI 4130", 670.0, 435.0, 7850.0),
    ("Titanium Ti-6Al-4V", 950.0, 880.0, 4430.0),
    ("Composite Carbon/Epoxy", 1500.0, 1200.0, 1600.0),
    ("Aluminum 7075-T6", 572.0, 503.0, 2810.0),
    ("Steel 4340", 745.0, 470.0, 7850.0),
];

static BUILTIN: Lazy<MaterialTable> = Lazy::new(|| MaterialTable {
    materials: CATALOG
        .iter()
        .map(|&(name, ultimate, yield_, density)| MaterialAllowables::new(name, ultimate, yield_, density))
        .collect(),
});

/// The process-wide built-in table
pub fn builtin_table() -> &'static MaterialTable {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_preserved() {
        let names: Vec<&str> = builtin_table().names().collect();
        assert_eq!(names.len(), CATALOG.len());
        assert_eq!(names[0], "Aluminum 6061-T6");
        assert_eq!(names[5], "Steel 4340");
    }

    #[test]
    fn test_yield_below_ultimate() {
        for material in &builtin_table().materials {
            assert!(material.yield_mpa < material.ultimate_mpa, "{}", material.name);
        }
    }
}
