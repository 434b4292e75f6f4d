//! Plain-text rendering of sizing reports and reference tables.

use std::fmt::{self, Write};

use sizer_core::materials::MaterialTable;
use sizer_core::model::{ResultFamily, StructuralModel};
use sizer_core::sizing::{SizingReport, SizingResult, SizingStatus};

const RULE: &str = "═══════════════════════════════════════════════════════════";

fn status_icon(pass: bool) -> &'static str {
    if pass {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

/// Render a sizing report for the terminal
pub fn render_report(report: &SizingReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", RULE)?;
    writeln!(out, "  SIZING RESULTS - PROPERTY {}", report.property_id)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    writeln!(out, "Target: {} >= {:.3}", report.metric, report.target_rf)?;
    writeln!(out)?;

    write_thickness_table(&mut out, report)?;

    writeln!(out, "{}", RULE)?;
    match (report.status, report.design_point()) {
        (SizingStatus::Found, Some(point)) => write_found(&mut out, report, point)?,
        (SizingStatus::Exhausted, Some(point)) => write_exhausted(&mut out, report, point)?,
        _ => writeln!(out, "  NO DATA: no thickness produced a result")?,
    }

    if let Some(point) = report.design_point() {
        write_design_notes(&mut out, point)?;
    }
    writeln!(out, "{}", RULE)?;
    Ok(out)
}

fn write_thickness_table(out: &mut String, report: &SizingReport) -> fmt::Result {
    if !report.results.is_empty() {
        writeln!(
            out,
            "  {:>8}  {:>7}  {:>7}  {:>7}  {:<24} {:<26} {:>6}  {:>8}",
            "t (mm)", "min RF", "mean RF", "max RF", "material", "criterion", "LC", "member"
        )?;
        for result in &report.results {
            let value = result.metric_value(report.metric);
            writeln!(
                out,
                "  {:>8.3}  {:>7.3}  {:>7.3}  {:>7.3}  {:<24} {:<26} {:>6}  {:>8} {}",
                result.thickness,
                result.min_rf,
                result.mean_rf,
                result.max_rf,
                result.governing_material,
                result.governing_criterion.to_string(),
                result.governing_load_case.to_string(),
                result.governing_member_id,
                status_icon(value >= report.target_rf)
            )?;
        }
        writeln!(out)?;
    }

    for skipped in &report.skipped_thicknesses {
        writeln!(out, "  skipped t = {:.3}: {}", skipped.thickness, skipped.error)?;
    }
    if !report.skipped_thicknesses.is_empty() {
        writeln!(out)?;
    }
    Ok(())
}

fn write_found(out: &mut String, report: &SizingReport, point: &SizingResult) -> fmt::Result {
    writeln!(out, "  OPTIMUM DESIGN: t = {:.3} mm", point.thickness)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "  Reserve Factor:    {:.3}", point.metric_value(report.metric))?;
    writeln!(out, "  Critical Material: {} ({:.0} MPa)", point.governing_material, point.allowable_mpa)?;
    writeln!(out, "  Critical Criterion: {}", point.governing_criterion)?;
    writeln!(out, "  Critical Load Case: {}", point.governing_load_case)?;
    writeln!(out, "  Critical Member:   {}", point.governing_member_id)?;
    writeln!(out, "  Max Stress:        {:.1} MPa", point.max_comparison_stress)
}

fn write_exhausted(out: &mut String, report: &SizingReport, point: &SizingResult) -> fmt::Result {
    writeln!(out, "  TARGET RF NOT ACHIEVED IN GIVEN RANGE")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "  At maximum thickness ({:.3} mm):", point.thickness)?;
    writeln!(out, "  Best RF achieved:  {:.3}", point.metric_value(report.metric))?;
    writeln!(out, "  Critical Material: {}", point.governing_material)?;
    writeln!(out, "  Critical Criterion: {}", point.governing_criterion)?;
    writeln!(out, "  Critical Load Case: {}", point.governing_load_case)?;
    writeln!(out, "  Increase the thickness range or adjust the target RF")
}

fn write_design_notes(out: &mut String, point: &SizingResult) -> fmt::Result {
    if point.dropped_members > 0 {
        writeln!(
            out,
            "  Note: {} member(s) had no results in load case {}",
            point.dropped_members, point.governing_load_case
        )?;
    }
    if !point.pair_summaries.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Combination summary at t = {:.3} mm:", point.thickness)?;
        for pair in &point.pair_summaries {
            writeln!(
                out,
                "    {:<24} {:<26} {:>7.3}  (LC {})",
                pair.material,
                pair.criterion.to_string(),
                pair.min_value,
                pair.critical_load_case
            )?;
        }
    }
    Ok(())
}

/// Render the material table
pub fn render_materials(table: &MaterialTable) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{:<26} {:>14} {:>12} {:>16}",
        "Material", "Ultimate (MPa)", "Yield (MPa)", "Density (kg/m³)"
    )?;
    for material in &table.materials {
        writeln!(
            out,
            "{:<26} {:>14.0} {:>12.0} {:>16.0}",
            material.name, material.ultimate_mpa, material.yield_mpa, material.density_kg_m3
        )?;
    }
    Ok(out)
}

/// Render available load cases per result family
pub fn render_load_cases<M: StructuralModel + ?Sized>(model: &M) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for family in ResultFamily::ALL {
        let cases: Vec<String> = model
            .available_load_cases(family)
            .iter()
            .map(ToString::to_string)
            .collect();
        let listed = if cases.is_empty() { "-".to_string() } else { cases.join(", ") };
        writeln!(out, "{:<13} {}", family.name(), listed)?;
    }
    let all: Vec<String> = model.available_load_cases_all().iter().map(ToString::to_string).collect();
    writeln!(out, "{:<13} {}", "ALL", all.join(", "))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizer_core::criteria::FailureCriterion;
    use sizer_core::model::{DesignProperty, LoadCaseId, Member, ModelSnapshot, PropertyKind, StressRow};
    use sizer_core::sizing::{size, SizingRequest, ThicknessRange};

    fn model() -> ModelSnapshot {
        ModelSnapshot::new()
            .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
            .with_member(Member::new(10, 1))
            .with_stress(LoadCaseId::Number(1), vec![StressRow::new(10, 150.0, 0.0, 0.0)])
    }

    fn request(target_rf: f64) -> SizingRequest {
        SizingRequest::new(1)
            .with_materials(["Aluminum 6061-T6"])
            .with_criteria([FailureCriterion::VonMises])
            .with_load_cases([LoadCaseId::Number(1)])
            .with_thickness(ThicknessRange::new(1.0, 2.0, 0.5))
            .with_target_rf(target_rf)
    }

    #[test]
    fn test_found_report_names_design_point() {
        let report = size(&model(), MaterialTable::builtin(), &request(1.1)).unwrap();
        let text = render_report(&report).unwrap();
        assert!(text.contains("OPTIMUM DESIGN: t = 1.500 mm"));
        assert!(text.contains("[FAIL]"));
        assert!(text.contains("[OK]"));
        assert!(text.contains("Combination summary"));
    }

    #[test]
    fn test_exhausted_report() {
        let report = size(&model(), MaterialTable::builtin(), &request(10.0)).unwrap();
        let text = render_report(&report).unwrap();
        assert!(text.contains("TARGET RF NOT ACHIEVED"));
        assert!(text.contains("At maximum thickness (2.000 mm)"));
    }

    #[test]
    fn test_material_listing() {
        let text = render_materials(MaterialTable::builtin()).unwrap();
        assert!(text.contains("Titanium Ti-6Al-4V"));
        assert_eq!(text.lines().count(), MaterialTable::builtin().len() + 1);
    }

    #[test]
    fn test_load_case_listing() {
        let text = render_load_cases(&model()).unwrap();
        assert!(text.starts_with("STRESS"));
        assert!(text.contains("STRAIN        -"));
    }
}
