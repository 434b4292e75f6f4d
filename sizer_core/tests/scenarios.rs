//! End-to-end sizing scenarios against small hand-checkable models.

use approx::assert_relative_eq;
use sizer_core::criteria::FailureCriterion;
use sizer_core::errors::SizingError;
use sizer_core::materials::MaterialTable;
use sizer_core::model::{DesignProperty, LoadCaseId, Member, ModelSnapshot, PropertyKind, StressRow};
use sizer_core::reserve_factor::GoverningMetric;
use sizer_core::search::{search, ExecutionMode, SearchInput, SearchPlan};
use sizer_core::sizing::{size, SizingRequest, SizingStatus, ThicknessRange};

/// One shell property (t_ref = 2.0) with a single member under uniaxial stress
fn single_member_model(stress: f64) -> ModelSnapshot {
    ModelSnapshot::new()
        .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
        .with_member(Member::new(100, 1))
        .with_stress(LoadCaseId::Number(1), vec![StressRow::new(100, stress, 0.0, 0.0)])
}

/// A wing-panel-like property with several members and load cases
fn panel_model() -> ModelSnapshot {
    let mut model = ModelSnapshot::new()
        .with_property(DesignProperty::new(7, PropertyKind::Shell { thickness: 3.0 }).with_label("Skin panel"))
        .with_property(DesignProperty::new(8, PropertyKind::Shell { thickness: 1.0 }));
    for id in 700..706 {
        model = model.with_member(Member::new(id, 7));
    }
    model = model.with_member(Member::new(800, 8));

    let rows = |lc: f64| -> Vec<StressRow> {
        (700..706)
            .map(|id| {
                let k = (id - 699) as f64;
                StressRow::new(id, 20.0 * k * lc, -5.0 * k, 3.0 * k * lc)
            })
            .chain(std::iter::once(StressRow::new(800, 999.0, 0.0, 0.0)))
            .collect()
    };
    model
        .with_stress(LoadCaseId::Number(1), rows(1.0))
        .with_stress(LoadCaseId::Number(2), rows(1.5))
        .with_stress(LoadCaseId::Label("Gust".to_string()), rows(0.8))
}

fn two_material_table() -> MaterialTable {
    MaterialTable::new()
        .with_material("A", 200.0, 180.0, 2700.0)
        .with_material("B", 100.0, 90.0, 2700.0)
}

fn panel_request() -> SizingRequest {
    SizingRequest::new(7)
        .with_materials(["Aluminum 7075-T6", "Aluminum 6061-T6", "Titanium Ti-6Al-4V"])
        .with_criteria([FailureCriterion::VonMises, FailureCriterion::MaxPrincipal])
        .with_load_cases([
            LoadCaseId::Number(1),
            LoadCaseId::Number(2),
            LoadCaseId::Label("Gust".to_string()),
        ])
        .with_thickness(ThicknessRange::new(0.5, 4.0, 0.25))
        .with_target_rf(1.5)
}

#[test]
fn scenario_a_reference_thickness_keeps_stress() {
    let model = single_member_model(150.0);
    let table = MaterialTable::new().with_material("M", 300.0, 250.0, 0.0);
    let input = SearchInput::new(1)
        .with_materials(["M"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)]);

    let result = search(&model, &table, &input, 2.0).unwrap();
    assert_relative_eq!(result.scale_factor, 1.0);
    assert_relative_eq!(result.governing().summary.min_rf, 2.0);
}

#[test]
fn scenario_b_half_thickness_doubles_stress() {
    let model = single_member_model(150.0);
    let table = MaterialTable::new().with_material("M", 300.0, 250.0, 0.0);
    let input = SearchInput::new(1)
        .with_materials(["M"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)]);

    let result = search(&model, &table, &input, 1.0).unwrap();
    assert_relative_eq!(result.scale_factor, 2.0);
    assert_relative_eq!(result.governing().summary.max_comparison_stress, 300.0);
    assert_relative_eq!(result.governing().summary.min_rf, 1.0);
}

#[test]
fn scenario_c_weaker_material_governs() {
    let model = single_member_model(100.0);
    let input = SearchInput::new(1)
        .with_materials(["A", "B"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)]);

    let result = search(&model, &two_material_table(), &input, 2.0).unwrap();
    assert_relative_eq!(result.entry("A", FailureCriterion::VonMises, &LoadCaseId::Number(1)).unwrap().summary.min_rf, 2.0);
    assert_eq!(result.governing().key.material, "B");
    assert_relative_eq!(result.governing_value(), 1.0);
}

#[test]
fn scenario_d_single_thickness_unreachable_target() {
    let model = single_member_model(150.0);
    let table = MaterialTable::new().with_material("M", 300.0, 250.0, 0.0);
    let request = SizingRequest::new(1)
        .with_materials(["M"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)])
        .with_thickness(ThicknessRange::new(1.0, 1.0, 1.0))
        .with_target_rf(100.0);

    let report = size(&model, &table, &request).unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.status, SizingStatus::Exhausted);
    assert_relative_eq!(report.design_point().unwrap().thickness, 1.0);
}

#[test]
fn scenario_e_no_intersecting_members() {
    let model = ModelSnapshot::new()
        .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
        .with_member(Member::new(100, 1))
        .with_stress(LoadCaseId::Number(1), vec![StressRow::new(555, 150.0, 0.0, 0.0)])
        .with_stress(LoadCaseId::Number(2), vec![StressRow::new(100, 150.0, 0.0, 0.0)]);
    let table = MaterialTable::new().with_material("M", 300.0, 250.0, 0.0);

    let input = SearchInput::new(1)
        .with_materials(["M"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)]);
    let err = search(&model, &table, &input, 2.0).unwrap_err();
    assert_eq!(err, SizingError::NoValidCombination { thickness: 2.0, attempted: 1 });

    // The thickness produces no entry; scanning continues past it
    let request = SizingRequest::new(1)
        .with_materials(["M"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)])
        .with_thickness(ThicknessRange::new(1.0, 2.0, 0.5));
    let report = size(&model, &table, &request).unwrap();
    assert!(report.results.is_empty());
    assert_eq!(report.skipped_thicknesses.len(), 3);
    assert_eq!(report.status, SizingStatus::NoData);
}

#[test]
fn rf_is_non_decreasing_in_thickness() {
    let model = panel_model();
    let table = MaterialTable::builtin();
    let input = panel_request().search_input();
    let plan = SearchPlan::new(&model, table, &input).unwrap();

    let mut previous = f64::NEG_INFINITY;
    for t in ThicknessRange::new(0.5, 6.0, 0.25).values().unwrap() {
        let entry = plan
            .evaluate(t)
            .unwrap()
            .entry("Aluminum 6061-T6", FailureCriterion::VonMises, &LoadCaseId::Number(2))
            .unwrap()
            .summary
            .min_rf;
        assert!(entry >= previous, "RF fell from {} to {} at t={}", previous, entry, t);
        previous = entry;
    }
}

#[test]
fn search_is_idempotent() {
    let model = panel_model();
    let input = panel_request().search_input();
    let first = search(&model, MaterialTable::builtin(), &input, 1.75).unwrap();
    let second = search(&model, MaterialTable::builtin(), &input, 1.75).unwrap();
    assert_eq!(first, second);
}

#[test]
fn round_trip_reproduces_governing_combination() {
    let model = panel_model();
    let request = panel_request();
    let report = size(&model, MaterialTable::builtin(), &request).unwrap();
    assert!(!report.results.is_empty());

    for result in &report.results {
        let rerun = search(&model, MaterialTable::builtin(), &request.search_input(), result.thickness).unwrap();
        let governing = rerun.governing();
        assert_eq!(governing.key.material, result.governing_material);
        assert_eq!(governing.key.criterion, result.governing_criterion);
        assert_eq!(governing.key.load_case, result.governing_load_case);
        assert_eq!(governing.summary.governing_member_id, result.governing_member_id);
        assert_relative_eq!(governing.summary.min_rf, result.min_rf);
    }
}

#[test]
fn panel_sizing_finds_design_point() {
    let model = panel_model();
    let report = size(&model, MaterialTable::builtin(), &panel_request()).unwrap();
    assert_eq!(report.status, SizingStatus::Found);

    let point = report.design_point().unwrap();
    assert!(point.min_rf >= 1.5);
    // Weakest material, most severe load case, most loaded member
    assert_eq!(point.governing_material, "Aluminum 6061-T6");
    assert_eq!(point.governing_load_case, LoadCaseId::Number(2));
    assert_eq!(point.governing_member_id, 705);

    // Every earlier thickness fell short and thicknesses ascend
    for pair in report.results.windows(2) {
        assert!(pair[0].thickness < pair[1].thickness);
        assert!(pair[0].min_rf < 1.5);
    }
}

#[test]
fn step_must_be_positive() {
    let model = single_member_model(150.0);
    let request = SizingRequest::new(1)
        .with_materials(["A"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)])
        .with_thickness(ThicknessRange::new(1.0, 2.0, 0.0));
    let err = size(&model, &two_material_table(), &request).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[test]
fn unknown_material_fails_before_search() {
    let model = single_member_model(150.0);
    let request = SizingRequest::new(1)
        .with_materials(["A", "Unobtainium"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)]);
    let err = size(&model, &two_material_table(), &request).unwrap_err();
    assert_eq!(err, SizingError::unknown_material("Unobtainium"));
}

#[test]
fn sequential_and_parallel_reports_match() {
    let model = panel_model();
    let parallel = size(&model, MaterialTable::builtin(), &panel_request()).unwrap();
    let sequential = size(
        &model,
        MaterialTable::builtin(),
        &panel_request().with_execution(ExecutionMode::Sequential),
    )
    .unwrap();
    assert_eq!(parallel, sequential);

    let exhausted = panel_request().with_target_rf(50.0);
    let parallel = size(&model, MaterialTable::builtin(), &exhausted).unwrap();
    let sequential = size(
        &model,
        MaterialTable::builtin(),
        &exhausted.clone().with_execution(ExecutionMode::Sequential),
    )
    .unwrap();
    assert_eq!(parallel.status, SizingStatus::Exhausted);
    assert_eq!(parallel, sequential);
}

#[test]
fn ties_resolve_to_first_declared() {
    let model = single_member_model(100.0);
    let table = MaterialTable::new()
        .with_material("First", 150.0, 100.0, 0.0)
        .with_material("Second", 150.0, 100.0, 0.0);
    let model = model.with_stress(LoadCaseId::Number(2), vec![StressRow::new(100, 100.0, 0.0, 0.0)]);

    let input = SearchInput::new(1)
        .with_materials(["Second", "First"])
        .with_criteria([FailureCriterion::MaxPrincipal, FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(2), LoadCaseId::Number(1)]);
    let result = search(&model, &table, &input, 2.0).unwrap();
    let key = &result.governing().key;
    assert_eq!(key.material, "Second");
    assert_eq!(key.criterion, FailureCriterion::MaxPrincipal);
    assert_eq!(key.load_case, LoadCaseId::Number(2));
}

#[test]
fn dropped_members_are_reported() {
    let model = ModelSnapshot::new()
        .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
        .with_member(Member::new(1, 1))
        .with_member(Member::new(2, 1))
        .with_member(Member::new(3, 1))
        .with_stress(LoadCaseId::Number(1), vec![StressRow::new(2, 100.0, 0.0, 0.0)]);
    let request = SizingRequest::new(1)
        .with_materials(["A"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)])
        .with_thickness(ThicknessRange::new(2.0, 2.0, 1.0));
    let report = size(&model, &two_material_table(), &request).unwrap();
    let point = report.design_point().unwrap();
    assert_eq!(point.dropped_members, 2);
    assert_eq!(point.governing_member_id, 2);
}

#[test]
fn mean_metric_drives_target_decision() {
    // Members at 100 and 25 MPa: min RF 2.0, mean RF (2.0 + 8.0) / 2 = 5.0 at t_ref
    let model = ModelSnapshot::new()
        .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
        .with_member(Member::new(1, 1))
        .with_member(Member::new(2, 1))
        .with_stress(
            LoadCaseId::Number(1),
            vec![StressRow::new(1, 100.0, 0.0, 0.0), StressRow::new(2, 25.0, 0.0, 0.0)],
        );
    let request = SizingRequest::new(1)
        .with_materials(["A"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)])
        .with_thickness(ThicknessRange::new(2.0, 2.0, 1.0))
        .with_target_rf(4.0);

    let by_min = size(&model, &two_material_table(), &request).unwrap();
    assert_eq!(by_min.status, SizingStatus::Exhausted);

    let by_mean = size(&model, &two_material_table(), &request.with_metric(GoverningMetric::MeanRf)).unwrap();
    assert_eq!(by_mean.status, SizingStatus::Found);
    assert_relative_eq!(by_mean.design_point().unwrap().mean_rf, 5.0);
}

#[test]
fn report_serializes_for_callers() {
    let model = single_member_model(150.0);
    let table = MaterialTable::new().with_material("M", 300.0, 250.0, 0.0);
    let request = SizingRequest::new(1)
        .with_materials(["M"])
        .with_criteria([FailureCriterion::VonMises])
        .with_load_cases([LoadCaseId::Number(1)])
        .with_thickness(ThicknessRange::new(1.0, 3.0, 0.5));
    let report = size(&model, &table, &request).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"governing_criterion\":\"Von Mises\""));
    let parsed: sizer_core::sizing::SizingReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.status, report.status);
    assert_eq!(parsed.results.len(), report.results.len());
    assert_relative_eq!(parsed.design_point().unwrap().min_rf, report.design_point().unwrap().min_rf, epsilon = 1e-12);
}
