//! Benchmarks for the critical-combination search and the thickness scan

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sizer_core::criteria::FailureCriterion;
use sizer_core::materials::MaterialTable;
use sizer_core::model::{DesignProperty, LoadCaseId, Member, ModelSnapshot, PropertyKind, StressRow};
use sizer_core::search::{search, ExecutionMode, SearchInput};
use sizer_core::sizing::{size, SizingRequest, ThicknessRange};

fn create_panel_model(members: u32, load_cases: i64) -> ModelSnapshot {
    let mut model = ModelSnapshot::new().with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }));

    for id in 0..members {
        model = model.with_member(Member::new(id, 1));
    }

    for lc in 1..=load_cases {
        let rows = (0..members)
            .map(|id| {
                let k = 1.0 + (id % 17) as f64 / 17.0;
                StressRow::new(id, 120.0 * k * lc as f64 / load_cases as f64, -30.0 * k, 15.0 * k)
            })
            .collect();
        model = model.with_stress(LoadCaseId::Number(lc), rows);
    }
    model
}

fn search_input(load_cases: i64, execution: ExecutionMode) -> SearchInput {
    SearchInput::new(1)
        .with_materials(MaterialTable::builtin().names().map(str::to_string).collect::<Vec<_>>())
        .with_criteria(FailureCriterion::ALL)
        .with_load_cases((1..=load_cases).map(LoadCaseId::Number))
        .with_execution(execution)
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for &members in &[100u32, 1_000, 10_000] {
        let model = create_panel_model(members, 8);
        for execution in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let input = search_input(8, execution);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", execution), members),
                &members,
                |b, _| b.iter(|| search(black_box(&model), MaterialTable::builtin(), &input, black_box(1.5))),
            );
        }
    }

    group.finish();
}

fn bench_size(c: &mut Criterion) {
    let model = create_panel_model(2_000, 8);
    let request = SizingRequest::new(1)
        .with_materials(["Aluminum 6061-T6", "Aluminum 7075-T6"])
        .with_criteria([FailureCriterion::VonMises, FailureCriterion::MaxPrincipal])
        .with_all_stress_load_cases(&model)
        .with_thickness(ThicknessRange::new(0.5, 10.0, 0.25))
        .with_target_rf(50.0);

    c.bench_function("size_exhausted_range", |b| {
        b.iter(|| size(black_box(&model), MaterialTable::builtin(), black_box(&request)))
    });
}

criterion_group!(benches, bench_search, bench_size);
criterion_main!(benches);
