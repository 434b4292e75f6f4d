//! # Critical-Combination Search
//!
//! Evaluates every (material, criterion, load case) triple for one design
//! property at one candidate thickness and picks the governing one: the
//! triple with the lowest governing metric.
//!
//! ## Procedure
//!
//! 1. Resolve allowables, the property and its reference thickness up front
//!    ([`SearchPlan::new`]). These are configuration errors and stop the
//!    search before any work.
//! 2. Scale factor `t_ref / t`.
//! 3. Extract each load case once; the bundle is shared by every
//!    (material, criterion) pair.
//! 4. Compute reserve factors for every triple. A failing triple is logged
//!    and recorded as skipped.
//! 5. The lowest metric governs. Ties keep the first triple in declared
//!    order (material, then criterion, then load case).
//!
//! If no triple succeeds the thickness fails with `NoValidCombination`.
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::criteria::FailureCriterion;
//! use sizer_core::materials::MaterialTable;
//! use sizer_core::model::{DesignProperty, LoadCaseId, Member, ModelSnapshot, PropertyKind, StressRow};
//! use sizer_core::search::{search, SearchInput};
//!
//! let model = ModelSnapshot::new()
//!     .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
//!     .with_member(Member::new(10, 1))
//!     .with_stress(LoadCaseId::Number(1), vec![StressRow::new(10, 100.0, 0.0, 0.0)]);
//! let table = MaterialTable::new()
//!     .with_material("A", 200.0, 150.0, 0.0)
//!     .with_material("B", 100.0, 80.0, 0.0);
//!
//! let input = SearchInput::new(1)
//!     .with_materials(["A", "B"])
//!     .with_criteria([FailureCriterion::VonMises])
//!     .with_load_cases([LoadCaseId::Number(1)]);
//!
//! let result = search(&model, &table, &input, 2.0).unwrap();
//! assert_eq!(result.governing().key.material, "B");
//! assert_eq!(result.governing().summary.min_rf, 1.0);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::criteria::FailureCriterion;
use crate::errors::{CalcResult, SizingError};
use crate::extraction::{extract, ResultBundle};
use crate::materials::{AllowableMode, MaterialTable};
use crate::model::{LoadCaseId, PropertyId, StructuralModel};
use crate::reserve_factor::{reserve_factor, GoverningMetric, RfSummary};
use crate::scaling::scale_factor;

/// How independent evaluations are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One evaluation at a time, in declared order
    Sequential,
    /// Evaluations spread over the rayon pool; results keep declared order
    #[default]
    Parallel,
}

/// Map `f` over `items`, keeping input order in both modes.
pub(crate) fn map_ordered<T, R, F>(mode: ExecutionMode, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    match mode {
        ExecutionMode::Sequential => items.iter().map(f).collect(),
        ExecutionMode::Parallel => items.par_iter().map(f).collect(),
    }
}

/// Identifies one evaluated triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombinationKey {
    pub material: String,
    pub criterion: FailureCriterion,
    pub load_case: LoadCaseId,
}

impl std::fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} / LC {}", self.material, self.criterion, self.load_case)
    }
}

/// A successfully evaluated triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationEntry {
    pub key: CombinationKey,
    /// Allowable the RFs were computed against (MPa)
    pub allowable_mpa: f64,
    /// Members dropped during extraction of this load case
    pub dropped_members: usize,
    pub summary: RfSummary,
}

/// A triple that could not be evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCombination {
    pub key: CombinationKey,
    pub error: SizingError,
}

/// Worst load case of one (material, criterion) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    pub material: String,
    pub criterion: FailureCriterion,
    /// Lowest metric value over the pair's load cases
    pub min_value: f64,
    /// Load case producing `min_value`
    pub critical_load_case: LoadCaseId,
}

/// Outcome of searching one thickness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationResult {
    pub property_id: PropertyId,
    /// Candidate thickness
    pub thickness: f64,
    /// Stress scale applied to the reference results
    pub scale_factor: f64,
    /// Metric used to pick the governing entry
    pub metric: GoverningMetric,
    /// Evaluated triples, in declared order
    pub entries: Vec<CombinationEntry>,
    /// Skipped triples, in declared order
    pub skipped: Vec<SkippedCombination>,
    /// Index of the governing entry in `entries`
    pub governing: usize,
}

impl CombinationResult {
    /// The governing entry
    pub fn governing(&self) -> &CombinationEntry {
        &self.entries[self.governing]
    }

    /// Governing metric value
    pub fn governing_value(&self) -> f64 {
        self.metric.value(&self.governing().summary)
    }

    /// Look up an entry by its triple
    pub fn entry(&self, material: &str, criterion: FailureCriterion, load_case: &LoadCaseId) -> Option<&CombinationEntry> {
        self.entries.iter().find(|e| {
            e.key.material == material && e.key.criterion == criterion && &e.key.load_case == load_case
        })
    }

    /// Number of triples attempted
    pub fn attempted(&self) -> usize {
        self.entries.len() + self.skipped.len()
    }

    /// Per (material, criterion) pair, the lowest metric value and the load
    /// case producing it. Pairs are in declared order; pairs with no
    /// evaluated load case are left out.
    pub fn pair_summaries(&self) -> Vec<PairSummary> {
        let mut pairs: Vec<PairSummary> = Vec::new();
        for entry in &self.entries {
            let value = self.metric.value(&entry.summary);
            let existing = pairs
                .iter_mut()
                .find(|p| p.material == entry.key.material && p.criterion == entry.key.criterion);
            match existing {
                Some(pair) if value < pair.min_value => {
                    pair.min_value = value;
                    pair.critical_load_case = entry.key.load_case.clone();
                }
                Some(_) => {}
                None => pairs.push(PairSummary {
                    material: entry.key.material.clone(),
                    criterion: entry.key.criterion,
                    min_value: value,
                    critical_load_case: entry.key.load_case.clone(),
                }),
            }
        }
        pairs
    }
}

/// What to search: a property and the combinations to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchInput {
    pub property_id: PropertyId,
    pub materials: Vec<String>,
    pub criteria: Vec<FailureCriterion>,
    pub load_cases: Vec<LoadCaseId>,
    #[serde(default)]
    pub allowable_mode: AllowableMode,
    #[serde(default)]
    pub metric: GoverningMetric,
    #[serde(default)]
    pub execution: ExecutionMode,
}

impl SearchInput {
    /// Empty input for a property; add combinations with the `with_*` methods
    pub fn new(property_id: PropertyId) -> Self {
        SearchInput {
            property_id,
            materials: Vec::new(),
            criteria: Vec::new(),
            load_cases: Vec::new(),
            allowable_mode: AllowableMode::default(),
            metric: GoverningMetric::default(),
            execution: ExecutionMode::default(),
        }
    }

    pub fn with_materials<I, S>(mut self, materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.materials = materials.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_criteria(mut self, criteria: impl IntoIterator<Item = FailureCriterion>) -> Self {
        self.criteria = criteria.into_iter().collect();
        self
    }

    pub fn with_load_cases(mut self, load_cases: impl IntoIterator<Item = LoadCaseId>) -> Self {
        self.load_cases = load_cases.into_iter().collect();
        self
    }

    pub fn with_allowable_mode(mut self, mode: AllowableMode) -> Self {
        self.allowable_mode = mode;
        self
    }

    pub fn with_metric(mut self, metric: GoverningMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Check the combination lists are non-empty
    pub fn validate(&self) -> CalcResult<()> {
        if self.materials.is_empty() {
            return Err(SizingError::invalid_input("materials", "[]", "At least one material is required"));
        }
        if self.criteria.is_empty() {
            return Err(SizingError::invalid_input("criteria", "[]", "At least one failure criterion is required"));
        }
        if self.load_cases.is_empty() {
            return Err(SizingError::invalid_input("load_cases", "[]", "At least one load case is required"));
        }
        Ok(())
    }
}

/// A validated search, ready to be evaluated at any number of thicknesses.
///
/// Building the plan performs every configuration check; evaluating it only
/// fails per triple or per thickness.
#[derive(Debug)]
pub struct SearchPlan<'a, M: StructuralModel + ?Sized> {
    model: &'a M,
    property_id: PropertyId,
    reference_thickness: f64,
    /// (material, allowable) in declared order
    allowables: Vec<(String, f64)>,
    criteria: Vec<FailureCriterion>,
    load_cases: Vec<LoadCaseId>,
    metric: GoverningMetric,
    execution: ExecutionMode,
}

impl<'a, M: StructuralModel + ?Sized> SearchPlan<'a, M> {
    /// Resolve and validate a search.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for empty lists, `UnknownProperty`, `InvalidThickness`
    /// for a non-positive reference thickness, `UnknownMaterial`.
    pub fn new(model: &'a M, table: &MaterialTable, input: &SearchInput) -> CalcResult<Self> {
        input.validate()?;

        let property = model
            .property(input.property_id)
            .ok_or(SizingError::UnknownProperty {
                property_id: input.property_id,
            })?;
        let reference_thickness = property.reference_thickness()?;

        let allowables = input
            .materials
            .iter()
            .map(|name| Ok((name.clone(), table.allowable(name, input.allowable_mode)?)))
            .collect::<CalcResult<Vec<_>>>()?;

        Ok(SearchPlan {
            model,
            property_id: input.property_id,
            reference_thickness,
            allowables,
            criteria: input.criteria.clone(),
            load_cases: input.load_cases.clone(),
            metric: input.metric,
            execution: input.execution,
        })
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    /// Thickness the model's results were computed at
    pub fn reference_thickness(&self) -> f64 {
        self.reference_thickness
    }

    pub fn metric(&self) -> GoverningMetric {
        self.metric
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    /// Number of triples evaluated per thickness
    pub fn combination_count(&self) -> usize {
        self.allowables.len() * self.criteria.len() * self.load_cases.len()
    }

    /// Evaluate every triple at one thickness.
    ///
    /// # Errors
    ///
    /// - `InvalidThickness` if `thickness` is not positive
    /// - `NoValidCombination` if every triple was skipped
    pub fn evaluate(&self, thickness: f64) -> CalcResult<CombinationResult> {
        let scale = scale_factor(self.reference_thickness, thickness)?;

        let bundles: Vec<CalcResult<ResultBundle>> = map_ordered(self.execution, &self.load_cases, |lc| {
            extract(self.model, self.property_id, lc, scale)
        });

        let mut triples = Vec::with_capacity(self.combination_count());
        for m in 0..self.allowables.len() {
            for c in 0..self.criteria.len() {
                for l in 0..self.load_cases.len() {
                    triples.push((m, c, l));
                }
            }
        }

        let outcomes = map_ordered(self.execution, &triples, |&(m, c, l)| {
            let (material, allowable) = &self.allowables[m];
            let key = CombinationKey {
                material: material.clone(),
                criterion: self.criteria[c],
                load_case: self.load_cases[l].clone(),
            };
            let evaluated = bundles[l].as_ref().map_err(Clone::clone).and_then(|bundle| {
                reserve_factor(bundle, *allowable, key.criterion).map(|summary| (bundle.dropped_members, summary))
            });
            match evaluated {
                Ok((dropped_members, summary)) => {
                    debug!(
                        thickness,
                        combination = %key,
                        min_rf = summary.min_rf,
                        mean_rf = summary.mean_rf,
                        "evaluated combination"
                    );
                    Ok(CombinationEntry {
                        key,
                        allowable_mpa: *allowable,
                        dropped_members,
                        summary,
                    })
                }
                Err(error) => {
                    warn!(
                        thickness,
                        combination = %key,
                        code = error.error_code(),
                        "skipping combination: {}",
                        error
                    );
                    Err(SkippedCombination { key, error })
                }
            }
        });

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(entry) => entries.push(entry),
                Err(skip) => skipped.push(skip),
            }
        }

        if entries.is_empty() {
            return Err(SizingError::NoValidCombination {
                thickness,
                attempted: skipped.len(),
            });
        }

        let mut governing = 0;
        for (i, entry) in entries.iter().enumerate() {
            if self.metric.value(&entry.summary) < self.metric.value(&entries[governing].summary) {
                governing = i;
            }
        }

        Ok(CombinationResult {
            property_id: self.property_id,
            thickness,
            scale_factor: scale,
            metric: self.metric,
            entries,
            skipped,
            governing,
        })
    }
}

/// Validate a search and evaluate it at one thickness.
///
/// See [`SearchPlan::new`] and [`SearchPlan::evaluate`] for the errors.
pub fn search<M>(model: &M, table: &MaterialTable, input: &SearchInput, thickness: f64) -> CalcResult<CombinationResult>
where
    M: StructuralModel + ?Sized,
{
    SearchPlan::new(model, table, input)?.evaluate(thickness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorClass;
    use crate::model::{DesignProperty, Member, ModelSnapshot, PropertyKind, StressRow};
    use approx::assert_relative_eq;

    fn model() -> ModelSnapshot {
        ModelSnapshot::new()
            .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
            .with_member(Member::new(10, 1))
            .with_member(Member::new(11, 1))
            .with_stress(
                LoadCaseId::Number(1),
                vec![StressRow::new(10, 100.0, 0.0, 0.0), StressRow::new(11, 50.0, 0.0, 0.0)],
            )
            .with_stress(LoadCaseId::Number(2), vec![StressRow::new(10, 200.0, 0.0, 0.0)])
            .with_stress(LoadCaseId::Number(3), vec![StressRow::new(99, 10.0, 0.0, 0.0)])
    }

    fn table() -> MaterialTable {
        MaterialTable::new()
            .with_material("A", 200.0, 150.0, 0.0)
            .with_material("B", 100.0, 80.0, 0.0)
    }

    fn input() -> SearchInput {
        SearchInput::new(1)
            .with_materials(["A", "B"])
            .with_criteria([FailureCriterion::VonMises, FailureCriterion::MaxPrincipal])
            .with_load_cases([LoadCaseId::Number(1), LoadCaseId::Number(2), LoadCaseId::Number(3)])
    }

    #[test]
    fn test_governing_is_global_minimum() {
        let result = search(&model(), &table(), &input(), 2.0).unwrap();
        let governing = result.governing();
        assert_eq!(governing.key.material, "B");
        assert_eq!(governing.key.criterion, FailureCriterion::VonMises);
        assert_eq!(governing.key.load_case, LoadCaseId::Number(2));
        assert_relative_eq!(governing.summary.min_rf, 0.5);
        assert_relative_eq!(result.scale_factor, 1.0);
    }

    #[test]
    fn test_failing_load_case_is_skipped_per_triple() {
        let result = search(&model(), &table(), &input(), 2.0).unwrap();
        assert_eq!(result.entries.len(), 8);
        assert_eq!(result.skipped.len(), 4);
        assert_eq!(result.attempted(), 12);
        assert!(result
            .skipped
            .iter()
            .all(|s| s.key.load_case == LoadCaseId::Number(3) && s.error.error_code() == "NO_STRESS_DATA_FOR_MEMBERS"));
    }

    #[test]
    fn test_entries_in_declared_order() {
        let result = search(&model(), &table(), &input(), 2.0).unwrap();
        let keys: Vec<(&str, LoadCaseId)> = result
            .entries
            .iter()
            .take(2)
            .map(|e| (e.key.material.as_str(), e.key.load_case.clone()))
            .collect();
        assert_eq!(keys, vec![("A", LoadCaseId::Number(1)), ("A", LoadCaseId::Number(2))]);
    }

    #[test]
    fn test_thinner_candidate_scales_stress() {
        let result = search(&model(), &table(), &input(), 1.0).unwrap();
        assert_relative_eq!(result.scale_factor, 2.0);
        assert_relative_eq!(result.governing_value(), 0.25);
    }

    #[test]
    fn test_all_skipped_is_no_valid_combination() {
        let input = input().with_load_cases([LoadCaseId::Number(3)]);
        let err = search(&model(), &table(), &input, 2.0).unwrap_err();
        assert_eq!(err, SizingError::NoValidCombination { thickness: 2.0, attempted: 4 });
    }

    #[test]
    fn test_configuration_errors_fail_fast() {
        let m = model();
        let err = search(&m, &table(), &input().with_materials(["A", "Unobtainium"]), 2.0).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_MATERIAL");

        let err = search(&m, &table(), &SearchInput { property_id: 42, ..input() }, 2.0).unwrap_err();
        assert_eq!(err, SizingError::UnknownProperty { property_id: 42 });

        let err = search(&m, &table(), &input().with_criteria(Vec::new()), 2.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = search(&m, &table(), &input(), 0.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_THICKNESS");
    }

    #[test]
    fn test_tie_keeps_first_declared_material() {
        let table = MaterialTable::new()
            .with_material("Twin 1", 100.0, 90.0, 0.0)
            .with_material("Twin 2", 100.0, 90.0, 0.0);
        let input = input().with_materials(["Twin 2", "Twin 1"]);
        let result = search(&model(), &table, &input, 2.0).unwrap();
        assert_eq!(result.governing().key.material, "Twin 2");
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let parallel = search(&model(), &table(), &input(), 1.5).unwrap();
        let sequential = search(
            &model(),
            &table(),
            &input().with_execution(ExecutionMode::Sequential),
            1.5,
        )
        .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_pair_summaries() {
        let result = search(&model(), &table(), &input(), 2.0).unwrap();
        let pairs = result.pair_summaries();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].material, "A");
        assert_eq!(pairs[0].critical_load_case, LoadCaseId::Number(2));
        assert_relative_eq!(pairs[0].min_value, 1.0);
        assert_relative_eq!(pairs[3].min_value, 0.5);
    }

    #[test]
    fn test_mean_metric_can_select_a_different_load_case() {
        // LC 4: one hot member and one cold one; LC 5: uniformly moderate
        let model = model()
            .with_stress(
                LoadCaseId::Number(4),
                vec![StressRow::new(10, 200.0, 0.0, 0.0), StressRow::new(11, 10.0, 0.0, 0.0)],
            )
            .with_stress(
                LoadCaseId::Number(5),
                vec![StressRow::new(10, 150.0, 0.0, 0.0), StressRow::new(11, 150.0, 0.0, 0.0)],
            );
        let input = SearchInput::new(1)
            .with_materials(["B"])
            .with_criteria([FailureCriterion::VonMises])
            .with_load_cases([LoadCaseId::Number(4), LoadCaseId::Number(5)]);

        let by_min = search(&model, &table(), &input, 2.0).unwrap();
        assert_eq!(by_min.governing().key.load_case, LoadCaseId::Number(4));
        assert_relative_eq!(by_min.governing_value(), 0.5);

        let by_mean = search(&model, &table(), &input.with_metric(GoverningMetric::MeanRf), 2.0).unwrap();
        assert_eq!(by_mean.governing().key.load_case, LoadCaseId::Number(5));
        assert_relative_eq!(by_mean.governing_value(), 100.0 / 150.0, epsilon = 1e-12);
        // LC 4 mean is (0.5 + 10.0) / 2
        assert_relative_eq!(by_mean.entries[0].summary.mean_rf, 5.25, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_comparison_stress_skips_only_that_criterion() {
        let model = model().with_stress(LoadCaseId::Number(6), vec![StressRow::new(10, 0.0, 50.0, 0.0)]);
        let input = SearchInput::new(1)
            .with_materials(["A"])
            .with_criteria([FailureCriterion::VonMisesLegacy, FailureCriterion::MaxPrincipal])
            .with_load_cases([LoadCaseId::Number(6)]);

        let result = search(&model, &table(), &input, 2.0).unwrap();
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].key.criterion, FailureCriterion::VonMisesLegacy);
        assert_eq!(result.skipped[0].error.error_code(), "ZERO_STRESS_DIVISION");

        assert_eq!(result.entries.len(), 1);
        let governing = result.governing();
        assert_eq!(governing.key.criterion, FailureCriterion::MaxPrincipal);
        assert_relative_eq!(governing.summary.min_rf, 4.0);
    }

    #[test]
    fn test_property_without_members_has_no_valid_combination() {
        let model = model().with_property(DesignProperty::new(2, PropertyKind::Shell { thickness: 2.0 }));
        let input = SearchInput { property_id: 2, ..input() };
        let err = search(&model, &table(), &input, 2.0).unwrap_err();
        assert_eq!(err, SizingError::NoValidCombination { thickness: 2.0, attempted: 12 });
        assert_eq!(err.class(), ErrorClass::Thickness);
    }
}
