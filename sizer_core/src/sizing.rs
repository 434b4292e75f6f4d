//! # Multi-Condition Sizing
//!
//! Scans candidate thicknesses in ascending order. At each one the
//! critical-combination search picks the governing (material, criterion,
//! load case); scanning stops at the first thickness whose governing metric
//! reaches the target reserve factor.
//!
//! ```text
//! Scanning ──(metric >= target)──> Found
//!    │
//!    └──(range ended)──> Exhausted    (NoData if no thickness produced a result)
//! ```
//!
//! A thickness where every combination fails is skipped (no result entry)
//! and scanning continues.
//!
//! In [`ExecutionMode::Parallel`] thicknesses are evaluated in ascending
//! batches as wide as the rayon pool. Only the rest of the batch holding the
//! design point is computed and discarded.
//!
//! ## Stepping
//!
//! `n = floor((max - min) / step + 1e-9) + 1` thicknesses,
//! `t_i = min + i * step`. Each value is computed from its index so round-off
//! does not accumulate; `min == max` gives exactly one thickness.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "property_id": 10,
//!   "materials": ["Aluminum 7075-T6", "Titanium Ti-6Al-4V"],
//!   "criteria": ["Von Mises", "Maximum Principal Stress"],
//!   "load_cases": [1, 2, 3],
//!   "thickness": { "min": 1.0, "max": 10.0, "step": 0.5 },
//!   "target_rf": 1.1
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sizer_core::criteria::FailureCriterion;
//! use sizer_core::materials::MaterialTable;
//! use sizer_core::model::{DesignProperty, LoadCaseId, Member, ModelSnapshot, PropertyKind, StressRow};
//! use sizer_core::sizing::{size, SizingRequest, SizingStatus, ThicknessRange};
//!
//! let model = ModelSnapshot::new()
//!     .with_property(DesignProperty::new(1, PropertyKind::Shell { thickness: 2.0 }))
//!     .with_member(Member::new(10, 1))
//!     .with_stress(LoadCaseId::Number(1), vec![StressRow::new(10, 150.0, 0.0, 0.0)]);
//! let table = MaterialTable::new().with_material("Plate", 300.0, 250.0, 2700.0);
//!
//! let request = SizingRequest::new(1)
//!     .with_materials(["Plate"])
//!     .with_criteria([FailureCriterion::VonMises])
//!     .with_load_cases([LoadCaseId::Number(1)])
//!     .with_thickness(ThicknessRange::new(1.0, 3.0, 0.5))
//!     .with_target_rf(1.1);
//!
//! let report = size(&model, &table, &request).unwrap();
//! assert_eq!(report.status, SizingStatus::Found);
//! // t = 1.0 gives RF 1.0, t = 1.5 gives RF 1.5
//! assert_eq!(report.design_point().unwrap().thickness, 1.5);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::criteria::FailureCriterion;
use crate::errors::{CalcResult, ErrorClass, SizingError};
use crate::materials::{AllowableMode, MaterialTable};
use crate::model::{LoadCaseId, MemberId, PropertyId, ResultFamily, StructuralModel};
use crate::reserve_factor::GoverningMetric;
use crate::search::{map_ordered, CombinationResult, ExecutionMode, PairSummary, SearchInput, SearchPlan};

/// Default target reserve factor
pub const DEFAULT_TARGET_RF: f64 = 1.1;

/// Slack absorbing round-off in the step count
const STEP_TOLERANCE: f64 = 1e-9;

/// Largest number of candidate thicknesses one scan may hold
pub const MAX_THICKNESS_COUNT: usize = 1_000_000;

fn default_target_rf() -> f64 {
    DEFAULT_TARGET_RF
}

/// Inclusive thickness range scanned by [`size`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThicknessRange {
    /// Thinnest candidate
    pub min: f64,
    /// Thickest candidate
    pub max: f64,
    /// Increment between candidates
    pub step: f64,
}

impl Default for ThicknessRange {
    fn default() -> Self {
        ThicknessRange {
            min: 1.0,
            max: 10.0,
            step: 0.5,
        }
    }
}

impl ThicknessRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        ThicknessRange { min, max, step }
    }

    /// Validate the range.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for non-finite values, `min <= 0`, `max < min`,
    /// `step <= 0`, or a range holding more than [`MAX_THICKNESS_COUNT`]
    /// thicknesses.
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("thickness.min", self.min), ("thickness.max", self.max), ("thickness.step", self.step)] {
            if !value.is_finite() {
                return Err(SizingError::invalid_input(field, value.to_string(), "Value must be finite"));
            }
        }
        if self.min <= 0.0 {
            return Err(SizingError::invalid_input(
                "thickness.min",
                self.min.to_string(),
                "Minimum thickness must be positive",
            ));
        }
        if self.max < self.min {
            return Err(SizingError::invalid_input(
                "thickness.max",
                self.max.to_string(),
                format!("Maximum thickness is below minimum {}", self.min),
            ));
        }
        if self.step <= 0.0 {
            return Err(SizingError::invalid_input(
                "thickness.step",
                self.step.to_string(),
                "Thickness step must be positive",
            ));
        }
        self.checked_count().map(|_| ())
    }

    /// Number of candidate thicknesses
    pub fn count(&self) -> CalcResult<usize> {
        self.validate()?;
        self.checked_count()
    }

    fn checked_count(&self) -> CalcResult<usize> {
        let intervals = ((self.max - self.min) / self.step + STEP_TOLERANCE).floor();
        let too_many = || {
            SizingError::invalid_input(
                "thickness.step",
                self.step.to_string(),
                format!("Range holds more than {} thicknesses", MAX_THICKNESS_COUNT),
            )
        };
        if !intervals.is_finite() || intervals >= MAX_THICKNESS_COUNT as f64 {
            return Err(too_many());
        }
        usize::try_from(intervals as u64)
            .ok()
            .and_then(|n| n.checked_add(1))
            .filter(|&n| n <= MAX_THICKNESS_COUNT)
            .ok_or_else(too_many)
    }

    /// Candidate thicknesses in ascending order
    pub fn values(&self) -> CalcResult<Vec<f64>> {
        let n = self.count()?;
        Ok((0..n).map(|i| self.min + i as f64 * self.step).collect())
    }
}

/// Everything [`size`] needs besides the model and material table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRequest {
    pub property_id: PropertyId,
    pub materials: Vec<String>,
    pub criteria: Vec<FailureCriterion>,
    /// Load cases to evaluate; must be non-empty when sizing
    #[serde(default)]
    pub load_cases: Vec<LoadCaseId>,
    #[serde(default)]
    pub thickness: ThicknessRange,
    #[serde(default = "default_target_rf")]
    pub target_rf: f64,
    #[serde(default)]
    pub allowable_mode: AllowableMode,
    #[serde(default)]
    pub metric: GoverningMetric,
    #[serde(default)]
    pub execution: ExecutionMode,
}

impl SizingRequest {
    /// Request with default range and target and no combinations yet
    pub fn new(property_id: PropertyId) -> Self {
        SizingRequest {
            property_id,
            materials: Vec::new(),
            criteria: Vec::new(),
            load_cases: Vec::new(),
            thickness: ThicknessRange::default(),
            target_rf: DEFAULT_TARGET_RF,
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

    /// Use every load case with stress results in the model
    pub fn with_all_stress_load_cases<M: StructuralModel + ?Sized>(mut self, model: &M) -> Self {
        self.load_cases = model.available_load_cases(ResultFamily::Stress);
        self
    }

    pub fn with_thickness(mut self, range: ThicknessRange) -> Self {
        self.thickness = range;
        self
    }

    pub fn with_target_rf(mut self, target_rf: f64) -> Self {
        self.target_rf = target_rf;
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

    /// The per-thickness search this request runs
    pub fn search_input(&self) -> SearchInput {
        SearchInput {
            property_id: self.property_id,
            materials: self.materials.clone(),
            criteria: self.criteria.clone(),
            load_cases: self.load_cases.clone(),
            allowable_mode: self.allowable_mode,
            metric: self.metric,
            execution: self.execution,
        }
    }

    /// Validate target, range and combination lists
    pub fn validate(&self) -> CalcResult<()> {
        if !self.target_rf.is_finite() || self.target_rf <= 0.0 {
            return Err(SizingError::invalid_input(
                "target_rf",
                self.target_rf.to_string(),
                "Target reserve factor must be positive",
            ));
        }
        self.thickness.validate()?;
        self.search_input().validate()
    }
}

/// Governing outcome at one analysed thickness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub thickness: f64,
    pub scale_factor: f64,
    pub min_rf: f64,
    pub mean_rf: f64,
    pub max_rf: f64,
    pub governing_material: String,
    pub governing_criterion: FailureCriterion,
    pub governing_load_case: LoadCaseId,
    pub governing_member_id: MemberId,
    pub max_comparison_stress: f64,
    /// Allowable of the governing material (MPa)
    pub allowable_mpa: f64,
    /// Members dropped while extracting the governing load case
    pub dropped_members: usize,
    /// Worst load case per (material, criterion)
    pub pair_summaries: Vec<PairSummary>,
}

impl SizingResult {
    /// Summarise a search by its governing entry
    pub fn from_combination(result: &CombinationResult) -> Self {
        let governing = result.governing();
        SizingResult {
            thickness: result.thickness,
            scale_factor: result.scale_factor,
            min_rf: governing.summary.min_rf,
            mean_rf: governing.summary.mean_rf,
            max_rf: governing.summary.max_rf,
            governing_material: governing.key.material.clone(),
            governing_criterion: governing.key.criterion,
            governing_load_case: governing.key.load_case.clone(),
            governing_member_id: governing.summary.governing_member_id,
            max_comparison_stress: governing.summary.max_comparison_stress,
            allowable_mpa: governing.allowable_mpa,
            dropped_members: governing.dropped_members,
            pair_summaries: result.pair_summaries(),
        }
    }

    /// Value of `metric` at this thickness
    pub fn metric_value(&self, metric: GoverningMetric) -> f64 {
        match metric {
            GoverningMetric::MinRf => self.min_rf,
            GoverningMetric::MeanRf => self.mean_rf,
        }
    }
}

/// Terminal state of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizingStatus {
    /// A thickness met the target; it is the last result
    Found,
    /// The range ended below target; the last result is the thickest analysed
    Exhausted,
    /// No thickness produced a result
    NoData,
}

/// A thickness skipped because no combination could be evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedThickness {
    pub thickness: f64,
    pub error: SizingError,
}

/// Outcome of [`size`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingReport {
    pub property_id: PropertyId,
    pub target_rf: f64,
    pub metric: GoverningMetric,
    pub status: SizingStatus,
    /// One entry per analysed thickness, ascending
    pub results: Vec<SizingResult>,
    pub skipped_thicknesses: Vec<SkippedThickness>,
}

impl SizingReport {
    /// Last appended result: the chosen thickness when `Found`, the thickest
    /// analysed when `Exhausted`
    pub fn design_point(&self) -> Option<&SizingResult> {
        self.results.last()
    }

    pub fn is_found(&self) -> bool {
        self.status == SizingStatus::Found
    }
}

/// Scan the thickness range until the target reserve factor is met.
///
/// # Errors
///
/// Configuration errors only (bad request, unknown property or material).
/// Per-combination and per-thickness failures are recorded in the report.
pub fn size<M>(model: &M, table: &MaterialTable, request: &SizingRequest) -> CalcResult<SizingReport>
where
    M: StructuralModel + ?Sized,
{
    request.validate()?;
    let thicknesses = request.thickness.values()?;
    let plan = SearchPlan::new(model, table, &request.search_input())?;

    info!(
        property_id = request.property_id,
        thicknesses = thicknesses.len(),
        combinations = plan.combination_count(),
        target_rf = request.target_rf,
        metric = %request.metric,
        reference_thickness = plan.reference_thickness(),
        "starting sizing scan"
    );

    match request.execution {
        ExecutionMode::Sequential => {
            let outcomes = thicknesses.iter().map(|&t| (t, plan.evaluate(t)));
            walk(request, outcomes)
        }
        ExecutionMode::Parallel => {
            // One batch per pool width; later batches are never evaluated once the walk stops
            let batch = rayon::current_num_threads().max(1);
            let outcomes = thicknesses
                .chunks(batch)
                .flat_map(|chunk| map_ordered(ExecutionMode::Parallel, chunk, |&t| (t, plan.evaluate(t))));
            walk(request, outcomes)
        }
    }
}

fn walk<I>(request: &SizingRequest, outcomes: I) -> CalcResult<SizingReport>
where
    I: IntoIterator<Item = (f64, CalcResult<CombinationResult>)>,
{
    let mut results = Vec::new();
    let mut skipped_thicknesses = Vec::new();
    let mut found = false;

    for (thickness, outcome) in outcomes {
        match outcome {
            Ok(combination) => {
                let value = combination.governing_value();
                let result = SizingResult::from_combination(&combination);
                info!(
                    thickness,
                    value,
                    material = %result.governing_material,
                    criterion = %result.governing_criterion,
                    load_case = %result.governing_load_case,
                    member = result.governing_member_id,
                    "thickness analysed"
                );
                results.push(result);
                if value >= request.target_rf {
                    found = true;
                    break;
                }
            }
            Err(error) if error.class() == ErrorClass::Thickness => {
                warn!(thickness, "skipping thickness: {}", error);
                skipped_thicknesses.push(SkippedThickness { thickness, error });
            }
            Err(error) => return Err(error),
        }
    }

    let status = if found {
        SizingStatus::Found
    } else if results.is_empty() {
        warn!(property_id = request.property_id, "no thickness produced a result");
        SizingStatus::NoData
    } else {
        warn!(
            property_id = request.property_id,
            target_rf = request.target_rf,
            max_thickness = request.thickness.max,
            "target reserve factor not reached in thickness range"
        );
        SizingStatus::Exhausted
    };

    if let (SizingStatus::Found, Some(point)) = (status, results.last()) {
        info!(
            thickness = point.thickness,
            min_rf = point.min_rf,
            "design point found"
        );
    }

    Ok(SizingReport {
        property_id: request.property_id,
        target_rf: request.target_rf,
        metric: request.metric,
        status,
        results,
        skipped_thicknesses,
    })
}

/// Size against one material and one criterion over every stress load case.
///
/// Kept for callers of the single-condition workflow; it runs the same scan
/// as [`size`].
pub fn size_single<M>(
    model: &M,
    table: &MaterialTable,
    property_id: PropertyId,
    material: &str,
    criterion: FailureCriterion,
    range: ThicknessRange,
    target_rf: f64,
) -> CalcResult<SizingReport>
where
    M: StructuralModel + ?Sized,
{
    let request = SizingRequest::new(property_id)
        .with_materials([material])
        .with_criteria([criterion])
        .with_all_stress_load_cases(model)
        .with_thickness(range)
        .with_target_rf(target_rf);
    size(model, table, &request)
}
