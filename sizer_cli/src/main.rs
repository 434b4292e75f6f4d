//! # sizer CLI
//!
//! Command-line front end for `sizer_core`. Reads a JSON model snapshot,
//! scans a thickness range for one design property and prints the governing
//! combination at each thickness.
//!
//! ```text
//! sizer size --model wing.json --property 10 \
//!     --material "Aluminum 7075-T6" --material "Titanium Ti-6Al-4V" \
//!     --criterion "Von Mises" --t-min 1 --t-max 6 --t-step 0.25
//! sizer size --model wing.json --request request.json --json
//! sizer materials
//! sizer load-cases --model wing.json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the filter.

mod io;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sizer_core::criteria::FailureCriterion;
use sizer_core::materials::{AllowableMode, MaterialTable};
use sizer_core::model::{LoadCaseId, ModelSnapshot, ResultFamily, StructuralModel};
use sizer_core::reserve_factor::GoverningMetric;
use sizer_core::search::ExecutionMode;
use sizer_core::sizing::{size, SizingRequest, SizingStatus, ThicknessRange, DEFAULT_TARGET_RF};

#[derive(Parser, Debug)]
#[command(name = "sizer", version, about = "Reserve-factor thickness sizing from FE results")]
struct Cli {
    /// JSON material table merged over the built-in materials
    #[arg(long, global = true, value_name = "TABLE.json")]
    materials: Option<PathBuf>,

    /// Log debug detail for every evaluated combination
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a thickness range for the first thickness meeting the target RF
    Size(SizeArgs),
    /// List available materials and their allowables
    Materials {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the load cases present in a model, per result family
    LoadCases {
        /// Model snapshot (JSON)
        #[arg(long)]
        model: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct SizeArgs {
    /// Model snapshot (JSON)
    #[arg(long)]
    model: PathBuf,

    /// Sizing request (JSON); replaces the combination and range flags
    #[arg(long, value_name = "REQUEST.json")]
    request: Option<PathBuf>,

    /// Design property to size
    #[arg(long, required_unless_present = "request")]
    property: Option<u32>,

    /// Material to evaluate (repeatable)
    #[arg(long = "material", value_name = "NAME")]
    material: Vec<String>,

    /// Failure criterion (repeatable, default "Von Mises")
    #[arg(long = "criterion", value_name = "NAME", value_parser = parse_criterion)]
    criterion: Vec<FailureCriterion>,

    /// Load case (repeatable, default every stress load case)
    #[arg(long = "load-case", value_name = "ID", value_parser = parse_load_case)]
    load_case: Vec<LoadCaseId>,

    #[arg(long, default_value_t = 1.0)]
    t_min: f64,

    #[arg(long, default_value_t = 10.0)]
    t_max: f64,

    #[arg(long, default_value_t = 0.5)]
    t_step: f64,

    #[arg(long, default_value_t = DEFAULT_TARGET_RF)]
    target_rf: f64,

    /// Governing metric: min_rf or mean_rf
    #[arg(long, default_value = "min_rf", value_parser = parse_metric)]
    metric: GoverningMetric,

    /// Allowable: ultimate or yield
    #[arg(long, default_value = "ultimate")]
    allowable: String,

    /// Evaluate one combination at a time
    #[arg(long)]
    sequential: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_criterion(s: &str) -> Result<FailureCriterion, String> {
    s.parse().map_err(|e: sizer_core::SizingError| e.to_string())
}

fn parse_load_case(s: &str) -> Result<LoadCaseId, String> {
    s.parse().map_err(|e: std::convert::Infallible| match e {})
}

fn parse_metric(s: &str) -> Result<GoverningMetric, String> {
    s.parse().map_err(|e: sizer_core::SizingError| e.to_string())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sizer_core=debug,sizer_cli=debug"
    } else {
        "sizer_core=info,sizer_cli=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_model(path: &Path) -> Result<ModelSnapshot> {
    let model: ModelSnapshot = io::load_json(path, "model")?;
    model
        .validate()
        .with_context(|| format!("model {} is inconsistent", path.display()))?;
    info!(
        properties = model.properties.len(),
        members = model.members.len(),
        "loaded model {}",
        path.display()
    );
    Ok(model)
}

fn load_materials(path: Option<&Path>) -> Result<MaterialTable> {
    let mut table = MaterialTable::builtin().clone();
    if let Some(path) = path {
        let extra: MaterialTable = io::load_json(path, "material table")?;
        extra
            .validate()
            .with_context(|| format!("material table {} is invalid", path.display()))?;
        table.merge(&extra);
    }
    Ok(table)
}

fn build_request(args: &SizeArgs, model: &ModelSnapshot) -> Result<SizingRequest> {
    let mut request = match (&args.request, args.property) {
        (Some(path), _) => io::load_json::<SizingRequest>(path, "request")?,
        (None, Some(property_id)) => {
            if args.material.is_empty() {
                bail!("at least one --material is required");
            }
            let criteria = if args.criterion.is_empty() {
                vec![FailureCriterion::VonMises]
            } else {
                args.criterion.clone()
            };
            SizingRequest::new(property_id)
                .with_materials(args.material.iter().cloned())
                .with_criteria(criteria)
                .with_load_cases(args.load_case.iter().cloned())
                .with_thickness(ThicknessRange::new(args.t_min, args.t_max, args.t_step))
                .with_target_rf(args.target_rf)
                .with_metric(args.metric)
                .with_allowable_mode(AllowableMode::parse_lenient(&args.allowable))
        }
        (None, None) => bail!("either --request or --property is required"),
    };

    if request.load_cases.is_empty() {
        request = request.with_all_stress_load_cases(model);
    }
    if args.sequential {
        request = request.with_execution(ExecutionMode::Sequential);
    }
    Ok(request)
}

fn run_size(args: &SizeArgs, table: &MaterialTable) -> Result<()> {
    let model = load_model(&args.model)?;
    let request = build_request(args, &model)?;

    let report = size(&model, table, &request).context("sizing failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_report(&report)?);
    }

    if report.status == SizingStatus::NoData {
        bail!(
            "no thickness of property {} could be evaluated ({} skipped)",
            report.property_id,
            report.skipped_thicknesses.len()
        );
    }
    Ok(())
}

fn run_load_cases(model_path: &Path, json: bool) -> Result<()> {
    let model = load_model(model_path)?;
    if json {
        let mut listing = serde_json::Map::new();
        for family in ResultFamily::ALL {
            listing.insert(
                family.name().to_string(),
                serde_json::to_value(model.available_load_cases(family))?,
            );
        }
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", report::render_load_cases(&model)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let table = load_materials(cli.materials.as_deref())?;

    match &cli.command {
        Commands::Size(args) => run_size(args, &table),
        Commands::Materials { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print!("{}", report::render_materials(&table)?);
            }
            Ok(())
        }
        Commands::LoadCases { model, json } => run_load_cases(model, *json),
    }
}
