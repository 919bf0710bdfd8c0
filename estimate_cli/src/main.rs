//! # Costline CLI
//!
//! Command-line front door for the estimation pipeline.
//!
//! ```text
//! estimate run --input project.json --format html --output report.html
//! estimate quick --building-type wood_frame_house --area 200 --quality economic
//! estimate types --area-unit sqft
//! estimate prices
//! ```

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, warn};

use estimate_core::config::Settings;
use estimate_core::file_io::{load_project_input, save_report};
use estimate_core::materials::ReferenceData;
use estimate_core::pipeline::{run, PipelineOutcome};
use estimate_core::project::{ProjectInput, DEFAULT_BUILDING_TYPE};
use estimate_core::report::Report;
use estimate_core::units::AreaUnit;

#[derive(Parser)]
#[command(name = "estimate")]
#[command(author, version, about = "Construction material quantity and cost estimates")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file (default: ./estimate.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with materials_<unit>.json / prices_<unit>.json overrides
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a project described in a JSON file
    Run {
        /// Project input JSON
        #[arg(long, short = 'i')]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Estimate a project from command-line flags
    Quick {
        #[arg(long, default_value = DEFAULT_BUILDING_TYPE)]
        building_type: String,

        /// Floor area
        #[arg(long)]
        area: f64,

        /// Area unit (m2, sqft, ft2)
        #[arg(long)]
        area_unit: Option<String>,

        /// Quality level (economic, standard, luxury)
        #[arg(long)]
        quality: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List building types with coefficient data
    Types {
        /// Area unit (default: configured area unit)
        #[arg(long)]
        area_unit: Option<String>,
    },

    /// List the material price table
    Prices {
        /// Area unit (default: configured area unit)
        #[arg(long)]
        area_unit: Option<String>,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Report format (json, html, pdf)
    #[arg(long)]
    format: Option<String>,

    /// Write the report here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Number of ranked cost items
    #[arg(long)]
    top_n: Option<usize>,

    /// Currency code for document reports
    #[arg(long)]
    currency: Option<String>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = Some(dir);
    }

    let loaded;
    let data: &ReferenceData = match &settings.data_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "loading reference data");
            loaded = ReferenceData::load_from_dir(dir);
            &loaded
        }
        None => ReferenceData::builtin(),
    };

    match cli.command {
        Commands::Run { input, output } => {
            let project = load_project_input(&input)
                .with_context(|| format!("Failed to load project input {}", input.display()))?;
            estimate(project, data, settings, output)
        }
        Commands::Quick {
            building_type,
            area,
            area_unit,
            quality,
            title,
            output,
        } => {
            let mut project = ProjectInput::new(building_type, area);
            project.area_unit = area_unit;
            project.quality_level = quality;
            project.title = title;
            estimate(project, data, settings, output)
        }
        Commands::Types { area_unit } => {
            let unit = table_unit(area_unit.as_deref(), &settings);
            let coefficients = data.coefficients(unit);
            if coefficients.is_empty() {
                warn!(%unit, "no building types available");
            }
            for building_type in coefficients.building_types() {
                let count = coefficients.get(building_type).map(|b| b.materials.len()).unwrap_or(0);
                println!("{:<28} {:>3} materials", building_type, count);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Prices { area_unit } => {
            let unit = table_unit(area_unit.as_deref(), &settings);
            for price in data.prices(unit).iter() {
                let priced_unit = price.unit.as_ref().map(|u| u.to_string()).unwrap_or_default();
                println!(
                    "{:<22} {:>10.2} {:<6} {}",
                    price.name, price.unit_price, priced_unit, price.description
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Unit system for the listing commands: the flag, else settings
fn table_unit(flag: Option<&str>, settings: &Settings) -> AreaUnit {
    flag.map(AreaUnit::parse_lenient).unwrap_or(settings.default_area_unit)
}

fn estimate(mut project: ProjectInput, data: &ReferenceData, mut settings: Settings, args: OutputArgs) -> Result<ExitCode> {
    if let Some(format) = args.format {
        project.report_format = Some(format);
    }
    if let Some(currency) = args.currency {
        project.currency = Some(currency);
    }
    if let Some(top_n) = args.top_n {
        settings.top_n = top_n;
    }

    let wants_pdf = project.report_format_or(&settings.default_report_format) == "pdf";
    if wants_pdf && args.output.is_none() {
        bail!("PDF reports need an output path (--output report.pdf)");
    }

    match run(&project, data, &settings) {
        PipelineOutcome::Success { report } => {
            emit(&report, args.output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        failure => {
            if let Some(body) = failure.failure_json() {
                eprintln!("{}", serde_json::to_string_pretty(&body)?);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn emit(report: &Report, output: Option<&Path>) -> Result<()> {
    if let Report::Unsupported { error } = report {
        warn!(%error, "report not rendered");
    }

    match output {
        Some(path) => {
            save_report(report, path).with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => {
            let bytes = report.to_bytes().context("Failed to serialize report")?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
    }
    Ok(())
}
