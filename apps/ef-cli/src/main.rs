mod error;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use ef_model::{Compartment, Control};
use ef_project::{Scenario, ScenarioSetup};
use ef_sim::{control_sweep, run_sweep};
use ef_solver::Method;
use error::{CliError, CliResult};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ef-cli")]
#[command(about = "EpiFlow CLI - Compartmental epidemic simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Run a scenario and print the trajectory
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: Option<PathBuf>,
        /// Run a built-in scenario instead of a file
        #[arg(long, conflicts_with = "scenario_path")]
        preset: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Override the solver method (rk45, bdf, lsoda)
        #[arg(long)]
        method: Option<Method>,
    },
    /// Print a built-in scenario as YAML
    Preset {
        /// One of: basic, extended, controlled
        name: String,
    },
    /// Vary one intervention coefficient and report the infectious peak
    Sweep {
        /// Path to a controlled scenario file
        scenario_path: Option<PathBuf>,
        /// Use a built-in scenario instead of a file
        #[arg(long, conflicts_with = "scenario_path")]
        preset: Option<String>,
        /// Coefficient to vary (contact_tracing, quarantine, mask_wearing, vaccination)
        #[arg(long)]
        control: Control,
        /// Comma-separated values in [0, 1]
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            preset,
            format,
            method,
        } => cmd_run(scenario_path.as_deref(), preset.as_deref(), format, method),
        Commands::Preset { name } => cmd_preset(&name),
        Commands::Sweep {
            scenario_path,
            preset,
            control,
            values,
        } => cmd_sweep(scenario_path.as_deref(), preset.as_deref(), control, &values),
    }
}

fn resolve(path: Option<&Path>, preset: Option<&str>) -> CliResult<Scenario> {
    match (path, preset) {
        (Some(path), None) => Ok(ef_project::load(path)?),
        (None, Some(name)) => Ok(ef_project::preset(name)?),
        _ => Err(CliError::BadArgs {
            what: "give either a scenario file or --preset".to_string(),
        }),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    let scenario = ef_project::load(scenario_path)?;
    scenario.build()?;
    println!(
        "✓ Scenario '{}' is valid ({} variant, {} points)",
        scenario.name, scenario.variant, scenario.time.points
    );
    Ok(())
}

fn cmd_run(
    path: Option<&Path>,
    preset: Option<&str>,
    format: Format,
    method: Option<Method>,
) -> CliResult<()> {
    let scenario = resolve(path, preset)?;
    let mut setup: ScenarioSetup = scenario.build()?;
    if let Some(method) = method {
        setup.options.method = method;
    }

    tracing::info!(scenario = %setup.name, method = %setup.options.method, "running scenario");
    let trajectory = setup.run()?;

    match format {
        Format::Csv => print!("{}", output::to_csv(&trajectory)),
        Format::Json => println!(
            "{}",
            output::to_json(&setup.name, setup.options.method, &trajectory)?
        ),
    }
    Ok(())
}

fn cmd_preset(name: &str) -> CliResult<()> {
    let scenario = ef_project::preset(name)?;
    print!("{}", serde_yaml::to_string(&scenario)?);
    Ok(())
}

fn cmd_sweep(
    path: Option<&Path>,
    preset: Option<&str>,
    control: Control,
    values: &[f64],
) -> CliResult<()> {
    let setup = resolve(path, preset)?.build()?;
    let cases = control_sweep(&setup.sweep_case(), control, values)?;
    let results = run_sweep(&cases);

    println!("{control},peak_infectious,peak_day");
    for (value, result) in values.iter().zip(results) {
        let trajectory = result?;
        let (day, peak) = trajectory
            .peak(Compartment::Infectious)
            .ok_or_else(|| CliError::BadArgs {
                what: "trajectory has no infectious compartment".to_string(),
            })?;
        println!("{value},{peak},{day}");
    }
    Ok(())
}
