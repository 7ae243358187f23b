use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use log::{LevelFilter, info, warn};
use mga_fidelity::compare::facade::report::to_export;
use mga_fidelity::compare::facade::scenario::{run_scenario, scenario_bodies};
use mga_fidelity::config::load_scenario;
use mga_fidelity::export::residuals::{write_json, write_table};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compare patched-conic MGA legs against full point-mass propagation"
)]
struct Cli {
    /// Scenario file (YAML or TOML)
    #[arg(long)]
    scenario: PathBuf,

    /// Body catalog overriding the scenario's `body_catalog`
    #[arg(long)]
    bodies: Option<PathBuf>,

    /// Output format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Propagate legs one after another instead of in parallel
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Exit with an error when any evaluation leg fails
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut scenario = load_scenario(&cli.scenario)
        .with_context(|| format!("loading scenario {}", cli.scenario.display()))?;
    if cli.sequential {
        scenario.comparison.parallel = false;
    }
    let bodies = scenario_bodies(&scenario, cli.bodies.as_deref())?;
    info!("body environment: {}", bodies.names().collect::<Vec<_>>().join(", "));

    let report = run_scenario(&scenario, &bodies)
        .with_context(|| format!("running scenario `{}`", scenario.name))?;
    let export = to_export(&scenario.name, &report);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Table => write_table(&mut out, &export)?,
        OutputFormat::Json => write_json(&mut out, &export)?,
    }
    out.flush()?;

    let failures = report.failures();
    if !failures.is_empty() {
        warn!(
            "{} of {} evaluation legs failed",
            failures.len(),
            report.outcomes.len()
        );
        if cli.strict {
            anyhow::bail!(
                "{} of {} evaluation legs failed (strict mode)",
                failures.len(),
                report.outcomes.len()
            );
        }
    }
    Ok(())
}

fn init_logging(verbosity: u8) {
    if std::env::var_os("RUST_LOG").is_some() {
        pretty_env_logger::init();
        return;
    }
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .init();
}
