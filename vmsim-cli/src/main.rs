//! `vmsim`: the command-line front-end around the `vmsim` simulation core.
//!
//! Two subcommands: `run` executes one simulation and appends its
//! results to the shared report files, `batch` sweeps a list of
//! algorithm/seed pairs through the same engine configuration, appending
//! every run to the same files. Trace parsing, engine configuration
//! loading, report writing, and the beta-PERT sampler are out of scope
//! for `vmsim` itself and live in this crate.

mod config;
mod pert_sampler;
mod report;
mod trace_io;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::EngineConfigRaw;
use pert_sampler::BetaPertSampler;
use std::path::{Path, PathBuf};
use vmsim::{trace, Engine, EngineConfig, SimError, SimulationOutput};

#[derive(Parser)]
#[command(name = "vmsim", about = "VM co-residency placement simulator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and append its results to the report files.
    Run(RunArgs),
    /// Sweep a list of algorithm/seed pairs through one engine configuration.
    Batch(BatchArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Primary trace CSV (no header).
    #[arg(long)]
    trace: PathBuf,
    /// Engine configuration YAML; every field optional and defaulted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Placement algorithm tag (e.g. `first_fit`, `han`, `ldbr`).
    #[arg(long)]
    algorithm: String,
    /// Overrides the config file's seed, if any.
    #[arg(long)]
    seed: Option<u64>,
    /// Directory the report files are written into (created if absent).
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
    /// Tag recorded in the `maldata` column of every report row.
    #[arg(long, default_value = "default")]
    maldata: String,
}

#[derive(Parser)]
struct BatchArgs {
    #[arg(long)]
    trace: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Comma-separated algorithm tags to sweep.
    #[arg(long, value_delimiter = ',')]
    algorithms: Vec<String>,
    /// Comma-separated seeds to sweep; each algorithm runs once per seed.
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<u64>,
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
    #[arg(long, default_value = "default")]
    maldata: String,
}

/// Exit code 0 on success; 1 on malformed CLI; -1 (255) on semantic errors:
/// duplicate ids, unsupported LDBR configuration, unknown algorithm,
/// capacity exhaustion.
fn main() {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let result = match cli.command {
        Commands::Run(args) => run_one(&args),
        Commands::Batch(args) => run_batch(&args),
    };
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        let code = if e.downcast_ref::<SimError>().is_some() { -1i32 as u8 } else { 1 };
        std::process::exit(code as i32);
    }
}

fn run_one(args: &RunArgs) -> anyhow::Result<()> {
    let raw = load_config_raw(args.config.as_deref())?;
    let seed = args.seed.or(raw.seed).unwrap_or_else(rand::random);
    let config = raw.clone().into_engine_config();

    log::info!(
        "loading trace {} (window [{}, {}])",
        args.trace.display(),
        config.min_time,
        config.max_time
    );
    let mut records = trace_io::load_trace(&args.trace, config.min_time, config.max_time)
        .with_context(|| format!("loading trace {}", args.trace.display()))?;

    let forced = config::load_forced_malicious_subscriptions(&raw.malicious_subscription_files())
        .context("loading malicious_subscription_files")?;

    let output = simulate(&mut records, &config, &args.algorithm, seed, &forced, raw.replacement_id())?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;
    write_reports(&args.out_dir, &args.algorithm, seed, &args.maldata, &output)?;

    log::info!(
        "run complete: algorithm={} seed={} core_utilization={}",
        args.algorithm,
        seed,
        output.summary.core_utilization
    );
    Ok(())
}

fn run_batch(args: &BatchArgs) -> anyhow::Result<()> {
    let raw = load_config_raw(args.config.as_deref())?;
    let config = raw.clone().into_engine_config();
    let forced = config::load_forced_malicious_subscriptions(&raw.malicious_subscription_files())
        .context("loading malicious_subscription_files")?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let base_records = trace_io::load_trace(&args.trace, config.min_time, config.max_time)
        .with_context(|| format!("loading trace {}", args.trace.display()))?;

    let seeds: Vec<u64> = if args.seeds.is_empty() {
        vec![raw.seed.unwrap_or_else(rand::random)]
    } else {
        args.seeds.clone()
    };

    for algorithm in &args.algorithms {
        for &seed in &seeds {
            let mut records = base_records.clone();
            log::info!("batch run: algorithm={algorithm} seed={seed}");
            let output = simulate(&mut records, &config, algorithm, seed, &forced, raw.replacement_id())?;
            write_reports(&args.out_dir, algorithm, seed, &args.maldata, &output)?;
        }
    }
    Ok(())
}

fn load_config_raw(path: Option<&Path>) -> anyhow::Result<EngineConfigRaw> {
    match path {
        Some(path) => EngineConfigRaw::from_file(path),
        None => Ok(EngineConfigRaw::default()),
    }
}

/// Sorts/classifies/rewrites `records` and runs one simulation, wiring the
/// three independent RNG streams: the malicious-labelling source from
/// `seed` directly, the engine's placement stream from `seed + 1`, and
/// LDBR's beta stream from `seed + 2`.
fn simulate(
    records: &mut Vec<trace::VmRecord>,
    config: &EngineConfig,
    algorithm: &str,
    seed: u64,
    forced_malicious: &std::collections::HashSet<String>,
    replacement_id: Option<&str>,
) -> anyhow::Result<SimulationOutput> {
    let (by_creation, _) = trace::sort_streams(records);
    let subscription_order = trace::first_seen_subscription_order(records, &by_creation);
    let malicious_by_subscription = trace::classify_malicious(
        &subscription_order,
        &config.malicious_proportions,
        forced_malicious,
        seed,
    );

    if let Some(replacement) = replacement_id {
        trace::apply_subscription_rewrite(records, &malicious_by_subscription, replacement);
    }

    let pert_sampler: Option<Box<dyn vmsim::pert::PertSampler>> = if algorithm == "ldbr" {
        Some(Box::new(BetaPertSampler::new(seed.wrapping_add(2))))
    } else {
        None
    };
    let policy = vmsim::placement::build(algorithm, config, pert_sampler).map_err(anyhow::Error::from)?;

    let mut engine = Engine::new(config.clone(), policy, seed);
    engine
        .run(records, &malicious_by_subscription)
        .map_err(anyhow::Error::from)
        .context("running simulation")
}

fn write_reports(
    out_dir: &Path,
    algorithm: &str,
    seed: u64,
    maldata: &str,
    output: &SimulationOutput,
) -> anyhow::Result<()> {
    report::write_summary(&out_dir.join("summary.csv"), algorithm, seed, maldata, output)?;
    report::write_metric_series(&out_dir.join("core_utilization.csv"), seed, maldata, &output.interval_series, |p| {
        p.core_utilization.to_string()
    })?;
    report::write_metric_series(&out_dir.join("active_hosts.csv"), seed, maldata, &output.interval_series, |p| {
        p.active_hosts.to_string()
    })?;
    report::write_metric_series(&out_dir.join("active_vms.csv"), seed, maldata, &output.interval_series, |p| {
        p.active_vms.to_string()
    })?;

    if output.vms_with_targets > 0 {
        report::write_target_summary(&out_dir.join("target.csv"), seed, maldata, output)?;
        let run_dir = out_dir.join(format!("{algorithm}-{seed}-{maldata}"));
        std::fs::create_dir_all(&run_dir)?;
        report::write_hits(&run_dir.join("hits.csv"), &output.hits)?;
    }
    report::write_malevents(
        &out_dir.join(format!("{algorithm}-{seed}-{maldata}-malevents.csv")),
        &output.malicious_events,
    )?;
    Ok(())
}
