//! `vmsim-workload-gen`: synthesizes a malicious subscription's attacker
//! trace against a benign background trace.
//!
//! Out of scope for the `vmsim` simulation core itself. Reads a background
//! CSV trace, picks `count` benign VMs active during `[window_start,
//! window_end)` as targets (uniformly at random), and emits a CSV fragment
//! of attacker VMs in the same row schema `vmsim-cli` consumes, each with
//! `target_vm_id` set to its chosen target. Feeding the emitted fragment
//! (concatenated with the background trace) into `vmsim-cli run` exercises
//! the engine's target-hit bookkeeping.

use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vmsim-workload-gen",
    about = "Synthesizes an attacker trace fragment against a benign background trace",
    version
)]
struct Cli {
    /// Background trace CSV to pick targets from.
    #[arg(long)]
    background_trace: PathBuf,
    /// Number of attacker VMs to synthesize, one target each.
    #[arg(long, default_value_t = 10)]
    count: usize,
    /// Subscription id every synthesized attacker VM belongs to.
    #[arg(long, default_value = "attacker")]
    subscription_id: String,
    /// Only benign VMs active at some point in this window are eligible
    /// targets.
    #[arg(long, default_value_t = i64::MIN)]
    window_start: i64,
    #[arg(long, default_value_t = i64::MAX)]
    window_end: i64,
    /// Lifetime (in trace time units) of each attacker VM, starting at the
    /// target's own `time_created`.
    #[arg(long, default_value_t = 3600)]
    attacker_duration: i64,
    #[arg(long, default_value_t = 1)]
    cores: i64,
    #[arg(long, default_value_t = 1.0)]
    memory: f64,
    #[arg(long)]
    seed: Option<u64>,
    /// Output CSV path for the attacker fragment.
    #[arg(long)]
    out: PathBuf,
}

/// A background trace row, parsed just enough to find targets: everything
/// beyond id/subscription/lifetime is carried as an opaque string so the
/// row can be skipped without fully understanding it.
#[derive(Debug, Clone, serde::Deserialize)]
struct RawRow {
    vm_id: String,
    subscription_id: String,
    _deployment_id: String,
    time_created: i64,
    time_deleted: i64,
    _max_cpu: String,
    _avg_cpu: String,
    _p95_cpu: String,
    _category: String,
    cores: String,
    memory: String,
}

#[derive(Debug, Clone, serde::Serialize)]
struct AttackerRow {
    vm_id: String,
    subscription_id: String,
    deployment_id: String,
    time_created: i64,
    time_deleted: i64,
    max_cpu: String,
    avg_cpu: String,
    p95_cpu: String,
    category: String,
    cores: i64,
    memory: f64,
    target_vm_id: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let targets = load_candidate_targets(&cli.background_trace, cli.window_start, cli.window_end)?;
    if targets.is_empty() {
        anyhow::bail!(
            "no benign VM in {} overlaps the window [{}, {})",
            cli.background_trace.display(),
            cli.window_start,
            cli.window_end
        );
    }
    log::info!("{} candidate targets found in window", targets.len());

    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&cli.out)?;

    for i in 0..cli.count {
        let target = targets.iter().choose(&mut rng).expect("targets is non-empty");
        let time_created = target.time_created.max(cli.window_start);
        let row = AttackerRow {
            vm_id: format!("attacker-{i}"),
            subscription_id: cli.subscription_id.clone(),
            deployment_id: String::new(),
            time_created,
            time_deleted: time_created + cli.attacker_duration,
            max_cpu: String::new(),
            avg_cpu: String::new(),
            p95_cpu: String::new(),
            category: "attacker".to_string(),
            cores: cli.cores,
            memory: cli.memory,
            target_vm_id: target.vm_id.clone(),
        };
        writer.serialize(&row)?;
    }
    writer.flush()?;
    log::info!("wrote {} attacker VMs to {}", cli.count, cli.out.display());
    Ok(())
}

/// Benign VMs (any subscription other than `cli.subscription_id`'s own, in
/// practice just "every VM in the background trace") whose lifetime
/// overlaps `[window_start, window_end)`.
fn load_candidate_targets(path: &std::path::Path, window_start: i64, window_end: i64) -> anyhow::Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut candidates = Vec::new();
    for result in reader.deserialize() {
        let row: RawRow = result?;
        if row.cores.contains('>') || row.memory.contains('>') {
            continue;
        }
        if row.time_created >= window_end || row.time_deleted <= window_start {
            continue;
        }
        candidates.push(row);
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(contents: &str) -> PathBuf {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("vmsim-workload-gen-test-{}-{n}.csv", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn finds_only_vms_overlapping_the_window() {
        let path = temp_csv("v1,s1,d,0,10,,,,c,1,1\nv2,s2,d,20,30,,,,c,1,1\n");
        let candidates = load_candidate_targets(&path, 5, 15).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].vm_id, "v1");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn skips_greater_than_tokened_rows() {
        let path = temp_csv("v1,s1,d,0,10,,,,c,>1,1\n");
        let candidates = load_candidate_targets(&path, 0, 10).unwrap();
        assert!(candidates.is_empty());
        let _ = std::fs::remove_file(&path);
    }
}
