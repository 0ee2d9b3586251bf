//! CSV report writing: a shared, append-only summary file, one
//! append-only file per time-series metric, and one target/hits/malevents
//! file per run.

use std::fs::OpenOptions;
use std::path::Path;
use vmsim::{Hit, IntervalPoint, MaliciousEvent, SimulationOutput};

/// Opens `path` for appending, writing `header` first only if the file is
/// new or empty, the "header on first write" rule shared by every output
/// file.
fn append_writer(path: &Path, header: &[String]) -> anyhow::Result<csv::Writer<std::fs::File>> {
    let needs_header = !path.exists() || path.metadata().map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(file);
    if needs_header {
        writer.write_record(header)?;
    }
    Ok(writer)
}

/// One row of the shared summary file: algorithm/seed/maldata tags, the
/// run-wide counters, then per-malicious-set CLR/safe-time/coverage
/// columns flattened in malicious-set order.
pub fn write_summary(
    path: &Path,
    algorithm: &str,
    seed: u64,
    maldata: &str,
    output: &SimulationOutput,
) -> anyhow::Result<()> {
    let mut header: Vec<String> = [
        "algorithm",
        "seed",
        "maldata",
        "core_utilization",
        "avg_active_hosts",
        "max_active_hosts",
        "host_boots",
        "host_shutdowns",
        "vm_creations",
        "avg_active_vms",
        "max_active_vms",
        "avg_seen_subs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for i in 0..output.summary.per_malicious_set.len() {
        header.push(format!("user_clr_{i}"));
        header.push(format!("vm_clr_{i}"));
        header.push(format!("unsafe_sub_vm_clr_{i}"));
        header.push(format!("safe_vm_time_{i}"));
        header.push(format!("unsafe_sub_safe_vm_time_{i}"));
        header.push(format!("safe_sub_time_{i}"));
        header.push(format!("coverage_{i}"));
    }
    let mut writer = append_writer(path, &header)?;

    let s = &output.summary;
    let mut row = vec![
        algorithm.to_string(),
        seed.to_string(),
        maldata.to_string(),
        s.core_utilization.to_string(),
        s.avg_active_hosts.to_string(),
        s.max_active_hosts.to_string(),
        s.host_boots.to_string(),
        s.host_shutdowns.to_string(),
        s.vm_creations.to_string(),
        s.avg_active_vms.to_string(),
        s.max_active_vms.to_string(),
        s.avg_seen_subs.to_string(),
    ];
    for set in &s.per_malicious_set {
        row.push(set.clr.user_clr.to_string());
        row.push(set.clr.vm_clr.to_string());
        row.push(set.clr.unsafe_sub_vm_clr.to_string());
        row.push(set.safe_time.safe_vm_time.to_string());
        row.push(set.safe_time.unsafe_sub_safe_vm_time.to_string());
        row.push(set.safe_time.safe_sub_time.to_string());
        row.push(set.coverage.to_string());
    }
    writer.write_record(&row)?;
    writer.flush()?;
    Ok(())
}

/// One per-metric time-series file: header `seed;maldata;t_1;...;t_k`,
/// one row per run. `extract` pulls the metric's string value out of
/// each interval point.
pub fn write_metric_series(
    path: &Path,
    seed: u64,
    maldata: &str,
    interval_series: &[IntervalPoint],
    extract: impl Fn(&IntervalPoint) -> String,
) -> anyhow::Result<()> {
    let mut header = vec!["seed".to_string(), "maldata".to_string()];
    header.extend(interval_series.iter().map(|p| format!("t_{}", p.t)));
    let mut writer = append_writer(path, &header)?;

    let mut row = vec![seed.to_string(), maldata.to_string()];
    row.extend(interval_series.iter().map(extract));
    writer.write_record(&row)?;
    writer.flush()?;
    Ok(())
}

/// `target.csv`: one row per run recording how many VMs in the trace named
/// a target.
pub fn write_target_summary(path: &Path, seed: u64, maldata: &str, output: &SimulationOutput) -> anyhow::Result<()> {
    let header = ["seed", "maldata", "vms_with_targets", "hits"].map(String::from);
    let mut writer = append_writer(path, &header)?;
    writer.write_record(&[
        seed.to_string(),
        maldata.to_string(),
        output.vms_with_targets.to_string(),
        output.hits.len().to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// `hits.csv`, written fresh per run at `path` (not appended): every landed
/// attack.
pub fn write_hits(path: &Path, hits: &[Hit]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(["attacker_vm", "attacker_subscription", "target_vm", "target_subscription", "time"])?;
    for hit in hits {
        writer.write_record(&[
            hit.attacker_vm.clone(),
            hit.attacker_subscription.clone(),
            hit.target_vm.clone(),
            hit.target_subscription.clone(),
            hit.time.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// `malevents.csv`, written fresh per run at `path`: every closed malicious
/// period, per host per malicious set.
pub fn write_malevents(path: &Path, events: &[MaliciousEvent]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(["host", "malicious_set", "start", "end"])?;
    for event in events {
        writer.write_record(&[
            event.host.to_string(),
            event.malicious_set.to_string(),
            event.start.to_string(),
            event.end.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
