//! CSV trace loading. Out of scope for `vmsim` itself; this is the one
//! place a raw CSV row becomes a typed [`VmRecord`].

use std::path::Path;
use vmsim::trace::VmRecord;

/// One row of the public dataset's CSV schema, no header, `cores`/`memory`
/// carried as strings so `>`-tokened rows can be detected before parsing.
#[derive(Debug, serde::Deserialize)]
struct RawRow {
    vm_id: String,
    subscription_id: String,
    _deployment_id: String,
    time_created: i64,
    time_deleted: i64,
    _max_cpu: String,
    _avg_cpu: String,
    _p95_cpu: String,
    category: String,
    cores: String,
    memory: String,
    target_vm_id: Option<String>,
}

/// Loads `path`, skipping `>`-tokened rows and rows outside
/// `[min_time, max_time]`. Used for the primary trace.
pub fn load_trace(path: &Path, min_time: i64, max_time: i64) -> anyhow::Result<Vec<VmRecord>> {
    let mut records = Vec::new();
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    for result in reader.deserialize() {
        let row: RawRow = result?;
        let Some(record) = parse_row(row) else {
            continue;
        };
        if record.time_created < min_time || record.time_deleted > max_time {
            log::debug!("skipping vm {} outside simulation window", record.vm_id);
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

/// Loads `path` with no window filtering, for `malicious_subscription_files`
/// where only the `vm_id -> subscription_id` mapping matters.
pub fn load_trace_unfiltered(path: &Path) -> anyhow::Result<Vec<VmRecord>> {
    let mut records = Vec::new();
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    for result in reader.deserialize() {
        let row: RawRow = result?;
        if let Some(record) = parse_row(row) {
            records.push(record);
        }
    }
    Ok(records)
}

fn parse_row(row: RawRow) -> Option<VmRecord> {
    if row.cores.contains('>') || row.memory.contains('>') {
        log::debug!("skipping vm {} with a `>`-tokened resource field", row.vm_id);
        return None;
    }
    let cores: i64 = row.cores.trim().parse().ok()?;
    let memory: f64 = row.memory.trim().parse().ok()?;
    Some(VmRecord {
        vm_id: row.vm_id,
        subscription_id: row.subscription_id,
        time_created: row.time_created,
        time_deleted: row.time_deleted,
        cores,
        memory,
        category: row.category,
        target_vm_id: row.target_vm_id.filter(|s| !s.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct TempCsv(std::path::PathBuf);

    impl TempCsv {
        fn new(contents: &str) -> Self {
            use std::sync::atomic::{AtomicU64, Ordering};
            static COUNTER: AtomicU64 = AtomicU64::new(0);
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!("vmsim-trace-test-{}-{n}.csv", std::process::id()));
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            TempCsv(path)
        }
    }

    impl Drop for TempCsv {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn skips_greater_than_tokened_rows() {
        let csv = "v1,s1,d,0,10,1,1,1,c,2,4,\nv2,s2,d,0,10,1,1,1,c,>2,4,\n";
        let t = TempCsv::new(csv);
        let records = load_trace(&t.0, 0, 100).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vm_id, "v1");
    }

    #[test]
    fn skips_rows_outside_window() {
        let csv = "v1,s1,d,0,10,1,1,1,c,2,4,\nv2,s2,d,5,200,1,1,1,c,2,4,\n";
        let t = TempCsv::new(csv);
        let records = load_trace(&t.0, 0, 100).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vm_id, "v1");
    }

    #[test]
    fn parses_optional_target_vm_id() {
        let csv = "v1,s1,d,0,10,1,1,1,c,2,4,v0\n";
        let t = TempCsv::new(csv);
        let records = load_trace(&t.0, 0, 100).unwrap();
        assert_eq!(records[0].target_vm_id.as_deref(), Some("v0"));
    }
}
