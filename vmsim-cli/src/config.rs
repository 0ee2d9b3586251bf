//! Engine configuration loading: every field optional and defaulted, the
//! same raw-then-merge style as the `dslab-iaas` reference example's
//! `SimulationConfigRaw`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use vmsim::EngineConfig;

/// Every field mirrors [`EngineConfig`], but optional, so a YAML file only
/// needs to set what an experiment varies; anything absent falls back to
/// [`EngineConfig::default`].
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct EngineConfigRaw {
    pub num_hosts: Option<usize>,
    pub active_hosts: Option<usize>,
    pub cores_per_host: Option<i64>,
    pub memory_per_host: Option<f64>,
    pub min_time: Option<i64>,
    pub max_time: Option<i64>,
    pub stat_interval: Option<i64>,
    pub stat_min_time: Option<i64>,
    pub malicious_proportions: Option<Vec<f64>>,
    /// Additional trace files whose subscriptions are forced malicious in
    /// every configured set.
    pub malicious_subscription_files: Option<Vec<String>>,
    /// Rewrite every loaded malicious VM's subscription id to this synthetic
    /// id, applied after sorting.
    pub replace_malicious_subscription_id: Option<String>,
    pub n_star: Option<u32>,
    pub max_cores: Option<i64>,
    pub max_memory: Option<f64>,
    pub pert_mode: Option<f64>,
    pub pert_lambda: Option<f64>,
    pub known_proportion_subscription_based: Option<bool>,
    pub known_proportion_lowest_avg_seen_for_new_subs: Option<bool>,
    pub seed: Option<u64>,
}

impl EngineConfigRaw {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
        let raw: EngineConfigRaw = serde_yaml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("parsing config file {}: {e}", path.display()))?;
        Ok(raw)
    }

    /// Merge onto [`EngineConfig::default`], field by field.
    pub fn into_engine_config(self) -> EngineConfig {
        let default = EngineConfig::default();
        let min_time = self.min_time.unwrap_or(default.min_time);
        EngineConfig {
            num_hosts: self.num_hosts.unwrap_or(default.num_hosts),
            active_hosts: self.active_hosts.unwrap_or(default.active_hosts),
            cores_per_host: self.cores_per_host.unwrap_or(default.cores_per_host),
            memory_per_host: self.memory_per_host.unwrap_or(default.memory_per_host),
            min_time,
            max_time: self.max_time.unwrap_or(default.max_time),
            stat_interval: self.stat_interval.unwrap_or(default.stat_interval),
            // Defaults to min_time, not to the engine's own zero default, so
            // an overridden min_time still lines up the first statistics
            // tick correctly.
            stat_min_time: self.stat_min_time.unwrap_or(min_time),
            malicious_proportions: self.malicious_proportions.unwrap_or(default.malicious_proportions),
            n_star: self.n_star.unwrap_or(default.n_star),
            max_cores: self.max_cores.unwrap_or(default.max_cores),
            max_memory: self.max_memory.unwrap_or(default.max_memory),
            pert_mode: self.pert_mode.unwrap_or(default.pert_mode),
            pert_lambda: self.pert_lambda.unwrap_or(default.pert_lambda),
            known_proportion_subscription_based: self
                .known_proportion_subscription_based
                .unwrap_or(default.known_proportion_subscription_based),
            known_proportion_lowest_avg_seen_for_new_subs: self
                .known_proportion_lowest_avg_seen_for_new_subs
                .unwrap_or(default.known_proportion_lowest_avg_seen_for_new_subs),
            seed: self.seed.or(default.seed),
        }
    }

    pub fn malicious_subscription_files(&self) -> Vec<String> {
        self.malicious_subscription_files.clone().unwrap_or_default()
    }

    pub fn replacement_id(&self) -> Option<&str> {
        self.replace_malicious_subscription_id.as_deref()
    }
}

/// Reads every `vm_id -> subscription_id` pair out of the extra trace files
/// named by `malicious_subscription_files`, returning the set of
/// subscription ids to force-mark malicious.
pub fn load_forced_malicious_subscriptions(files: &[String]) -> anyhow::Result<HashSet<String>> {
    let mut forced = HashSet::new();
    for path in files {
        let records = crate::trace_io::load_trace_unfiltered(Path::new(path))?;
        for record in records {
            forced.insert(record.subscription_id);
        }
    }
    Ok(forced)
}
