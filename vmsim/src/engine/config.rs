/// Engine configuration. Every field has the documented default so a
/// caller only needs to override what a given experiment varies.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    pub num_hosts: usize,
    /// Initial count of hosts activated uniformly at random at `start_time`.
    /// Reinterpreted by Han/HanKeepOn as the group size; those policies
    /// never random-activate at init.
    pub active_hosts: usize,
    pub cores_per_host: i64,
    pub memory_per_host: f64,

    pub min_time: i64,
    pub max_time: i64,

    pub stat_interval: i64,
    pub stat_min_time: i64,

    /// One entry per malicious set.
    pub malicious_proportions: Vec<f64>,

    /// Han's cap on same-subscription VMs hosted on one host before it
    /// prefers a host the subscription hasn't touched yet.
    pub n_star: u32,

    /// Azar's oversized-VM thresholds.
    pub max_cores: i64,
    pub max_memory: f64,

    pub pert_mode: f64,
    pub pert_lambda: f64,

    /// Known-Proportion: compute `proportion_known` over distinct
    /// subscriptions on a host rather than over individual VMs.
    pub known_proportion_subscription_based: bool,
    /// Known-Proportion: when every candidate's `proportion_known` is zero,
    /// fall back to minimizing tenants' average `seen_subs` cardinality
    /// instead of leaving the full eligible set as candidates.
    pub known_proportion_lowest_avg_seen_for_new_subs: bool,

    /// Unspecified draws a fresh seed nondeterministically.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            num_hosts: 200_000,
            active_hosts: 0,
            cores_per_host: 32,
            memory_per_host: 224.0,
            min_time: 0,
            max_time: i64::MAX,
            stat_interval: 21_600,
            stat_min_time: 0,
            malicious_proportions: Vec::new(),
            n_star: 4,
            max_cores: 32,
            max_memory: 224.0,
            pert_mode: 0.9,
            pert_lambda: 3.0,
            known_proportion_subscription_based: true,
            known_proportion_lowest_avg_seen_for_new_subs: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn malicious_sets(&self) -> usize {
        self.malicious_proportions.len()
    }
}
