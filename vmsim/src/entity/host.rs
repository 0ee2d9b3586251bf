use crate::ids::{MaliciousSet, SubscriptionId, VmId};
use crate::ticks::{core_ticks, BigInt};
use std::collections::HashMap;

/// A maximal time window during which a host hosted >= 1 VM malicious in a
/// given set. `open_start` is `Some` iff the host currently hosts such a VM;
/// `|closed| - (open_start.is_some() as usize)` differing by more than one
/// would be a bug.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaliciousPeriods {
    pub closed: Vec<(i64, i64)>,
    pub open_start: Option<i64>,
}

impl MaliciousPeriods {
    pub fn open(&mut self, start: i64) {
        debug_assert!(self.open_start.is_none());
        self.open_start = Some(start);
    }

    pub fn close(&mut self, end: i64) {
        if let Some(start) = self.open_start.take() {
            self.closed.push((start, end));
        }
    }

    pub fn is_open(&self) -> bool {
        self.open_start.is_some()
    }

    /// All periods, including the currently-open one clipped at `now` if
    /// asked to report a snapshot mid-simulation.
    pub fn all_with_open_clipped_at(&self, now: i64) -> Vec<(i64, i64)> {
        let mut all = self.closed.clone();
        if let Some(start) = self.open_start {
            all.push((start, now));
        }
        all
    }
}

/// A physical host. `host_number` (its [`crate::ids::HostId`]) is both its
/// primary identity and its capacity-table index; hosts are never freed, so
/// "shutdown" just flips state back to [`Inactive`](Host::is_active).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Host {
    pub cores: i64,
    pub memory: f64,

    pub current_vms: Vec<VmId>,
    /// Every VM ever hosted here, in hosting order. May repeat ids is not
    /// possible since VM ids are unique, but a VM is never re-hosted here
    /// after leaving, so in practice this is also a dedup log; kept as a
    /// plain log to match the data model's stated shape.
    pub vms_ever_hosted: Vec<VmId>,

    pub cores_busy: i64,
    pub memory_used: f64,

    /// `None` when inactive.
    booted: Option<i64>,
    pub number_of_boots: u64,

    /// Timestamp the tick accumulators below were last brought up to date.
    last_event: i64,

    pub busy_core_ticks: BigInt,
    pub total_core_ticks: BigInt,
    pub interval_busy_core_ticks: BigInt,
    pub interval_total_core_ticks: BigInt,

    pub current_malicious_vms: Vec<u32>,
    pub malicious_periods: Vec<MaliciousPeriods>,

    pub subs_ever_hosted: std::collections::HashSet<SubscriptionId>,
    pub current_sub_counts: HashMap<SubscriptionId, u32>,

    /// Start time of an open co-residency window between an unordered pair
    /// of distinct subscriptions both currently present on this host. Used
    /// to accrue `Subscription::coresident_time`; see DESIGN.md for the
    /// chosen (spec-silent) semantics.
    pub(crate) sub_pair_overlap_since: HashMap<(SubscriptionId, SubscriptionId), i64>,
    /// Number of currently-resident VM pairs between the two sides of each
    /// key above; the overlap window above is open iff this is nonzero.
    pub(crate) sub_pair_counts: HashMap<(SubscriptionId, SubscriptionId), u32>,
}

impl Host {
    pub fn new(cores: i64, memory: f64, malicious_sets: usize) -> Self {
        Host {
            cores,
            memory,
            current_vms: Vec::new(),
            vms_ever_hosted: Vec::new(),
            cores_busy: 0,
            memory_used: 0.0,
            booted: None,
            number_of_boots: 0,
            last_event: 0,
            busy_core_ticks: BigInt::from(0),
            total_core_ticks: BigInt::from(0),
            interval_busy_core_ticks: BigInt::from(0),
            interval_total_core_ticks: BigInt::from(0),
            current_malicious_vms: vec![0; malicious_sets],
            malicious_periods: vec![MaliciousPeriods::default(); malicious_sets],
            subs_ever_hosted: Default::default(),
            current_sub_counts: HashMap::new(),
            sub_pair_overlap_since: HashMap::new(),
            sub_pair_counts: HashMap::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.booted.is_some()
    }

    pub fn booted_at(&self) -> Option<i64> {
        self.booted
    }

    /// Timestamp the tick accumulators were last brought current. Doubles as
    /// a last-mutation watermark for out-of-order event detection.
    pub fn last_event(&self) -> i64 {
        self.last_event
    }

    pub fn free_cores(&self) -> i64 {
        self.cores - self.cores_busy
    }

    pub fn free_memory(&self) -> f64 {
        self.memory - self.memory_used
    }

    pub fn has_capacity(&self, cores: i64, memory: f64) -> bool {
        self.free_cores() >= cores && self.free_memory() >= memory
    }

    /// Bring the tick accumulators up to date as of `t`, using the capacity
    /// and busy-cores that held since the last flush. Must be called before
    /// any mutation to `cores_busy`/`cores`, and at every statistics tick and
    /// at shutdown.
    pub fn flush_ticks_to(&mut self, t: i64) {
        if self.is_active() {
            let dt = t - self.last_event;
            if dt > 0 {
                let busy = core_ticks(self.cores_busy, dt);
                let total = core_ticks(self.cores, dt);
                self.busy_core_ticks += &busy;
                self.total_core_ticks += &total;
                self.interval_busy_core_ticks += busy;
                self.interval_total_core_ticks += total;
            }
        }
        self.last_event = t;
    }

    /// Reset the per-interval accumulators after the engine has read them
    /// into the current statistics tick. Does not touch `last_event`: the
    /// next flush continues from wherever ticks were last brought current.
    pub fn reset_interval_accumulators(&mut self) {
        self.interval_busy_core_ticks = BigInt::from(0);
        self.interval_total_core_ticks = BigInt::from(0);
    }

    pub fn boot(&mut self, t: i64) {
        debug_assert!(!self.is_active());
        self.booted = Some(t);
        self.number_of_boots += 1;
        self.last_event = t;
    }

    /// Returns `Err` if the host still has resident VMs.
    pub fn shutdown(&mut self, t: i64) -> Result<(), ()> {
        if !self.current_vms.is_empty() {
            return Err(());
        }
        self.flush_ticks_to(t);
        self.booted = None;
        Ok(())
    }

    pub fn malicious_count(&self, m: MaliciousSet) -> u32 {
        self.current_malicious_vms[m]
    }
}
