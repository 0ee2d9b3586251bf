//! The event loop: merges the creation/deletion streams into entity
//! mutations, fires interval statistics ticks, and tracks the engine-level
//! counters consumed by the summary report.

pub mod config;

pub use config::EngineConfig;

use crate::decimal::Ratio;
use crate::entity::{Host, Subscription, Vm};
use crate::error::SimError;
use crate::ids::{HostId, SubscriptionId, VmId};
use crate::metrics::{self, ClrMetrics, SafeTimeMetrics};
use crate::placement::{Ctx, HostActivityCounters, PlacementPolicy, PlacementRequest};
use crate::ticks::BigInt;
use crate::trace::{sort_streams, VmRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// One statistics tick's worth of interval metrics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalPoint {
    pub t: i64,
    pub core_utilization: Ratio,
    pub active_hosts: u64,
    pub active_vms: u64,
    pub boots: u64,
    pub shutdowns: u64,
    pub creations: u64,
    pub deletions: u64,
}

/// A landed attack: the attacker VM hit a named target VM at the moment of
/// its own creation, destined for `hits.csv`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit {
    pub attacker_vm: String,
    pub attacker_subscription: String,
    pub target_vm: String,
    pub target_subscription: String,
    pub time: i64,
}

/// One closed malicious period on some host, for `malevents.csv`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaliciousEvent {
    pub host: usize,
    pub malicious_set: usize,
    pub start: i64,
    pub end: i64,
}

/// Aggregate metrics for one malicious set.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaliciousSetReport {
    pub clr: ClrMetrics,
    pub safe_time: SafeTimeMetrics,
    pub coverage: Ratio,
}

/// The `summary.csv` row: one per run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub core_utilization: Ratio,
    pub avg_active_hosts: Ratio,
    pub max_active_hosts: u64,
    pub host_boots: u64,
    pub host_shutdowns: u64,
    pub vm_creations: u64,
    pub avg_active_vms: Ratio,
    pub max_active_vms: u64,
    pub avg_seen_subs: Ratio,
    pub per_malicious_set: Vec<MaliciousSetReport>,
}

/// Everything the simulation produced: the summary row, the interval time
/// series shared across per-metric output files, and the attack-simulation
/// side tables.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub summary: Summary,
    pub interval_series: Vec<IntervalPoint>,
    pub vms_with_targets: u64,
    pub hits: Vec<Hit>,
    pub malicious_events: Vec<MaliciousEvent>,
    pub hosts: Vec<Host>,
    pub vms: Vec<Vm>,
    pub subscriptions: Vec<Subscription>,
}

fn pair_key(a: SubscriptionId, b: SubscriptionId) -> (SubscriptionId, SubscriptionId) {
    if a.index() <= b.index() {
        (a, b)
    } else {
        (b, a)
    }
}

/// The simulation engine: owns the three entity arenas, the placement
/// policy, and every engine-level counter. Entities are referenced by
/// stable index rather than owning pointer, since the reference graph is
/// cyclic and nothing is freed mid-run.
pub struct Engine {
    config: EngineConfig,
    policy: Box<dyn PlacementPolicy>,
    rng: StdRng,

    hosts: Vec<Host>,
    vms: Vec<Vm>,
    subscriptions: Vec<Subscription>,
    subscription_by_external_id: HashMap<String, SubscriptionId>,
    vm_by_external_id: HashMap<String, VmId>,

    host_activity: HostActivityCounters,

    running_vms: u64,
    max_active_vms: u64,
    cumulative_vm_ticks: BigInt,
    cumulative_host_ticks: BigInt,
    last_counter_event: i64,

    interval_creations: u64,
    interval_deletions: u64,
    total_vm_creations: u64,
    total_vm_deletions: u64,

    vms_with_targets: u64,
    hits: Vec<Hit>,

    next_stat: i64,
    interval_series: Vec<IntervalPoint>,

    now: i64,
}

impl Engine {
    /// `seed` is the single user- or CLI-resolved seed for this run; the
    /// engine's own placement stream draws from `seed + 1`. The trace's
    /// malicious labelling (`seed` directly) and LDBR's beta draws
    /// (`seed + 2`) are resolved by the caller before this constructor
    /// runs, so all three streams share one seed but never perturb each
    /// other.
    pub fn new(config: EngineConfig, policy: Box<dyn PlacementPolicy>, seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let malicious_sets = config.malicious_sets();
        let hosts: Vec<Host> = (0..config.num_hosts)
            .map(|_| Host::new(config.cores_per_host, config.memory_per_host, malicious_sets))
            .collect();

        let mut engine = Engine {
            config,
            policy,
            rng,
            hosts,
            vms: Vec::new(),
            subscriptions: Vec::new(),
            subscription_by_external_id: HashMap::new(),
            vm_by_external_id: HashMap::new(),
            host_activity: HostActivityCounters::default(),
            running_vms: 0,
            max_active_vms: 0,
            cumulative_vm_ticks: BigInt::from(0),
            cumulative_host_ticks: BigInt::from(0),
            last_counter_event: 0,
            interval_creations: 0,
            interval_deletions: 0,
            total_vm_creations: 0,
            total_vm_deletions: 0,
            vms_with_targets: 0,
            hits: Vec::new(),
            next_stat: 0,
            interval_series: Vec::new(),
            now: 0,
        };
        engine.last_counter_event = engine.config.min_time;
        engine.now = engine.config.min_time;
        engine.next_stat = engine.config.stat_min_time + engine.config.stat_interval;

        if !engine.policy.owns_initial_activation() && engine.config.active_hosts > 0 {
            engine.activate_initial_hosts();
        }

        engine
    }

    fn activate_initial_hosts(&mut self) {
        let mut indices: Vec<usize> = (0..self.hosts.len()).collect();
        indices.shuffle(&mut self.rng);
        let t = self.config.min_time;
        for &i in indices.iter().take(self.config.active_hosts.min(self.hosts.len())) {
            self.hosts[i].boot(t);
            self.host_activity.active_now += 1;
            self.host_activity.total_boots += 1;
            self.host_activity.interval_boots += 1;
        }
        self.host_activity.max_active = self.host_activity.max_active.max(self.host_activity.active_now);
    }

    /// Runs the full event loop over `records`. `records` need not be
    /// pre-sorted; [`sort_streams`] produces the two stable orders this
    /// function merges. `malicious_by_subscription` is the output of
    /// [`crate::trace::classify_malicious`].
    pub fn run(
        &mut self,
        records: &[VmRecord],
        malicious_by_subscription: &HashMap<String, Vec<bool>>,
    ) -> Result<SimulationOutput, SimError> {
        let (by_creation, by_deletion) = sort_streams(records);
        let mut ci = 0usize;
        let mut di = 0usize;

        loop {
            let next_creation = by_creation.get(ci).map(|&i| records[i].time_created);
            let next_deletion = by_deletion.get(di).map(|&i| records[i].time_deleted);

            // Creation wins ties: the trace contains instantaneously
            // deleted VMs, and creating first avoids underestimating load
            // and preserves co-residency semantics.
            let (t, is_creation) = match (next_creation, next_deletion) {
                (None, None) => break,
                (Some(tc), None) => (tc, true),
                (None, Some(td)) => (td, false),
                (Some(tc), Some(td)) => (tc.min(td), tc <= td),
            };

            self.advance_stat_ticks_to(t);
            self.now = t;

            if is_creation {
                let idx = by_creation[ci];
                self.process_creation(&records[idx], malicious_by_subscription, t)?;
                ci += 1;
            } else {
                let idx = by_deletion[di];
                self.process_deletion(&records[idx], t)?;
                di += 1;
            }
        }

        Ok(self.finalize())
    }

    /// Fires every statistics tick boundary at or before `t`, in order.
    /// This may fire multiple times in one step if events skip intervals.
    fn advance_stat_ticks_to(&mut self, t: i64) {
        if self.config.stat_interval <= 0 {
            return;
        }
        while self.next_stat <= t {
            self.fire_stat_tick(self.next_stat);
            self.next_stat += self.config.stat_interval;
        }
    }

    fn fire_stat_tick(&mut self, t: i64) {
        self.flush_global_ticks(t);
        for host in &mut self.hosts {
            host.flush_ticks_to(t);
        }

        let point = IntervalPoint {
            t,
            core_utilization: metrics::core_utilization_interval(&self.hosts),
            active_hosts: self.host_activity.active_now,
            active_vms: self.running_vms,
            boots: self.host_activity.interval_boots,
            shutdowns: self.host_activity.interval_shutdowns,
            creations: self.interval_creations,
            deletions: self.interval_deletions,
        };
        self.interval_series.push(point);

        for host in &mut self.hosts {
            host.reset_interval_accumulators();
        }
        self.host_activity.interval_boots = 0;
        self.host_activity.interval_shutdowns = 0;
        self.interval_creations = 0;
        self.interval_deletions = 0;
    }

    /// Brings the running-VM/running-host tick accumulators up to date as
    /// of `t`, using whatever counts held since the last flush. Cumulative
    /// VM-ticks is the sum of delta-t times running VMs.
    fn flush_global_ticks(&mut self, t: i64) {
        let dt = t - self.last_counter_event;
        if dt > 0 {
            self.cumulative_vm_ticks += BigInt::from(self.running_vms) * BigInt::from(dt);
            self.cumulative_host_ticks += BigInt::from(self.host_activity.active_now) * BigInt::from(dt);
        }
        self.last_counter_event = t;
    }

    fn ensure_subscription(
        &mut self,
        external_id: &str,
        t: i64,
        malicious_by_subscription: &HashMap<String, Vec<bool>>,
    ) -> SubscriptionId {
        if let Some(&id) = self.subscription_by_external_id.get(external_id) {
            return id;
        }
        let malicious_sets = self.config.malicious_sets();
        let mut sub = Subscription::new(external_id.to_string(), t, malicious_sets);
        if let Some(flags) = malicious_by_subscription.get(external_id) {
            sub.malicious = flags.clone();
        }
        let id = SubscriptionId(self.subscriptions.len());
        self.subscriptions.push(sub);
        self.subscription_by_external_id.insert(external_id.to_string(), id);
        id
    }

    fn process_creation(
        &mut self,
        record: &VmRecord,
        malicious_by_subscription: &HashMap<String, Vec<bool>>,
        t: i64,
    ) -> Result<(), SimError> {
        if self.vm_by_external_id.contains_key(&record.vm_id) {
            return Err(SimError::DuplicateVmId {
                vm_id: record.vm_id.clone(),
            });
        }

        let sub_id = self.ensure_subscription(&record.subscription_id, t, malicious_by_subscription);

        let target_vm = record
            .target_vm_id
            .as_ref()
            .and_then(|id| self.vm_by_external_id.get(id).copied());
        if record.target_vm_id.is_some() {
            self.vms_with_targets += 1;
        }

        let vm = Vm {
            external_id: record.vm_id.clone(),
            subscription: sub_id,
            time_created: t,
            time_deleted: record.time_deleted,
            cores: record.cores,
            memory: record.memory,
            category: record.category.clone(),
            target_vm_external_id: record.target_vm_id.clone(),
            target_vm,
            hit_target: false,
            was_colocated_with_malicious: vec![false; self.config.malicious_sets()],
            current_host: None,
            first_host: None,
        };
        let vm_id = VmId(self.vms.len());
        self.vms.push(vm);
        self.vm_by_external_id.insert(record.vm_id.clone(), vm_id);
        self.subscriptions[sub_id.index()].on_vm_created(vm_id, t);

        let req = PlacementRequest {
            cores: record.cores,
            memory: record.memory,
            subscription: sub_id,
        };
        let host_id = {
            let mut ctx = Ctx {
                hosts: &mut self.hosts,
                subscriptions: &self.subscriptions,
                vms: &self.vms,
                rng: &mut self.rng,
                host_activity: &mut self.host_activity,
            };
            self.policy.pick_host(&mut ctx, req)
        }
        .ok_or_else(|| {
            log::warn!(
                "capacity exhausted placing vm {} ({} cores / {} GiB)",
                record.vm_id,
                record.cores,
                record.memory
            );
            SimError::CapacityExhausted {
                vm_cores: record.cores,
                vm_memory: record.memory,
            }
        })?;

        if !self.hosts[host_id.index()].has_capacity(record.cores, record.memory) {
            return Err(SimError::PlacementViolatesCapacity { host: host_id });
        }

        if !self.hosts[host_id.index()].is_active() {
            let mut ctx = Ctx {
                hosts: &mut self.hosts,
                subscriptions: &self.subscriptions,
                vms: &self.vms,
                rng: &mut self.rng,
                host_activity: &mut self.host_activity,
            };
            ctx.activate_host(host_id, t);
        }

        self.host_add_vm(host_id, vm_id, t);

        {
            let mut ctx = Ctx {
                hosts: &mut self.hosts,
                subscriptions: &self.subscriptions,
                vms: &self.vms,
                rng: &mut self.rng,
                host_activity: &mut self.host_activity,
            };
            self.policy.on_create(&mut ctx, host_id, req, t);
        }

        if let Some(target_id) = target_vm {
            if self.vms[target_id.index()].current_host == Some(host_id) {
                self.vms[vm_id.index()].hit_target = true;
                let target_sub = self.vms[target_id.index()].subscription;
                self.subscriptions[target_sub.index()]
                    .target_vms
                    .get_or_insert_with(HashMap::new)
                    .insert(target_id, true);
                self.subscriptions[sub_id.index()]
                    .target_subscriptions
                    .get_or_insert_with(HashMap::new)
                    .insert(target_sub, true);
                self.hits.push(Hit {
                    attacker_vm: record.vm_id.clone(),
                    attacker_subscription: record.subscription_id.clone(),
                    target_vm: self.vms[target_id.index()].external_id.clone(),
                    target_subscription: self.subscriptions[target_sub.index()].external_id.clone(),
                    time: t,
                });
            }
        }

        self.flush_global_ticks(t);
        self.running_vms += 1;
        self.max_active_vms = self.max_active_vms.max(self.running_vms);
        self.total_vm_creations += 1;
        self.interval_creations += 1;

        Ok(())
    }

    fn process_deletion(&mut self, record: &VmRecord, t: i64) -> Result<(), SimError> {
        let vm_id = *self
            .vm_by_external_id
            .get(&record.vm_id)
            .expect("deletion stream is derived from the same records as creation");
        let host_id = self.vms[vm_id.index()]
            .current_host
            .expect("a VM present in the deletion stream must currently be hosted");

        if t < self.hosts[host_id.index()].last_event() {
            return Err(SimError::OutOfOrderEvent {
                host: host_id,
                last_event: self.hosts[host_id.index()].last_event(),
                new_event: t,
            });
        }
        self.host_remove_vm(host_id, vm_id, t);

        let sub_id = self.vms[vm_id.index()].subscription;
        self.subscriptions[sub_id.index()].on_vm_deleted(vm_id, t);
        self.vms[vm_id.index()].current_host = None;

        let req = PlacementRequest {
            cores: self.vms[vm_id.index()].cores,
            memory: self.vms[vm_id.index()].memory,
            subscription: sub_id,
        };
        let deactivate_by_default = {
            let mut ctx = Ctx {
                hosts: &mut self.hosts,
                subscriptions: &self.subscriptions,
                vms: &self.vms,
                rng: &mut self.rng,
                host_activity: &mut self.host_activity,
            };
            self.policy.on_delete(&mut ctx, host_id, req, t)
        };
        if deactivate_by_default && self.hosts[host_id.index()].current_vms.is_empty() {
            let mut ctx = Ctx {
                hosts: &mut self.hosts,
                subscriptions: &self.subscriptions,
                vms: &self.vms,
                rng: &mut self.rng,
                host_activity: &mut self.host_activity,
            };
            ctx.deactivate_host(host_id, t);
        }

        self.flush_global_ticks(t);
        self.running_vms -= 1;
        self.total_vm_deletions += 1;
        self.interval_deletions += 1;

        Ok(())
    }

    /// VM-create-on-host: co-residency/exposure bookkeeping against every
    /// VM already there, malicious-period open/close, occupancy ticks, in
    /// that order (the order among the first two only matters in that
    /// retroactive exposure must see the pre-addition VM list, which
    /// `existing` captures up front).
    fn host_add_vm(&mut self, host_id: HostId, vm_id: VmId, t: i64) {
        let sub_id = self.vms[vm_id.index()].subscription;
        let cores = self.vms[vm_id.index()].cores;
        let memory = self.vms[vm_id.index()].memory;
        let existing: Vec<VmId> = self.hosts[host_id.index()].current_vms.clone();

        for &other_vm in &existing {
            let other_sub = self.vms[other_vm.index()].subscription;
            if other_sub == sub_id {
                continue;
            }
            self.link_subscriptions(sub_id, other_sub);
            self.on_pair_cohosted(host_id, sub_id, other_sub, t);
        }

        {
            let host = &mut self.hosts[host_id.index()];
            host.subs_ever_hosted.insert(sub_id);
            *host.current_sub_counts.entry(sub_id).or_insert(0) += 1;
        }

        for m in 0..self.config.malicious_sets() {
            let already_malicious = self.hosts[host_id.index()].current_malicious_vms[m] > 0;
            if already_malicious {
                self.vms[vm_id.index()].was_colocated_with_malicious[m] = true;
            }
            if self.subscriptions[sub_id.index()].malicious[m] {
                if !already_malicious {
                    self.hosts[host_id.index()].malicious_periods[m].open(t);
                    for &other_vm in &existing {
                        self.vms[other_vm.index()].was_colocated_with_malicious[m] = true;
                    }
                }
                self.hosts[host_id.index()].current_malicious_vms[m] += 1;
            }
        }

        let host = &mut self.hosts[host_id.index()];
        host.flush_ticks_to(t);
        host.current_vms.push(vm_id);
        host.vms_ever_hosted.push(vm_id);
        host.cores_busy += cores;
        host.memory_used += memory;

        self.vms[vm_id.index()].current_host = Some(host_id);
        if self.vms[vm_id.index()].first_host.is_none() {
            self.vms[vm_id.index()].first_host = Some(host_id);
        }
    }

    /// VM-delete-on-host.
    fn host_remove_vm(&mut self, host_id: HostId, vm_id: VmId, t: i64) {
        let sub_id = self.vms[vm_id.index()].subscription;
        let cores = self.vms[vm_id.index()].cores;
        let memory = self.vms[vm_id.index()].memory;

        let host = &mut self.hosts[host_id.index()];
        host.flush_ticks_to(t);
        host.current_vms.retain(|&v| v != vm_id);
        host.cores_busy -= cores;
        host.memory_used -= memory;

        for m in 0..self.config.malicious_sets() {
            if self.subscriptions[sub_id.index()].malicious[m] {
                let host = &mut self.hosts[host_id.index()];
                host.current_malicious_vms[m] -= 1;
                if host.current_malicious_vms[m] == 0 {
                    host.malicious_periods[m].close(t);
                }
            }
        }

        let remaining_other_subs: Vec<SubscriptionId> = self.hosts[host_id.index()]
            .current_vms
            .iter()
            .map(|&v| self.vms[v.index()].subscription)
            .filter(|&s| s != sub_id)
            .collect();

        {
            let host = &mut self.hosts[host_id.index()];
            if let Some(count) = host.current_sub_counts.get_mut(&sub_id) {
                *count -= 1;
                if *count == 0 {
                    host.current_sub_counts.remove(&sub_id);
                }
            }
        }

        let still_present = self.hosts[host_id.index()].current_sub_counts.contains_key(&sub_id);
        if !still_present {
            let mut seen = std::collections::HashSet::new();
            for other_sub in remaining_other_subs {
                if seen.insert(other_sub) {
                    self.on_pair_uncohosted(host_id, sub_id, other_sub, t);
                }
            }
        }
    }

    fn link_subscriptions(&mut self, a: SubscriptionId, b: SubscriptionId) {
        self.subscriptions[a.index()].seen_subs.insert(b);
        self.subscriptions[b.index()].seen_subs.insert(a);
        for m in 0..self.config.malicious_sets() {
            if self.subscriptions[b.index()].malicious[m] {
                self.subscriptions[a.index()].exposed_to_malicious_sub[m] = true;
            }
            if self.subscriptions[a.index()].malicious[m] {
                self.subscriptions[b.index()].exposed_to_malicious_sub[m] = true;
            }
        }
        *self.subscriptions[a.index()].currently_cores_subs.entry(b).or_insert(0) += 1;
        *self.subscriptions[b.index()].currently_cores_subs.entry(a).or_insert(0) += 1;
    }

    fn on_pair_cohosted(&mut self, host_id: HostId, a: SubscriptionId, b: SubscriptionId, t: i64) {
        let key = pair_key(a, b);
        let host = &mut self.hosts[host_id.index()];
        let count = host.sub_pair_counts.entry(key).or_insert(0);
        if *count == 0 {
            host.sub_pair_overlap_since.insert(key, t);
        }
        *count += 1;
    }

    fn on_pair_uncohosted(&mut self, host_id: HostId, a: SubscriptionId, b: SubscriptionId, t: i64) {
        let key = pair_key(a, b);
        let closed = {
            let host = &mut self.hosts[host_id.index()];
            match host.sub_pair_counts.get_mut(&key) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    if *count == 0 {
                        host.sub_pair_counts.remove(&key);
                        host.sub_pair_overlap_since.remove(&key)
                    } else {
                        None
                    }
                }
                _ => None,
            }
        };
        if let Some(start) = closed {
            let elapsed = t - start;
            *self.subscriptions[a.index()].coresident_time.entry(b).or_insert(0) += elapsed;
            *self.subscriptions[b.index()].coresident_time.entry(a).or_insert(0) += elapsed;
        }
        if let Some(count) = self.subscriptions[a.index()].currently_cores_subs.get_mut(&b) {
            *count -= 1;
            if *count <= 0 {
                self.subscriptions[a.index()].currently_cores_subs.remove(&b);
            }
        }
        if let Some(count) = self.subscriptions[b.index()].currently_cores_subs.get_mut(&a) {
            *count -= 1;
            if *count <= 0 {
                self.subscriptions[b.index()].currently_cores_subs.remove(&a);
            }
        }
    }

    fn finalize(&mut self) -> SimulationOutput {
        let now = self.now.max(self.config.min_time);
        self.flush_global_ticks(now);
        for host in &mut self.hosts {
            host.flush_ticks_to(now);
        }

        let total_time = (now - self.config.min_time).max(0);
        let avg_active_hosts = Ratio::from_big_fraction(&self.cumulative_host_ticks, &BigInt::from(total_time.max(1)));
        let avg_active_vms = Ratio::from_big_fraction(&self.cumulative_vm_ticks, &BigInt::from(total_time.max(1)));

        let total_seen: i64 = self.subscriptions.iter().map(|s| s.seen_subs.len() as i64).sum();
        let avg_seen_subs = if self.subscriptions.is_empty() {
            Ratio::zero()
        } else {
            Ratio::from_counts(total_seen, self.subscriptions.len() as i64)
        };

        let per_malicious_set = (0..self.config.malicious_sets())
            .map(|m| MaliciousSetReport {
                clr: metrics::clr(&self.subscriptions, &self.vms, m),
                safe_time: metrics::safe_time(&self.subscriptions, &self.vms, &self.hosts, m, now),
                coverage: metrics::coverage(&self.hosts, m),
            })
            .collect();

        let mut malicious_events = Vec::new();
        for (host_idx, host) in self.hosts.iter().enumerate() {
            for (m, periods) in host.malicious_periods.iter().enumerate() {
                for &(start, end) in &periods.closed {
                    malicious_events.push(MaliciousEvent {
                        host: host_idx,
                        malicious_set: m,
                        start,
                        end,
                    });
                }
            }
        }

        let summary = Summary {
            core_utilization: metrics::core_utilization_lifetime(&self.hosts),
            avg_active_hosts,
            max_active_hosts: self.host_activity.max_active,
            host_boots: self.host_activity.total_boots,
            host_shutdowns: self.host_activity.total_shutdowns,
            vm_creations: self.total_vm_creations,
            avg_active_vms,
            max_active_vms: self.max_active_vms,
            avg_seen_subs,
            per_malicious_set,
        };

        SimulationOutput {
            summary,
            interval_series: std::mem::take(&mut self.interval_series),
            vms_with_targets: self.vms_with_targets,
            hits: std::mem::take(&mut self.hits),
            malicious_events,
            hosts: self.hosts.clone(),
            vms: self.vms.clone(),
            subscriptions: self.subscriptions.clone(),
        }
    }
}
