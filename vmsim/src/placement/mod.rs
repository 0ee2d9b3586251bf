//! The placement-policy framework: the engine's contract with pluggable
//! host-selection strategies.
//!
//! Each policy is a value implementing [`PlacementPolicy`], carrying its own
//! config and any extra bookkeeping it needs (Azar's full-host set, Han's
//! group state, LDBR's per-subscription probabilities). The engine owns
//! exactly one such value behind a `Box<dyn PlacementPolicy>` and dispatches
//! every creation/deletion through it, in place of an inheritance hierarchy.

mod agarwal_pcuf;
mod azar;
mod best_fit;
mod dedicated_instance;
mod first_fit;
mod han;
mod known_proportion;
mod ldbr;
mod next_fit;
mod random_active;
mod worst_fit;

pub use agarwal_pcuf::AgarwalPcuf;
pub use azar::Azar;
pub use best_fit::BestFit;
pub use dedicated_instance::DedicatedInstance;
pub use first_fit::FirstFit;
pub use han::Han;
pub use known_proportion::KnownProportion;
pub use ldbr::Ldbr;
pub use next_fit::NextFit;
pub use random_active::RandomActive;
pub use worst_fit::WorstFit;

use crate::engine::EngineConfig;
use crate::entity::{Host, Subscription, Vm};
use crate::error::SimError;
use crate::ids::{HostId, SubscriptionId};
use crate::pert::PertSampler;
use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;

/// The resource shape of a VM being placed. Policies never see the full
/// [`crate::entity::Vm`] before it exists.
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest {
    pub cores: i64,
    pub memory: f64,
    pub subscription: SubscriptionId,
}

/// Lifetime host-activation counters, threaded through [`Ctx`] so that
/// activations/deactivations triggered by a policy's own bookkeeping (Azar
/// opening a replacement host, Han tearing down a group) are counted
/// exactly like the engine's own default activate-on-create, instead of
/// each policy having to report boot/shutdown events back separately.
#[derive(Debug, Default)]
pub struct HostActivityCounters {
    pub active_now: u64,
    pub max_active: u64,
    pub total_boots: u64,
    pub total_shutdowns: u64,
    pub interval_boots: u64,
    pub interval_shutdowns: u64,
}

/// What a policy is allowed to touch: the host arena, read-only
/// subscription state (for seen-subs / malicious-flag lookups), and the
/// engine's placement RNG. Policies never own their own placement
/// randomness; only LDBR's beta draws are a separate stream.
pub struct Ctx<'a> {
    pub hosts: &'a mut Vec<Host>,
    pub subscriptions: &'a [Subscription],
    pub vms: &'a [Vm],
    pub rng: &'a mut StdRng,
    pub host_activity: &'a mut HostActivityCounters,
}

impl<'a> Ctx<'a> {
    pub fn eligible_active(&self, cores: i64, memory: f64) -> Vec<HostId> {
        self.hosts
            .iter()
            .enumerate()
            .filter(|(_, h)| h.is_active() && h.has_capacity(cores, memory))
            .map(|(i, _)| HostId(i))
            .collect()
    }

    /// `pick_empty_host(vm)`: uniformly random over inactive hosts with
    /// sufficient capacity.
    pub fn pick_empty_host(&mut self, cores: i64, memory: f64) -> Option<HostId> {
        let candidates: Vec<HostId> = self
            .hosts
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_active() && h.cores >= cores && h.memory >= memory)
            .map(|(i, _)| HostId(i))
            .collect();
        self.pick_random(&candidates)
    }

    /// `pick_random(hosts)`: uniform choice from a non-empty collection.
    pub fn pick_random(&mut self, candidates: &[HostId]) -> Option<HostId> {
        if candidates.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..candidates.len());
        Some(candidates[idx])
    }

    /// `activate_host(host, t)`. A no-op if already active, guarding
    /// against double-activation when a policy's own bookkeeping races with
    /// the engine's default activate-on-create.
    pub fn activate_host(&mut self, host: HostId, t: i64) {
        if !self.hosts[host.index()].is_active() {
            self.hosts[host.index()].boot(t);
            self.host_activity.active_now += 1;
            self.host_activity.max_active = self.host_activity.max_active.max(self.host_activity.active_now);
            self.host_activity.total_boots += 1;
            self.host_activity.interval_boots += 1;
            log::debug!("host {host} booted at t={t}");
        }
    }

    /// `deactivate_host(host, t)`. A no-op if already inactive.
    pub fn deactivate_host(&mut self, host: HostId, t: i64) {
        if self.hosts[host.index()].is_active() && self.hosts[host.index()].shutdown(t).is_ok() {
            self.host_activity.active_now -= 1;
            self.host_activity.total_shutdowns += 1;
            self.host_activity.interval_shutdowns += 1;
            log::debug!("host {host} shut down at t={t}");
        }
    }

    /// `deactivate_empty_hosts(k)`: deactivate up to `k` currently empty
    /// active hosts.
    pub fn deactivate_empty_hosts(&mut self, t: i64, k: usize) {
        let mut done = 0;
        for i in 0..self.hosts.len() {
            if done >= k {
                break;
            }
            if self.hosts[i].is_active() && self.hosts[i].current_vms.is_empty() {
                self.deactivate_host(HostId(i), t);
                done += 1;
            }
        }
    }
}

/// All hosts in `candidates` with the minimum `free_cores`.
pub(crate) fn min_by_free_cores(ctx: &Ctx, candidates: &[HostId]) -> Vec<HostId> {
    let Some(min) = candidates.iter().map(|&h| ctx.hosts[h.index()].free_cores()).min() else {
        return Vec::new();
    };
    candidates
        .iter()
        .copied()
        .filter(|&h| ctx.hosts[h.index()].free_cores() == min)
        .collect()
}

/// All hosts in `candidates` with the maximum `free_cores`.
pub(crate) fn max_by_free_cores(ctx: &Ctx, candidates: &[HostId]) -> Vec<HostId> {
    let Some(max) = candidates.iter().map(|&h| ctx.hosts[h.index()].free_cores()).max() else {
        return Vec::new();
    };
    candidates
        .iter()
        .copied()
        .filter(|&h| ctx.hosts[h.index()].free_cores() == max)
        .collect()
}

/// Policies decide which host a new VM lands on, and may react to
/// host-level create/delete events to maintain their own bookkeeping. Each
/// policy is a value carrying its own config; the engine holds one such
/// value and dispatches through it.
pub trait PlacementPolicy: fmt::Debug {
    /// `pick_host(vm) -> Host`. Must return a host with sufficient
    /// capacity, active or inactive; `None` means the trace exceeds
    /// simulated capacity.
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId>;

    /// Called after the engine has recorded the VM on `host`. Most
    /// policies need nothing here; Azar and Han track group/full-set state.
    fn on_create(&mut self, _ctx: &mut Ctx, _host: HostId, _vm: PlacementRequest, _now: i64) {}

    /// Called after the engine has removed the VM from `host`, before the
    /// engine's default "deactivate if now empty" step. Returning `false`
    /// suppresses that default, for policies (Han/HanKeepOn) that manage
    /// deactivation themselves.
    fn on_delete(&mut self, _ctx: &mut Ctx, _host: HostId, _vm: PlacementRequest, _now: i64) -> bool {
        true
    }

    /// Whether this policy manages its own initial-activation semantics.
    /// Han/HanKeepOn repurpose `active_hosts` as group size and activate
    /// only group 0 up front; every other policy leaves the engine to
    /// randomly activate `active_hosts` hosts at `min_time`.
    fn owns_initial_activation(&self) -> bool {
        false
    }
}

/// Construct the named policy from engine configuration. `pert_sampler` is
/// required only for `"ldbr"`; other tags ignore it.
pub fn build(
    tag: &str,
    config: &EngineConfig,
    pert_sampler: Option<Box<dyn PertSampler>>,
) -> Result<Box<dyn PlacementPolicy>, SimError> {
    match tag {
        "first_fit" => Ok(Box::new(FirstFit::new())),
        "next_fit" => Ok(Box::new(NextFit::new())),
        "best_fit" => Ok(Box::new(BestFit::new())),
        "worst_fit" => Ok(Box::new(WorstFit::new())),
        "random_active" => Ok(Box::new(RandomActive::new())),
        "dedicated_instance" => Ok(Box::new(DedicatedInstance::new())),
        "azar" => Ok(Box::new(Azar::new(config.active_hosts, config.max_cores, config.max_memory))),
        "han" => Ok(Box::new(Han::new(config.num_hosts, config.active_hosts, config.n_star, false))),
        "han_keep_on" => Ok(Box::new(Han::new(config.num_hosts, config.active_hosts, config.n_star, true))),
        "agarwal_pcuf" => Ok(Box::new(AgarwalPcuf::new())),
        "known_proportion" => Ok(Box::new(KnownProportion::new(
            config.known_proportion_subscription_based,
            config.known_proportion_lowest_avg_seen_for_new_subs,
        ))),
        "ldbr" => {
            if config.malicious_sets() != 1 {
                return Err(SimError::LdbrRequiresSingleMaliciousSet {
                    malicious_sets: config.malicious_sets(),
                });
            }
            if !(0.0..=1.0).contains(&config.pert_mode) {
                return Err(SimError::PertModeOutOfRange {
                    pert_mode: config.pert_mode,
                });
            }
            let sampler = pert_sampler.expect("ldbr requires a pert sampler");
            Ok(Box::new(Ldbr::new(sampler, config.pert_mode, config.pert_lambda)))
        }
        other => Err(SimError::UnknownAlgorithm { tag: other.to_string() }),
    }
}
