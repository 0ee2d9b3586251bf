use super::{min_by_free_cores, Ctx, PlacementPolicy, PlacementRequest};
use crate::entity::Subscription;
use crate::ids::{HostId, SubscriptionId};

/// For each candidate host, computes the proportion of its current tenants
/// (subscriptions or VMs, per `subscription_based`) already "known" to the
/// placing subscription via `seen_subs`; retains the maximizing hosts, then
/// picks the minimum-`free_cores` host among those.
#[derive(Debug)]
pub struct KnownProportion {
    subscription_based: bool,
    lowest_avg_seen_for_new_subs: bool,
}

impl KnownProportion {
    pub fn new(subscription_based: bool, lowest_avg_seen_for_new_subs: bool) -> Self {
        KnownProportion {
            subscription_based,
            lowest_avg_seen_for_new_subs,
        }
    }

    /// `best_so_far` drives the VM-level early-exit: once the best
    /// achievable proportion for this host can no longer beat it, stop
    /// scanning the host's VMs.
    fn proportion_known(&self, ctx: &Ctx, host: HostId, sub_id: SubscriptionId, sub: &Subscription, best_so_far: f64) -> f64 {
        let h = &ctx.hosts[host.index()];
        if self.subscription_based {
            let total = h.current_sub_counts.len();
            if total == 0 {
                return 1.0;
            }
            let known = h
                .current_sub_counts
                .keys()
                .filter(|s| sub.seen_subs.contains(s))
                .count();
            known as f64 / total as f64
        } else {
            let total = h.current_vms.len();
            if total == 0 {
                return 1.0;
            }
            let mut unknown = 0usize;
            for (counted, &vm_id) in h.current_vms.iter().enumerate() {
                let owner = ctx.vms[vm_id.index()].subscription;
                if owner != sub_id && !sub.seen_subs.contains(&owner) {
                    unknown += 1;
                }
                let scanned = counted + 1;
                let best_possible = (total - unknown) as f64 / total as f64;
                if best_possible < best_so_far && scanned < total {
                    break;
                }
            }
            (total - unknown) as f64 / total as f64
        }
    }
}

impl PlacementPolicy for KnownProportion {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let e = ctx.eligible_active(vm.cores, vm.memory);
        if e.is_empty() {
            return ctx.pick_empty_host(vm.cores, vm.memory);
        }

        let sub = ctx.subscriptions[vm.subscription.index()].clone();
        if sub.total_vms.is_empty() {
            return ctx.pick_random(&e);
        }

        let mut best_prop = f64::MIN;
        let mut scored: Vec<(HostId, f64)> = Vec::with_capacity(e.len());
        for &h in &e {
            let p = self.proportion_known(ctx, h, vm.subscription, &sub, best_prop);
            if p > best_prop {
                best_prop = p;
            }
            scored.push((h, p));
        }

        let mut candidates: Vec<HostId> = scored
            .iter()
            .filter(|(_, p)| *p >= best_prop)
            .map(|(h, _)| *h)
            .collect();

        if best_prop == 0.0 && self.lowest_avg_seen_for_new_subs {
            candidates = lowest_avg_seen(ctx, &e);
        }

        let tied = min_by_free_cores(ctx, &candidates);
        ctx.pick_random(&tied)
    }
}

fn lowest_avg_seen(ctx: &Ctx, candidates: &[HostId]) -> Vec<HostId> {
    let avg = |h: HostId| -> f64 {
        let host = &ctx.hosts[h.index()];
        if host.current_sub_counts.is_empty() {
            return 0.0;
        }
        let total: usize = host
            .current_sub_counts
            .keys()
            .map(|s| ctx.subscriptions[s.index()].seen_subs.len())
            .sum();
        total as f64 / host.current_sub_counts.len() as f64
    };
    let min = candidates
        .iter()
        .map(|&h| avg(h))
        .fold(f64::MAX, |acc, x| acc.min(x));
    candidates.iter().copied().filter(|&h| avg(h) == min).collect()
}
