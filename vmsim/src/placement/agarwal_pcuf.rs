use super::{min_by_free_cores, Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;

/// Among the active hosts with capacity, retains those where the VM's
/// subscription has already co-resided with every subscription currently
/// on the host, then picks the minimum-`free_cores` host among those. A
/// brand-new subscription (no prior VMs) skips the filter.
#[derive(Debug, Default)]
pub struct AgarwalPcuf;

impl AgarwalPcuf {
    pub fn new() -> Self {
        AgarwalPcuf
    }
}

impl PlacementPolicy for AgarwalPcuf {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let e = ctx.eligible_active(vm.cores, vm.memory);
        if e.is_empty() {
            return ctx.pick_empty_host(vm.cores, vm.memory);
        }

        let sub = &ctx.subscriptions[vm.subscription.index()];
        if sub.total_vms.is_empty() {
            return ctx.pick_random(&e);
        }

        let known = e
            .iter()
            .copied()
            .filter(|&h| {
                ctx.hosts[h.index()]
                    .current_sub_counts
                    .keys()
                    .all(|s| *s == vm.subscription || sub.seen_subs.contains(s))
            })
            .collect::<Vec<_>>();
        let pool = if known.is_empty() { e } else { known };

        let tied = min_by_free_cores(ctx, &pool);
        ctx.pick_random(&tied)
    }
}
