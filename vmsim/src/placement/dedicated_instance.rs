use super::{min_by_free_cores, Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;

/// Prefers an active host that currently hosts only the VM's own
/// subscription; among those, the one(s) minimizing `free_cores`. Falls
/// back to an empty host otherwise.
#[derive(Debug, Default)]
pub struct DedicatedInstance;

impl DedicatedInstance {
    pub fn new() -> Self {
        DedicatedInstance
    }
}

impl PlacementPolicy for DedicatedInstance {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let candidates: Vec<HostId> = ctx
            .hosts
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                h.is_active()
                    && h.current_sub_counts.len() == 1
                    && h.current_sub_counts.contains_key(&vm.subscription)
                    && h.has_capacity(vm.cores, vm.memory)
            })
            .map(|(i, _)| HostId(i))
            .collect();
        if candidates.is_empty() {
            return ctx.pick_empty_host(vm.cores, vm.memory);
        }
        let tied = min_by_free_cores(ctx, &candidates);
        ctx.pick_random(&tied)
    }
}
