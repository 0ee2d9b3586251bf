use super::{min_by_free_cores, Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;

/// From the active hosts with capacity, picks the one(s) minimizing
/// `free_cores`, tie-breaking uniformly at random.
#[derive(Debug, Default)]
pub struct BestFit;

impl BestFit {
    pub fn new() -> Self {
        BestFit
    }
}

impl PlacementPolicy for BestFit {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let e = ctx.eligible_active(vm.cores, vm.memory);
        if e.is_empty() {
            return ctx.pick_empty_host(vm.cores, vm.memory);
        }
        let tied = min_by_free_cores(ctx, &e);
        ctx.pick_random(&tied)
    }
}
