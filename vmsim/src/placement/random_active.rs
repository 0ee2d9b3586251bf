use super::{Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;

/// Uniformly random over the active hosts with capacity.
#[derive(Debug, Default)]
pub struct RandomActive;

impl RandomActive {
    pub fn new() -> Self {
        RandomActive
    }
}

impl PlacementPolicy for RandomActive {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let e = ctx.eligible_active(vm.cores, vm.memory);
        ctx.pick_random(&e).or_else(|| ctx.pick_empty_host(vm.cores, vm.memory))
    }
}
