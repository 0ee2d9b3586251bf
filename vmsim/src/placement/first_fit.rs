use super::{Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;

/// Scans all hosts in index order and returns the first with capacity,
/// active or inactive.
#[derive(Debug, Default)]
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        FirstFit
    }
}

impl PlacementPolicy for FirstFit {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        ctx.hosts
            .iter()
            .position(|h| h.has_capacity(vm.cores, vm.memory))
            .map(HostId)
    }
}
