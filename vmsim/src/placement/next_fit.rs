use super::{Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;

/// Like first-fit, but resumes scanning from the index after the
/// previously chosen host, wrapping around.
#[derive(Debug, Default)]
pub struct NextFit {
    last: Option<usize>,
}

impl NextFit {
    pub fn new() -> Self {
        NextFit { last: None }
    }
}

impl PlacementPolicy for NextFit {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let n = ctx.hosts.len();
        if n == 0 {
            return None;
        }
        let start = self.last.map(|i| (i + 1) % n).unwrap_or(0);
        for offset in 0..n {
            let i = (start + offset) % n;
            if ctx.hosts[i].has_capacity(vm.cores, vm.memory) {
                self.last = Some(i);
                return Some(HostId(i));
            }
        }
        None
    }
}
