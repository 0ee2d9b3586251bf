use super::{Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;
use rand::Rng;
use std::collections::HashSet;

/// Maintains a target number `A` of "open" active hosts alongside a
/// separate "full" set. Standard-sized VMs go to a random open host;
/// oversized VMs (exceeding `max_cores`/`max_memory`) sometimes reuse a
/// full-but-capable host instead of opening a new one.
#[derive(Debug)]
pub struct Azar {
    target_open: usize,
    max_cores: i64,
    max_memory: f64,
    full_hosts: HashSet<HostId>,
}

impl Azar {
    pub fn new(target_open: usize, max_cores: i64, max_memory: f64) -> Self {
        Azar {
            target_open,
            max_cores,
            max_memory,
            full_hosts: HashSet::new(),
        }
    }

    fn is_open(&self, host: HostId, ctx: &Ctx) -> bool {
        ctx.hosts[host.index()].is_active() && !self.full_hosts.contains(&host)
    }

    fn is_full(&self, ctx: &Ctx, host: HostId) -> bool {
        let h = &ctx.hosts[host.index()];
        h.free_cores() < self.max_cores || h.free_memory() < self.max_memory
    }
}

impl PlacementPolicy for Azar {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let oversized = vm.cores > self.max_cores || vm.memory > self.max_memory;

        if !oversized {
            let open: Vec<HostId> = (0..ctx.hosts.len())
                .map(HostId)
                .filter(|&h| self.is_open(h, ctx) && ctx.hosts[h.index()].has_capacity(vm.cores, vm.memory))
                .collect();
            return ctx
                .pick_random(&open)
                .or_else(|| ctx.pick_empty_host(vm.cores, vm.memory));
        }

        let e = ctx.eligible_active(vm.cores, vm.memory);
        let has_inactive_capacity = ctx
            .hosts
            .iter()
            .any(|h| !h.is_active() && h.cores >= vm.cores && h.memory >= vm.memory);
        let draw = ctx.rng.random_range(0..=self.target_open as u64);
        if (draw as usize) < e.len() || !has_inactive_capacity {
            ctx.pick_random(&e).or_else(|| ctx.pick_empty_host(vm.cores, vm.memory))
        } else {
            ctx.pick_empty_host(vm.cores, vm.memory)
        }
    }

    fn on_create(&mut self, ctx: &mut Ctx, host: HostId, _vm: PlacementRequest, now: i64) {
        if !self.full_hosts.contains(&host) && self.is_full(ctx, host) {
            self.full_hosts.insert(host);
            if let Some(replacement) = ctx.pick_empty_host(0, 0.0) {
                ctx.activate_host(replacement, now);
            }
        }
    }

    fn on_delete(&mut self, ctx: &mut Ctx, host: HostId, _vm: PlacementRequest, now: i64) -> bool {
        if self.full_hosts.contains(&host) && !self.is_full(ctx, host) {
            self.full_hosts.remove(&host);
        }
        let active_count = ctx.hosts.iter().filter(|h| h.is_active()).count();
        if active_count > self.target_open {
            ctx.deactivate_empty_hosts(now, active_count - self.target_open);
        }
        true
    }
}
