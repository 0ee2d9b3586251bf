use super::{max_by_free_cores, Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::HostId;
use std::collections::HashSet;

/// Han-PSSF and its Han-KeepOn variant. Hosts are
/// partitioned into fixed-size groups; groups are activated/deactivated as
/// a whole. The two variants differ only in whether an individually-empty
/// host inside an active group is shut down right away (plain Han) or left
/// active until the whole group empties (`keep_on`).
#[derive(Debug)]
pub struct Han {
    group_size: usize,
    num_groups: usize,
    n_star: u32,
    keep_on: bool,
    active_groups: HashSet<usize>,
    /// Count of currently non-empty hosts per group.
    non_empty_hosts: Vec<u32>,
}

impl Han {
    pub fn new(num_hosts: usize, group_size: usize, n_star: u32, keep_on: bool) -> Self {
        let group_size = group_size.max(1);
        let num_groups = num_hosts.div_ceil(group_size);
        let mut active_groups = HashSet::new();
        if num_groups > 0 {
            active_groups.insert(0);
        }
        Han {
            group_size,
            num_groups,
            n_star,
            keep_on,
            active_groups,
            non_empty_hosts: vec![0; num_groups],
        }
    }

    fn group_of(&self, host: HostId) -> usize {
        host.index() / self.group_size
    }

    fn hosts_in_group(&self, group: usize, num_hosts: usize) -> Vec<HostId> {
        let start = group * self.group_size;
        let end = (start + self.group_size).min(num_hosts);
        (start..end).map(HostId).collect()
    }
}

impl PlacementPolicy for Han {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let num_hosts = ctx.hosts.len();

        // (1) Hosts in active groups already hosting this subscription with
        // fewer than n_star of its VMs present.
        let under_cap: Vec<HostId> = self
            .active_groups
            .iter()
            .flat_map(|&g| self.hosts_in_group(g, num_hosts))
            .filter(|&h| {
                let host = &ctx.hosts[h.index()];
                host.has_capacity(vm.cores, vm.memory)
                    && host
                        .current_sub_counts
                        .get(&vm.subscription)
                        .is_some_and(|&c| c > 0 && c < self.n_star)
            })
            .collect();
        if let Some(pick) = ctx.pick_random(&under_cap) {
            return Some(pick);
        }

        // (2) NPSS: hosts in active groups never hosting this subscription.
        // Pick the lowest-numbered such host's group, then within that
        // group maximize free_cores.
        let mut active_sorted: Vec<usize> = self.active_groups.iter().copied().collect();
        active_sorted.sort_unstable();
        for g in active_sorted {
            let group_hosts = self.hosts_in_group(g, num_hosts);
            let npss: Vec<HostId> = group_hosts
                .iter()
                .copied()
                .filter(|&h| {
                    let host = &ctx.hosts[h.index()];
                    host.has_capacity(vm.cores, vm.memory) && !host.subs_ever_hosted.contains(&vm.subscription)
                })
                .collect();
            if !npss.is_empty() {
                let best = max_by_free_cores(ctx, &npss);
                if let Some(pick) = ctx.pick_random(&best) {
                    return Some(pick);
                }
            }
        }

        // (3) Activate the lowest-indexed inactive group, pick a random
        // host from it.
        let mut inactive_groups: Vec<usize> = (0..self.num_groups)
            .filter(|g| !self.active_groups.contains(g))
            .collect();
        inactive_groups.sort_unstable();
        for g in inactive_groups {
            let group_hosts = self.hosts_in_group(g, num_hosts);
            let capable: Vec<HostId> = group_hosts
                .iter()
                .copied()
                .filter(|&h| ctx.hosts[h.index()].cores >= vm.cores && ctx.hosts[h.index()].memory >= vm.memory)
                .collect();
            if let Some(pick) = ctx.pick_random(&capable) {
                self.active_groups.insert(g);
                return Some(pick);
            }
        }

        None
    }

    fn on_create(&mut self, ctx: &mut Ctx, host: HostId, _vm: PlacementRequest, _now: i64) {
        if ctx.hosts[host.index()].current_vms.len() == 1 {
            self.non_empty_hosts[self.group_of(host)] += 1;
        }
    }

    fn on_delete(&mut self, ctx: &mut Ctx, host: HostId, _vm: PlacementRequest, now: i64) -> bool {
        let became_empty = ctx.hosts[host.index()].current_vms.is_empty();
        if became_empty {
            let group = self.group_of(host);
            self.non_empty_hosts[group] = self.non_empty_hosts[group].saturating_sub(1);
            if self.non_empty_hosts[group] == 0 {
                self.active_groups.remove(&group);
                let num_hosts = ctx.hosts.len();
                for h in self.hosts_in_group(group, num_hosts) {
                    ctx.deactivate_host(h, now);
                }
            }
        }
        !self.keep_on
    }

    fn owns_initial_activation(&self) -> bool {
        true
    }
}
