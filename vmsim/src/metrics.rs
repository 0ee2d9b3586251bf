//! Aggregate and interval metric computations over final (or snapshot)
//! entity state, including the divide-by-zero conventions for each ratio.

use crate::decimal::Ratio;
use crate::entity::{Host, Subscription, Vm};
use crate::ids::MaliciousSet;
use crate::intervals::IntervalSet;
use crate::ticks::BigInt;

/// Co-location leakage rates for one malicious set: the fraction of benign
/// entities that were *not* exposed to a malicious-in-set peer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClrMetrics {
    pub user_clr: Ratio,
    pub vm_clr: Ratio,
    pub unsafe_sub_vm_clr: Ratio,
}

/// `(|B| - |X|) / |B|`, or the safe value `1` if `B` is empty.
fn safety_ratio(benign: i64, exposed: i64) -> Ratio {
    if benign == 0 {
        Ratio::one()
    } else {
        Ratio::from_counts(benign - exposed, benign)
    }
}

pub fn clr(subscriptions: &[Subscription], vms: &[Vm], m: MaliciousSet) -> ClrMetrics {
    let mut benign_subs = 0i64;
    let mut exposed_subs = 0i64;
    for sub in subscriptions {
        if sub.malicious[m] {
            continue;
        }
        benign_subs += 1;
        if sub.exposed_to_malicious_sub[m] {
            exposed_subs += 1;
        }
    }
    let user_clr = safety_ratio(benign_subs, exposed_subs);

    let mut benign_vms = 0i64;
    let mut exposed_vms = 0i64;
    let mut unsafe_sub_benign_vms = 0i64;
    let mut unsafe_sub_exposed_vms = 0i64;
    for vm in vms {
        let sub = &subscriptions[vm.subscription.index()];
        if sub.malicious[m] {
            continue;
        }
        benign_vms += 1;
        let was_colocated = vm.was_colocated_with_malicious[m];
        if was_colocated {
            exposed_vms += 1;
        }
        if sub.exposed_to_malicious_sub[m] {
            unsafe_sub_benign_vms += 1;
            if was_colocated {
                unsafe_sub_exposed_vms += 1;
            }
        }
    }
    let vm_clr = safety_ratio(benign_vms, exposed_vms);
    let unsafe_sub_vm_clr = safety_ratio(unsafe_sub_benign_vms, unsafe_sub_exposed_vms);

    ClrMetrics {
        user_clr,
        vm_clr,
        unsafe_sub_vm_clr,
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SafeTimeMetrics {
    pub safe_vm_time: Ratio,
    pub unsafe_sub_safe_vm_time: Ratio,
    pub safe_sub_time: Ratio,
}

/// The malicious-period union a single VM is exposed to: its own host's
/// periods for set `m`, clipped to the VM's own lifetime.
fn vm_unsafe_intervals(vm: &Vm, hosts: &[Host], m: MaliciousSet, now: i64) -> IntervalSet {
    let mut set = IntervalSet::new();
    if let Some(host) = vm.first_host {
        for (s, e) in hosts[host.index()].malicious_periods[m].all_with_open_clipped_at(now) {
            let (cs, ce) = (s.max(vm.time_created), e.min(vm.time_deleted));
            set.insert(cs, ce);
        }
    }
    set
}

pub fn safe_time(
    subscriptions: &[Subscription],
    vms: &[Vm],
    hosts: &[Host],
    m: MaliciousSet,
    now: i64,
) -> SafeTimeMetrics {
    let mut total_vm_time = 0i64;
    let mut unsafe_vm_time = 0i64;
    let mut unsafe_sub_total_vm_time = 0i64;
    let mut unsafe_sub_unsafe_vm_time = 0i64;

    for vm in vms {
        let sub = &subscriptions[vm.subscription.index()];
        if sub.malicious[m] {
            continue;
        }
        let duration = vm.duration();
        let unsafe_intervals = vm_unsafe_intervals(vm, hosts, m, now);
        let unsafe_time = unsafe_intervals.intersect_len(vm.time_created, vm.time_deleted);

        total_vm_time += duration;
        unsafe_vm_time += unsafe_time;
        if sub.exposed_to_malicious_sub[m] {
            unsafe_sub_total_vm_time += duration;
            unsafe_sub_unsafe_vm_time += unsafe_time;
        }
    }

    let safe_vm_time = if total_vm_time == 0 {
        Ratio::one()
    } else {
        Ratio::from_counts(total_vm_time - unsafe_vm_time, total_vm_time)
    };
    let unsafe_sub_safe_vm_time = if unsafe_sub_total_vm_time == 0 {
        Ratio::one()
    } else {
        Ratio::from_counts(
            unsafe_sub_total_vm_time - unsafe_sub_unsafe_vm_time,
            unsafe_sub_total_vm_time,
        )
    };

    let safe_sub_time = safe_subscription_time(subscriptions, vms, hosts, m, now);

    SafeTimeMetrics {
        safe_vm_time,
        unsafe_sub_safe_vm_time,
        safe_sub_time,
    }
}

/// Per benign subscription: union of its VMs' own lifetimes ("active
/// time") vs. the union of each VM's own malicious-period exposure
/// (clipped to that VM's lifetime before unioning, so two VMs of the same
/// subscription with overlapping exposure windows aren't double-counted),
/// averaged ratio-of-ratios is *not* used; this sums raw time across all
/// benign subscriptions and takes one ratio, consistent with the VM-time
/// metrics above.
fn safe_subscription_time(
    subscriptions: &[Subscription],
    vms: &[Vm],
    hosts: &[Host],
    m: MaliciousSet,
    now: i64,
) -> Ratio {
    let mut total_active = 0i64;
    let mut total_unsafe = 0i64;

    for sub in subscriptions {
        if sub.malicious[m] {
            continue;
        }
        let mut active = IntervalSet::new();
        let mut unsafe_union = IntervalSet::new();
        for &vm_id in &sub.total_vms {
            let vm = &vms[vm_id.index()];
            active.insert(vm.time_created, vm.time_deleted);
            for (s, e) in vm_unsafe_intervals(vm, hosts, m, now).as_slice() {
                unsafe_union.insert(*s, *e);
            }
        }
        total_active += active.total_len();
        total_unsafe += unsafe_union.total_len();
    }

    if total_active == 0 {
        Ratio::one()
    } else {
        Ratio::from_counts(total_active - total_unsafe, total_active)
    }
}

/// Fraction of ever-active hosts that ever had a malicious period in `m`.
pub fn coverage(hosts: &[Host], m: MaliciousSet) -> Ratio {
    let mut ever_active = 0i64;
    let mut covered = 0i64;
    for host in hosts {
        let was_ever_active = host.number_of_boots > 0;
        if !was_ever_active {
            continue;
        }
        ever_active += 1;
        if !host.malicious_periods[m].closed.is_empty() || host.malicious_periods[m].is_open() {
            covered += 1;
        }
    }
    if ever_active == 0 {
        Ratio::one()
    } else {
        Ratio::from_counts(covered, ever_active)
    }
}

/// `Σ busy_core_ticks(t) / Σ total_core_ticks(t)`; `1` if the denominator is
/// zero. `ticks_of` selects lifetime or per-interval accumulators so the
/// same function serves both the lifetime and interval metric variants.
pub fn core_utilization(hosts: &[Host], ticks_of: impl Fn(&Host) -> (&BigInt, &BigInt)) -> Ratio {
    let mut busy = BigInt::from(0);
    let mut total = BigInt::from(0);
    for host in hosts {
        let (b, t) = ticks_of(host);
        busy += b;
        total += t;
    }
    Ratio::from_big_fraction(&busy, &total)
}

pub fn core_utilization_lifetime(hosts: &[Host]) -> Ratio {
    core_utilization(hosts, |h| (&h.busy_core_ticks, &h.total_core_ticks))
}

pub fn core_utilization_interval(hosts: &[Host]) -> Ratio {
    core_utilization(hosts, |h| {
        (&h.interval_busy_core_ticks, &h.interval_total_core_ticks)
    })
}
