use crate::ids::{SubscriptionId, VmId};
use std::collections::{HashMap, HashSet};

/// A tenant: the owner of one or more VMs across the lifetime of the trace.
/// Created lazily on the first VM of its id, destroyed only at process end.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subscription {
    pub external_id: String,
    pub time_first_vm_created: i64,

    /// One flag per configured malicious set.
    pub malicious: Vec<bool>,

    pub current_vms: HashSet<VmId>,
    /// Every VM ever owned, in creation order (includes currently-owned).
    pub total_vms: Vec<VmId>,

    /// Every other subscription ever co-resident with one of ours, on any
    /// host, at any time. Symmetric: `a.seen_subs.contains(b) <=>
    /// b.seen_subs.contains(a)`.
    pub seen_subs: HashSet<SubscriptionId>,
    /// Monotonic: once true for set `m`, stays true.
    pub exposed_to_malicious_sub: Vec<bool>,

    /// Total time this subscription had >= 1 running VM. Tracked
    /// incrementally: `active_since` is `Some` while `current_vms` is
    /// non-empty.
    pub active_time: i64,
    active_since: Option<i64>,

    /// Total time some VM of ours overlapped with some VM of `other` on any
    /// host. See DESIGN.md for the exact accrual semantics chosen (the
    /// source spec names the field but not its precise update rule, and no
    /// published metric consumes it).
    pub coresident_time: HashMap<SubscriptionId, i64>,
    /// Count of hosts currently shared with `other` (both subscriptions
    /// have >= 1 resident VM there right now).
    pub currently_cores_subs: HashMap<SubscriptionId, i32>,

    /// Present only when the loaded trace carries `target_vm_id` data:
    /// whether each of our VMs that is named as a target has been hit.
    pub target_vms: Option<HashMap<VmId, bool>>,
    /// Whether each subscription that owns one of our targeted VMs has
    /// landed at least one hit against us.
    pub target_subscriptions: Option<HashMap<SubscriptionId, bool>>,
}

impl Subscription {
    pub fn new(external_id: String, time_first_vm_created: i64, malicious_sets: usize) -> Self {
        Subscription {
            external_id,
            time_first_vm_created,
            malicious: vec![false; malicious_sets],
            current_vms: HashSet::new(),
            total_vms: Vec::new(),
            seen_subs: HashSet::new(),
            exposed_to_malicious_sub: vec![false; malicious_sets],
            active_time: 0,
            active_since: None,
            coresident_time: HashMap::new(),
            currently_cores_subs: HashMap::new(),
            target_vms: None,
            target_subscriptions: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.current_vms.is_empty()
    }

    pub fn on_vm_created(&mut self, vm: VmId, now: i64) {
        self.total_vms.push(vm);
        let was_active = self.is_active();
        self.current_vms.insert(vm);
        if !was_active {
            self.active_since = Some(now);
        }
    }

    pub fn on_vm_deleted(&mut self, vm: VmId, now: i64) {
        self.current_vms.remove(&vm);
        if self.current_vms.is_empty() {
            if let Some(since) = self.active_since.take() {
                self.active_time += now - since;
            }
        }
    }

    /// Flush the in-progress active-time span as of `now`, without closing
    /// it, for a mid-run snapshot (e.g. interval metrics or end-of-trace
    /// totals where the subscription is still active).
    pub fn active_time_as_of(&self, now: i64) -> i64 {
        match self.active_since {
            Some(since) => self.active_time + (now - since),
            None => self.active_time,
        }
    }
}
