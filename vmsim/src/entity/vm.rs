use crate::ids::{HostId, SubscriptionId, VmId};

/// A virtual machine. Exists on exactly one host at a time while between
/// `time_created` and `time_deleted`; `time_created == time_deleted` is a
/// valid, instantaneous VM.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vm {
    pub external_id: String,
    pub subscription: SubscriptionId,

    pub time_created: i64,
    pub time_deleted: i64,

    pub cores: i64,
    pub memory: f64,
    pub category: String,

    /// External id of the target VM this one is attacking, if the trace
    /// supplied a `target_vm_id` column for it.
    pub target_vm_external_id: Option<String>,
    /// Resolved once the target's external id has been seen in the trace.
    pub target_vm: Option<VmId>,
    pub hit_target: bool,

    pub was_colocated_with_malicious: Vec<bool>,

    pub current_host: Option<HostId>,
    pub first_host: Option<HostId>,
}

impl Vm {
    pub fn duration(&self) -> i64 {
        self.time_deleted - self.time_created
    }
}
