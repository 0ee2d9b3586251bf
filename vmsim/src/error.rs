//! The engine's structured error type.
//!
//! A precise `derive_more` error enum with a hand-written `Display`,
//! surfaced to callers wrapped in `anyhow::Result` (see [`crate::Result`])
//! so front-ends can add file/line context with `.context(...)` without
//! the core crate depending on `anyhow`'s dynamic error type internally.

use crate::ids::HostId;
use derive_more::Error;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Error)]
pub enum SimError {
    /// An event arrived with a timestamp earlier than the last event
    /// processed on the same host. The trace is malformed.
    OutOfOrderEvent {
        host: HostId,
        last_event: i64,
        new_event: i64,
    },
    /// A VM could not be placed: no active host had capacity, and an empty
    /// inactive host (or a fresh group, for Han) also lacked capacity or
    /// did not exist. The trace exceeds simulated capacity.
    CapacityExhausted { vm_cores: i64, vm_memory: f64 },
    /// `pick_host` returned a host lacking capacity for the VM, which would
    /// be a placement-policy bug rather than a malformed trace.
    PlacementViolatesCapacity { host: HostId },
    /// LDBR requires exactly one malicious set.
    LdbrRequiresSingleMaliciousSet { malicious_sets: usize },
    /// The beta-PERT `pert_mode` parameter must lie in `[0, 1]`.
    PertModeOutOfRange { pert_mode: f64 },
    /// `shutdown` was called on a host that still has VMs resident.
    ShutdownOfNonEmptyHost { host: HostId, resident_vms: usize },
    /// Duplicate `vm_id` within a single loaded trace.
    DuplicateVmId { vm_id: String },
    /// An algorithm tag did not match any known placement policy.
    UnknownAlgorithm { tag: String },
}

impl Display for SimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SimError::OutOfOrderEvent {
                host,
                last_event,
                new_event,
            } => write!(
                f,
                "host {host} received event at t={new_event}, before its last event at t={last_event}"
            ),
            SimError::CapacityExhausted { vm_cores, vm_memory } => write!(
                f,
                "no host (active or inactive) has capacity for a VM requesting {vm_cores} cores / {vm_memory} GiB"
            ),
            SimError::PlacementViolatesCapacity { host } => write!(
                f,
                "placement policy returned host {host}, which lacks capacity for the VM"
            ),
            SimError::LdbrRequiresSingleMaliciousSet { malicious_sets } => write!(
                f,
                "LDBR supports exactly one malicious set, but {malicious_sets} are configured"
            ),
            SimError::PertModeOutOfRange { pert_mode } => {
                write!(f, "pert_mode must be in [0, 1], got {pert_mode}")
            }
            SimError::ShutdownOfNonEmptyHost { host, resident_vms } => write!(
                f,
                "attempted to shut down host {host} while it still hosts {resident_vms} VM(s)"
            ),
            SimError::DuplicateVmId { vm_id } => {
                write!(f, "duplicate vm_id `{vm_id}` in trace")
            }
            SimError::UnknownAlgorithm { tag } => {
                write!(f, "unknown placement algorithm `{tag}`")
            }
        }
    }
}
