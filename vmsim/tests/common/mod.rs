//! Shared helpers for the scenario/invariant integration tests.

use std::collections::HashMap;
use vmsim::placement::PlacementPolicy;
use vmsim::trace::VmRecord;
use vmsim::{Engine, EngineConfig, SimulationOutput};

#[allow(dead_code)]
pub fn rec(vm: &str, sub: &str, created: i64, deleted: i64, cores: i64, memory: f64) -> VmRecord {
    VmRecord {
        vm_id: vm.to_string(),
        subscription_id: sub.to_string(),
        time_created: created,
        time_deleted: deleted,
        cores,
        memory,
        category: String::new(),
        target_vm_id: None,
    }
}

#[allow(dead_code)]
pub fn rec_with_target(vm: &str, sub: &str, created: i64, deleted: i64, cores: i64, memory: f64, target: &str) -> VmRecord {
    let mut r = rec(vm, sub, created, deleted, cores, memory);
    r.target_vm_id = Some(target.to_string());
    r
}

/// Runs `records` through `policy` with every named subscription in
/// `malicious` flagged malicious in set 0 and everyone else benign.
#[allow(dead_code)]
pub fn run_with(config: EngineConfig, policy: Box<dyn PlacementPolicy>, records: &[VmRecord], malicious: &[&str], seed: u64) -> SimulationOutput {
    let malicious_by_subscription: HashMap<String, Vec<bool>> =
        malicious.iter().map(|&s| (s.to_string(), vec![true])).collect();
    let mut engine = Engine::new(config, policy, seed);
    engine.run(records, &malicious_by_subscription).expect("simulation should not error")
}

#[allow(dead_code)]
pub fn find_sub<'a>(output: &'a SimulationOutput, id: &str) -> &'a vmsim::entity::Subscription {
    output
        .subscriptions
        .iter()
        .find(|s| s.external_id == id)
        .unwrap_or_else(|| panic!("subscription {id} not found"))
}

#[allow(dead_code)]
pub fn find_vm<'a>(output: &'a SimulationOutput, id: &str) -> &'a vmsim::entity::Vm {
    output.vms.iter().find(|v| v.external_id == id).unwrap_or_else(|| panic!("vm {id} not found"))
}
