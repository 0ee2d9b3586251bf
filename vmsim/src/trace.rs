//! Typed trace records and the pure (no I/O) orchestration that sits
//! between "a CSV file" and the engine's event loop.
//!
//! CSV parsing itself is out of scope for this crate: that is
//! `vmsim-cli`'s job. This module owns everything downstream of a typed
//! [`VmRecord`] slice, since sorting it into the engine's two event streams
//! and classifying subscriptions as malicious are core simulation concerns,
//! not I/O.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

/// One VM, as parsed from a trace row. Fields ignored by the CSV schema
/// (deployment_id, max/avg/p95 cpu) are not represented here, since the
/// core never consumes them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VmRecord {
    pub vm_id: String,
    pub subscription_id: String,
    pub time_created: i64,
    pub time_deleted: i64,
    pub cores: i64,
    pub memory: f64,
    pub category: String,
    pub target_vm_id: Option<String>,
}

/// A stable sort of `records` by creation time, and by deletion time,
/// expressed as index permutations into `records`. Creation-before-deletion
/// tie-breaks are applied at consumption time by [`crate::engine::Engine`],
/// not baked into these orders, since the tie-break is about which *event*
/// runs first at a shared timestamp, not about sort order within one
/// stream.
pub fn sort_streams(records: &[VmRecord]) -> (Vec<usize>, Vec<usize>) {
    let mut by_creation: Vec<usize> = (0..records.len()).collect();
    by_creation.sort_by_key(|&i| records[i].time_created);

    let mut by_deletion: Vec<usize> = (0..records.len()).collect();
    by_deletion.sort_by_key(|&i| records[i].time_deleted);

    (by_creation, by_deletion)
}

/// Independent Bernoulli draws, one per subscription per malicious set,
/// seeded directly from `seed`. `subscription_ids` must be in
/// first-seen order so that re-running with the same trace and seed is
/// deterministic regardless of how the caller discovered the id list.
///
/// Subscriptions named in `forced_malicious` are malicious in every set,
/// without consuming a draw (so toggling `forced_malicious` membership for
/// one subscription never perturbs another subscription's draw).
pub fn classify_malicious(
    subscription_ids_in_first_seen_order: &[String],
    malicious_proportions: &[f64],
    forced_malicious: &HashSet<String>,
    seed: u64,
) -> HashMap<String, Vec<bool>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut result = HashMap::with_capacity(subscription_ids_in_first_seen_order.len());
    for id in subscription_ids_in_first_seen_order {
        let forced = forced_malicious.contains(id);
        let flags: Vec<bool> = malicious_proportions
            .iter()
            .map(|&p| forced || rng.random::<f64>() < p)
            .collect();
        result.insert(id.clone(), flags);
    }
    result
}

/// Rewrites the `subscription_id` of every record whose subscription is
/// malicious in *any* configured set to `replacement`, merging what may
/// have been many distinct attacker subscriptions into one synthetic
/// tenant. Applied after sorting, so it never changes event order, only
/// which subscription entity a VM belongs to.
pub fn apply_subscription_rewrite(
    records: &mut [VmRecord],
    malicious_by_subscription: &HashMap<String, Vec<bool>>,
    replacement: &str,
) {
    for record in records.iter_mut() {
        let is_malicious = malicious_by_subscription
            .get(&record.subscription_id)
            .is_some_and(|flags| flags.iter().any(|&b| b));
        if is_malicious {
            record.subscription_id = replacement.to_string();
        }
    }
}

/// Distinct subscription ids from `records`, in first-seen order under the
/// creation-time sort `by_creation`, the order subscriptions would be
/// lazily created in by the engine.
pub fn first_seen_subscription_order(records: &[VmRecord], by_creation: &[usize]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for &i in by_creation {
        let id = &records[i].subscription_id;
        if seen.insert(id.clone()) {
            order.push(id.clone());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(vm: &str, sub: &str, created: i64, deleted: i64) -> VmRecord {
        VmRecord {
            vm_id: vm.to_string(),
            subscription_id: sub.to_string(),
            time_created: created,
            time_deleted: deleted,
            cores: 1,
            memory: 1.0,
            category: String::new(),
            target_vm_id: None,
        }
    }

    #[test]
    fn sort_streams_is_stable_on_ties() {
        let records = vec![rec("v1", "s1", 5, 10), rec("v2", "s2", 5, 3), rec("v3", "s3", 5, 20)];
        let (by_creation, by_deletion) = sort_streams(&records);
        assert_eq!(by_creation, vec![0, 1, 2]);
        assert_eq!(by_deletion, vec![1, 0, 2]);
    }

    #[test]
    fn classify_malicious_is_deterministic_for_a_seed() {
        let ids: Vec<String> = (0..50).map(|i| format!("s{i}")).collect();
        let forced = HashSet::new();
        let a = classify_malicious(&ids, &[0.2], &forced, 42);
        let b = classify_malicious(&ids, &[0.2], &forced, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn forced_malicious_is_always_flagged() {
        let ids = vec!["attacker".to_string(), "benign".to_string()];
        let mut forced = HashSet::new();
        forced.insert("attacker".to_string());
        let flags = classify_malicious(&ids, &[0.0], &forced, 1);
        assert_eq!(flags["attacker"], vec![true]);
    }

    #[test]
    fn rewrite_merges_malicious_subscriptions() {
        let mut records = vec![rec("v1", "s1", 0, 1), rec("v2", "s2", 0, 1), rec("v3", "s3", 0, 1)];
        let mut malicious = HashMap::new();
        malicious.insert("s1".to_string(), vec![true]);
        malicious.insert("s2".to_string(), vec![false]);
        malicious.insert("s3".to_string(), vec![true]);
        apply_subscription_rewrite(&mut records, &malicious, "ATTACKER");
        assert_eq!(records[0].subscription_id, "ATTACKER");
        assert_eq!(records[1].subscription_id, "s2");
        assert_eq!(records[2].subscription_id, "ATTACKER");
    }
}
