use super::{Ctx, PlacementPolicy, PlacementRequest};
use crate::ids::{HostId, SubscriptionId};
use crate::pert::PertSampler;
use std::collections::HashMap;
use std::fmt;

/// Each subscription draws a probability from a beta-PERT(0, 1, `mode`,
/// `lambda`) distribution the first time it places a VM: malicious
/// subscriptions draw with `pert_mode`, benign ones with the complementary
/// `1 - pert_mode`. The sampler's own generator is seeded independently of
/// the engine's placement stream, so these draws don't perturb other
/// policies' results when replayed. Construction requires exactly one
/// malicious set, enforced by [`super::build`].
pub struct Ldbr {
    sampler: Box<dyn PertSampler>,
    mode: f64,
    lambda: f64,
    probabilities: HashMap<SubscriptionId, f64>,
}

impl fmt::Debug for Ldbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ldbr")
            .field("mode", &self.mode)
            .field("lambda", &self.lambda)
            .field("assigned", &self.probabilities.len())
            .finish()
    }
}

impl Ldbr {
    pub fn new(sampler: Box<dyn PertSampler>, mode: f64, lambda: f64) -> Self {
        Ldbr {
            sampler,
            mode,
            lambda,
            probabilities: HashMap::new(),
        }
    }

    fn probability_of(&mut self, ctx: &Ctx, sub: SubscriptionId) -> f64 {
        if let Some(&p) = self.probabilities.get(&sub) {
            return p;
        }
        let malicious = ctx.subscriptions[sub.index()].malicious[0];
        let mode = if malicious { self.mode } else { 1.0 - self.mode };
        let p = self.sampler.sample(mode, self.lambda);
        self.probabilities.insert(sub, p);
        p
    }

    /// `E = n * prod(p_s) * (1 - p_new) + (1 - prod(p_s)) * p_new`, where
    /// `n` is the host's current VM count and the product runs over the
    /// probabilities of the subscriptions owning those VMs.
    fn score(&mut self, ctx: &Ctx, host: HostId, p_new: f64) -> f64 {
        let current_vms = ctx.hosts[host.index()].current_vms.clone();
        let n = current_vms.len() as f64;
        let mut product = 1.0;
        for vm_id in current_vms {
            let sub = ctx.vms[vm_id.index()].subscription;
            product *= self.probability_of(ctx, sub);
        }
        n * product * (1.0 - p_new) + (1.0 - product) * p_new
    }
}

impl PlacementPolicy for Ldbr {
    fn pick_host(&mut self, ctx: &mut Ctx, vm: PlacementRequest) -> Option<HostId> {
        let e = ctx.eligible_active(vm.cores, vm.memory);
        if e.is_empty() {
            return ctx.pick_empty_host(vm.cores, vm.memory);
        }

        let p_new = self.probability_of(&*ctx, vm.subscription);

        let mut best_score = f64::INFINITY;
        let mut scored = Vec::with_capacity(e.len());
        for &h in &e {
            let s = self.score(&*ctx, h, p_new);
            best_score = best_score.min(s);
            scored.push((h, s));
        }
        let tied: Vec<HostId> = scored.into_iter().filter(|(_, s)| *s == best_score).map(|(h, _)| h).collect();
        ctx.pick_random(&tied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Host, Subscription, Vm};
    use crate::ids::VmId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug)]
    struct FixedSampler(f64);
    impl PertSampler for FixedSampler {
        fn sample(&mut self, mode: f64, _lambda: f64) -> f64 {
            // Mirrors the mode exactly so the test can reason about scores
            // without depending on a real PERT implementation.
            mode.min(self.0)
        }
    }

    fn sub(malicious: bool) -> Subscription {
        let mut s = Subscription::new("s".into(), 0, 1);
        s.malicious[0] = malicious;
        s
    }

    fn vm(subscription: SubscriptionId) -> Vm {
        Vm {
            external_id: "v".into(),
            subscription,
            time_created: 0,
            time_deleted: 10,
            cores: 1,
            memory: 1.0,
            category: String::new(),
            target_vm_external_id: None,
            target_vm: None,
            hit_target: false,
            was_colocated_with_malicious: vec![false],
            current_host: None,
            first_host: None,
        }
    }

    #[test]
    fn prefers_the_benign_only_host_over_the_malicious_one() {
        let subscriptions = vec![sub(false), sub(true), sub(false)];
        let mut hosts = vec![Host::new(8, 16.0, 1), Host::new(8, 16.0, 1)];
        hosts[0].boot(0);
        hosts[1].boot(0);
        hosts[0].current_vms.push(VmId(0));
        hosts[1].current_vms.push(VmId(1));
        let vms = vec![vm(SubscriptionId(0)), vm(SubscriptionId(1))];
        let mut rng = StdRng::seed_from_u64(1);
        let mut activity = super::super::HostActivityCounters::default();

        let mut policy = Ldbr::new(Box::new(FixedSampler(1.0)), 0.9, 3.0);
        let mut ctx = Ctx {
            hosts: &mut hosts,
            subscriptions: &subscriptions,
            vms: &vms,
            rng: &mut rng,
            host_activity: &mut activity,
        };
        let req = PlacementRequest {
            cores: 1,
            memory: 1.0,
            subscription: SubscriptionId(2),
        };
        let picked = policy.pick_host(&mut ctx, req).unwrap();
        assert_eq!(picked, HostId(0));
    }
}
