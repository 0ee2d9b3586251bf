//! The concrete beta-PERT sampler LDBR draws from. `vmsim` only defines
//! the [`vmsim::pert::PertSampler`] interface; this is the one real
//! distribution behind it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Beta, Distribution};
use vmsim::pert::PertSampler;

/// Draws from `Beta(alpha, beta)` where `alpha = 1 + lambda * mode` and
/// `beta = 1 + lambda * (1 - mode)`, the standard PERT(0, 1, mode, lambda)
/// to beta-shape conversion with `min = 0`, `max = 1`, so the draw needs no
/// rescaling.
#[derive(Debug)]
pub struct BetaPertSampler {
    rng: StdRng,
}

impl BetaPertSampler {
    /// `seed` should already be the engine's independent LDBR stream seed
    /// (`seed + 2`), resolved by the caller.
    pub fn new(seed: u64) -> Self {
        BetaPertSampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PertSampler for BetaPertSampler {
    fn sample(&mut self, mode: f64, lambda: f64) -> f64 {
        let alpha = 1.0 + lambda * mode;
        let beta = 1.0 + lambda * (1.0 - mode);
        let dist = Beta::new(alpha, beta).expect("alpha/beta are positive for mode in [0,1] and lambda >= 0");
        dist.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_in_unit_interval() {
        let mut sampler = BetaPertSampler::new(7);
        for _ in 0..100 {
            let p = sampler.sample(0.9, 3.0);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn is_deterministic_for_a_seed() {
        let mut a = BetaPertSampler::new(99);
        let mut b = BetaPertSampler::new(99);
        for _ in 0..20 {
            assert_eq!(a.sample(0.1, 3.0), b.sample(0.1, 3.0));
        }
    }
}
