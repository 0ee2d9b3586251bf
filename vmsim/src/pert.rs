//! Beta-PERT sampling interface.
//!
//! LDBR assigns each subscription a probability drawn from a beta-PERT(0,
//! 1, mode, lambda) distribution the first time it places a VM. The
//! concrete distribution (`rand_distr::Beta`) is out of scope for this
//! crate; only the interface lives here, so the core never depends on a
//! distributions crate. `vmsim-cli` supplies the implementation.

use std::fmt;

/// Draws beta-PERT(0, 1, `mode`, `lambda`) samples. Implementations own
/// their randomness; LDBR's generator is seeded independently from the
/// engine's placement stream (`seed + 2`).
pub trait PertSampler: fmt::Debug {
    fn sample(&mut self, mode: f64, lambda: f64) -> f64;
}
