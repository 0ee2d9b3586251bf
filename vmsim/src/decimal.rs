//! Fixed-scale decimal ratios.
//!
//! Every ratio the engine reports (CLRs, safe-time proportions, coverage,
//! core utilization) is rounded to a fixed scale with half-up rounding
//! rather than left as a machine float, so that two runs over the same
//! input produce byte-identical reports regardless of float rounding
//! quirks on the host platform.

use bigdecimal::{BigDecimal, RoundingMode};
use num::BigInt;
use std::fmt;

/// Number of digits after the decimal point every `Ratio` is rounded to.
pub const SCALE: i64 = 10;

/// A ratio in `[0, 1]` (occasionally outside that range for raw counts),
/// rounded to [`SCALE`] digits with half-up rounding at construction time.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ratio(BigDecimal);

impl Ratio {
    pub fn zero() -> Self {
        Self(BigDecimal::from(0))
    }

    pub fn one() -> Self {
        Self(BigDecimal::from(1))
    }

    /// `-1`, the sentinel used for hit-proportion metrics with no targets.
    pub fn sentinel_no_targets() -> Self {
        Self(BigDecimal::from(-1))
    }

    /// Build a ratio from a pair of arbitrary-precision integers, rounding
    /// the quotient to [`SCALE`] digits, half-up. Returns [`Ratio::one`] if
    /// `denominator` is zero, matching the engine's divide-by-zero safe
    /// value convention for "everything was safe" metrics; callers with a
    /// different zero-denominator convention (e.g. the `-1` hit-proportion
    /// sentinel) should special-case before calling this.
    pub fn from_big_fraction(numerator: &BigInt, denominator: &BigInt) -> Self {
        if denominator == &BigInt::from(0) {
            return Self::one();
        }
        let quotient = BigDecimal::from(numerator.clone()) / BigDecimal::from(denominator.clone());
        Self(quotient.with_scale_round(SCALE, RoundingMode::HalfUp))
    }

    pub fn from_counts(numerator: i64, denominator: i64) -> Self {
        Self::from_big_fraction(&BigInt::from(numerator), &BigInt::from(denominator))
    }

    pub fn as_big_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigDecimal::from(0)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ratio({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_at_scale_10() {
        let r = Ratio::from_counts(1, 3);
        assert_eq!(r.to_string(), "0.3333333333");
    }

    #[test]
    fn zero_denominator_is_safe_one() {
        let r = Ratio::from_counts(5, 0);
        assert_eq!(r, Ratio::one());
    }

    #[test]
    fn exact_ratio() {
        let r = Ratio::from_counts(1, 2);
        assert_eq!(r.to_string(), "0.5000000000");
    }
}
