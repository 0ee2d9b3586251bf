//! Tick accumulator helpers.
//!
//! A "tick" is one unit of time x capacity. Busy/total core-tick
//! accumulators on a host are `time_elapsed * cores`, and the sum across
//! 200,000 hosts over a multi-year trace overflows a 64-bit integer, so
//! accumulators are `num::BigInt` rather than `i64`.

pub use num::BigInt;

/// `cores * duration`, promoted to an arbitrary-precision integer before
/// multiplying so the product never overflows regardless of trace size.
pub fn core_ticks(cores: i64, duration: i64) -> BigInt {
    BigInt::from(cores) * BigInt::from(duration)
}
