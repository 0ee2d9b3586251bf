//! # vmsim
//!
//! A discrete event simulator of VM placement strategies and the
//! co-residency "leakage" they expose to an adversarial tenant.
//!
//! The engine ([`engine::Engine`]) merges a trace's creation and deletion
//! streams into a single ordered sequence of entity mutations, dispatching
//! every placement decision through a pluggable [`placement::PlacementPolicy`]
//! trait object. Entities ([`entity::Host`], [`entity::Vm`],
//! [`entity::Subscription`]) live in index-keyed arenas and reference each
//! other only through the stable integer ids in [`ids`], since the reference
//! graph between them is cyclic.
//!
//! Trace parsing, CLI argument handling, report writing, and the concrete
//! beta-PERT sampler used by the LDBR policy are out of scope for this crate;
//! they live in the `vmsim-cli` and `vmsim-workload-gen` binaries built on
//! top of this library's public API.

pub mod decimal;
pub mod entity;
pub mod error;
pub mod ids;
pub mod intervals;
pub mod metrics;
pub mod pert;
pub mod placement;
pub mod ticks;
pub mod trace;

mod engine;

pub use engine::{
    EngineConfig, Engine, Hit, IntervalPoint, MaliciousEvent, MaliciousSetReport, SimulationOutput, Summary,
};
pub use error::SimError;

/// The crate's top-level result alias. The core never depends on `anyhow`'s
/// dynamic error type internally; front-ends add file/line context with
/// `.context(...)` on top of this.
pub type Result<T> = anyhow::Result<T>;
