//! The entity model: [`Host`], [`Vm`], [`Subscription`].
//!
//! The three arenas live on [`crate::engine::Engine`] as plain `Vec`s,
//! indexed by the newtypes in [`crate::ids`]. Cross-entity references
//! (VM -> Host, VM -> Subscription, Subscription -> Subscription) are those
//! indices, not owning pointers, since the reference graph is cyclic and no
//! entity is ever freed mid-run.

mod host;
mod subscription;
mod vm;

pub use host::{Host, MaliciousPeriods};
pub use subscription::Subscription;
pub use vm::Vm;
