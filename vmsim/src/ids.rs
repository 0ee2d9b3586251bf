//! Stable integer identities for the three entity arenas.
//!
//! The entity graph is cyclic (VM <-> Host, VM <-> Subscription, Subscription
//! <-> Subscription via `seen_subs`), so entities reference each other through
//! these newtypes over arena indices rather than through owning pointers. No
//! entity is ever freed mid-run, so an id is valid for the lifetime of the
//! `Engine` that produced it.

use std::fmt;

macro_rules! entity_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub usize);

        impl $name {
            /// The raw arena index backing this id.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(HostId, "Index into `Engine::hosts`.");
entity_id!(VmId, "Index into `Engine::vms`.");
entity_id!(SubscriptionId, "Index into `Engine::subscriptions`.");

/// Index into the runtime-configured `malicious_proportions` list. Every
/// per-malicious-set field on an entity is a `Vec` sized to this count rather
/// than a fixed-size array.
pub type MaliciousSet = usize;
