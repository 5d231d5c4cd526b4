//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// One controlled agent (a logged-in character).  Stable across reconnects.
    pub struct AgentId(u32);
}

typed_id! {
    /// A world entity as reported by the world server.  Only unique within
    /// one shard; never persisted by the core.
    pub struct EntityId(u64);
}

typed_id! {
    /// An ability whose cooldown the world server reports (attack, area
    /// burst, donation, …).  Meaning is defined by the application.
    pub struct AbilityId(u16);
}

typed_id! {
    /// Identity of a constructed strategy.  Allocated once per strategy
    /// object; two strategies with identical loops still differ.
    pub struct StrategyId(u32);
}

static NEXT_STRATEGY: AtomicU32 = AtomicU32::new(0);

impl StrategyId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        StrategyId(NEXT_STRATEGY.fetch_add(1, Ordering::Relaxed))
    }
}
