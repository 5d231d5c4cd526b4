//! `fl-coord` — cooperation between independently scheduled agents.
//!
//! Two narrow operations are the only writes one agent makes to another's
//! state:
//!
//! | Operation        | Module       | Effect on the friend                          |
//! |------------------|--------------|-----------------------------------------------|
//! | de-duplication   | [`dedup`]    | deletes one entity from its `VisibilityCache`  |
//! | donation         | [`donation`] | receives resource through a `Donate` action    |
//!
//! Neither takes a lock across agents.  A friend may be mid-decision on a
//! stale snapshot; the worst outcome of such a race is one wasted action.
//!
//! Friends are held through [`FriendSet`], a list of `Weak<AgentSlot>`
//! injected at strategy construction.  Reading through the slot means a
//! friend's reconnect is picked up without re-wiring.

pub mod dedup;
pub mod donation;
pub mod friends;


pub use dedup::Deduplicator;
pub use donation::{DonationLedger, DonationPlan, DonationPolicy, Donor};
pub use friends::FriendSet;
