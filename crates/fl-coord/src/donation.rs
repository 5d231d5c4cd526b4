//! Resource donation between friends.
//!
//! # Recipient choice
//!
//! A donor that can use its donation ability picks, among its friends, the
//! one with the lowest pool ratio that is
//!
//! * not the donor,
//! * connected,
//! * within the ability's range,
//! * short of resource (`deficit > 0`),
//! * not given to by this donor within the per-pair cooldown.
//!
//! ```text
//! amount = min(clamp(deficit, min_amount, max_amount), deficit, donor.current)
//! ```
//!
//! At most one donation is attempted per call.  The per-pair timestamps live
//! in a [`DonationLedger`] shared by every agent of a fleet, so a pair is
//! throttled no matter which side started the exchange.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::time::Instant;
use tracing::{debug, warn};

use fl_agent::{Action, ActionResult, AgentHandle, SharedHandle};
use fl_core::{AbilityId, AgentId, DonationConfig};

use crate::FriendSet;

// ── Policy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct DonationPolicy {
    pub ability:       AbilityId,
    /// Maximum donor–recipient distance.
    pub range:         f32,
    pub pair_cooldown: Duration,
    pub min_amount:    u32,
    pub max_amount:    u32,
}

impl DonationPolicy {
    pub fn from_config(config: &DonationConfig, ability: AbilityId, range: f32) -> Self {
        Self {
            ability,
            range,
            pair_cooldown: Duration::from_millis(config.pair_cooldown_ms),
            min_amount:    config.min_amount,
            max_amount:    config.max_amount,
        }
    }

    /// Amount to give a recipient short by `deficit` from a donor holding
    /// `available`.
    pub fn amount(&self, deficit: u32, available: u32) -> u32 {
        deficit
            .clamp(self.min_amount, self.max_amount.max(self.min_amount))
            .min(deficit)
            .min(available)
    }
}

// ── Ledger ────────────────────────────────────────────────────────────────────

/// Last donation time per `(donor, recipient)` pair.
#[derive(Default, Debug)]
pub struct DonationLedger {
    last: Mutex<FxHashMap<(AgentId, AgentId), Instant>>,
}

impl DonationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, donor: AgentId, recipient: AgentId, at: Instant) {
        self.last.lock().insert((donor, recipient), at);
    }

    /// `true` when the pair has not exchanged within `cooldown` of `now`.
    pub fn is_clear(&self, donor: AgentId, recipient: AgentId, now: Instant, cooldown: Duration) -> bool {
        self.last
            .lock()
            .get(&(donor, recipient))
            .is_none_or(|at| now.saturating_duration_since(*at) >= cooldown)
    }
}

// ── Donor ─────────────────────────────────────────────────────────────────────

/// A decided donation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DonationPlan {
    pub donor:     AgentId,
    pub recipient: AgentId,
    pub amount:    u32,
}

/// Runs the donation protocol for one agent against its friend set.
#[derive(Clone, Debug)]
pub struct Donor {
    friends: FriendSet,
    policy:  DonationPolicy,
    ledger:  Arc<DonationLedger>,
}

impl Donor {
    pub fn new(friends: FriendSet, policy: DonationPolicy, ledger: Arc<DonationLedger>) -> Self {
        Self { friends, policy, ledger }
    }

    pub fn policy(&self) -> &DonationPolicy {
        &self.policy
    }

    /// Decide whether `donor` should give to a friend right now.
    pub fn plan(&self, donor: &dyn AgentHandle, now: Instant) -> Option<DonationPlan> {
        if !donor.can_use(self.policy.ability) {
            return None;
        }
        let available = donor.pool().current;
        let here = donor.position();

        self.friends
            .handles(donor.id())
            .into_iter()
            .filter(|f| f.is_connected())
            .filter(|f| f.pool().deficit() > 0)
            .filter(|f| here.within(f.position(), self.policy.range))
            .filter(|f| self.ledger.is_clear(donor.id(), f.id(), now, self.policy.pair_cooldown))
            .min_by(|a, b| {
                a.pool().ratio().partial_cmp(&b.pool().ratio()).unwrap_or(Ordering::Equal)
            })
            .map(|f| DonationPlan {
                donor:     donor.id(),
                recipient: f.id(),
                amount:    self.policy.amount(f.pool().deficit(), available),
            })
            .filter(|p| p.amount > 0)
    }

    /// Plan and perform at most one donation from `donor`.
    pub async fn donate_once(&self, donor: &SharedHandle) -> ActionResult<Option<DonationPlan>> {
        let Some(plan) = self.plan(donor.as_ref(), Instant::now()) else {
            return Ok(None);
        };
        self.execute(donor, plan).await.map(Some)
    }

    /// Ask the first friend able to donate to `recipient` to do so.  Used by
    /// agents that want a boost before a fight.
    pub async fn request_for(&self, recipient: &SharedHandle) -> ActionResult<Option<DonationPlan>> {
        let now = Instant::now();
        let me = recipient.id();
        let deficit = recipient.pool().deficit();
        if deficit == 0 {
            return Ok(None);
        }

        let found = self.friends.handles(me).into_iter().find_map(|friend| {
            let usable = friend.is_connected()
                && friend.can_use(self.policy.ability)
                && friend.position().within(recipient.position(), self.policy.range)
                && self.ledger.is_clear(friend.id(), me, now, self.policy.pair_cooldown);
            let amount = self.policy.amount(deficit, friend.pool().current);
            (usable && amount > 0).then(|| {
                (friend.clone(), DonationPlan { donor: friend.id(), recipient: me, amount })
            })
        });

        match found {
            Some((friend, plan)) => self.execute(&friend, plan).await.map(Some),
            None => Ok(None),
        }
    }

    async fn execute(&self, donor: &SharedHandle, plan: DonationPlan) -> ActionResult<DonationPlan> {
        let action = Action::Donate { ability: self.policy.ability, to: plan.recipient, amount: plan.amount };
        match donor.perform(action).await {
            Ok(_) => {
                self.ledger.record(plan.donor, plan.recipient, Instant::now());
                debug!(donor = %plan.donor, recipient = %plan.recipient, amount = plan.amount, "donated");
                Ok(plan)
            }
            Err(e) => {
                warn!(donor = %plan.donor, recipient = %plan.recipient, error = %e, "donation failed");
                Err(e)
            }
        }
    }
}
