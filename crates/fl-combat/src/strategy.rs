//! `CombatStrategy` — the attack (and optional donate) loops built from the
//! prioritizer, the allocator and the coordination protocol.
//!
//! # One attack fire
//!
//! 1. Capture a [`CombatContext`] (kind-filtered, in range, not doomed by
//!    projectiles).
//! 2. If the area ability is ready, allocate.  A non-empty allocation claims
//!    its kills across friends and is issued as one `AreaEffect`; the ledger
//!    commits on success and rolls back on failure.
//! 3. If the basic attack is ready, rank what is left.  If one attack
//!    finishes the top target, claim it.  Ask a friend for a donation when
//!    not boosted, then attack.
//!
//! # Usage
//!
//! ```rust,ignore
//! let combat = CombatStrategy::builder(ATTACK)
//!     .kinds(["goo", "bee"])
//!     .area(BURST, AllocatorConfig::default())
//!     .dedup(Deduplicator::new(friends.clone()))
//!     .donor(donor)
//!     .build()?;
//! strategist.apply(combat).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use fl_agent::{Action, ActionResult, AgentHandle, SharedHandle};
use fl_coord::{Deduplicator, Donor, FriendSet};
use fl_core::{AbilityId, EntityKind};
use fl_schedule::{Interval, Loop, LoopName, Strategy};

use crate::{AllocatorConfig, BudgetAllocator, CombatContext, CombatError, CombatResult, TargetPrioritizer};

// ── Plan ──────────────────────────────────────────────────────────────────────

/// Shared, immutable decision state captured by the loop closures.
struct CombatPlan {
    attack:      AbilityId,
    area:        Option<(AbilityId, BudgetAllocator)>,
    prioritizer: TargetPrioritizer,
    dedup:       Deduplicator,
    donor:       Option<Donor>,
}

impl CombatPlan {
    async fn attack_once(&self, agent: SharedHandle) -> ActionResult<()> {
        let mut ctx = CombatContext::capture(agent.as_ref(), self.prioritizer.kinds());
        if ctx.candidates.is_empty() {
            return Ok(());
        }

        if let Some((ability, allocator)) = &self.area {
            if agent.can_use(*ability) {
                let mut allocation = allocator.allocate(&ctx, &self.prioritizer);
                if !allocation.is_empty() {
                    let kills = allocation.picks().iter().filter(|p| p.is_kill()).map(|p| &p.candidate);
                    self.dedup.claim_all(ctx.agent, kills);

                    let action = Action::AreaEffect { ability: *ability, targets: allocation.targets() };
                    match agent.perform(action).await {
                        Ok(_) => {
                            let spent = allocation.commit();
                            debug!(agent = %ctx.agent, targets = allocation.picks().len(), spent, "area effect");
                        }
                        Err(e) => {
                            allocation.rollback();
                            return Err(e);
                        }
                    }
                    ctx.candidates.retain(|c| !allocation.picks().iter().any(|p| p.candidate.id == c.id));
                }
            }
        }

        // Claims and donation requests only precede an attack that is issued.
        if !agent.can_use(self.attack) {
            return Ok(());
        }
        let Some(target) = self.prioritizer.best(ctx.position, ctx.candidates.iter()).cloned() else {
            return Ok(());
        };
        if target.hp <= ctx.attack_damage {
            self.dedup.claim(ctx.agent, &target);
        }
        if let Some(donor) = &self.donor {
            if !agent.is_boosted() {
                if let Err(e) = donor.request_for(&agent).await {
                    warn!(agent = %ctx.agent, error = %e, "donation request failed");
                }
            }
        }
        agent.perform(Action::Attack { target: target.id }).await.map(|_| ())
    }

    async fn donate_once(&self, agent: SharedHandle) -> ActionResult<()> {
        match &self.donor {
            Some(donor) => donor.donate_once(&agent).await.map(|_| ()),
            None => Ok(()),
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

pub struct CombatStrategy;

impl CombatStrategy {
    pub fn builder(attack: AbilityId) -> CombatStrategyBuilder {
        CombatStrategyBuilder::new(attack)
    }
}

pub struct CombatStrategyBuilder {
    label:          String,
    attack:         AbilityId,
    kinds:          Vec<EntityKind>,
    area:           Option<(AbilityId, AllocatorConfig)>,
    dedup:          Option<Deduplicator>,
    donor:          Option<Donor>,
    donate_every:   Option<Duration>,
}

impl CombatStrategyBuilder {
    pub fn new(attack: AbilityId) -> Self {
        Self {
            label: "combat".to_owned(),
            attack,
            kinds: Vec::new(),
            area: None,
            dedup: None,
            donor: None,
            donate_every: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Kind priority list, most wanted first.  Also filters targets; an
    /// empty list accepts every kind.
    pub fn kinds<I, K>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<EntityKind>,
    {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Enable the batched area effect.
    pub fn area(mut self, ability: AbilityId, config: AllocatorConfig) -> Self {
        self.area = Some((ability, config));
        self
    }

    pub fn dedup(mut self, dedup: Deduplicator) -> Self {
        self.dedup = Some(dedup);
        self
    }

    /// Request donations before attacking when not boosted.
    pub fn donor(mut self, donor: Donor) -> Self {
        self.donor = Some(donor);
        self
    }

    /// Also run a `Donate` loop on a fixed period.  Needs a donor.
    pub fn donate_every(mut self, period: Duration) -> Self {
        self.donate_every = Some(period);
        self
    }

    pub fn build(self) -> CombatResult<Arc<Strategy>> {
        if let Some((_, cfg)) = &self.area {
            if !(cfg.hp_per_resource > 0.0) {
                return Err(CombatError::Config("hp_per_resource must be > 0".into()));
            }
        }
        if self.donate_every.is_some() && self.donor.is_none() {
            return Err(CombatError::Config("donate loop needs a donor".into()));
        }

        let mut gates = vec![self.attack];
        gates.extend(self.area.as_ref().map(|(a, _)| *a));
        let attack_interval = Interval::cooldown(gates)?;

        let plan = Arc::new(CombatPlan {
            attack:      self.attack,
            area:        self.area.map(|(a, cfg)| (a, BudgetAllocator::new(cfg))),
            prioritizer: TargetPrioritizer::new(self.kinds),
            dedup:       self.dedup.unwrap_or_else(|| Deduplicator::new(FriendSet::new())),
            donor:       self.donor,
        });

        let attack_plan = Arc::clone(&plan);
        let mut builder = Strategy::builder(self.label).run(
            LoopName::Attack,
            Loop::new(attack_interval, move |agent| {
                let plan = Arc::clone(&attack_plan);
                async move { plan.attack_once(agent).await }
            }),
        );

        if let Some(period) = self.donate_every {
            let donate_plan = Arc::clone(&plan);
            builder = builder.run(
                LoopName::Donate,
                Loop::new(Interval::Fixed(period), move |agent| {
                    let plan = Arc::clone(&donate_plan);
                    async move { plan.donate_once(agent).await }
                }),
            );
        }

        Ok(builder.build())
    }
}
