//! `BudgetAllocator` — which candidates to include in one batched area
//! effect, given a finite resource pool.
//!
//! # Passes
//!
//! Each pass draws on what the previous ones left.  The fixed per-use
//! `base_cost` is reserved together with the first pass that picks anything.
//!
//! | Pass            | Entered when                                   | Offers (cost)                                   |
//! |-----------------|------------------------------------------------|-------------------------------------------------|
//! | `Lethal`        | always                                         | `hp < lethal_hp_threshold`, ascending `cost(c)` |
//! | `Harvest`       | `harvest_value > harvest_fraction × reference` | harvestable, ranked (`harvest_cost` each)       |
//! | `ContestDenial` | a hostile player is within reach               | untargeted, `xp > 0`, finishable or doomed, ranked (`steal_cost` each) |
//! | `Opportunistic` | budget remains                                 | the single best-ranked candidate that fits      |
//!
//! `cost(c) = ceil(hp / hp_per_resource)`.  Immune and excluded kinds are
//! never offered, and a candidate is picked at most once.  Candidates that
//! projectiles will already finish (`CombatContext::doomed`) are offered to
//! `ContestDenial` only.
//!
//! # Invariant
//!
//! `base_cost + Σ pick.cost ≤ pool.current` for every call.  The allocator
//! never fails on a short pool; the result may simply be empty.

use tracing::trace;

use fl_core::{Candidate, EntityId, EntityKind};

use crate::{CombatContext, Ledger, TargetPrioritizer};

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct AllocatorConfig {
    /// Resource spent once per batched use, however many targets.
    pub base_cost:              u32,
    /// Hit points removed per unit of resource.
    pub hp_per_resource:        f32,
    /// Lethal pass considers candidates strictly below this hp.
    pub lethal_hp_threshold:    u32,
    /// Kinds never included in an area effect.
    pub excluded_kinds:         Vec<EntityKind>,
    /// Harvest pass runs when `harvest_value` exceeds this fraction of
    /// `harvest_reference_cost`.
    pub harvest_fraction:       f32,
    pub harvest_reference_cost: u32,
    pub harvest_cost:           u32,
    pub steal_cost:             u32,
    /// Extra distance on top of both attack ranges within which a hostile
    /// player counts as contesting.
    pub contest_margin:         f32,
    pub harvest:                bool,
    pub contest_denial:         bool,
    pub opportunistic:          bool,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            base_cost:              0,
            hp_per_resource:        1.0,
            lethal_hp_threshold:    200,
            excluded_kinds:         Vec::new(),
            harvest_fraction:       0.5,
            harvest_reference_cost: 80,
            harvest_cost:           80,
            steal_cost:             80,
            contest_margin:         100.0,
            harvest:                true,
            contest_denial:         true,
            opportunistic:          true,
        }
    }
}

// ── Allocation ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Lethal,
    Harvest,
    ContestDenial,
    Opportunistic,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pick {
    pub candidate: Candidate,
    pub cost:      u32,
    pub pass:      Pass,
}

impl Pick {
    /// Lethal and contest-denial picks are expected to die from this hit.
    pub fn is_kill(&self) -> bool {
        matches!(self.pass, Pass::Lethal | Pass::ContestDenial)
    }
}

/// The result of one allocation call, with its resource still reserved.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    picks:  Vec<Pick>,
    ledger: Ledger,
}

impl Allocation {
    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Reserved resource, base cost included.
    pub fn total(&self) -> u32 {
        self.ledger.reserved()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// `(target, cost)` pairs for `Action::AreaEffect`.
    pub fn targets(&self) -> Vec<(EntityId, u32)> {
        self.picks.iter().map(|p| (p.candidate.id, p.cost)).collect()
    }

    /// The action succeeded: finalize consumption.
    pub fn commit(&mut self) -> u32 {
        self.ledger.commit()
    }

    /// The action failed: release the reservation.
    pub fn rollback(&mut self) -> u32 {
        self.ledger.rollback()
    }
}

// ── BudgetAllocator ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct BudgetAllocator {
    config: AllocatorConfig,
}

impl BudgetAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Resource needed to take `candidate` out with the area effect alone.
    pub fn cost(&self, candidate: &Candidate) -> u32 {
        (candidate.hp as f32 / self.config.hp_per_resource).ceil() as u32
    }

    fn eligible(&self, c: &Candidate) -> bool {
        !c.immune && !self.config.excluded_kinds.contains(&c.kind)
    }

    /// Run every enabled pass over `ctx.candidates`.
    pub fn allocate(&self, ctx: &CombatContext, prioritizer: &TargetPrioritizer) -> Allocation {
        let cfg = &self.config;
        let mut ledger = Ledger::new(ctx.pool.current);
        let mut picks: Vec<Pick> = Vec::new();

        let eligible: Vec<Candidate> =
            ctx.candidates.iter().filter(|c| self.eligible(c)).cloned().collect();
        let ranked = prioritizer.ranked(ctx.position, eligible.clone());

        // ── Pass 1: lethal finishing ──────────────────────────────────────
        let mut lethal: Vec<(&Candidate, u32)> = eligible
            .iter()
            .filter(|c| c.hp < cfg.lethal_hp_threshold)
            .map(|c| (c, self.cost(c)))
            .collect();
        lethal.sort_by_key(|(_, cost)| *cost);
        self.run_pass(&mut ledger, &mut picks, Pass::Lethal, lethal);

        // ── Pass 2: value harvest ─────────────────────────────────────────
        let harvest_floor = cfg.harvest_fraction * cfg.harvest_reference_cost as f32;
        if cfg.harvest && ctx.harvest_value > harvest_floor {
            let offers = ranked.iter().filter(|c| c.harvestable).map(|c| (c, cfg.harvest_cost));
            self.run_pass(&mut ledger, &mut picks, Pass::Harvest, offers);
        }

        // ── Pass 3: contest denial ────────────────────────────────────────
        if cfg.contest_denial && ctx.contested(cfg.contest_margin) {
            let finishable = cfg.steal_cost as f32 * cfg.hp_per_resource;
            let contestable: Vec<Candidate> = eligible
                .iter()
                .chain(ctx.doomed.iter().filter(|c| self.eligible(c)))
                .filter(|c| !c.targeted && c.xp > 0)
                .filter(|c| c.hp as f32 <= finishable || c.is_doomed())
                .cloned()
                .collect();
            let contestable = prioritizer.ranked(ctx.position, contestable);
            let offers = contestable.iter().map(|c| (c, cfg.steal_cost));
            self.run_pass(&mut ledger, &mut picks, Pass::ContestDenial, offers);
        }

        // ── Pass 4: opportunistic ─────────────────────────────────────────
        if cfg.opportunistic {
            let budget = self.pass_budget(&ledger, &picks);
            let best = ranked
                .iter()
                .filter(|c| !is_picked(&picks, c.id))
                .map(|c| (c, self.cost(c)))
                .find(|(_, cost)| *cost <= budget);
            self.run_pass(&mut ledger, &mut picks, Pass::Opportunistic, best);
        }

        trace!(
            agent = %ctx.agent,
            pool = ctx.pool.current,
            reserved = ledger.reserved(),
            picks = picks.len(),
            "allocated area effect"
        );
        Allocation { picks, ledger }
    }

    /// What a pass may spend on targets, after the base cost if it still has
    /// to be paid.
    fn pass_budget(&self, ledger: &Ledger, picks: &[Pick]) -> u32 {
        let base = if picks.is_empty() { self.config.base_cost } else { 0 };
        ledger.available().saturating_sub(base)
    }

    /// Greedily accept offers that fit, then reserve the pass as a whole.
    fn run_pass<'a, I>(&self, ledger: &mut Ledger, picks: &mut Vec<Pick>, pass: Pass, offers: I)
    where
        I: IntoIterator<Item = (&'a Candidate, u32)>,
    {
        let first = picks.is_empty();
        let base = if first { self.config.base_cost } else { 0 };
        if ledger.available() < base {
            return;
        }
        let budget = ledger.available() - base;

        let mut chosen: Vec<Pick> = Vec::new();
        let mut total = 0u32;
        for (c, cost) in offers {
            if is_picked(picks, c.id) || is_picked(&chosen, c.id) {
                continue;
            }
            if let Some(next) = total.checked_add(cost).filter(|t| *t <= budget) {
                total = next;
                chosen.push(Pick { candidate: c.clone(), cost, pass });
            }
        }

        if !chosen.is_empty() && ledger.reserve(base + total) {
            picks.extend(chosen);
        }
    }
}

fn is_picked(picks: &[Pick], id: EntityId) -> bool {
    picks.iter().any(|p| p.candidate.id == id)
}
