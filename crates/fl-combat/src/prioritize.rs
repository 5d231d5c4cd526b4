//! `TargetPrioritizer` — total order over candidates for one agent.
//!
//! | Key | Preferred first                                   |
//! |-----|---------------------------------------------------|
//! | 1   | lower index in the kind priority list (absent last) |
//! | 2   | already targeted by anyone                        |
//! | 3   | not doomed by in-flight projectiles               |
//! | 4   | not doomed by burn                                |
//! | 5   | lower hp                                          |
//! | 6   | closer to the agent                               |
//!
//! Keys 2–4 avoid both abandoning contested kills and overkill.  The order is
//! recomputed from a fresh snapshot on every call; nothing is cached.

use std::cmp::Ordering;

use fl_core::{Candidate, EntityKind, Position};

#[derive(Clone, Debug, Default)]
pub struct TargetPrioritizer {
    kinds: Vec<EntityKind>,
}

impl TargetPrioritizer {
    pub fn new(kinds: Vec<EntityKind>) -> Self {
        Self { kinds }
    }

    pub fn kinds(&self) -> &[EntityKind] {
        &self.kinds
    }

    fn kind_rank(&self, kind: &EntityKind) -> usize {
        self.kinds.iter().position(|k| k == kind).unwrap_or(usize::MAX)
    }

    /// Compare two candidates as seen from `origin`.  `Less` means `a` is
    /// preferred.
    pub fn compare(&self, origin: Position, a: &Candidate, b: &Candidate) -> Ordering {
        self.kind_rank(&a.kind)
            .cmp(&self.kind_rank(&b.kind))
            .then_with(|| b.targeted.cmp(&a.targeted))
            .then_with(|| a.doomed_by_projectiles.cmp(&b.doomed_by_projectiles))
            .then_with(|| a.doomed_by_burn.cmp(&b.doomed_by_burn))
            .then_with(|| a.hp.cmp(&b.hp))
            .then_with(|| {
                origin
                    .distance(a.position)
                    .total_cmp(&origin.distance(b.position))
            })
    }

    /// Sort `candidates` in place, most preferred first.
    pub fn rank(&self, origin: Position, candidates: &mut [Candidate]) {
        candidates.sort_by(|a, b| self.compare(origin, a, b));
    }

    /// Owned, ranked copy.
    pub fn ranked(&self, origin: Position, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        self.rank(origin, &mut candidates);
        candidates
    }

    /// The single most preferred candidate.
    pub fn best<'a, I>(&self, origin: Position, candidates: I) -> Option<&'a Candidate>
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        candidates.into_iter().min_by(|a, b| self.compare(origin, a, b))
    }
}
