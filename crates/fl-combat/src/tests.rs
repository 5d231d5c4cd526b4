//! Unit tests for fl-combat.

use fl_agent::ResourcePool;
use fl_core::{AgentId, Candidate, EntityId, Position, Stranger};

use crate::CombatContext;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn origin() -> Position {
    Position::new(0, 0.0, 0.0)
}

fn cand(id: u64, kind: &str, hp: u32) -> Candidate {
    Candidate::new(EntityId(id), kind, Position::new(0, id as f32, 0.0), hp)
}

fn context(pool: u32, candidates: Vec<Candidate>) -> CombatContext {
    CombatContext {
        agent:         AgentId(0),
        position:      origin(),
        range:         150.0,
        pool:          ResourcePool::new(pool, pool.max(1)),
        attack_damage: 10,
        harvest_value: 0.0,
        strangers:     Vec::new(),
        candidates,
        doomed:        Vec::new(),
    }
}

fn ids(cands: &[Candidate]) -> Vec<u64> {
    cands.iter().map(|c| c.id.0).collect()
}

// ── TargetPrioritizer ─────────────────────────────────────────────────────────

#[cfg(test)]
mod prioritizer {
    use super::*;
    use crate::TargetPrioritizer;

    fn ab() -> TargetPrioritizer {
        TargetPrioritizer::new(vec!["a".into(), "b".into()])
    }

    #[test]
    fn kind_order_dominates() {
        let ranked = ab().ranked(
            origin(),
            vec![cand(1, "b", 5), cand(2, "a", 90), cand(3, "b", 1), cand(4, "a", 40)],
        );
        let kinds: Vec<&str> = ranked.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["a", "a", "b", "b"]);
    }

    #[test]
    fn absent_kinds_sort_last() {
        let ranked = ab().ranked(origin(), vec![cand(1, "zzz", 1), cand(2, "b", 100)]);
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn lower_hp_first_within_kind_and_claim() {
        let ranked = ab().ranked(origin(), vec![cand(1, "a", 50), cand(2, "a", 10)]);
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn targeted_before_untargeted() {
        let claimed = Candidate { targeted: true, ..cand(1, "a", 90) };
        let ranked = ab().ranked(origin(), vec![cand(2, "a", 10), claimed]);
        assert_eq!(ids(&ranked), vec![1, 2]);
    }

    #[test]
    fn doomed_sort_after_healthy_prospects() {
        let by_projectiles = Candidate { doomed_by_projectiles: true, ..cand(1, "a", 5) };
        let by_burn = Candidate { doomed_by_burn: true, ..cand(2, "a", 5) };
        let ranked = ab().ranked(origin(), vec![by_projectiles, by_burn, cand(3, "a", 50)]);
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
    }

    #[test]
    fn distance_breaks_remaining_ties() {
        let far = Candidate { position: Position::new(0, 90.0, 0.0), ..cand(1, "a", 20) };
        let near = Candidate { position: Position::new(0, 3.0, 4.0), ..cand(2, "a", 20) };
        let best = ab().best(origin(), [&far, &near]).map(|c| c.id);
        assert_eq!(best, Some(EntityId(2)));
    }
}

// ── Ledger ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ledger {
    use crate::Ledger;

    #[test]
    fn reserve_is_all_or_nothing() {
        let mut l = Ledger::new(100);
        assert!(l.reserve(70));
        assert!(!l.reserve(31));
        assert_eq!(l.reserved(), 70);
        assert_eq!(l.available(), 30);
    }

    #[test]
    fn commit_moves_reservation_to_spent() {
        let mut l = Ledger::new(100);
        l.reserve(40);
        assert_eq!(l.commit(), 40);
        assert_eq!(l.spent(), 40);
        assert_eq!(l.reserved(), 0);
        assert_eq!(l.available(), 60);
    }

    #[test]
    fn rollback_releases() {
        let mut l = Ledger::new(50);
        l.reserve(50);
        assert_eq!(l.rollback(), 50);
        assert_eq!(l.available(), 50);
        assert_eq!(l.spent(), 0);
    }
}

// ── BudgetAllocator ───────────────────────────────────────────────────────────

#[cfg(test)]
mod allocator {
    use super::*;
    use crate::{AllocatorConfig, BudgetAllocator, Pass, TargetPrioritizer};

    fn any_kind() -> TargetPrioritizer {
        TargetPrioritizer::default()
    }

    #[test]
    fn lethal_pass_takes_cheapest_that_fit() {
        let alloc = BudgetAllocator::default();
        let ctx = context(100, vec![cand(1, "goo", 45), cand(2, "goo", 30), cand(3, "goo", 40)]);
        let out = alloc.allocate(&ctx, &any_kind());
        assert_eq!(out.targets(), vec![(EntityId(2), 30), (EntityId(3), 40)]);
        assert_eq!(out.total(), 70);
        assert!(out.picks().iter().all(|p| p.pass == Pass::Lethal));
    }

    #[test]
    fn base_cost_counts_against_pool() {
        let alloc = BudgetAllocator::new(AllocatorConfig { base_cost: 35, ..Default::default() });
        let ctx = context(100, vec![cand(1, "goo", 30), cand(2, "goo", 40)]);
        let out = alloc.allocate(&ctx, &any_kind());
        assert_eq!(out.targets(), vec![(EntityId(1), 30)]);
        assert_eq!(out.total(), 65);
    }

    #[test]
    fn empty_when_pool_cannot_cover_base() {
        let alloc = BudgetAllocator::new(AllocatorConfig { base_cost: 50, ..Default::default() });
        let ctx = context(40, vec![cand(1, "goo", 1)]);
        let out = alloc.allocate(&ctx, &any_kind());
        assert!(out.is_empty());
        assert_eq!(out.total(), 0);
    }

    #[test]
    fn immune_and_excluded_are_never_picked() {
        let alloc = BudgetAllocator::new(AllocatorConfig {
            excluded_kinds: vec!["boss".into()],
            ..Default::default()
        });
        let immune = Candidate { immune: true, ..cand(1, "goo", 5) };
        let ctx = context(1000, vec![immune, cand(2, "boss", 5)]);
        assert!(alloc.allocate(&ctx, &any_kind()).is_empty());
    }

    #[test]
    fn cost_scales_with_hp_per_resource() {
        let alloc = BudgetAllocator::new(AllocatorConfig { hp_per_resource: 4.0, ..Default::default() });
        assert_eq!(alloc.cost(&cand(1, "goo", 10)), 3);
        assert_eq!(alloc.cost(&cand(1, "goo", 12)), 3);
    }

    #[test]
    fn harvest_pass_needs_enough_harvest_value() {
        let cfg = AllocatorConfig { lethal_hp_threshold: 0, opportunistic: false, ..Default::default() };
        let alloc = BudgetAllocator::new(cfg);
        let mk = |id| Candidate { harvestable: true, ..cand(id, "goo", 900) };

        let mut ctx = context(200, vec![mk(1), mk(2), mk(3)]);
        ctx.harvest_value = 30.0;
        assert!(alloc.allocate(&ctx, &any_kind()).is_empty());

        ctx.harvest_value = 50.0;
        let out = alloc.allocate(&ctx, &any_kind());
        assert_eq!(out.targets(), vec![(EntityId(1), 80), (EntityId(2), 80)]);
        assert!(out.picks().iter().all(|p| p.pass == Pass::Harvest));
    }

    #[test]
    fn contest_denial_only_with_hostile_nearby() {
        let cfg = AllocatorConfig { lethal_hp_threshold: 0, opportunistic: false, ..Default::default() };
        let alloc = BudgetAllocator::new(cfg);
        let claimed = Candidate { targeted: true, ..cand(1, "goo", 50) };
        let pet = Candidate { xp: -1, ..cand(2, "goo", 50) };
        let tanky = cand(3, "goo", 500);
        let doomed = Candidate { doomed_by_burn: true, ..cand(4, "goo", 500) };
        let easy = cand(5, "goo", 60);
        let mut ctx = context(1000, vec![claimed, pet, tanky, doomed, easy]);
        ctx.doomed.push(Candidate { doomed_by_projectiles: true, ..cand(6, "goo", 500) });

        assert!(alloc.allocate(&ctx, &any_kind()).is_empty());

        ctx.strangers.push(Stranger {
            name:     "friendly".into(),
            position: Position::new(0, 10.0, 0.0),
            range:    50.0,
            friendly: true,
        });
        assert!(alloc.allocate(&ctx, &any_kind()).is_empty());

        ctx.strangers.push(Stranger {
            name:     "rival".into(),
            position: Position::new(0, 290.0, 0.0),
            range:    50.0,
            friendly: false,
        });
        let out = alloc.allocate(&ctx, &any_kind());
        let mut picked: Vec<u64> = out.picks().iter().map(|p| p.candidate.id.0).collect();
        picked.sort_unstable();
        assert_eq!(picked, vec![4, 5, 6]);
        assert!(out.picks().iter().all(|p| p.pass == Pass::ContestDenial && p.cost == 80));
    }

    #[test]
    fn projectile_doomed_are_left_to_other_passes() {
        let alloc = BudgetAllocator::default();
        let mut ctx = context(1000, vec![cand(1, "goo", 5)]);
        ctx.doomed.push(Candidate { doomed_by_projectiles: true, ..cand(2, "goo", 5) });
        let out = alloc.allocate(&ctx, &any_kind());
        assert_eq!(out.targets(), vec![(EntityId(1), 5)]);
    }

    #[test]
    fn saturated_costs_never_overflow_the_budget() {
        let cfg = AllocatorConfig {
            hp_per_resource:     1e-9,
            lethal_hp_threshold: 100,
            opportunistic:       false,
            ..Default::default()
        };
        let alloc = BudgetAllocator::new(cfg);
        let ctx = context(u32::MAX, vec![cand(1, "goo", 10), cand(2, "goo", 20)]);
        let out = alloc.allocate(&ctx, &any_kind());
        assert_eq!(out.picks().len(), 1);
        assert_eq!(out.total(), u32::MAX);
    }

    #[test]
    fn opportunistic_takes_single_best_ranked_that_fits() {
        let cfg = AllocatorConfig { lethal_hp_threshold: 0, ..Default::default() };
        let alloc = BudgetAllocator::new(cfg);
        let ctx = context(100, vec![cand(1, "b", 20), cand(2, "a", 300), cand(3, "a", 90)]);
        let pr = TargetPrioritizer::new(vec!["a".into(), "b".into()]);
        let out = alloc.allocate(&ctx, &pr);
        assert_eq!(out.targets(), vec![(EntityId(3), 90)]);
        assert_eq!(out.picks()[0].pass, Pass::Opportunistic);
    }

    #[test]
    fn total_never_exceeds_pool() {
        let alloc = BudgetAllocator::new(AllocatorConfig { base_cost: 7, ..Default::default() });
        for pool in [0u32, 5, 7, 30, 64, 99, 150] {
            let ctx = context(pool, (1..=12).map(|i| cand(i, "goo", (i * 13 % 97) as u32 + 1)).collect());
            let out = alloc.allocate(&ctx, &any_kind());
            let sum: u32 = out.picks().iter().map(|p| p.cost).sum();
            assert!(out.total() <= pool, "pool {pool}: reserved {}", out.total());
            if !out.is_empty() {
                assert_eq!(out.total(), sum + 7);
            }
        }
    }

    #[test]
    fn commit_and_rollback_follow_action_result() {
        let alloc = BudgetAllocator::default();
        let ctx = context(100, vec![cand(1, "goo", 30)]);
        let mut ok = alloc.allocate(&ctx, &any_kind());
        assert_eq!(ok.commit(), 30);
        assert_eq!(ok.ledger().spent(), 30);

        let mut failed = alloc.allocate(&ctx, &any_kind());
        assert_eq!(failed.rollback(), 30);
        assert_eq!(failed.ledger().available(), 100);
    }
}

// ── CombatContext ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod combat_context {
    use fl_agent::{AgentHandle, MockHandle};
    use fl_core::{EntityKind, Role};

    use super::*;

    #[test]
    fn capture_filters_kind_range_and_projectiles() {
        let bot = MockHandle::builder(AgentId(0), Role::Mage).range(100.0).build();
        let far = Candidate { position: Position::new(0, 500.0, 0.0), ..cand(3, "goo", 10) };
        let other_map = Candidate { position: Position::new(1, 1.0, 0.0), ..cand(4, "goo", 10) };
        let doomed = Candidate { doomed_by_projectiles: true, ..cand(5, "goo", 10) };
        bot.visible().sync([cand(1, "goo", 10), cand(2, "bat", 10), far, other_map, doomed]);

        let ctx = CombatContext::capture(&*bot, &[EntityKind::from("goo")]);
        assert_eq!(ids(&ctx.candidates), vec![1]);

        assert_eq!(ids(&ctx.doomed), vec![5]);

        let any = CombatContext::capture(&*bot, &[]);
        assert_eq!(ids(&any.candidates), vec![1, 2]);
        assert_eq!(bot.visible().len(), 5);
    }
}

// ── CombatStrategy ────────────────────────────────────────────────────────────

#[cfg(test)]
mod combat_strategy {
    use std::sync::Arc;
    use std::time::Duration;

    use fl_agent::{
        Action, ActionError, AgentHandle, AgentIdentity, AgentSlot, MockHandle, SharedHandle,
        ShardId,
    };
    use fl_coord::{Deduplicator, DonationLedger, DonationPolicy, Donor, FriendSet};
    use fl_core::{AbilityId, DonationConfig, Role};
    use fl_schedule::{Interval, LoopName, LoopSlot, Strategy};

    use super::*;
    use crate::{AllocatorConfig, CombatStrategy};

    const ATTACK: AbilityId = AbilityId(0);
    const BURST: AbilityId = AbilityId(1);
    const GIVE: AbilityId = AbilityId(2);

    fn mage(id: u32) -> Arc<MockHandle> {
        MockHandle::builder(AgentId(id), Role::Mage)
            .pool(ResourcePool::new(100, 100))
            .range(200.0)
            .build()
    }

    fn slot(h: &Arc<MockHandle>) -> Arc<AgentSlot> {
        Arc::new(AgentSlot::new(
            Arc::clone(h) as SharedHandle,
            AgentIdentity::new(h.id(), "o", "a", h.name()),
            ShardId::new("US", "I"),
        ))
    }

    async fn fire(strategy: &Strategy, name: LoopName, agent: &Arc<MockHandle>) -> fl_agent::ActionResult<()> {
        match strategy.slot(name) {
            Some(LoopSlot::Run(lp)) => lp.fire(Arc::clone(agent) as SharedHandle).await,
            other => panic!("no runnable {name} loop: {other:?}"),
        }
    }

    #[test]
    fn attack_loop_is_gated_by_both_cooldowns() {
        let s = CombatStrategy::builder(ATTACK).area(BURST, AllocatorConfig::default()).build().unwrap();
        match s.slot(LoopName::Attack) {
            Some(LoopSlot::Run(lp)) => {
                assert_eq!(lp.interval(), &Interval::cooldown([ATTACK, BURST]).unwrap());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(s.slot(LoopName::Donate).is_none());
    }

    #[test]
    fn donate_loop_without_donor_is_rejected() {
        let r = CombatStrategy::builder(ATTACK).donate_every(Duration::from_secs(1)).build();
        assert!(r.is_err());
    }

    #[tokio::test]
    async fn area_then_attack_with_dedup() {
        let me = mage(0);
        let friend = mage(1);
        let world = [cand(1, "goo", 30), cand(2, "goo", 40), cand(3, "goo", 45)];
        me.visible().sync(world.clone());
        friend.visible().sync(world);

        let slots = vec![slot(&me), slot(&friend)];
        let s = CombatStrategy::builder(ATTACK)
            .kinds(["goo"])
            .area(BURST, AllocatorConfig { opportunistic: false, ..Default::default() })
            .dedup(Deduplicator::new(FriendSet::from_slots(&slots)))
            .build()
            .unwrap();

        fire(&s, LoopName::Attack, &me).await.unwrap();

        assert_eq!(
            me.performed(),
            vec![
                Action::AreaEffect { ability: BURST, targets: vec![(EntityId(1), 30), (EntityId(2), 40)] },
                Action::Attack { target: EntityId(3) },
            ]
        );
        assert_eq!(me.pool().current, 30);
        assert_eq!(ids(&friend.visible().snapshot()), vec![3]);
    }

    #[tokio::test]
    async fn failed_area_effect_aborts_the_fire() {
        let me = mage(0);
        me.visible().sync([cand(1, "goo", 30)]);
        me.fail_next(ActionError::Rejected("no line of sight".into()));
        let s = CombatStrategy::builder(ATTACK).area(BURST, AllocatorConfig::default()).build().unwrap();

        assert!(fire(&s, LoopName::Attack, &me).await.is_err());
        assert_eq!(me.performed().len(), 1);
        assert_eq!(me.pool().current, 100);
    }

    #[tokio::test]
    async fn finishing_blow_is_claimed_and_cooperative_kept() {
        let me = mage(0);
        let friend = mage(1);
        let world = [cand(1, "goo", 8), cand(2, "phoenix", 1)];
        me.visible().sync(world.clone());
        friend.visible().sync(world);
        let slots = vec![slot(&me), slot(&friend)];
        let s = CombatStrategy::builder(ATTACK)
            .kinds(["phoenix", "goo"])
            .dedup(
                Deduplicator::new(FriendSet::from_slots(&slots))
                    .with_cooperative([fl_core::EntityKind::from("phoenix")]),
            )
            .build()
            .unwrap();

        fire(&s, LoopName::Attack, &me).await.unwrap();
        assert_eq!(me.performed(), vec![Action::Attack { target: EntityId(2) }]);
        assert!(friend.visible().contains(EntityId(2)));
        assert!(friend.visible().contains(EntityId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn attack_skipped_while_on_cooldown() {
        let me = mage(0);
        me.visible().sync([cand(1, "goo", 30)]);
        me.set_cooldown(ATTACK, Duration::from_millis(500));
        let s = CombatStrategy::builder(ATTACK).build().unwrap();
        fire(&s, LoopName::Attack, &me).await.unwrap();
        assert!(me.performed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn attack_cooldown_leaves_friends_untouched() {
        let me = mage(0);
        let friend = mage(1);
        me.set_pool(ResourcePool::new(0, 100));
        me.set_cooldown(ATTACK, Duration::from_millis(900));
        me.visible().sync([cand(1, "goo", 1)]);
        friend.visible().sync([cand(1, "goo", 1)]);

        let slots = vec![slot(&me), slot(&friend)];
        let policy = DonationPolicy::from_config(&DonationConfig::default(), GIVE, 300.0);
        let s = CombatStrategy::builder(ATTACK)
            .kinds(["goo"])
            .area(BURST, AllocatorConfig::default())
            .dedup(Deduplicator::new(FriendSet::from_slots(&slots)))
            .donor(Donor::new(FriendSet::from_slots(&slots), policy, Arc::new(DonationLedger::new())))
            .build()
            .unwrap();

        // The area ability is ready, so the loop fires, but nothing is affordable.
        assert!(me.can_use(BURST));
        fire(&s, LoopName::Attack, &me).await.unwrap();

        assert!(me.performed().is_empty());
        assert!(friend.performed().is_empty(), "no donation without an attack");
        assert!(friend.visible().contains(EntityId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn requests_donation_when_not_boosted_and_runs_donate_loop() {
        let me = mage(0);
        me.set_pool(ResourcePool::new(10, 100));
        me.visible().sync([cand(1, "goo", 500)]);
        let priest = mage(1);
        let slots = vec![slot(&me), slot(&priest)];
        let ledger = Arc::new(DonationLedger::new());
        let policy = DonationPolicy::from_config(&DonationConfig::default(), GIVE, 300.0);
        let s = CombatStrategy::builder(ATTACK)
            .donor(Donor::new(FriendSet::from_slots(&slots), policy, Arc::clone(&ledger)))
            .donate_every(Duration::from_secs(2))
            .build()
            .unwrap();

        fire(&s, LoopName::Attack, &me).await.unwrap();
        assert_eq!(priest.performed(), vec![Action::Donate { ability: GIVE, to: AgentId(0), amount: 90 }]);
        assert_eq!(me.performed(), vec![Action::Attack { target: EntityId(1) }]);

        me.set_boosted(true);
        tokio::time::advance(Duration::from_secs(10)).await;
        fire(&s, LoopName::Attack, &me).await.unwrap();
        assert_eq!(priest.performed().len(), 1);

        // The donate loop on the priest gives to the agent still short of resource.
        fire(&s, LoopName::Donate, &priest).await.unwrap();
        assert_eq!(priest.performed().len(), 2);
    }
}
