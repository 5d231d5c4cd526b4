//! Unit tests for fl-agent.

#[cfg(test)]
mod pool {
    use crate::ResourcePool;

    #[test]
    fn new_clamps_current_to_max() {
        let p = ResourcePool::new(900, 500);
        assert_eq!(p.current, 500);
        assert!(p.is_full());
    }

    #[test]
    fn ratio_and_deficit() {
        let p = ResourcePool::new(100, 400);
        assert!((p.ratio() - 0.25).abs() < 1e-6);
        assert_eq!(p.deficit(), 300);
    }

    #[test]
    fn zero_capacity_counts_as_full() {
        let p = ResourcePool::new(0, 0);
        assert_eq!(p.ratio(), 1.0);
        assert_eq!(p.deficit(), 0);
    }

    #[test]
    fn spend_refuses_overdraft() {
        let mut p = ResourcePool::new(30, 100);
        assert!(!p.spend(31));
        assert_eq!(p.current, 30);
        assert!(p.spend(30));
        assert_eq!(p.current, 0);
    }

    #[test]
    fn refill_caps_at_max() {
        let mut p = ResourcePool::new(90, 100);
        assert_eq!(p.refill(50), 10);
        assert!(p.is_full());
    }
}

#[cfg(test)]
mod action {
    use fl_core::{AbilityId, AgentId, EntityId};

    use crate::Action;

    #[test]
    fn area_effect_cost_is_sum_of_targets() {
        let a = Action::AreaEffect {
            ability: AbilityId(3),
            targets: vec![(EntityId(1), 10), (EntityId(2), 15)],
        };
        assert_eq!(a.resource_cost(), 25);
        assert_eq!(a.ability(), Some(AbilityId(3)));
        assert_eq!(a.label(), "area_effect");
    }

    #[test]
    fn attack_has_no_ability_or_cost() {
        let a = Action::Attack { target: EntityId(9) };
        assert_eq!(a.ability(), None);
        assert_eq!(a.resource_cost(), 0);
    }

    #[test]
    fn donate_costs_its_amount() {
        let a = Action::Donate { ability: AbilityId(7), to: AgentId(2), amount: 40 };
        assert_eq!(a.resource_cost(), 40);
    }
}

#[cfg(test)]
mod visibility {
    use fl_core::{Candidate, EntityId, Position};

    use crate::VisibilityCache;

    fn goo(id: u64) -> Candidate {
        Candidate::new(EntityId(id), "goo", Position::new(0, id as f32, 0.0), 50)
    }

    #[test]
    fn sync_replaces_content() {
        let cache = VisibilityCache::new();
        cache.upsert(goo(99));
        cache.sync([goo(1), goo(2)]);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(EntityId(99)));
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let cache = VisibilityCache::new();
        cache.sync([goo(5), goo(1), goo(3)]);
        let ids: Vec<u64> = cache.snapshot().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn remove_reports_presence() {
        let cache = VisibilityCache::new();
        cache.upsert(goo(1));
        assert!(cache.remove(EntityId(1)));
        assert!(!cache.remove(EntityId(1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn upsert_overwrites() {
        let cache = VisibilityCache::new();
        cache.upsert(goo(1));
        cache.upsert(Candidate { hp: 7, ..goo(1) });
        assert_eq!(cache.get(EntityId(1)).map(|c| c.hp), Some(7));
    }
}

#[cfg(test)]
mod slot {
    use std::sync::Arc;

    use fl_core::{AgentId, Role};

    use crate::{AgentIdentity, AgentSlot, MockHandle, SharedHandle, ShardId};

    #[test]
    fn replace_swaps_current_handle() {
        let first = MockHandle::builder(AgentId(1), Role::Mage).name("first").build();
        let second = MockHandle::builder(AgentId(1), Role::Mage).name("second").build();
        let slot = AgentSlot::new(
            first,
            AgentIdentity::new(AgentId(1), "owner", "auth", "first"),
            ShardId::new("US", "I"),
        );
        assert_eq!(slot.id(), AgentId(1));
        assert_eq!(slot.role(), Role::Mage);
        assert_eq!(slot.current().name(), "first");

        let shared: SharedHandle = second;
        let old = slot.replace(shared);
        assert_eq!(old.name(), "first");
        assert_eq!(slot.current().name(), "second");
    }

    #[test]
    fn weak_reference_sees_replacement() {
        let slot = Arc::new(AgentSlot::new(
            MockHandle::builder(AgentId(4), Role::Priest).name("a").build(),
            AgentIdentity::new(AgentId(4), "o", "x", "a"),
            ShardId::new("EU", "II"),
        ));
        let weak = Arc::downgrade(&slot);
        slot.replace(MockHandle::builder(AgentId(4), Role::Priest).name("b").build());
        let seen = weak.upgrade().map(|s| s.current().name().to_owned());
        assert_eq!(seen.as_deref(), Some("b"));
    }

    #[test]
    fn set_shard() {
        let slot = AgentSlot::new(
            MockHandle::builder(AgentId(0), Role::Rogue).build(),
            AgentIdentity::new(AgentId(0), "o", "x", "c"),
            ShardId::new("US", "I"),
        );
        slot.set_shard(ShardId::new("ASIA", "I"));
        assert_eq!(slot.shard().to_string(), "ASIA I");
    }
}

#[cfg(test)]
mod mock {
    use std::time::Duration;

    use fl_core::{AbilityId, AgentId, Candidate, EntityId, Position, Role};

    use crate::{
        Action, ActionError, AgentHandle, AgentIdentity, ConnectError, FactoryError,
        HandleFactory, MockFactory, MockHandle, ResourcePool, ShardId,
    };

    const BURST: AbilityId = AbilityId(1);

    #[tokio::test(start_paused = true)]
    async fn cooldown_counts_down_on_virtual_clock() {
        let bot = MockHandle::builder(AgentId(0), Role::Mage).build();
        bot.set_cooldown(BURST, Duration::from_millis(300));
        assert!(!bot.can_use(BURST));
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(bot.cooldown(BURST), Duration::from_millis(200));
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(bot.can_use(BURST));
    }

    #[tokio::test(start_paused = true)]
    async fn perform_records_and_spends() {
        let bot = MockHandle::builder(AgentId(0), Role::Mage)
            .pool(ResourcePool::new(100, 100))
            .build();
        bot.set_cooldown_on_use(BURST, Duration::from_secs(1));
        let action = Action::AreaEffect { ability: BURST, targets: vec![(EntityId(1), 30)] };

        let outcome = bot.perform(action.clone()).await;
        assert_eq!(outcome.map(|o| o.consumed), Ok(30));
        assert_eq!(bot.pool().current, 70);

        assert_eq!(bot.perform(action).await, Err(ActionError::OnCooldown(BURST)));
        assert_eq!(bot.performed().len(), 2);
    }

    #[tokio::test]
    async fn insufficient_resource_is_reported() {
        let bot = MockHandle::builder(AgentId(0), Role::Mage)
            .pool(ResourcePool::new(5, 100))
            .build();
        let r = bot
            .perform(Action::Donate { ability: AbilityId(2), to: AgentId(1), amount: 10 })
            .await;
        assert_eq!(r, Err(ActionError::InsufficientResource { needed: 10, available: 5 }));
        assert_eq!(bot.pool().current, 5);
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let bot = MockHandle::builder(AgentId(0), Role::Ranger).build();
        bot.fail_next(ActionError::Rejected("one".into()));
        bot.fail_next(ActionError::Transport("two".into()));
        let mv = Action::Move { to: Position::new(0, 1.0, 1.0) };
        assert_eq!(bot.perform(mv.clone()).await, Err(ActionError::Rejected("one".into())));
        assert_eq!(bot.perform(mv.clone()).await, Err(ActionError::Transport("two".into())));
        assert!(bot.perform(mv).await.is_ok());
        assert_eq!(bot.position(), Position::new(0, 1.0, 1.0));
    }

    #[tokio::test]
    async fn attack_damages_and_kills_in_local_view() {
        let bot = MockHandle::builder(AgentId(0), Role::Warrior).attack_damage(30).build();
        bot.visible().upsert(Candidate::new(EntityId(5), "goo", Position::new(0, 0.0, 0.0), 50));
        bot.perform(Action::Attack { target: EntityId(5) }).await.ok();
        assert_eq!(bot.visible().get(EntityId(5)).map(|c| c.hp), Some(20));
        bot.perform(Action::Attack { target: EntityId(5) }).await.ok();
        assert!(!bot.visible().contains(EntityId(5)));
    }

    #[tokio::test]
    async fn disconnect_flips_link_and_blocks_actions() {
        let bot = MockHandle::builder(AgentId(0), Role::Mage).build();
        let mut link = bot.link();
        assert!(*link.borrow());
        bot.simulate_disconnect();
        link.changed().await.ok();
        assert!(!*link.borrow());
        assert!(!bot.is_ready());
        let r = bot.perform(Action::Move { to: Position::new(0, 0.0, 0.0) }).await;
        assert_eq!(r, Err(ActionError::Disconnected));
    }

    #[tokio::test]
    async fn connect_uses_scripted_results() {
        let bot = MockHandle::builder(AgentId(0), Role::Mage).connected(false).build();
        bot.push_connect_result(Err(ConnectError::Rejected("limits".into())));
        assert!(bot.connect().await.is_err());
        assert!(!bot.is_connected());
        assert!(bot.connect().await.is_ok());
        assert!(bot.is_ready());
        assert_eq!(bot.connect_calls(), 2);
    }

    #[test]
    fn factory_builds_disconnected_handles() {
        let factory = MockFactory::new(MockHandle::builder(AgentId(3), Role::Mage));
        let identity = AgentIdentity::new(AgentId(7), "owner", "auth", "Zed");
        let h = factory.build(Role::Priest, &identity, &ShardId::new("US", "II"));
        let h = h.map_err(|e| e.to_string());
        assert!(h.is_ok());
        let built = factory.last_built();
        let built = built.as_deref();
        assert_eq!(built.map(|b| b.id()), Some(AgentId(7)));
        assert_eq!(built.map(|b| b.role()), Some(Role::Priest));
        assert_eq!(built.map(|b| b.name().to_owned()).as_deref(), Some("Zed"));
        assert_eq!(built.map(|b| b.is_connected()), Some(false));
        assert_eq!(factory.shards(), vec![ShardId::new("US", "II")]);
    }

    #[test]
    fn factory_rejects_unsupported_role() {
        let factory =
            MockFactory::new(MockHandle::builder(AgentId(0), Role::Mage)).supporting(&[Role::Mage]);
        let identity = AgentIdentity::new(AgentId(0), "o", "a", "c");
        let err = factory.build(Role::Rogue, &identity, &ShardId::new("US", "I")).err();
        assert_eq!(err, Some(FactoryError::UnsupportedRole(Role::Rogue)));
        assert!(factory.built().is_empty());
    }

    #[tokio::test]
    async fn factory_hands_out_connect_script() {
        let factory = MockFactory::new(MockHandle::builder(AgentId(0), Role::Mage));
        factory.script_connects([Err(ConnectError::Rejected("wait_3_second".into()))]);
        let identity = AgentIdentity::new(AgentId(0), "o", "a", "c");
        let shard = ShardId::new("US", "I");
        let first = factory.build(Role::Mage, &identity, &shard).map_err(|e| e.to_string());
        let second = factory.build(Role::Mage, &identity, &shard).map_err(|e| e.to_string());
        assert!(first.unwrap().connect().await.is_err());
        assert!(second.unwrap().connect().await.is_ok());
    }
}

#[cfg(test)]
mod directory {
    use fl_core::{EntityKind, Position};

    use crate::{DirectoryQuery, DirectoryRecord, EntityDirectory, ShardId, StaticDirectory};

    fn record(kind: &str, seen: u64) -> DirectoryRecord {
        DirectoryRecord {
            kind:         EntityKind::from(kind),
            shard:        ShardId::new("US", "I"),
            position:     Position::new(1, 0.0, 0.0),
            hp:           1000,
            last_seen_ms: seen,
        }
    }

    #[tokio::test]
    async fn filters_by_kind_and_age_newest_first() {
        let dir = StaticDirectory::new(vec![
            record("boss", 100),
            record("goo", 900),
            record("boss", 800),
            record("boss", 950),
        ]);
        let q = DirectoryQuery {
            kinds:      vec![EntityKind::from("boss")],
            shard:      None,
            max_age_ms: 500,
            now_ms:     1000,
            limit:      10,
        };
        let hits = dir.find_recent(&q).await.unwrap_or_default();
        let seen: Vec<u64> = hits.iter().map(|r| r.last_seen_ms).collect();
        assert_eq!(seen, vec![950, 800]);
    }

    #[tokio::test]
    async fn zero_limit_is_an_error() {
        let dir = StaticDirectory::default();
        let q = DirectoryQuery::default();
        assert!(dir.find_recent(&q).await.is_err());
    }
}
