//! Unit tests for fl-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EntityId, StrategyId};

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(EntityId(100) > EntityId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(EntityId::INVALID.0, u64::MAX);
        assert!(!AgentId::default().is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }

    #[test]
    fn strategy_ids_are_unique() {
        let a = StrategyId::next();
        let b = StrategyId::next();
        assert_ne!(a, b);
    }
}

#[cfg(test)]
mod geo {
    use crate::Position;

    #[test]
    fn zero_distance() {
        let p = Position::new(0, 12.0, -40.0);
        assert_eq!(p.distance(p), 0.0);
    }

    #[test]
    fn pythagorean_distance() {
        let a = Position::new(0, 0.0, 0.0);
        let b = Position::new(0, 3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert!(a.within(b, 5.0));
        assert!(!a.within(b, 4.9));
    }

    #[test]
    fn different_maps_are_infinitely_far() {
        let a = Position::new(0, 0.0, 0.0);
        let b = Position::new(1, 0.0, 0.0);
        assert!(a.distance(b).is_infinite());
        assert!(!a.within(b, f32::MAX));
    }
}

#[cfg(test)]
mod entity {
    use crate::{Candidate, EntityId, EntityKind, Position};

    #[test]
    fn new_candidate_is_neutral() {
        let c = Candidate::new(EntityId(1), "goo", Position::new(0, 0.0, 0.0), 50);
        assert_eq!(c.kind, EntityKind::from("goo"));
        assert_eq!(c.max_hp, 50);
        assert!(!c.targeted);
        assert!(!c.is_doomed());
    }

    #[test]
    fn doomed_by_either_source() {
        let base = Candidate::new(EntityId(1), "goo", Position::new(0, 0.0, 0.0), 50);
        let burning = Candidate { doomed_by_burn: true, ..base.clone() };
        let shot = Candidate { doomed_by_projectiles: true, ..base };
        assert!(burning.is_doomed());
        assert!(shot.is_doomed());
    }
}

#[cfg(test)]
mod role {
    use crate::Role;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Mage".parse::<Role>().unwrap(), Role::Mage);
        assert_eq!(" warrior ".parse::<Role>().unwrap(), Role::Warrior);
    }

    #[test]
    fn unknown_role_errors() {
        assert!("necromancer".parse::<Role>().is_err());
    }

    #[test]
    fn labels_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}

#[cfg(test)]
mod config {
    use std::time::Duration;

    use crate::{FleetConfig, SlotConflict};

    #[test]
    fn empty_document_uses_defaults() {
        let config = FleetConfig::from_toml_str("").unwrap();
        assert_eq!(config, FleetConfig::default());
        assert_eq!(config.scheduler.cooldown_floor(), Duration::from_millis(50));
        assert_eq!(config.fleet.max_agents, 8);
        assert_eq!(config.reconnect.default_backoff_ms, 10_000);
    }

    #[test]
    fn partial_sections_override() {
        let config = FleetConfig::from_toml_str(
            "[scheduler]\nslot_conflict = \"reject\"\n\n[donation]\npair_cooldown_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.scheduler.slot_conflict, SlotConflict::Reject);
        assert_eq!(config.scheduler.cooldown_floor_ms, 50);
        assert_eq!(config.donation.pair_cooldown_ms, 250);
    }

    #[test]
    fn zero_floor_is_rejected() {
        assert!(FleetConfig::from_toml_str("[scheduler]\ncooldown_floor_ms = 0\n").is_err());
    }

    #[test]
    fn inverted_donation_bounds_are_rejected() {
        let text = "[donation]\nmin_amount = 200\nmax_amount = 100\n";
        assert!(FleetConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(FleetConfig::from_toml_str("[scheduler\n").is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = SimRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}
