//! skirmish — smallest end-to-end run of the rust_fleet controller.
//!
//! Three scripted mage agents fight over a synthetic field of monsters that
//! respawns every half second.  Each agent runs a combat strategy (area
//! effect plus basic attack, kill de-duplication, resource donation) and a
//! patrol strategy whose cadence comes from an embedded CSV table.  Agent 1
//! drops its connection mid-run and is rebuilt through the handle factory
//! after a server-imposed backoff.
//!
//! Pass a TOML file as the first argument to override the fleet config.
//! Loop and link events are written to `output/skirmish/`.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fl_agent::{
    Action, AgentHandle, AgentIdentity, AgentSlot, ConnectError, MockFactory, MockHandle, MockHandleBuilder,
    ResourcePool, SharedHandle, ShardId,
};
use fl_combat::{AllocatorConfig, CombatStrategy};
use fl_coord::{Deduplicator, DonationLedger, DonationPolicy, Donor, FriendSet};
use fl_core::{AbilityId, AgentId, Candidate, EntityId, EntityKind, FleetConfig, Position, Role, SimRng};
use fl_output::{CsvWriter, OutputObserver, OutputWriter, SharedWriter};
use fl_schedule::{load_cadences_reader, Interval, Loop, LoopName, Strategy};
use fl_sim::Fleet;

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:   u32      = 3;
const SEED:          u64      = 42;
const RUN_FOR:       Duration = Duration::from_secs(8);
const RESPAWN_EVERY: Duration = Duration::from_millis(500);
const DROP_AFTER:    Duration = Duration::from_secs(2);

const ATTACK: AbilityId = AbilityId(0);
const BURST:  AbilityId = AbilityId(1);
const GIVE:   AbilityId = AbilityId(2);

const KINDS: [&str; 3] = ["phoenix", "goo", "bee"];

// ── Cadence CSV ───────────────────────────────────────────────────────────────

// Patrol loops; `move` walks, `loot` is a placeholder pickup.
const CADENCE_CSV: &str = "\
loop,interval_ms,abilities\n\
move,1200,\n\
loot,2500,\n\
";

// ── Agents ────────────────────────────────────────────────────────────────────

fn template(id: u32) -> MockHandleBuilder {
    MockHandle::builder(AgentId(id), Role::Mage)
        .pool(ResourcePool::new(400, 500))
        .range(150.0)
        .attack_damage(12)
        .attack_ability(ATTACK)
}

fn spawn_agent(id: u32) -> Arc<MockHandle> {
    let h = template(id)
        .name(format!("mage{id}"))
        .position(Position::new(0, id as f32 * 40.0, 0.0))
        .build();
    h.set_cooldown_on_use(ATTACK, Duration::from_millis(400));
    h.set_cooldown_on_use(BURST, Duration::from_millis(1_500));
    h.set_cooldown_on_use(GIVE, Duration::from_millis(1_000));
    h
}

fn patrol(seed: u64) -> Result<Arc<Strategy>> {
    let cadences = load_cadences_reader(Cursor::new(CADENCE_CSV))?;
    let steps = Arc::new(Steps::new(seed));
    let walk = Loop::new(Interval::fixed_ms(2_000), move |agent: SharedHandle| {
        let (dx, dy) = steps.next();
        async move {
            let to = agent.position().offset(dx, dy);
            agent.perform(Action::Move { to }).await.map(|_| ())
        }
    });
    let loot = Loop::new(Interval::fixed_ms(5_000), |_agent| async { Ok(()) });

    Ok(Strategy::builder("patrol")
        .run(LoopName::Move, walk)
        .run(LoopName::Loot, loot)
        .cadences(&cadences)
        .build())
}

/// Seeded random walk shared by one patrol loop.
struct Steps(Mutex<SimRng>);

impl Steps {
    fn new(seed: u64) -> Self {
        Steps(Mutex::new(SimRng::new(seed)))
    }

    fn next(&self) -> (f32, f32) {
        let mut rng = self.0.lock();
        (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0))
    }
}

fn combat(friends: &FriendSet, config: &FleetConfig, ledger: &Arc<DonationLedger>) -> Result<Arc<Strategy>> {
    let policy = DonationPolicy::from_config(&config.donation, GIVE, 200.0);
    let strategy = CombatStrategy::builder(ATTACK)
        .kinds(KINDS)
        .area(BURST, AllocatorConfig::default())
        .dedup(Deduplicator::new(friends.clone()).with_cooperative([EntityKind::from("phoenix")]))
        .donor(Donor::new(friends.clone(), policy, Arc::clone(ledger)))
        .donate_every(Duration::from_millis(1_500))
        .build()?;
    Ok(strategy)
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Drop a handful of monsters near the agents into every current cache.
fn respawn(rng: &mut SimRng, slots: &[Arc<AgentSlot>], next_id: &mut u64) -> usize {
    let count = rng.gen_range(2..6);
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let kind = rng.choose(&KINDS).copied().unwrap_or("goo");
        let hp = match kind {
            "phoenix" => rng.gen_range(200..400),
            "bee"     => rng.gen_range(5..30),
            _         => rng.gen_range(20..60),
        };
        let at = Position::new(0, rng.gen_range(-20.0..100.0), rng.gen_range(-60.0..60.0));
        *next_id += 1;
        spawned.push(Candidate::new(EntityId(*next_id), kind, at, hp));
    }
    for slot in slots {
        let handle = slot.current();
        for c in &spawned {
            handle.visible().upsert(c.clone());
        }
    }
    count
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== skirmish: rust_fleet controller ===");
    println!("Agents: {AGENT_COUNT}  |  Run: {} s  |  Seed: {SEED}", RUN_FOR.as_secs());
    println!();

    // 1. Configuration.
    let config = match std::env::args().nth(1) {
        Some(path) => FleetConfig::load(Path::new(&path))?,
        None => FleetConfig::default(),
    };

    // 2. Factory; the first rebuilt handle is told to wait.
    let factory = Arc::new(MockFactory::new(template(0)));
    factory.script_connects([Err(ConnectError::Rejected("wait_1_second".into()))]);

    // 3. Output.
    std::fs::create_dir_all("output/skirmish")?;
    let writer = SharedWriter::new(CsvWriter::new(Path::new("output/skirmish"))?);

    // 4. Start every agent without strategies, so friend sets can see all slots.
    let mut fleet = Fleet::new(config.clone(), Arc::clone(&factory) as _);
    let mut agents = Vec::new();
    let mut controls = Vec::new();
    for id in 0..AGENT_COUNT {
        let h = spawn_agent(id);
        let identity = AgentIdentity::new(h.id(), "demo", "token", format!("mage{id}"));
        let control = fleet
            .start(Arc::clone(&h) as SharedHandle, identity, ShardId::new("US", "I"), OutputObserver::new(writer.clone()))
            .await?;
        agents.push(h);
        controls.push(control);
    }

    // 5. Strategies.
    let friends = FriendSet::from_slots(&fleet.slots());
    let ledger = Arc::new(DonationLedger::new());
    for (i, control) in controls.iter().enumerate() {
        control.apply(combat(&friends, &config, &ledger)?).await?;
        control.apply(patrol(SEED + i as u64)?).await?;
    }

    // 6. Run the world.
    let mut rng = SimRng::new(SEED);
    let mut next_id = 0u64;
    let mut spawned = 0usize;
    let mut dropped = false;
    let t0 = Instant::now();
    let mut ticker = tokio::time::interval(RESPAWN_EVERY);
    while t0.elapsed() < RUN_FOR {
        ticker.tick().await;
        spawned += respawn(&mut rng, &fleet.slots(), &mut next_id);
        if !dropped && t0.elapsed() >= DROP_AFTER {
            info!(agent = %agents[1].id(), "dropping connection");
            agents[1].simulate_disconnect();
            dropped = true;
        }
    }

    // 7. Summary before stopping.
    println!();
    println!("{:<8} {:<14} {:<22} {:<10}", "Agent", "Link", "Loops", "Visible");
    println!("{}", "-".repeat(56));
    for control in &controls {
        let status = control.status().await?;
        let loops: Vec<&str> = status.loops.iter().map(|l| l.as_str()).collect();
        let visible = fleet
            .slots()
            .iter()
            .find(|s| s.id() == status.agent)
            .map(|s| s.current().visible().len())
            .unwrap_or(0);
        println!("{:<8} {:<14} {:<22} {:<10}", status.agent.0, status.link.label(), loops.join(","), visible);
    }

    fleet.stop_all().await;
    let mut writer = writer;
    writer.finish()?;

    let attacks: usize = agents
        .iter()
        .chain(factory.built().iter())
        .flat_map(|h| h.performed())
        .filter(|a| matches!(a, Action::Attack { .. } | Action::AreaEffect { .. }))
        .count();
    println!();
    println!("Monsters spawned : {spawned}");
    println!("Attacks issued   : {attacks}");
    println!("Handles rebuilt  : {}", factory.built().len());
    println!("Output           : output/skirmish/loop_events.csv, link_events.csv");

    Ok(())
}
