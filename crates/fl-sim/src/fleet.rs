//! `Fleet` — starts, tracks and stops one strategist task per agent.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use fl_agent::{AgentIdentity, AgentSlot, HandleFactory, SharedHandle, ShardId};
use fl_core::{AgentId, FleetConfig};

use crate::{
    SchedulerError, SchedulerObserver, SchedulerResult, StrategistBuilder, StrategistHandle,
};

struct Running {
    slot:   Arc<AgentSlot>,
    handle: StrategistHandle,
    task:   JoinHandle<()>,
}

/// The set of agents controlled by this process.
///
/// Capacity is `fleet.max_agents`.  Each started agent runs its
/// [`Strategist`][crate::Strategist] on a spawned tokio task; callers talk
/// to it through the returned [`StrategistHandle`].
pub struct Fleet {
    config:  FleetConfig,
    factory: Arc<dyn HandleFactory>,
    agents:  BTreeMap<AgentId, Running>,
}

impl Fleet {
    pub fn new(config: FleetConfig, factory: Arc<dyn HandleFactory>) -> Self {
        Self { config, factory, agents: BTreeMap::new() }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Start scheduling `handle`.  Connects it first if needed; a failed
    /// first connect is left to the strategist's reconnect logic.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::FleetFull`] at `fleet.max_agents`.
    /// - [`SchedulerError::AgentExists`] if the agent is already running.
    /// - [`SchedulerError::Config`] from the builder.
    pub async fn start<O>(
        &mut self,
        handle:   SharedHandle,
        identity: AgentIdentity,
        shard:    ShardId,
        observer: O,
    ) -> SchedulerResult<StrategistHandle>
    where
        O: SchedulerObserver + Send + 'static,
    {
        let agent = handle.id();
        if self.agents.len() >= self.config.fleet.max_agents {
            return Err(SchedulerError::FleetFull { max: self.config.fleet.max_agents });
        }
        if self.agents.contains_key(&agent) {
            return Err(SchedulerError::AgentExists(agent));
        }

        if !handle.is_connected() {
            if let Err(e) = handle.connect().await {
                warn!(agent = %agent, error = %e, "initial connect failed");
            }
        }

        let (mut strategist, control) =
            StrategistBuilder::new(handle, identity, shard.clone(), Arc::clone(&self.factory))
                .config(self.config.clone())
                .build()?;
        let slot = Arc::clone(strategist.slot());

        let mut observer = observer;
        let task = tokio::spawn(async move {
            strategist.run(&mut observer).await;
        });

        info!(agent = %agent, shard = %shard, agents = self.agents.len() + 1, "agent started");
        self.agents.insert(agent, Running { slot, handle: control.clone(), task });
        Ok(control)
    }

    /// Slots of every running agent, in id order.  Build friend sets from
    /// these.
    pub fn slots(&self) -> Vec<Arc<AgentSlot>> {
        self.agents.values().map(|r| Arc::clone(&r.slot)).collect()
    }

    pub fn handle(&self, agent: AgentId) -> Option<StrategistHandle> {
        self.agents.get(&agent).map(|r| r.handle.clone())
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Stop `agent`, wait for its in-flight actions, and forget it.
    pub async fn stop(&mut self, agent: AgentId) -> SchedulerResult<()> {
        let running = self.agents.remove(&agent).ok_or(SchedulerError::AgentNotFound(agent))?;
        // Closed means the task already exited on its own.
        match running.handle.stop().await {
            Ok(()) | Err(SchedulerError::Closed) => {}
            Err(e) => return Err(e),
        }
        if let Err(e) = running.task.await {
            warn!(agent = %agent, error = %e, "strategist task ended abnormally");
        }
        info!(agent = %agent, agents = self.agents.len(), "agent stopped");
        Ok(())
    }

    pub async fn stop_all(&mut self) {
        for agent in self.ids() {
            if let Err(e) = self.stop(agent).await {
                warn!(agent = %agent, error = %e, "stop failed");
            }
        }
    }
}
