//! Fluent builder for constructing a [`Strategist`].

use std::sync::Arc;

use tokio::sync::mpsc;

use fl_agent::{AgentIdentity, AgentSlot, HandleFactory, SharedHandle, ShardId};
use fl_core::FleetConfig;

use crate::{SchedulerError, SchedulerResult, Strategist, StrategistHandle};

/// Fluent builder for [`Strategist`].
///
/// # Required inputs
///
/// - the agent's initial [`SharedHandle`]; if it is not connected the
///   strategist reconnects through the factory on its first pass
/// - [`AgentIdentity`] and [`ShardId`], reused on every reconnect
/// - an `Arc<dyn HandleFactory>` for building replacement handles
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                 |
/// |-------------------------|-------------------------|
/// | `.config(c)`            | `FleetConfig::default()`|
/// | `.command_capacity(n)`  | `32`                    |
///
/// # Example
///
/// ```rust,ignore
/// let (mut strategist, handle) = StrategistBuilder::new(agent, identity, shard, factory)
///     .config(config)
///     .build()?;
/// strategist.apply(combat)?;
/// strategist.run(&mut NoopObserver).await;
/// ```
pub struct StrategistBuilder {
    handle:   SharedHandle,
    identity: AgentIdentity,
    shard:    ShardId,
    factory:  Arc<dyn HandleFactory>,
    config:   FleetConfig,
    capacity: usize,
}

impl StrategistBuilder {
    pub fn new(
        handle:   SharedHandle,
        identity: AgentIdentity,
        shard:    ShardId,
        factory:  Arc<dyn HandleFactory>,
    ) -> Self {
        Self {
            handle,
            identity,
            shard,
            factory,
            config:   FleetConfig::default(),
            capacity: 32,
        }
    }

    pub fn config(mut self, config: FleetConfig) -> Self {
        self.config = config;
        self
    }

    /// Bound of the command channel behind [`StrategistHandle`].
    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Validate inputs and construct the strategist and its command handle.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::Config`] if the configuration is invalid, the
    ///   command capacity is zero, or the identity names a different agent
    ///   than the handle.
    pub fn build(self) -> SchedulerResult<(Strategist, StrategistHandle)> {
        self.config.validate()?;
        if self.capacity == 0 {
            return Err(SchedulerError::Config("command_capacity must be positive".into()));
        }
        let agent = self.handle.id();
        if self.identity.agent != agent {
            return Err(SchedulerError::Config(format!(
                "identity is for {} but the handle reports {}",
                self.identity.agent, agent
            )));
        }

        let slot = Arc::new(AgentSlot::new(self.handle, self.identity, self.shard));
        let (tx, rx) = mpsc::channel(self.capacity);
        let strategist = Strategist::new(slot, self.factory, self.config, rx);
        Ok((strategist, StrategistHandle::new(agent, tx)))
    }
}
