//! In-memory directory for single-process markets

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use gavel_core::AgentId;
use gavel_ports::{Directory, DirectoryError, DirectoryResult};

/// Capability → advertised agents, shared between all agents of a process
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    entries: Arc<DashMap<String, BTreeSet<AgentId>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for InMemoryDirectory {
    fn lookup(&self, capability: &str) -> DirectoryResult<BTreeSet<AgentId>> {
        Ok(self
            .entries
            .get(capability)
            .map(|agents| agents.value().clone())
            .unwrap_or_default())
    }

    fn register(&self, agent: &AgentId, capability: &str) -> DirectoryResult<()> {
        self.entries
            .entry(capability.to_string())
            .or_default()
            .insert(agent.clone());
        log::debug!("Directory: {} registered for {}", agent, capability);
        Ok(())
    }

    fn deregister(&self, agent: &AgentId, capability: &str) -> DirectoryResult<()> {
        let removed = self
            .entries
            .get_mut(capability)
            .is_some_and(|mut agents| agents.remove(agent));
        if !removed {
            return Err(DirectoryError::NotRegistered {
                agent: agent.to_string(),
                capability: capability.to_string(),
            });
        }
        log::debug!("Directory: {} deregistered from {}", agent, capability);
        Ok(())
    }
}
