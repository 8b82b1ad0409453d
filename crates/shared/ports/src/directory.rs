use std::collections::BTreeSet;

use gavel_core::AgentId;

use crate::error::DirectoryResult;

/// Port for peer discovery ("yellow pages")
///
/// The seller only reads from it (`lookup`, once per round tick); buyers
/// advertise themselves with `register` and withdraw with `deregister`.
pub trait Directory: Send + Sync {
    /// Identities currently advertising `capability`
    fn lookup(&self, capability: &str) -> DirectoryResult<BTreeSet<AgentId>>;

    /// Advertise `agent` under `capability` (idempotent)
    fn register(&self, agent: &AgentId, capability: &str) -> DirectoryResult<()>;

    /// Stop advertising `agent` under `capability`
    fn deregister(&self, agent: &AgentId, capability: &str) -> DirectoryResult<()>;
}
