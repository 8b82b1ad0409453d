use thiserror::Error;

/// Errors surfaced by a directory collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Agent {agent} is not registered for {capability}")]
    NotRegistered { agent: String, capability: String },
}

pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
