use gavel_core::{ItemId, Price};
use gavel_ports::DirectoryError;
use thiserror::Error;

/// Errors returned to the presentation layer by buyer commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuyerError {
    #[error("Still the provisional winner of {0:?}")]
    StillWinning(Vec<ItemId>),

    #[error("Maximum price must not be negative, got {0}")]
    InvalidPrice(Price),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Buyer agent has stopped")]
    AgentStopped,
}
