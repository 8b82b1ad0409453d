use gavel_core::{ItemId, Price};
use thiserror::Error;

/// Errors returned to the presentation layer by seller commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SellerError {
    #[error("An auction for {0} is already running")]
    DuplicateAuction(ItemId),

    #[error("Increment must be positive, got {0}")]
    InvalidIncrement(Price),

    #[error("Starting price must not be negative, got {0}")]
    InvalidPrice(Price),

    #[error("Seller agent has stopped")]
    AgentStopped,
}

/// Inbound message that decoded but cannot be applied
///
/// Answered with `MalformedMessage`; never changes auction state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("No auction for {0}")]
    UnknownItem(ItemId),
}
