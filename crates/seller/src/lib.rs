//! Gavel Seller
//!
//! The seller side of the auction market. One agent owns every auction it
//! started and runs them independently:
//!
//! - [`AuctionManager`]: round state machine and purchase-confirmation handshake
//! - [`collector`]: first-bidder-wins tallying of bid replies
//! - [`SellerAgent`]: the actor loop (commands, timers, mailbox)
//! - [`SellerHandle`]: the presentation layer's way in
//!
//! The manager is synchronous and returns [`SellerAction`]s; the agent turns
//! them into messages, timers and observer callbacks.

pub mod agent;
pub mod collector;
pub mod config;
pub mod error;
pub mod handle;
pub mod manager;

pub use agent::{SellerAgent, SellerTimer, TimerKey};
pub use collector::BidVerdict;
pub use config::SellerConfig;
pub use error::{ProtocolViolation, SellerError};
pub use handle::{SellerHandle, SellerSnapshot};
pub use manager::{AuctionManager, SellerAction, SellerMessage};
