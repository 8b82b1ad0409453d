//! Gavel Core Domain
//!
//! Pure domain types for the Gavel book auction market.
//! This crate contains no async, no I/O, and is 100% unit testable.
//!
//! - [`Auction`]: the seller's per-item record and its round arithmetic
//! - [`PreferenceBook`]: a buyer's titles of interest and price ceilings
//! - [`SaleRecord`] / [`Purchase`]: completed transactions as each side sees them

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Auction, AuctionPhase, AuctionSnapshot, IdleOutcome, PreferenceBook, Purchase,
    PurchaseCheck, RoundOutcome, SaleRecord,
};
pub use values::{AgentId, ItemId, Price, Timestamp};
