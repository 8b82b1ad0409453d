//! Gavel Buyer
//!
//! The buyer side of the auction market:
//!
//! - [`DecisionEngine`]: preferences, bid decisions, the winning set and
//!   purchase commitment
//! - [`MarketView`]: the buyer's picture of the auctions it hears about
//! - [`BuyerAgent`]: the actor loop (commands, mailbox)
//! - [`BuyerHandle`]: the presentation layer's way in
//!
//! A buyer may only leave the market while it holds no provisional win.

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod view;

pub use agent::BuyerAgent;
pub use config::BuyerConfig;
pub use engine::{DecisionEngine, PurchaseDecision};
pub use error::BuyerError;
pub use handle::{BuyerHandle, BuyerSnapshot};
pub use view::MarketView;
