//! Gavel Runner - Book Auction Market
//!
//! Wires one seller and any number of buyers together in a single process:
//!
//! - **Config**: JSON scenario (seller settings, auctions, buyers and their wants)
//! - **Bootstrap**: router, directory and agents, started in the right order
//! - **Observer**: presentation callbacks written to the log or recorded
//! - **Simulation**: drives the market for a while and collects the outcome
//!
//! ## Architecture
//!
//! ```text
//!                 ┌───────────────────────┐
//!                 │   InMemoryDirectory   │
//!                 └───▲───────────────▲───┘
//!          lookup     │               │  register / deregister
//!                     │               │
//!  ┌──────────────────┴──┐        ┌───┴─────────────────┐
//!  │     Seller agent    │        │    Buyer agents     │
//!  │  AuctionManager     │◄──────►│  DecisionEngine     │
//!  │  Scheduler (ticks)  │  CFP / │  MarketView         │
//!  └──────────┬──────────┘ bids / └──────────┬──────────┘
//!             │          handshake           │
//!             └────────► ChannelRouter ◄─────┘
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod observer;
pub mod simulation;

// Re-export main types
pub use bootstrap::MarketBootstrap;
pub use config::{AuctionSpec, BuyerSpec, PreferenceSpec, ScenarioConfig};
pub use error::{ConfigError, RunnerError};
pub use observer::{LogObserver, RecordingObserver};
pub use simulation::{MarketSimulation, SimulationResults};
