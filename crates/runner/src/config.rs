//! Scenario configuration
//!
//! A scenario is a JSON document describing one market run:
//!
//! ```json
//! {
//!   "seller": { "agent_id": "seller", "round_interval_ms": 10000 },
//!   "auctions": [ { "item": "Foo", "starting_price": "10", "increment": "2" } ],
//!   "buyers": [
//!     { "agent_id": "ana", "contact_info": "555-0101",
//!       "preferences": [ { "item": "Foo", "max_price": "20" } ] }
//!   ],
//!   "duration_secs": 120
//! }
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use gavel_buyer::BuyerConfig;
use gavel_core::{ItemId, PreferenceBook, Price};
use gavel_seller::SellerConfig;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration for a market run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub seller: SellerConfig,

    /// Auctions the seller opens at start-up
    #[serde(default)]
    pub auctions: Vec<AuctionSpec>,

    #[serde(default)]
    pub buyers: Vec<BuyerSpec>,

    /// How long the market runs before results are collected
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
}

fn default_duration_secs() -> u64 {
    120
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seller: SellerConfig::default(),
            auctions: Vec::new(),
            buyers: Vec::new(),
            duration_secs: default_duration_secs(),
        }
    }
}

/// An auction to open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionSpec {
    pub item: ItemId,
    pub starting_price: Price,
    pub increment: Price,
}

impl AuctionSpec {
    pub fn new(item: impl Into<ItemId>, starting_price: Price, increment: Price) -> Self {
        Self {
            item: item.into(),
            starting_price,
            increment,
        }
    }
}

/// One title a buyer wants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSpec {
    pub item: ItemId,
    pub max_price: Price,
}

/// A buyer and its initial wants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerSpec {
    #[serde(flatten)]
    pub config: BuyerConfig,

    #[serde(default)]
    pub preferences: Vec<PreferenceSpec>,
}

impl BuyerSpec {
    pub fn new(agent_id: &str, contact_info: &str) -> Self {
        Self {
            config: BuyerConfig::new(agent_id, contact_info),
            preferences: Vec::new(),
        }
    }

    pub fn wants(mut self, item: impl Into<ItemId>, max_price: Price) -> Self {
        self.preferences.push(PreferenceSpec {
            item: item.into(),
            max_price,
        });
        self
    }

    pub fn preference_book(&self) -> PreferenceBook {
        let mut book = PreferenceBook::new();
        for pref in &self.preferences {
            book.insert(pref.item.clone(), pref.max_price);
        }
        book
    }
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check what serde cannot: unique names, sane prices, usable timings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seller.round_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "seller round_interval_ms must be positive".to_string(),
            ));
        }
        if self.seller.confirmation_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "seller confirmation_timeout_ms must be positive".to_string(),
            ));
        }
        if self.seller.mailbox_capacity == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} needs a mailbox_capacity of at least one",
                self.seller.agent_id
            )));
        }

        let mut names = BTreeSet::new();
        names.insert(self.seller.agent_id.as_str());
        for buyer in &self.buyers {
            if !names.insert(buyer.config.agent_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "agent name {} is used twice",
                    buyer.config.agent_id
                )));
            }
            if buyer.config.mailbox_capacity == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{} needs a mailbox_capacity of at least one",
                    buyer.config.agent_id
                )));
            }
            if let Some(pref) = buyer.preferences.iter().find(|p| p.max_price.is_sign_negative()) {
                return Err(ConfigError::Invalid(format!(
                    "{} has a negative ceiling for {}",
                    buyer.config.agent_id, pref.item
                )));
            }
        }

        let mut items = BTreeSet::new();
        for auction in &self.auctions {
            if !items.insert(&auction.item) {
                return Err(ConfigError::Invalid(format!(
                    "{} is auctioned twice",
                    auction.item
                )));
            }
            if auction.increment <= Price::ZERO {
                return Err(ConfigError::Invalid(format!(
                    "{} needs a positive increment",
                    auction.item
                )));
            }
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Two books, three buyers; every title finds a buyer
    pub fn demo() -> Self {
        Self {
            seller: SellerConfig::new("seller"),
            auctions: vec![
                AuctionSpec::new("Foundation", dec!(10), dec!(2)),
                AuctionSpec::new("Dune", dec!(25), dec!(5)),
            ],
            buyers: vec![
                BuyerSpec::new("ana", "555-0101")
                    .wants("Foundation", dec!(20))
                    .wants("Dune", dec!(30)),
                BuyerSpec::new("ben", "555-0102").wants("Foundation", dec!(15)),
                BuyerSpec::new("cat", "555-0103").wants("Dune", dec!(45)),
            ],
            duration_secs: 180,
        }
    }
}
