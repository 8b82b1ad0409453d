//! Simulation - drive a market for a fixed time and report what happened

use std::collections::BTreeMap;
use std::sync::Arc;

use gavel_buyer::BuyerSnapshot;
use gavel_core::{AgentId, AuctionSnapshot, ItemId, Purchase, SaleRecord};
use gavel_ports::AuctionObserver;

use crate::bootstrap::MarketBootstrap;
use crate::config::ScenarioConfig;
use crate::error::Result;
use crate::observer::LogObserver;

/// Outcome of a market run
#[derive(Debug, Clone, Default)]
pub struct SimulationResults {
    /// Confirmed sales in confirmation order
    pub sales: Vec<SaleRecord>,
    /// Auctions still running when the market was stopped
    pub unsold: Vec<AuctionSnapshot>,
    /// Final state of every buyer that was still reachable
    pub buyers: BTreeMap<AgentId, BuyerSnapshot>,
}

impl SimulationResults {
    pub fn sale_of(&self, item: &ItemId) -> Option<&SaleRecord> {
        self.sales.iter().find(|s| &s.item == item)
    }

    pub fn purchases_of(&self, buyer: &AgentId) -> &[Purchase] {
        self.buyers
            .get(buyer)
            .map(|b| b.purchases.as_slice())
            .unwrap_or(&[])
    }

    pub fn log_summary(&self) {
        log::info!("=== Market summary ===");
        for sale in &self.sales {
            log::info!(
                "SOLD   {} to {} at {} (contact {})",
                sale.item,
                sale.buyer,
                sale.price,
                sale.contact_info
            );
        }
        for auction in &self.unsold {
            log::info!(
                "OPEN   {} {} at {} (round {})",
                auction.item,
                auction.phase,
                auction.current_price,
                auction.round
            );
        }
        for (buyer, snapshot) in &self.buyers {
            log::info!(
                "BUYER  {} bought {} item(s), still wants {}",
                buyer,
                snapshot.purchases.len(),
                snapshot.preferences.len()
            );
        }
    }
}

/// A full market run from a scenario
pub struct MarketSimulation {
    config: ScenarioConfig,
    observer: Arc<dyn AuctionObserver>,
}

impl MarketSimulation {
    /// Simulation that reports to the log
    pub fn new(config: ScenarioConfig) -> Self {
        Self::with_observer(config, Arc::new(LogObserver))
    }

    pub fn with_observer(config: ScenarioConfig, observer: Arc<dyn AuctionObserver>) -> Self {
        Self { config, observer }
    }

    /// Start the market, let it run for the configured duration, collect results
    pub async fn run(self) -> Result<SimulationResults> {
        log::info!(
            "Starting market: {} auctions, {} buyers, {}s",
            self.config.auctions.len(),
            self.config.buyers.len(),
            self.config.duration_secs
        );

        let market = MarketBootstrap::start(&self.config, self.observer.clone())?;
        market.open_auctions(&self.config.auctions).await?;

        tokio::time::sleep(self.config.duration()).await;

        let results = Self::collect(&market).await?;
        market.shutdown().await;
        Ok(results)
    }

    async fn collect(market: &MarketBootstrap) -> Result<SimulationResults> {
        let seller = market.seller.snapshot().await?;
        let mut buyers = BTreeMap::new();
        for (id, handle) in &market.buyers {
            match handle.snapshot().await {
                Ok(snapshot) => {
                    buyers.insert(id.clone(), snapshot);
                }
                Err(e) => log::debug!("[{}] not reporting: {}", id, e),
            }
        }

        Ok(SimulationResults {
            sales: seller.sales,
            unsold: seller.auctions,
            buyers,
        })
    }
}
