//! Bootstrap - market setup
//!
//! Builds the shared collaborators (router and directory), gives every agent
//! its mailbox and spawns them. Agents only find each other through the
//! directory once they are running.

use std::sync::Arc;

use gavel_buyer::{BuyerAgent, BuyerHandle};
use gavel_clock::SystemClock;
use gavel_core::AgentId;
use gavel_gateway::{ChannelRouter, InMemoryDirectory};
use gavel_ports::{AuctionObserver, Clock};
use gavel_seller::{SellerAgent, SellerHandle};
use tokio::task::JoinHandle;

use crate::config::{AuctionSpec, ScenarioConfig};
use crate::error::Result;

/// A running market: one seller, its buyers, and what connects them
pub struct MarketBootstrap {
    pub router: ChannelRouter,
    pub directory: InMemoryDirectory,
    pub seller: SellerHandle,
    /// Buyer handles in configuration order
    pub buyers: Vec<(AgentId, BuyerHandle)>,
    tasks: Vec<JoinHandle<()>>,
}

impl MarketBootstrap {
    /// Spawn every agent of the scenario (must be called inside a tokio runtime)
    pub fn start(config: &ScenarioConfig, observer: Arc<dyn AuctionObserver>) -> Result<Self> {
        Self::start_with_clock(config, observer, Arc::new(SystemClock::new()))
    }

    pub fn start_with_clock(
        config: &ScenarioConfig,
        observer: Arc<dyn AuctionObserver>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let router = ChannelRouter::new();
        let directory = InMemoryDirectory::new();
        let mut tasks = Vec::with_capacity(config.buyers.len() + 1);

        let seller_id = AgentId::new(config.seller.agent_id.clone());
        let mailbox = router.register(seller_id.clone(), config.seller.mailbox_capacity)?;
        let (seller, seller_handle) = SellerAgent::new(
            config.seller.clone(),
            mailbox,
            Arc::new(router.clone()),
            Arc::new(directory.clone()),
            observer.clone(),
            clock,
        );
        tasks.push(seller.spawn());
        log::info!("Seller {} ready", seller_id);

        let mut buyers = Vec::with_capacity(config.buyers.len());
        for spec in &config.buyers {
            let buyer_id = AgentId::new(spec.config.agent_id.clone());
            let mailbox = router.register(buyer_id.clone(), spec.config.mailbox_capacity)?;
            let (buyer, handle) = BuyerAgent::new(
                spec.config.clone(),
                spec.preference_book(),
                mailbox,
                Arc::new(router.clone()),
                Arc::new(directory.clone()),
                observer.clone(),
            );
            tasks.push(buyer.spawn());
            log::info!(
                "Buyer {} ready with {} preferences",
                buyer_id,
                spec.preferences.len()
            );
            buyers.push((buyer_id, handle));
        }

        Ok(Self {
            router,
            directory,
            seller: seller_handle,
            buyers,
            tasks,
        })
    }

    pub fn buyer(&self, name: &str) -> Option<&BuyerHandle> {
        self.buyers
            .iter()
            .find(|(id, _)| id.as_str() == name)
            .map(|(_, handle)| handle)
    }

    /// Ask the seller to open each auction
    pub async fn open_auctions(&self, auctions: &[AuctionSpec]) -> Result<()> {
        for auction in auctions {
            self.seller
                .start_auction(auction.item.clone(), auction.starting_price, auction.increment)
                .await?;
        }
        Ok(())
    }

    /// Stop every agent and wait for them to finish
    pub async fn shutdown(self) {
        if let Err(e) = self.seller.shutdown().await {
            log::debug!("Seller already gone: {}", e);
        }
        // Buyers stop once their last handle is dropped
        drop(self.buyers);
        for task in self.tasks {
            if let Err(e) = task.await {
                log::warn!("Agent task ended abnormally: {}", e);
            }
        }
    }
}
