use gavel_core::{AuctionSnapshot, ItemId, Price, SaleRecord};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::SellerError;

/// Seller state as seen from outside the agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerSnapshot {
    /// Active auctions, ordered by item
    pub auctions: Vec<AuctionSnapshot>,
    /// Completed sales in the order they were confirmed
    pub sales: Vec<SaleRecord>,
}

impl SellerSnapshot {
    pub fn auction(&self, item: &ItemId) -> Option<&AuctionSnapshot> {
        self.auctions.iter().find(|a| &a.item == item)
    }

    pub fn sale(&self, item: &ItemId) -> Option<&SaleRecord> {
        self.sales.iter().find(|s| &s.item == item)
    }
}

/// Commands accepted by a running seller agent
#[derive(Debug)]
pub(crate) enum SellerCommand {
    StartAuction {
        item: ItemId,
        starting_price: Price,
        increment: Price,
        reply: oneshot::Sender<Result<(), SellerError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SellerSnapshot>,
    },
    Shutdown,
}

/// Presentation-layer handle to a seller agent
///
/// Cheap to clone. Every call fails with [`SellerError::AgentStopped`] once
/// the agent's loop has ended.
#[derive(Debug, Clone)]
pub struct SellerHandle {
    tx: mpsc::Sender<SellerCommand>,
}

impl SellerHandle {
    pub(crate) fn new(tx: mpsc::Sender<SellerCommand>) -> Self {
        Self { tx }
    }

    /// Open an auction for `item`
    pub async fn start_auction(
        &self,
        item: impl Into<ItemId>,
        starting_price: Price,
        increment: Price,
    ) -> Result<(), SellerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SellerCommand::StartAuction {
                item: item.into(),
                starting_price,
                increment,
                reply,
            })
            .await
            .map_err(|_| SellerError::AgentStopped)?;
        rx.await.map_err(|_| SellerError::AgentStopped)?
    }

    pub async fn snapshot(&self) -> Result<SellerSnapshot, SellerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SellerCommand::Snapshot { reply })
            .await
            .map_err(|_| SellerError::AgentStopped)?;
        rx.await.map_err(|_| SellerError::AgentStopped)
    }

    /// Stop the agent; pending timers are dropped
    pub async fn shutdown(&self) -> Result<(), SellerError> {
        self.tx
            .send(SellerCommand::Shutdown)
            .await
            .map_err(|_| SellerError::AgentStopped)
    }
}
