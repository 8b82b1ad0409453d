use gavel_core::{AuctionSnapshot, ItemId, Price, Purchase};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::BuyerError;

/// Buyer state as seen from outside the agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerSnapshot {
    /// Titles still wanted, with their ceilings
    pub preferences: Vec<(ItemId, Price)>,
    /// Items this buyer currently holds a provisional accept for
    pub winning: Vec<ItemId>,
    /// Items agreed to but not yet finalized by the seller
    pub pending: Vec<ItemId>,
    pub purchases: Vec<Purchase>,
    /// Auctions heard about, as last reported by their seller
    pub auctions: Vec<AuctionSnapshot>,
    /// Whether the buyer is currently advertised in the directory
    pub in_market: bool,
    pub can_exit: bool,
}

type Reply<T> = oneshot::Sender<Result<T, BuyerError>>;

#[derive(Debug)]
pub(crate) enum BuyerCommand {
    AddPreference {
        item: ItemId,
        max_price: Price,
        reply: Reply<()>,
    },
    RequestExit {
        reply: Reply<()>,
    },
    LeaveMarket {
        reply: Reply<()>,
    },
    RejoinMarket {
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<BuyerSnapshot>,
    },
}

/// Presentation-layer handle to a buyer agent
#[derive(Debug, Clone)]
pub struct BuyerHandle {
    tx: mpsc::Sender<BuyerCommand>,
}

impl BuyerHandle {
    pub(crate) fn new(tx: mpsc::Sender<BuyerCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> BuyerCommand,
    ) -> Result<T, BuyerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| BuyerError::AgentStopped)?;
        rx.await.map_err(|_| BuyerError::AgentStopped)?
    }

    /// Want `item` at up to `max_price` (replaces an existing ceiling)
    pub async fn add_preference(
        &self,
        item: impl Into<ItemId>,
        max_price: Price,
    ) -> Result<(), BuyerError> {
        let item = item.into();
        self.request(|reply| BuyerCommand::AddPreference {
            item,
            max_price,
            reply,
        })
        .await
    }

    /// Leave the market and stop the agent
    ///
    /// Refused with [`BuyerError::StillWinning`] while a provisional win is held.
    pub async fn request_exit(&self) -> Result<(), BuyerError> {
        self.request(|reply| BuyerCommand::RequestExit { reply }).await
    }

    /// Stop advertising in the directory but keep running
    pub async fn leave_market(&self) -> Result<(), BuyerError> {
        self.request(|reply| BuyerCommand::LeaveMarket { reply }).await
    }

    /// Advertise in the directory again
    pub async fn rejoin_market(&self) -> Result<(), BuyerError> {
        self.request(|reply| BuyerCommand::RejoinMarket { reply }).await
    }

    pub async fn snapshot(&self) -> Result<BuyerSnapshot, BuyerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BuyerCommand::Snapshot { reply })
            .await
            .map_err(|_| BuyerError::AgentStopped)?;
        rx.await.map_err(|_| BuyerError::AgentStopped)
    }
}
