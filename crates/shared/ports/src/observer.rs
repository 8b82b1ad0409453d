use gavel_core::{AuctionSnapshot, ItemId};

/// Port for the presentation layer
///
/// Agents push state changes out through this; it has no way to influence
/// protocol decisions. Implementations must be cheap and non-blocking since
/// they run inside the agent's message loop.
pub trait AuctionObserver: Send + Sync {
    /// An auction's visible state changed
    fn on_auction_event(&self, item: &ItemId, snapshot: &AuctionSnapshot);

    /// Free-form operator notification
    fn on_notification(&self, text: &str);
}

/// Observer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl AuctionObserver for NoopObserver {
    fn on_auction_event(&self, _item: &ItemId, _snapshot: &AuctionSnapshot) {}

    fn on_notification(&self, _text: &str) {}
}
