//! Presentation-layer observers

use gavel_core::{AuctionPhase, AuctionSnapshot, ItemId};
use gavel_ports::AuctionObserver;
use parking_lot::Mutex;

/// Writes every event and notification to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl AuctionObserver for LogObserver {
    fn on_auction_event(&self, item: &ItemId, snapshot: &AuctionSnapshot) {
        let who = snapshot
            .seller
            .as_ref()
            .map(|s| s.as_str())
            .unwrap_or("?");
        match &snapshot.winner {
            Some(winner) => log::info!(
                "[{}] {} {} at {} (round {}, winner {})",
                who,
                item,
                snapshot.phase,
                snapshot.current_price,
                snapshot.round,
                winner
            ),
            None => log::info!(
                "[{}] {} {} at {} (round {}, {} participants)",
                who,
                item,
                snapshot.phase,
                snapshot.current_price,
                snapshot.round,
                snapshot.participants
            ),
        }
    }

    fn on_notification(&self, text: &str) {
        log::info!("{}", text);
    }
}

/// Keeps everything it is told, for assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AuctionSnapshot>>,
    notifications: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuctionSnapshot> {
        self.events.lock().clone()
    }

    pub fn events_for(&self, item: &ItemId) -> Vec<AuctionSnapshot> {
        self.events
            .lock()
            .iter()
            .filter(|s| &s.item == item)
            .cloned()
            .collect()
    }

    /// Every phase the item went through, consecutive repeats collapsed
    pub fn phases_of(&self, item: &ItemId) -> Vec<AuctionPhase> {
        let mut phases: Vec<AuctionPhase> = Vec::new();
        for snapshot in self.events_for(item) {
            if phases.last() != Some(&snapshot.phase) {
                phases.push(snapshot.phase);
            }
        }
        phases
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().clone()
    }

    pub fn has_notification(&self, needle: &str) -> bool {
        self.notifications.lock().iter().any(|n| n.contains(needle))
    }
}

impl AuctionObserver for RecordingObserver {
    fn on_auction_event(&self, _item: &ItemId, snapshot: &AuctionSnapshot) {
        self.events.lock().push(snapshot.clone());
    }

    fn on_notification(&self, text: &str) {
        self.notifications.lock().push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::Auction;
    use rust_decimal_macros::dec;

    #[test]
    fn test_recording_observer_collapses_phases() {
        let observer = RecordingObserver::new();
        let mut auction = Auction::new("Foo", dec!(10), dec!(2));
        observer.on_auction_event(&auction.item, &auction.snapshot());
        observer.on_auction_event(&auction.item, &auction.snapshot());
        auction.phase = AuctionPhase::Bidding;
        observer.on_auction_event(&auction.item, &auction.snapshot());
        observer.on_notification("hello");

        assert_eq!(
            observer.phases_of(&ItemId::from("Foo")),
            vec![AuctionPhase::AwaitingParticipants, AuctionPhase::Bidding]
        );
        assert!(observer.has_notification("hell"));
        assert!(observer.events_for(&ItemId::from("Bar")).is_empty());
    }
}
