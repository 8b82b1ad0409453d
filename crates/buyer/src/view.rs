use std::collections::BTreeMap;

use gavel_core::{AgentId, AuctionPhase, AuctionSnapshot, ItemId};
use gavel_gateway::{AuctionStart, CallForBids, FinalResult, PurchaseFinalized, RoundResult};

/// The auctions a buyer has heard about, rebuilt from seller messages
#[derive(Debug, Default)]
pub struct MarketView {
    auctions: BTreeMap<ItemId, AuctionSnapshot>,
}

impl MarketView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<AuctionSnapshot> {
        self.auctions.values().cloned().collect()
    }

    fn entry(&mut self, seller: &AgentId, item: &ItemId) -> &mut AuctionSnapshot {
        self.auctions.entry(item.clone()).or_insert_with(|| {
            AuctionSnapshot::observed(
                item.clone(),
                seller.clone(),
                AuctionPhase::AwaitingParticipants,
                Default::default(),
            )
        })
    }

    pub fn on_start(&mut self, seller: &AgentId, start: &AuctionStart) -> AuctionSnapshot {
        let mut snapshot = AuctionSnapshot::observed(
            start.item.clone(),
            seller.clone(),
            AuctionPhase::AwaitingParticipants,
            start.starting_price,
        );
        snapshot.increment = start.increment;
        self.auctions.insert(start.item.clone(), snapshot.clone());
        snapshot
    }

    pub fn on_call(&mut self, seller: &AgentId, cfp: &CallForBids) -> AuctionSnapshot {
        let snapshot = self.entry(seller, &cfp.item);
        snapshot.phase = AuctionPhase::Bidding;
        snapshot.current_price = cfp.price;
        snapshot.bidders.clear();
        snapshot.clone()
    }

    pub fn on_round(&mut self, seller: &AgentId, result: &RoundResult) -> AuctionSnapshot {
        let snapshot = self.entry(seller, &result.item);
        snapshot.phase = AuctionPhase::Bidding;
        snapshot.current_price = result.price;
        snapshot.round = result.round;
        snapshot.bidders = result.bidders.clone();
        snapshot.clone()
    }

    pub fn on_final(&mut self, seller: &AgentId, result: &FinalResult) -> AuctionSnapshot {
        let snapshot = self.entry(seller, &result.item);
        snapshot.phase = AuctionPhase::AwaitingConfirmation;
        snapshot.current_price = result.final_price;
        snapshot.round = result.round;
        snapshot.winner = Some(result.winner.clone());
        snapshot.clone()
    }

    pub fn on_finalized(&mut self, seller: &AgentId, done: &PurchaseFinalized) -> AuctionSnapshot {
        let snapshot = self.entry(seller, &done.item);
        snapshot.phase = AuctionPhase::Closed;
        snapshot.current_price = done.price;
        snapshot.clone()
    }
}
