//! Auction manager - the seller's round state machine
//!
//! Owns every active [`Auction`] keyed by item. Each entry point mutates the
//! affected auction in place and returns the actions the agent must carry
//! out, in order. Nothing here awaits, so ticks and replies are applied
//! strictly one after another.

use std::collections::HashMap;
use std::sync::Arc;

use gavel_core::{
    AgentId, Auction, AuctionPhase, AuctionSnapshot, IdleOutcome, ItemId, Price, RoundOutcome,
    SaleRecord,
};
use gavel_gateway::{
    AuctionStart, BidReply, CallForBids, FinalResult, ProvisionalAccept, ProvisionalReject,
    PurchaseAgree, PurchaseFinalized, PurchaseRefuse, PurchaseRequest, RoundResult,
};
use gavel_ports::{Clock, Directory};

use crate::collector::{self, BidVerdict};
use crate::error::{ProtocolViolation, SellerError};
use crate::handle::SellerSnapshot;

/// Message the seller sends to buyers
#[derive(Debug, Clone, PartialEq)]
pub enum SellerMessage {
    AuctionStart(AuctionStart),
    CallForBids(CallForBids),
    ProvisionalAccept(ProvisionalAccept),
    ProvisionalReject(ProvisionalReject),
    RoundResult(RoundResult),
    FinalResult(FinalResult),
    PurchaseRequest(PurchaseRequest),
    PurchaseFinalized(PurchaseFinalized),
}

/// Side effect requested by the manager
#[derive(Debug, Clone, PartialEq)]
pub enum SellerAction {
    Send { to: AgentId, message: SellerMessage },
    Broadcast { to: Vec<AgentId>, message: SellerMessage },
    /// Arm (or re-arm) the periodic round tick
    ArmRoundTick { item: ItemId, epoch: u64 },
    CancelRoundTick { item: ItemId },
    ArmConfirmationTimeout { item: ItemId, epoch: u64 },
    /// Drop every timer of the item
    CancelTimers { item: ItemId },
    Event(AuctionSnapshot),
    Notify(String),
}

pub struct AuctionManager {
    seller: AgentId,
    capability: String,
    directory: Arc<dyn Directory>,
    clock: Arc<dyn Clock>,
    auctions: HashMap<ItemId, Auction>,
    sales: Vec<SaleRecord>,
}

impl AuctionManager {
    pub fn new(
        seller: AgentId,
        capability: impl Into<String>,
        directory: Arc<dyn Directory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            seller,
            capability: capability.into(),
            directory,
            clock,
            auctions: HashMap::new(),
            sales: Vec::new(),
        }
    }

    pub fn auction(&self, item: &ItemId) -> Option<&Auction> {
        self.auctions.get(item)
    }

    pub fn sales(&self) -> &[SaleRecord] {
        &self.sales
    }

    pub fn snapshot(&self) -> SellerSnapshot {
        let mut auctions: Vec<_> = self.auctions.values().map(|a| self.view(a)).collect();
        auctions.sort_by(|a, b| a.item.cmp(&b.item));
        SellerSnapshot {
            auctions,
            sales: self.sales.clone(),
        }
    }

    fn view(&self, auction: &Auction) -> AuctionSnapshot {
        let mut snapshot = auction.snapshot();
        snapshot.seller = Some(self.seller.clone());
        snapshot
    }

    /// Open an auction; the first call-for-bids goes out on the first tick
    pub fn start_auction(
        &mut self,
        item: ItemId,
        starting_price: Price,
        increment: Price,
    ) -> Result<Vec<SellerAction>, SellerError> {
        if self.auctions.contains_key(&item) {
            return Err(SellerError::DuplicateAuction(item));
        }
        if starting_price.is_sign_negative() {
            return Err(SellerError::InvalidPrice(starting_price));
        }
        if increment <= Price::ZERO {
            return Err(SellerError::InvalidIncrement(increment));
        }

        let auction = Auction::new(item.clone(), starting_price, increment);
        log::info!(
            "[{}] Auction for {} opened at {} (+{})",
            self.seller,
            item,
            starting_price,
            increment
        );

        let actions = vec![
            SellerAction::ArmRoundTick {
                item: item.clone(),
                epoch: auction.epoch,
            },
            SellerAction::Event(self.view(&auction)),
            SellerAction::Notify(format!(
                "Auction for {} started at {}, increment {}",
                item, starting_price, increment
            )),
        ];
        self.auctions.insert(item, auction);
        Ok(actions)
    }

    /// Periodic round tick for one auction
    pub fn on_round_tick(&mut self, item: &ItemId, epoch: u64) -> Vec<SellerAction> {
        let participants = match self.directory.lookup(&self.capability) {
            Ok(found) => Some(found),
            Err(e) => {
                log::warn!(
                    "[{}] Directory lookup failed, keeping known participants: {}",
                    self.seller,
                    e
                );
                None
            }
        };

        let Some(auction) = self.auctions.get_mut(item) else {
            return Vec::new();
        };
        if auction.epoch != epoch || auction.is_awaiting_confirmation() {
            return Vec::new();
        }

        let mut actions = Vec::new();
        match auction.close_round() {
            RoundOutcome::NotStarted => {}
            RoundOutcome::NoBids => {
                log::debug!("[{}] No bids for {} yet", self.seller, item);
            }
            RoundOutcome::Won { winner, price } => {
                let round = auction.round;
                let recipients: Vec<_> = auction.participants.iter().cloned().collect();
                log::info!(
                    "[{}] {} won by {} at {} in round {}",
                    self.seller,
                    item,
                    winner,
                    price,
                    round
                );
                actions.push(SellerAction::Broadcast {
                    to: recipients,
                    message: SellerMessage::FinalResult(FinalResult {
                        item: item.clone(),
                        winner: winner.clone(),
                        final_price: price,
                        round,
                    }),
                });
                actions.push(SellerAction::Send {
                    to: winner.clone(),
                    message: SellerMessage::PurchaseRequest(PurchaseRequest {
                        item: item.clone(),
                        price,
                    }),
                });
                actions.push(SellerAction::CancelRoundTick { item: item.clone() });
                actions.push(SellerAction::ArmConfirmationTimeout {
                    item: item.clone(),
                    epoch,
                });
                actions.push(SellerAction::Notify(format!(
                    "{} won {} at {}, awaiting confirmation",
                    winner, item, price
                )));
                let snapshot = self.view_of(item);
                actions.extend(snapshot.map(SellerAction::Event));
                return actions;
            }
            RoundOutcome::Contested {
                price,
                bidders,
                round,
            } => {
                log::debug!(
                    "[{}] Round {} of {} contested by {} bidders at {}",
                    self.seller,
                    round,
                    item,
                    bidders.len(),
                    price
                );
                actions.push(SellerAction::Broadcast {
                    to: auction.participants.iter().cloned().collect(),
                    message: SellerMessage::RoundResult(RoundResult {
                        item: item.clone(),
                        price,
                        bidders,
                        round,
                    }),
                });
            }
        }

        auction.advance_round();

        if let Some(found) = participants {
            let newcomers = auction.refresh_participants(found);
            if !newcomers.is_empty() {
                actions.push(SellerAction::Broadcast {
                    to: newcomers,
                    message: SellerMessage::AuctionStart(AuctionStart {
                        item: item.clone(),
                        starting_price: auction.starting_price,
                        increment: auction.increment,
                    }),
                });
            }
        }

        if auction.participants.is_empty() {
            match auction.go_idle() {
                IdleOutcome::Waiting => {
                    log::debug!("[{}] {} is waiting for participants", self.seller, item);
                }
                IdleOutcome::Abandoned => {
                    log::info!("[{}] All participants left {}", self.seller, item);
                    actions.push(SellerAction::Notify(format!(
                        "All participants left {}, price reset to {}",
                        item, auction.starting_price
                    )));
                }
            }
        } else {
            auction.phase = AuctionPhase::Bidding;
            actions.push(SellerAction::Broadcast {
                to: auction.participants.iter().cloned().collect(),
                message: SellerMessage::CallForBids(CallForBids {
                    item: item.clone(),
                    price: auction.current_price,
                }),
            });
        }

        actions.extend(self.view_of(item).map(SellerAction::Event));
        actions
    }

    fn view_of(&self, item: &ItemId) -> Option<AuctionSnapshot> {
        self.auctions.get(item).map(|a| self.view(a))
    }

    /// The winner did not confirm in time: start over at the original terms
    pub fn on_confirmation_timeout(&mut self, item: &ItemId, epoch: u64) -> Vec<SellerAction> {
        let Some(auction) = self.auctions.get(item) else {
            return Vec::new();
        };
        if auction.epoch != epoch || auction.purchase_confirmed || !auction.is_awaiting_confirmation()
        {
            return Vec::new();
        }

        let fresh = auction.restarted();
        log::info!(
            "[{}] {} not confirmed by {:?}, restarting at {}",
            self.seller,
            item,
            auction.winner,
            fresh.starting_price
        );

        let actions = vec![
            SellerAction::ArmRoundTick {
                item: item.clone(),
                epoch: fresh.epoch,
            },
            SellerAction::Notify(format!(
                "Purchase of {} not confirmed, auction restarted at {}",
                item, fresh.starting_price
            )),
            SellerAction::Event(self.view(&fresh)),
        ];
        self.auctions.insert(item.clone(), fresh);
        actions
    }

    /// Bid reply from a participant
    pub fn on_bid(
        &mut self,
        sender: &AgentId,
        bid: BidReply,
    ) -> Result<Vec<SellerAction>, ProtocolViolation> {
        let auction = self
            .auctions
            .get_mut(&bid.item)
            .ok_or_else(|| ProtocolViolation::UnknownItem(bid.item.clone()))?;

        let verdict = collector::collect(auction, sender, bid.participate);
        let price = auction.current_price;
        log::debug!(
            "[{}] {} {} on {} at {}: {:?}",
            self.seller,
            sender,
            if bid.participate { "bids" } else { "passes" },
            bid.item,
            price,
            verdict
        );

        let message = match verdict {
            BidVerdict::Accepted => SellerMessage::ProvisionalAccept(ProvisionalAccept {
                item: bid.item,
                price,
            }),
            BidVerdict::Rejected => SellerMessage::ProvisionalReject(ProvisionalReject {
                item: bid.item,
                price,
            }),
        };
        Ok(vec![SellerAction::Send {
            to: sender.clone(),
            message,
        }])
    }

    /// Purchase agreement from (hopefully) the declared winner
    pub fn on_purchase_agree(
        &mut self,
        sender: &AgentId,
        agree: PurchaseAgree,
    ) -> Result<Vec<SellerAction>, ProtocolViolation> {
        let auction = self
            .auctions
            .get_mut(&agree.item)
            .ok_or_else(|| ProtocolViolation::UnknownItem(agree.item.clone()))?;

        if !auction.is_awaiting_confirmation() || auction.winner.as_ref() != Some(sender) {
            log::debug!(
                "[{}] Dropping agreement for {} from {} (winner {:?})",
                self.seller,
                agree.item,
                sender,
                auction.winner
            );
            return Ok(Vec::new());
        }

        if agree.price != auction.current_price {
            log::info!(
                "[{}] {} agreed to {} at {}, asking again at {}",
                self.seller,
                sender,
                agree.item,
                agree.price,
                auction.current_price
            );
            return Ok(vec![SellerAction::Send {
                to: sender.clone(),
                message: SellerMessage::PurchaseRequest(PurchaseRequest {
                    item: agree.item,
                    price: auction.current_price,
                }),
            }]);
        }

        auction.confirm_purchase();
        let mut closed = auction.snapshot();
        closed.seller = Some(self.seller.clone());
        self.auctions.remove(&agree.item);

        let sale = SaleRecord {
            item: agree.item.clone(),
            buyer: sender.clone(),
            price: agree.price,
            contact_info: agree.contact_info,
            sold_at: self.clock.now(),
        };
        log::info!(
            "[{}] Sold {} to {} at {} (contact: {})",
            self.seller,
            sale.item,
            sale.buyer,
            sale.price,
            sale.contact_info
        );

        let actions = vec![
            SellerAction::CancelTimers {
                item: agree.item.clone(),
            },
            SellerAction::Send {
                to: sender.clone(),
                message: SellerMessage::PurchaseFinalized(PurchaseFinalized {
                    item: agree.item,
                    price: sale.price,
                }),
            },
            SellerAction::Event(closed),
            SellerAction::Notify(format!(
                "{} sold to {} at {} (contact: {})",
                sale.item, sale.buyer, sale.price, sale.contact_info
            )),
        ];
        self.sales.push(sale);
        Ok(actions)
    }

    /// The winner declined; the confirmation timeout will restart the auction
    pub fn on_purchase_refuse(&mut self, sender: &AgentId, refuse: PurchaseRefuse) -> Vec<SellerAction> {
        log::info!("[{}] {} refused to buy {}", self.seller, sender, refuse.item);
        vec![SellerAction::Notify(format!(
            "{} refused the purchase of {}",
            sender, refuse.item
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_clock::FixedClock;
    use gavel_gateway::{Capabilities, InMemoryDirectory};
    use rust_decimal_macros::dec;

    fn setup(buyers: &[&str]) -> (AuctionManager, InMemoryDirectory) {
        let directory = InMemoryDirectory::new();
        for buyer in buyers {
            directory
                .register(&AgentId::from(*buyer), Capabilities::AUCTION_PARTICIPANT)
                .unwrap();
        }
        let manager = AuctionManager::new(
            AgentId::from("seller"),
            Capabilities::AUCTION_PARTICIPANT,
            Arc::new(directory.clone()),
            Arc::new(FixedClock::default()),
        );
        (manager, directory)
    }

    fn foo() -> ItemId {
        ItemId::from("Foo")
    }

    fn bid(manager: &mut AuctionManager, who: &str) -> Vec<SellerAction> {
        manager
            .on_bid(
                &AgentId::from(who),
                BidReply {
                    item: foo(),
                    participate: true,
                },
            )
            .unwrap()
    }

    fn sent_kinds(actions: &[SellerAction]) -> Vec<&SellerMessage> {
        actions
            .iter()
            .filter_map(|a| match a {
                SellerAction::Send { message, .. } | SellerAction::Broadcast { message, .. } => {
                    Some(message)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_validates_terms() {
        let (mut manager, _) = setup(&[]);
        assert_eq!(
            manager.start_auction(foo(), dec!(10), dec!(0)),
            Err(SellerError::InvalidIncrement(dec!(0)))
        );
        assert_eq!(
            manager.start_auction(foo(), dec!(-1), dec!(2)),
            Err(SellerError::InvalidPrice(dec!(-1)))
        );
        let actions = manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();
        assert!(actions.contains(&SellerAction::ArmRoundTick {
            item: foo(),
            epoch: 0
        }));
        assert_eq!(
            manager.start_auction(foo(), dec!(10), dec!(2)),
            Err(SellerError::DuplicateAuction(foo()))
        );
    }

    #[test]
    fn test_first_tick_announces_and_calls_for_bids() {
        let (mut manager, _) = setup(&["alice", "bob"]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();

        let actions = manager.on_round_tick(&foo(), 0);
        let messages = sent_kinds(&actions);
        assert!(matches!(messages[0], SellerMessage::AuctionStart(_)));
        assert_eq!(
            messages[1],
            &SellerMessage::CallForBids(CallForBids {
                item: foo(),
                price: dec!(10)
            })
        );

        let auction = manager.auction(&foo()).unwrap();
        assert_eq!(auction.round, 1);
        assert_eq!(auction.phase, AuctionPhase::Bidding);
    }

    #[test]
    fn test_no_participants_keeps_waiting_without_cfp() {
        let (mut manager, _) = setup(&[]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();

        for _ in 0..5 {
            let actions = manager.on_round_tick(&foo(), 0);
            assert!(sent_kinds(&actions).is_empty());
        }
        let auction = manager.auction(&foo()).unwrap();
        assert_eq!(auction.round, 0);
        assert_eq!(auction.current_price, dec!(10));
        assert_eq!(auction.phase, AuctionPhase::AwaitingParticipants);
    }

    #[test]
    fn test_newcomer_is_announced_once() {
        let (mut manager, directory) = setup(&["alice"]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();
        manager.on_round_tick(&foo(), 0);

        directory
            .register(&AgentId::from("bob"), Capabilities::AUCTION_PARTICIPANT)
            .unwrap();
        bid(&mut manager, "alice");
        bid(&mut manager, "bob");
        let actions = manager.on_round_tick(&foo(), 0);

        let starts: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                SellerAction::Broadcast {
                    to,
                    message: SellerMessage::AuctionStart(_),
                } => Some(to.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![vec![AgentId::from("bob")]]);
    }

    #[test]
    fn test_sole_bidder_wins_and_handshake_starts() {
        let (mut manager, _) = setup(&["alice", "bob"]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();
        manager.on_round_tick(&foo(), 0);
        bid(&mut manager, "alice");

        let actions = manager.on_round_tick(&foo(), 0);
        assert!(actions.contains(&SellerAction::Send {
            to: AgentId::from("alice"),
            message: SellerMessage::PurchaseRequest(PurchaseRequest {
                item: foo(),
                price: dec!(10)
            }),
        }));
        assert!(actions.contains(&SellerAction::CancelRoundTick { item: foo() }));
        assert!(actions.contains(&SellerAction::ArmConfirmationTimeout {
            item: foo(),
            epoch: 0
        }));
        assert!(manager.auction(&foo()).unwrap().is_awaiting_confirmation());

        // Further ticks are ignored while confirming
        assert!(manager.on_round_tick(&foo(), 0).is_empty());
    }

    #[test]
    fn test_zero_bid_round_rolls_price_back() {
        let (mut manager, _) = setup(&["alice", "bob"]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();
        manager.on_round_tick(&foo(), 0);
        bid(&mut manager, "alice");
        bid(&mut manager, "bob");
        manager.on_round_tick(&foo(), 0); // contested at 10, now 12

        let actions = manager.on_round_tick(&foo(), 0); // nobody bid at 12
        let auction = manager.auction(&foo()).unwrap();
        assert_eq!(auction.current_price, dec!(10));
        assert_eq!(auction.winner, Some(AgentId::from("bob")));
        assert!(actions.iter().any(|a| matches!(
            a,
            SellerAction::Broadcast {
                message: SellerMessage::FinalResult(FinalResult { final_price, .. }),
                ..
            } if *final_price == dec!(10)
        )));
    }

    #[test]
    fn test_unknown_item_bid_is_a_violation() {
        let (mut manager, _) = setup(&["alice"]);
        let result = manager.on_bid(
            &AgentId::from("alice"),
            BidReply {
                item: ItemId::from("Nope"),
                participate: true,
            },
        );
        assert_eq!(
            result,
            Err(ProtocolViolation::UnknownItem(ItemId::from("Nope")))
        );
    }

    fn won_by_alice() -> AuctionManager {
        let (mut manager, _) = setup(&["alice", "bob"]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();
        manager.on_round_tick(&foo(), 0);
        bid(&mut manager, "alice");
        manager.on_round_tick(&foo(), 0);
        manager
    }

    fn agree(price: Price) -> PurchaseAgree {
        PurchaseAgree {
            item: foo(),
            price,
            contact_info: "555-0100".to_string(),
        }
    }

    #[test]
    fn test_agreement_from_non_winner_is_dropped() {
        let mut manager = won_by_alice();
        let actions = manager
            .on_purchase_agree(&AgentId::from("bob"), agree(dec!(10)))
            .unwrap();
        assert!(actions.is_empty());
        assert!(!manager.auction(&foo()).unwrap().purchase_confirmed);
    }

    #[test]
    fn test_price_mismatch_reissues_request() {
        let mut manager = won_by_alice();
        let actions = manager
            .on_purchase_agree(&AgentId::from("alice"), agree(dec!(8)))
            .unwrap();
        assert_eq!(
            actions,
            vec![SellerAction::Send {
                to: AgentId::from("alice"),
                message: SellerMessage::PurchaseRequest(PurchaseRequest {
                    item: foo(),
                    price: dec!(10)
                }),
            }]
        );
        assert!(manager.auction(&foo()).is_some());
    }

    #[test]
    fn test_valid_agreement_records_sale() {
        let mut manager = won_by_alice();
        let actions = manager
            .on_purchase_agree(&AgentId::from("alice"), agree(dec!(10)))
            .unwrap();

        assert!(actions.contains(&SellerAction::CancelTimers { item: foo() }));
        assert!(manager.auction(&foo()).is_none());
        let sale = &manager.sales()[0];
        assert_eq!(sale.buyer, AgentId::from("alice"));
        assert_eq!(sale.price, dec!(10));
        assert_eq!(sale.contact_info, "555-0100");

        // The timeout that may still be in flight is a no-op
        assert!(manager.on_confirmation_timeout(&foo(), 0).is_empty());
    }

    #[test]
    fn test_timeout_restarts_at_original_terms() {
        let (mut manager, _) = setup(&["alice", "bob"]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();
        manager.on_round_tick(&foo(), 0);
        bid(&mut manager, "alice");
        bid(&mut manager, "bob");
        manager.on_round_tick(&foo(), 0);
        bid(&mut manager, "bob");
        manager.on_round_tick(&foo(), 0); // bob wins at 12

        let actions = manager.on_confirmation_timeout(&foo(), 0);
        assert!(actions.contains(&SellerAction::ArmRoundTick {
            item: foo(),
            epoch: 1
        }));
        let auction = manager.auction(&foo()).unwrap();
        assert_eq!(auction.current_price, dec!(10));
        assert_eq!(auction.increment, dec!(2));
        assert_eq!(auction.round, 0);
        assert!(auction.winner.is_none());
        assert_eq!(auction.phase, AuctionPhase::Restarted);

        // Ticks armed for the old incarnation are ignored
        assert!(manager.on_round_tick(&foo(), 0).is_empty());
        assert!(!manager.on_round_tick(&foo(), 1).is_empty());
    }

    #[test]
    fn test_abandoned_auction_resets_price() {
        let (mut manager, directory) = setup(&["alice", "bob"]);
        manager.start_auction(foo(), dec!(10), dec!(2)).unwrap();
        manager.on_round_tick(&foo(), 0);
        bid(&mut manager, "alice");
        bid(&mut manager, "bob");

        directory
            .deregister(&AgentId::from("alice"), Capabilities::AUCTION_PARTICIPANT)
            .unwrap();
        directory
            .deregister(&AgentId::from("bob"), Capabilities::AUCTION_PARTICIPANT)
            .unwrap();
        let actions = manager.on_round_tick(&foo(), 0);

        assert!(
            actions
                .iter()
                .any(|a| matches!(a, SellerAction::Notify(text) if text.contains("left")))
        );
        let auction = manager.auction(&foo()).unwrap();
        assert_eq!(auction.current_price, dec!(10));
        assert_eq!(auction.round, 0);
        assert_eq!(auction.phase, AuctionPhase::AwaitingParticipants);
    }
}
