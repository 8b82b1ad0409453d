use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::values::{AgentId, ItemId, Price};

/// Where an auction sits in its lifecycle
///
/// ```text
/// AwaitingParticipants ──► Bidding(round N) ──► AwaitingConfirmation ──► Closed
///          ▲                    │   ▲                     │
///          └──── abandoned ─────┘   └─ contested ─┘       └──► Restarted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionPhase {
    /// No participant has been discovered yet (or all of them left)
    AwaitingParticipants,
    /// A call-for-bids is out for the current round
    Bidding,
    /// A winner is determined and the purchase handshake is running
    AwaitingConfirmation,
    /// Sale confirmed by the winner
    Closed,
    /// Fresh auction created after an unconfirmed handshake timed out
    Restarted,
}

impl std::fmt::Display for AuctionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuctionPhase::AwaitingParticipants => "awaiting participants",
            AuctionPhase::Bidding => "bidding",
            AuctionPhase::AwaitingConfirmation => "awaiting confirmation",
            AuctionPhase::Closed => "closed",
            AuctionPhase::Restarted => "restarted",
        };
        f.write_str(s)
    }
}

/// Result of evaluating the round that just ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// No round was running (round number 0)
    NotStarted,
    /// Nobody has ever bid; the auction goes back to waiting at round 0
    NoBids,
    /// Bidding stopped and a winner is determined
    Won { winner: AgentId, price: Price },
    /// Two or more bidders contested the round; bidding continues
    Contested {
        price: Price,
        bidders: Vec<AgentId>,
        round: u32,
    },
}

/// What happened when a round found nobody to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// Nobody has joined yet; keep waiting at the starting price
    Waiting,
    /// Everyone left mid-auction; price and round history are reset
    Abandoned,
}

/// English auction state for one item, owned exclusively by the seller
///
/// All fields are mutated in place by the seller's round tick and bid
/// collection; nothing here is shared across auctions or agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub item: ItemId,
    pub starting_price: Price,
    pub increment: Price,
    /// Offered price of the current round
    pub current_price: Price,
    /// 0 until the first call-for-bids goes out
    pub round: u32,
    /// Eligible bidders as of the last directory refresh
    pub participants: BTreeSet<AgentId>,
    pub bids_this_round: u32,
    pub bidders_this_round: BTreeSet<AgentId>,
    /// Most recent affirmative bidder of the current round
    pub last_bidder: Option<AgentId>,
    /// Affirmative bidder carried over from the preceding round
    pub previous_bidder: Option<AgentId>,
    pub winner: Option<AgentId>,
    pub purchase_confirmed: bool,
    pub phase: AuctionPhase,
    /// Bumped on every restart so timers armed for an older incarnation can be discarded
    pub epoch: u64,
}

impl Auction {
    /// Create a new auction waiting for participants
    pub fn new(item: impl Into<ItemId>, starting_price: Price, increment: Price) -> Self {
        Self {
            item: item.into(),
            starting_price,
            increment,
            current_price: starting_price,
            round: 0,
            participants: BTreeSet::new(),
            bids_this_round: 0,
            bidders_this_round: BTreeSet::new(),
            last_bidder: None,
            previous_bidder: None,
            winner: None,
            purchase_confirmed: false,
            phase: AuctionPhase::AwaitingParticipants,
            epoch: 0,
        }
    }

    /// Fresh auction for the same item at the original starting price and increment
    ///
    /// All round history (participants, bidders, winner) is dropped.
    pub fn restarted(&self) -> Self {
        let mut fresh = Self::new(self.item.clone(), self.starting_price, self.increment);
        fresh.epoch = self.epoch + 1;
        fresh.phase = AuctionPhase::Restarted;
        fresh
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.phase == AuctionPhase::AwaitingConfirmation
    }

    /// Evaluate the round that just ended
    ///
    /// - zero bids: the carried-over bidder wins one increment below the
    ///   unanswered price; with nobody carried over the auction drops back to round 0
    /// - one bid: the last bidder wins at the offered price
    /// - two or more: the round is contested and bidding goes on
    pub fn close_round(&mut self) -> RoundOutcome {
        if self.round == 0 {
            return RoundOutcome::NotStarted;
        }

        match self.bids_this_round {
            0 => match self.previous_bidder.clone() {
                Some(winner) => {
                    self.current_price -= self.increment;
                    self.declare_winner(winner)
                }
                None => {
                    self.round = 0;
                    RoundOutcome::NoBids
                }
            },
            1 => match self.last_bidder.clone() {
                Some(winner) => self.declare_winner(winner),
                // A counted bid always records its bidder
                None => RoundOutcome::NoBids,
            },
            _ => RoundOutcome::Contested {
                price: self.current_price,
                bidders: self.bidders_this_round.iter().cloned().collect(),
                round: self.round,
            },
        }
    }

    fn declare_winner(&mut self, winner: AgentId) -> RoundOutcome {
        self.winner = Some(winner.clone());
        self.phase = AuctionPhase::AwaitingConfirmation;
        RoundOutcome::Won {
            winner,
            price: self.current_price,
        }
    }

    /// Move the bookkeeping on to the next round
    ///
    /// The price only rises once the first round is behind us.
    pub fn advance_round(&mut self) {
        self.previous_bidder = self.last_bidder.take();
        self.bids_this_round = 0;
        self.bidders_this_round.clear();
        if self.round != 0 {
            self.current_price += self.increment;
        }
        self.round += 1;
    }

    /// Replace the participant set with a fresh directory answer
    ///
    /// Returns the identities that were not known before, in order.
    pub fn refresh_participants(&mut self, found: BTreeSet<AgentId>) -> Vec<AgentId> {
        let newcomers = found
            .iter()
            .filter(|agent| !self.participants.contains(*agent))
            .cloned()
            .collect();
        self.participants = found;
        newcomers
    }

    /// Handle a round that found no participants to call
    pub fn go_idle(&mut self) -> IdleOutcome {
        self.phase = AuctionPhase::AwaitingParticipants;
        if self.round == 1 {
            self.round = 0;
            return IdleOutcome::Waiting;
        }

        self.previous_bidder = None;
        self.last_bidder = None;
        self.current_price = self.starting_price;
        self.round = 0;
        IdleOutcome::Abandoned
    }

    /// Record the winner's validated purchase agreement
    pub fn confirm_purchase(&mut self) {
        self.purchase_confirmed = true;
        self.phase = AuctionPhase::Closed;
    }

    /// Point-in-time view for observers
    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            item: self.item.clone(),
            phase: self.phase,
            current_price: self.current_price,
            starting_price: self.starting_price,
            increment: self.increment,
            round: self.round,
            participants: self.participants.len(),
            bidders: self.bidders_this_round.iter().cloned().collect(),
            winner: self.winner.clone(),
            seller: None,
        }
    }
}

/// Read-only view of an auction, handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    pub item: ItemId,
    pub phase: AuctionPhase,
    pub current_price: Price,
    pub starting_price: Price,
    pub increment: Price,
    pub round: u32,
    pub participants: usize,
    pub bidders: Vec<AgentId>,
    pub winner: Option<AgentId>,
    /// Set on the buyer side, where snapshots are rebuilt from seller messages
    pub seller: Option<AgentId>,
}

impl AuctionSnapshot {
    /// Snapshot as seen by a buyer from a seller's announcement
    pub fn observed(item: ItemId, seller: AgentId, phase: AuctionPhase, price: Price) -> Self {
        Self {
            item,
            phase,
            current_price: price,
            starting_price: price,
            increment: Decimal::ZERO,
            round: 0,
            participants: 0,
            bidders: Vec::new(),
            winner: None,
            seller: Some(seller),
        }
    }
}
