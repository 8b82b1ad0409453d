//! Protocol vocabulary shared by sellers and buyers
//!
//! Every message is an [`Envelope`] carrying one [`MessageKind`] and the
//! encoded payload for that kind. Payload structs live in [`payloads`].

pub mod envelope;
pub mod payloads;

pub use envelope::Envelope;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Message kind (the performative) of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// seller → buyer: one-time notice to a newly discovered participant
    AuctionStart,
    /// seller → buyers: opens a bidding round
    CallForBids,
    /// buyer → seller: the buyer's round decision
    BidReply,
    /// seller → buyer: first bidder of the round holds the provisional win
    ProvisionalAccept,
    /// seller → buyer: later (or declining) bidder does not hold the win
    ProvisionalReject,
    /// seller → buyers: two or more bidders contested the round
    RoundResult,
    /// seller → buyers: a round resolved to a winner
    FinalResult,
    /// seller → winner: opens the confirmation handshake
    PurchaseRequest,
    /// buyer → seller: buyer commits to the purchase
    PurchaseAgree,
    /// buyer → seller: buyer declines the purchase
    PurchaseRefuse,
    /// seller → buyer: sale recorded
    PurchaseFinalized,
    /// either direction: a received message could not be interpreted
    MalformedMessage,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MessageKind::AuctionStart => "AUCTION_START",
            MessageKind::CallForBids => "CFP",
            MessageKind::BidReply => "PROPOSE",
            MessageKind::ProvisionalAccept => "ACCEPT_PROPOSAL",
            MessageKind::ProvisionalReject => "REJECT_PROPOSAL",
            MessageKind::RoundResult => "ROUND_RESULT",
            MessageKind::FinalResult => "FINAL_RESULT",
            MessageKind::PurchaseRequest => "REQUEST",
            MessageKind::PurchaseAgree => "AGREE",
            MessageKind::PurchaseRefuse => "REFUSE",
            MessageKind::PurchaseFinalized => "PURCHASE_FINALIZED",
            MessageKind::MalformedMessage => "NOT_UNDERSTOOD",
        };
        f.write_str(s)
    }
}

/// A payload type bound to the message kind that carries it
pub trait Payload: Serialize + DeserializeOwned {
    const KIND: MessageKind;
}
