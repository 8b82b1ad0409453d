//! Payloads, one per message kind

use gavel_core::{AgentId, ItemId, Price};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MessageKind, Payload};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionStart {
    pub item: ItemId,
    pub starting_price: Price,
    pub increment: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallForBids {
    pub item: ItemId,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidReply {
    pub item: ItemId,
    pub participate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionalAccept {
    pub item: ItemId,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionalReject {
    pub item: ItemId,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub item: ItemId,
    pub price: Price,
    pub bidders: Vec<AgentId>,
    pub round: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub item: ItemId,
    pub winner: AgentId,
    pub final_price: Price,
    pub round: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub item: ItemId,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseAgree {
    pub item: ItemId,
    pub price: Price,
    pub contact_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRefuse {
    pub item: ItemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFinalized {
    pub item: ItemId,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalformedMessage {
    /// Id of the envelope that could not be interpreted
    pub in_reply_to: Uuid,
    pub reason: String,
}

impl Payload for AuctionStart {
    const KIND: MessageKind = MessageKind::AuctionStart;
}

impl Payload for CallForBids {
    const KIND: MessageKind = MessageKind::CallForBids;
}

impl Payload for BidReply {
    const KIND: MessageKind = MessageKind::BidReply;
}

impl Payload for ProvisionalAccept {
    const KIND: MessageKind = MessageKind::ProvisionalAccept;
}

impl Payload for ProvisionalReject {
    const KIND: MessageKind = MessageKind::ProvisionalReject;
}

impl Payload for RoundResult {
    const KIND: MessageKind = MessageKind::RoundResult;
}

impl Payload for FinalResult {
    const KIND: MessageKind = MessageKind::FinalResult;
}

impl Payload for PurchaseRequest {
    const KIND: MessageKind = MessageKind::PurchaseRequest;
}

impl Payload for PurchaseAgree {
    const KIND: MessageKind = MessageKind::PurchaseAgree;
}

impl Payload for PurchaseRefuse {
    const KIND: MessageKind = MessageKind::PurchaseRefuse;
}

impl Payload for PurchaseFinalized {
    const KIND: MessageKind = MessageKind::PurchaseFinalized;
}

impl Payload for MalformedMessage {
    const KIND: MessageKind = MessageKind::MalformedMessage;
}
