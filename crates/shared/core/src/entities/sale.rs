use serde::{Deserialize, Serialize};

use crate::values::{AgentId, ItemId, Price, Timestamp};

/// Sale recorded by the seller once the winner confirms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub item: ItemId,
    pub buyer: AgentId,
    pub price: Price,
    /// Contact details the buyer sent with its agreement
    pub contact_info: String,
    pub sold_at: Timestamp,
}

/// Purchase recorded by a buyer once the seller finalizes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub item: ItemId,
    pub seller: AgentId,
    pub price: Price,
}
