use gavel_gateway::Capabilities;
use serde::{Deserialize, Serialize};

/// Buyer agent configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerConfig {
    /// Name of the buyer on the transport
    pub agent_id: String,

    /// Sent to the seller with every purchase agreement
    #[serde(default)]
    pub contact_info: String,

    /// Directory capability to advertise
    #[serde(default = "default_capability")]
    pub capability: String,

    /// Mailbox channel capacity
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

fn default_capability() -> String {
    Capabilities::AUCTION_PARTICIPANT.to_string()
}

fn default_mailbox_capacity() -> usize {
    1_000
}

impl Default for BuyerConfig {
    fn default() -> Self {
        Self {
            agent_id: "buyer".to_string(),
            contact_info: String::new(),
            capability: default_capability(),
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

impl BuyerConfig {
    pub fn new(agent_id: impl Into<String>, contact_info: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            contact_info: contact_info.into(),
            ..Default::default()
        }
    }
}
