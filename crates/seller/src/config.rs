use gavel_gateway::Capabilities;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seller agent configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerConfig {
    /// Name of the seller on the transport
    #[serde(default = "default_agent_id")]
    pub agent_id: String,

    /// Period of the round tick for every auction
    #[serde(default = "default_round_interval_ms")]
    pub round_interval_ms: u64,

    /// How long a declared winner has to agree to the purchase
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,

    /// Directory capability the participants advertise
    #[serde(default = "default_participant_capability")]
    pub participant_capability: String,

    /// Mailbox channel capacity
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

fn default_agent_id() -> String {
    "seller".to_string()
}

fn default_round_interval_ms() -> u64 {
    10_000
}

fn default_confirmation_timeout_ms() -> u64 {
    30_000
}

fn default_participant_capability() -> String {
    Capabilities::AUCTION_PARTICIPANT.to_string()
}

fn default_mailbox_capacity() -> usize {
    1_000
}

impl Default for SellerConfig {
    fn default() -> Self {
        Self {
            agent_id: default_agent_id(),
            round_interval_ms: default_round_interval_ms(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
            participant_capability: default_participant_capability(),
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

impl SellerConfig {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Default::default()
        }
    }

    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SellerConfig::default();
        assert_eq!(config.round_interval(), Duration::from_secs(10));
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(30));
        assert_eq!(config.participant_capability, "auction-participant");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SellerConfig =
            serde_json::from_str(r#"{"agent_id": "shop", "round_interval_ms": 500}"#).unwrap();
        assert_eq!(config.agent_id, "shop");
        assert_eq!(config.round_interval_ms, 500);
        assert_eq!(config.confirmation_timeout_ms, 30_000);
        assert_eq!(config.mailbox_capacity, 1_000);
    }
}
