//! Sending side of an agent
//!
//! Wraps a transport with the owning agent's identity. Delivery failures are
//! logged and absorbed: a lost message is never fatal to the sender, the
//! protocol's timeouts take care of recovery.

use std::sync::Arc;

use gavel_core::AgentId;

use crate::messages::{Envelope, Payload, payloads::MalformedMessage};
use crate::transport::Transport;

#[derive(Clone)]
pub struct Outbox {
    me: AgentId,
    transport: Arc<dyn Transport>,
}

impl Outbox {
    pub fn new(me: AgentId, transport: Arc<dyn Transport>) -> Self {
        Self { me, transport }
    }

    pub fn me(&self) -> &AgentId {
        &self.me
    }

    /// Send a payload to one agent; returns whether it was delivered
    pub async fn send<P: Payload>(&self, to: &AgentId, payload: &P) -> bool {
        match Envelope::new(self.me.clone(), to.clone(), payload) {
            Ok(envelope) => self.deliver(envelope).await,
            Err(e) => {
                log::error!("[{}] Failed to encode {} for {}: {}", self.me, P::KIND, to, e);
                false
            }
        }
    }

    /// Answer `original`, correlating the reply to it
    pub async fn reply<P: Payload>(&self, original: &Envelope, payload: &P) -> bool {
        match original.reply(payload) {
            Ok(envelope) => self.deliver(envelope).await,
            Err(e) => {
                log::error!(
                    "[{}] Failed to encode {} reply for {}: {}",
                    self.me,
                    P::KIND,
                    original.sender,
                    e
                );
                false
            }
        }
    }

    /// Tell the sender of `original` that it could not be interpreted
    pub async fn not_understood(&self, original: &Envelope, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        log::warn!(
            "[{}] Could not interpret {} from {}: {}",
            self.me,
            original.kind,
            original.sender,
            reason
        );
        self.reply(
            original,
            &MalformedMessage {
                in_reply_to: original.id,
                reason,
            },
        )
        .await
    }

    async fn deliver(&self, envelope: Envelope) -> bool {
        let kind = envelope.kind;
        let to = envelope.receiver.clone();
        match self.transport.send(envelope).await {
            Ok(()) => {
                log::trace!("[{}] {} -> {}", self.me, kind, to);
                true
            }
            Err(e) => {
                log::warn!("[{}] Failed to send {} to {}: {}", self.me, kind, to, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageKind;
    use crate::messages::payloads::CallForBids;
    use crate::transport::channel::ChannelRouter;
    use gavel_core::ItemId;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_failed_send_is_absorbed() {
        let router = ChannelRouter::new();
        let mut alice = router.register(AgentId::from("alice"), 10).unwrap();
        let outbox = Outbox::new(AgentId::from("seller"), Arc::new(router.clone()));
        let cfp = CallForBids {
            item: ItemId::from("Dune"),
            price: dec!(10),
        };

        assert!(!outbox.send(&AgentId::from("ghost"), &cfp).await);
        assert!(outbox.send(&AgentId::from("alice"), &cfp).await);
        assert_eq!(alice.next().await.unwrap().kind, MessageKind::CallForBids);
    }

    #[tokio::test]
    async fn test_not_understood_quotes_original_id() {
        let router = ChannelRouter::new();
        let mut alice = router.register(AgentId::from("alice"), 10).unwrap();
        let outbox = Outbox::new(AgentId::from("seller"), Arc::new(router.clone()));

        let original = Envelope::raw(
            AgentId::from("alice"),
            AgentId::from("seller"),
            MessageKind::BidReply,
            b"???".to_vec(),
        );
        assert!(outbox.not_understood(&original, "bad content").await);

        let reply = alice.next().await.unwrap();
        assert_eq!(reply.in_reply_to, Some(original.id));
        let body: MalformedMessage = reply.decode().unwrap();
        assert_eq!(body.in_reply_to, original.id);
        assert_eq!(body.reason, "bad content");
    }
}
