//! Message envelope

use gavel_core::AgentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MessageKind, Payload};
use crate::codec;
use crate::error::CodecError;

/// Addressed message with opaque content
///
/// The content is only interpreted by the receiving handler through
/// [`Envelope::decode`]; a failure there is answered with `MalformedMessage`
/// quoting this envelope's `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Correlation id of this message
    pub id: Uuid,
    pub sender: AgentId,
    pub receiver: AgentId,
    pub kind: MessageKind,
    pub content: Vec<u8>,
    /// Id of the message this one answers, if any
    pub in_reply_to: Option<Uuid>,
}

impl Envelope {
    /// Build an envelope around an encoded payload
    pub fn new<P: Payload>(
        sender: AgentId,
        receiver: AgentId,
        payload: &P,
    ) -> Result<Self, CodecError> {
        Ok(Self::raw(sender, receiver, P::KIND, codec::encode(payload)?))
    }

    /// Build an envelope from already-encoded content
    pub fn raw(sender: AgentId, receiver: AgentId, kind: MessageKind, content: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            receiver,
            kind,
            content,
            in_reply_to: None,
        }
    }

    /// Build the answer to this envelope, addressed back to its sender
    pub fn reply<P: Payload>(&self, payload: &P) -> Result<Self, CodecError> {
        let mut reply = Self::new(self.receiver.clone(), self.sender.clone(), payload)?;
        reply.in_reply_to = Some(self.id);
        Ok(reply)
    }

    /// Decode the content as the payload for this envelope's kind
    pub fn decode<P: Payload>(&self) -> Result<P, CodecError> {
        if self.kind != P::KIND {
            return Err(CodecError::KindMismatch {
                expected: P::KIND,
                found: self.kind,
            });
        }
        codec::decode(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::payloads::{BidReply, CallForBids};
    use gavel_core::ItemId;
    use rust_decimal_macros::dec;

    fn cfp() -> Envelope {
        Envelope::new(
            AgentId::from("seller"),
            AgentId::from("buyer"),
            &CallForBids {
                item: ItemId::from("Dune"),
                price: dec!(10),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_envelope_carries_kind_of_payload() {
        let env = cfp();
        assert_eq!(env.kind, MessageKind::CallForBids);
        assert!(env.in_reply_to.is_none());
        let decoded: CallForBids = env.decode().unwrap();
        assert_eq!(decoded.price, dec!(10));
    }

    #[test]
    fn test_reply_swaps_addresses_and_correlates() {
        let env = cfp();
        let reply = env
            .reply(&BidReply {
                item: ItemId::from("Dune"),
                participate: true,
            })
            .unwrap();

        assert_eq!(reply.sender, AgentId::from("buyer"));
        assert_eq!(reply.receiver, AgentId::from("seller"));
        assert_eq!(reply.in_reply_to, Some(env.id));
        assert_ne!(reply.id, env.id);
    }

    #[test]
    fn test_decode_as_other_kind_is_rejected() {
        let env = cfp();
        let result: Result<BidReply, _> = env.decode();
        assert!(matches!(
            result,
            Err(CodecError::KindMismatch {
                expected: MessageKind::BidReply,
                found: MessageKind::CallForBids
            })
        ));
    }
}
