//! Error types for the gateway crate

use thiserror::Error;

use crate::messages::MessageKind;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(String),

    #[error("Mailbox already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Mailbox for {0} needs a capacity of at least one")]
    ZeroCapacity(String),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Content encoding/decoding errors
///
/// A decode failure on an inbound message is a protocol violation: the
/// receiving agent answers it with `MalformedMessage`.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Expected {expected} content, envelope is {found}")]
    KindMismatch {
        expected: MessageKind,
        found: MessageKind,
    },
}
