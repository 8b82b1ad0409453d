//! Gavel Gateway
//!
//! Everything two auction agents need to talk to each other:
//! - Message envelope and the protocol vocabulary (twelve message kinds)
//! - Content codec (payloads are opaque bytes on the envelope)
//! - Transport abstraction with a tokio channel router of named mailboxes
//! - In-memory directory for capability-based discovery
//!
//! ## Architecture
//!
//! ```text
//!   Seller agent                                   Buyer agents
//!  ┌────────────┐   Outbox ──► ChannelRouter ──►  ┌────────────┐
//!  │  Mailbox   │ ◄──────────────────────────────  │  Mailbox   │
//!  └─────┬──────┘                                  └─────┬──────┘
//!        │ lookup("auction-participant")                 │ register / deregister
//!        └──────────────►  InMemoryDirectory  ◄──────────┘
//! ```
//!
//! ## Transport
//!
//! Currently uses tokio channels for single-process operation.
//! The `Transport` trait allows plugging in a networked transport later.

pub mod codec;
pub mod directory;
pub mod error;
pub mod messages;
pub mod outbox;
pub mod transport;

// Re-export commonly used types
pub use directory::InMemoryDirectory;
pub use error::{CodecError, TransportError};
pub use messages::{
    Envelope, MessageKind, Payload,
    payloads::{
        AuctionStart, BidReply, CallForBids, FinalResult, MalformedMessage, ProvisionalAccept,
        ProvisionalReject, PurchaseAgree, PurchaseFinalized, PurchaseRefuse, PurchaseRequest,
        RoundResult,
    },
};
pub use outbox::Outbox;
pub use transport::{
    Capabilities, Transport,
    channel::{ChannelRouter, Mailbox},
};
