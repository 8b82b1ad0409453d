//! Transport abstraction layer
//!
//! Point-to-point delivery of envelopes between named agents.
//! The trait-based design allows swapping in a networked transport later.

pub mod channel;
pub mod config;

pub use config::Capabilities;

use crate::error::TransportError;
use crate::messages::Envelope;
use async_trait::async_trait;

/// Transport - delivers an envelope to the mailbox named by its receiver
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver an envelope
    async fn send(&self, envelope: Envelope) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ensure the trait is object-safe
    fn _assert_transport_object_safe(_: &dyn Transport) {}
}
