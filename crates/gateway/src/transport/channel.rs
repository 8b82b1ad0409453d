//! Tokio channel-based transport for single-process mode
//!
//! Each agent owns a bounded mpsc mailbox registered under its name.
//! No serialization of the envelope itself - envelopes are passed directly.

use crate::error::TransportError;
use crate::messages::Envelope;
use crate::transport::Transport;
use async_trait::async_trait;
use dashmap::DashMap;
use gavel_core::AgentId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Routes envelopes to named mailboxes
///
/// Cheap to clone; all clones share the same routing table.
#[derive(Clone, Default)]
pub struct ChannelRouter {
    mailboxes: Arc<DashMap<AgentId, mpsc::Sender<Envelope>>>,
}

impl ChannelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a mailbox for `agent`
    pub fn register(&self, agent: AgentId, capacity: usize) -> Result<Mailbox, TransportError> {
        if capacity == 0 {
            return Err(TransportError::ZeroCapacity(agent.to_string()));
        }
        if self.mailboxes.contains_key(&agent) {
            return Err(TransportError::AlreadyRegistered(agent.to_string()));
        }
        let (tx, rx) = mpsc::channel(capacity);
        log::debug!("Mailbox opened for {}", agent);
        self.mailboxes.insert(agent, tx);
        Ok(Mailbox { rx })
    }

    /// Close the mailbox for `agent`; later sends to it fail
    pub fn unregister(&self, agent: &AgentId) -> bool {
        self.mailboxes.remove(agent).is_some()
    }
}

#[async_trait]
impl Transport for ChannelRouter {
    async fn send(&self, envelope: Envelope) -> Result<(), TransportError> {
        // Clone the sender out so no map guard is held across the await
        let tx = self
            .mailboxes
            .get(&envelope.receiver)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TransportError::UnknownRecipient(envelope.receiver.to_string()))?;

        tx.send(envelope)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Receiving end of an agent's mailbox
pub struct Mailbox {
    rx: mpsc::Receiver<Envelope>,
}

impl Mailbox {
    /// Wait for the next envelope
    pub async fn next(&mut self) -> Result<Envelope, TransportError> {
        self.rx.recv().await.ok_or(TransportError::ChannelClosed)
    }

    /// Try to receive without blocking (returns None if no envelope is waiting)
    pub fn try_next(&mut self) -> Result<Option<Envelope>, TransportError> {
        match self.rx.try_recv() {
            Ok(envelope) => Ok(Some(envelope)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::ChannelClosed),
        }
    }

    /// Take everything currently waiting
    pub fn drain(&mut self) -> Vec<Envelope> {
        let mut envelopes = Vec::new();
        while let Ok(Some(envelope)) = self.try_next() {
            envelopes.push(envelope);
        }
        envelopes
    }
}
