//! Seller agent runner
//!
//! Serializes everything that touches the auctions through one `select!`
//! loop: presentation commands, timer events and inbound messages.

use std::sync::Arc;

use gavel_clock::Scheduler;
use gavel_core::{AgentId, ItemId};
use gavel_gateway::{
    BidReply, Envelope, Mailbox, MalformedMessage, MessageKind, Outbox, Payload, PurchaseAgree,
    PurchaseRefuse, Transport,
};
use gavel_ports::{AuctionObserver, Clock, Directory};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::SellerConfig;
use crate::handle::{SellerCommand, SellerHandle};
use crate::manager::{AuctionManager, SellerAction, SellerMessage};

/// Timer slot of an auction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Round(ItemId),
    Confirmation(ItemId),
}

/// Timer event, tagged with the auction incarnation it was armed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellerTimer {
    RoundTick { item: ItemId, epoch: u64 },
    ConfirmationTimeout { item: ItemId, epoch: u64 },
}

pub struct SellerAgent {
    config: SellerConfig,
    manager: AuctionManager,
    outbox: Outbox,
    mailbox: Mailbox,
    observer: Arc<dyn AuctionObserver>,
    scheduler: Scheduler<TimerKey, SellerTimer>,
    timer_rx: mpsc::UnboundedReceiver<SellerTimer>,
    command_rx: mpsc::Receiver<SellerCommand>,
}

impl SellerAgent {
    /// Create the agent and the handle that controls it
    ///
    /// `mailbox` must be the one registered under `config.agent_id`.
    pub fn new(
        config: SellerConfig,
        mailbox: Mailbox,
        transport: Arc<dyn Transport>,
        directory: Arc<dyn Directory>,
        observer: Arc<dyn AuctionObserver>,
        clock: Arc<dyn Clock>,
    ) -> (Self, SellerHandle) {
        let me = AgentId::new(config.agent_id.clone());
        let manager = AuctionManager::new(
            me.clone(),
            config.participant_capability.clone(),
            directory,
            clock,
        );
        let (scheduler, timer_rx) = Scheduler::new();
        let (command_tx, command_rx) = mpsc::channel(64);

        let agent = Self {
            outbox: Outbox::new(me, transport),
            config,
            manager,
            mailbox,
            observer,
            scheduler,
            timer_rx,
            command_rx,
        };
        (agent, SellerHandle::new(command_tx))
    }

    /// Run the agent on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the agent until shut down or its mailbox closes
    pub async fn run(mut self) {
        log::info!("[{}] Seller started", self.config.agent_id);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => {
                            if self.handle_command(command).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                Some(timer) = self.timer_rx.recv() => {
                    self.handle_timer(timer).await;
                }

                result = self.mailbox.next() => {
                    match result {
                        Ok(envelope) => self.handle_envelope(envelope).await,
                        Err(_) => {
                            log::info!("[{}] Mailbox closed", self.config.agent_id);
                            break;
                        }
                    }
                }
            }
        }

        self.scheduler.cancel_all();
        log::info!("[{}] Seller stopped", self.config.agent_id);
    }

    /// Returns true when the agent should stop
    async fn handle_command(&mut self, command: SellerCommand) -> bool {
        match command {
            SellerCommand::StartAuction {
                item,
                starting_price,
                increment,
                reply,
            } => {
                let result = match self.manager.start_auction(item, starting_price, increment) {
                    Ok(actions) => {
                        self.apply(actions).await;
                        Ok(())
                    }
                    Err(e) => {
                        log::warn!("[{}] {}", self.config.agent_id, e);
                        self.observer.on_notification(&e.to_string());
                        Err(e)
                    }
                };
                let _ = reply.send(result);
                false
            }
            SellerCommand::Snapshot { reply } => {
                let _ = reply.send(self.manager.snapshot());
                false
            }
            SellerCommand::Shutdown => true,
        }
    }

    async fn handle_timer(&mut self, timer: SellerTimer) {
        let actions = match timer {
            SellerTimer::RoundTick { item, epoch } => self.manager.on_round_tick(&item, epoch),
            SellerTimer::ConfirmationTimeout { item, epoch } => {
                self.manager.on_confirmation_timeout(&item, epoch)
            }
        };
        self.apply(actions).await;
    }

    async fn handle_envelope(&mut self, envelope: Envelope) {
        log::trace!(
            "[{}] {} from {}",
            self.config.agent_id,
            envelope.kind,
            envelope.sender
        );

        match envelope.kind {
            MessageKind::BidReply => {
                if let Some(bid) = self.decoded::<BidReply>(&envelope).await {
                    let result = self.manager.on_bid(&envelope.sender, bid);
                    self.settle(&envelope, result).await;
                }
            }
            MessageKind::PurchaseAgree => {
                if let Some(agree) = self.decoded::<PurchaseAgree>(&envelope).await {
                    let result = self.manager.on_purchase_agree(&envelope.sender, agree);
                    self.settle(&envelope, result).await;
                }
            }
            MessageKind::PurchaseRefuse => {
                if let Some(refuse) = self.decoded::<PurchaseRefuse>(&envelope).await {
                    let actions = self.manager.on_purchase_refuse(&envelope.sender, refuse);
                    self.apply(actions).await;
                }
            }
            MessageKind::MalformedMessage => match envelope.decode::<MalformedMessage>() {
                Ok(notice) => {
                    let text = format!(
                        "{} did not understand message {}: {}",
                        envelope.sender, notice.in_reply_to, notice.reason
                    );
                    log::warn!("[{}] {}", self.config.agent_id, text);
                    self.observer.on_notification(&text);
                }
                // Never answer a malformed notice with another one
                Err(e) => log::warn!(
                    "[{}] Unreadable not-understood notice from {}: {}",
                    self.config.agent_id,
                    envelope.sender,
                    e
                ),
            },
            kind => {
                self.outbox
                    .not_understood(&envelope, format!("{} is not handled by a seller", kind))
                    .await;
            }
        }
    }

    async fn decoded<P: Payload>(&self, envelope: &Envelope) -> Option<P> {
        match envelope.decode::<P>() {
            Ok(payload) => Some(payload),
            Err(e) => {
                self.outbox.not_understood(envelope, e.to_string()).await;
                None
            }
        }
    }

    async fn settle<E: std::fmt::Display>(
        &mut self,
        envelope: &Envelope,
        result: Result<Vec<SellerAction>, E>,
    ) {
        match result {
            Ok(actions) => self.apply(actions).await,
            Err(violation) => {
                self.outbox
                    .not_understood(envelope, violation.to_string())
                    .await;
            }
        }
    }

    async fn apply(&mut self, actions: Vec<SellerAction>) {
        for action in actions {
            match action {
                SellerAction::Send { to, message } => {
                    self.deliver(&to, &message).await;
                }
                SellerAction::Broadcast { to, message } => {
                    for recipient in &to {
                        self.deliver(recipient, &message).await;
                    }
                }
                SellerAction::ArmRoundTick { item, epoch } => {
                    self.scheduler.every(
                        TimerKey::Round(item.clone()),
                        self.config.round_interval(),
                        SellerTimer::RoundTick { item, epoch },
                    );
                }
                SellerAction::CancelRoundTick { item } => {
                    self.scheduler.cancel(&TimerKey::Round(item));
                }
                SellerAction::ArmConfirmationTimeout { item, epoch } => {
                    self.scheduler.once(
                        TimerKey::Confirmation(item.clone()),
                        self.config.confirmation_timeout(),
                        SellerTimer::ConfirmationTimeout { item, epoch },
                    );
                }
                SellerAction::CancelTimers { item } => {
                    self.scheduler.cancel(&TimerKey::Round(item.clone()));
                    self.scheduler.cancel(&TimerKey::Confirmation(item));
                }
                SellerAction::Event(snapshot) => {
                    self.observer.on_auction_event(&snapshot.item, &snapshot);
                }
                SellerAction::Notify(text) => {
                    log::info!("[{}] {}", self.config.agent_id, text);
                    self.observer.on_notification(&text);
                }
            }
        }
    }

    async fn deliver(&self, to: &AgentId, message: &SellerMessage) -> bool {
        match message {
            SellerMessage::AuctionStart(p) => self.outbox.send(to, p).await,
            SellerMessage::CallForBids(p) => self.outbox.send(to, p).await,
            SellerMessage::ProvisionalAccept(p) => self.outbox.send(to, p).await,
            SellerMessage::ProvisionalReject(p) => self.outbox.send(to, p).await,
            SellerMessage::RoundResult(p) => self.outbox.send(to, p).await,
            SellerMessage::FinalResult(p) => self.outbox.send(to, p).await,
            SellerMessage::PurchaseRequest(p) => self.outbox.send(to, p).await,
            SellerMessage::PurchaseFinalized(p) => self.outbox.send(to, p).await,
        }
    }
}
