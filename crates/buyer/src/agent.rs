//! Buyer agent runner

use std::sync::Arc;

use gavel_core::{AgentId, AuctionSnapshot, PreferenceBook};
use gavel_gateway::{
    AuctionStart, BidReply, CallForBids, Envelope, FinalResult, Mailbox, MalformedMessage,
    MessageKind, Outbox, Payload, ProvisionalAccept, ProvisionalReject, PurchaseAgree,
    PurchaseFinalized, PurchaseRefuse, PurchaseRequest, RoundResult, Transport,
};
use gavel_ports::{AuctionObserver, Directory, DirectoryError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::BuyerConfig;
use crate::engine::{DecisionEngine, PurchaseDecision};
use crate::error::BuyerError;
use crate::handle::{BuyerCommand, BuyerHandle, BuyerSnapshot};
use crate::view::MarketView;

pub struct BuyerAgent {
    config: BuyerConfig,
    me: AgentId,
    engine: DecisionEngine,
    view: MarketView,
    outbox: Outbox,
    mailbox: Mailbox,
    directory: Arc<dyn Directory>,
    observer: Arc<dyn AuctionObserver>,
    command_rx: mpsc::Receiver<BuyerCommand>,
    in_market: bool,
}

impl BuyerAgent {
    /// Create the agent and the handle that controls it
    ///
    /// The agent registers itself in the directory when it starts running.
    pub fn new(
        config: BuyerConfig,
        preferences: PreferenceBook,
        mailbox: Mailbox,
        transport: Arc<dyn Transport>,
        directory: Arc<dyn Directory>,
        observer: Arc<dyn AuctionObserver>,
    ) -> (Self, BuyerHandle) {
        let me = AgentId::new(config.agent_id.clone());
        let (command_tx, command_rx) = mpsc::channel(64);

        let agent = Self {
            outbox: Outbox::new(me.clone(), transport),
            engine: DecisionEngine::with_preferences(preferences),
            view: MarketView::new(),
            me,
            config,
            mailbox,
            directory,
            observer,
            command_rx,
            in_market: false,
        };
        (agent, BuyerHandle::new(command_tx))
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until the exit request is granted or every handle is dropped
    pub async fn run(mut self) {
        log::info!(
            "[{}] Buyer started with {} preferences",
            self.me,
            self.engine.preferences().len()
        );
        if let Err(e) = self.join_market() {
            log::warn!("[{}] Could not register in the directory: {}", self.me, e);
            self.observer
                .on_notification(&format!("{} could not join the market: {}", self.me, e));
        }

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => {
                            if self.handle_command(command) {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                result = self.mailbox.next() => {
                    match result {
                        Ok(envelope) => self.handle_envelope(envelope).await,
                        Err(_) => {
                            log::info!("[{}] Mailbox closed", self.me);
                            break;
                        }
                    }
                }
            }
        }

        log::info!(
            "[{}] Buyer stopped after {} purchases",
            self.me,
            self.engine.purchases().len()
        );
    }

    fn join_market(&mut self) -> Result<(), DirectoryError> {
        self.directory.register(&self.me, &self.config.capability)?;
        self.in_market = true;
        Ok(())
    }

    fn leave_market(&mut self) -> Result<(), BuyerError> {
        if !self.engine.can_exit() {
            return Err(BuyerError::StillWinning(self.engine.winning()));
        }
        if self.in_market {
            self.directory.deregister(&self.me, &self.config.capability)?;
            self.in_market = false;
        }
        Ok(())
    }

    /// Returns true when the agent should stop
    fn handle_command(&mut self, command: BuyerCommand) -> bool {
        match command {
            BuyerCommand::AddPreference {
                item,
                max_price,
                reply,
            } => {
                let result = if max_price.is_sign_negative() {
                    Err(BuyerError::InvalidPrice(max_price))
                } else {
                    log::info!("[{}] Wants {} for at most {}", self.me, item, max_price);
                    self.engine.add_preference(item, max_price);
                    Ok(())
                };
                let _ = reply.send(result);
                false
            }
            BuyerCommand::RequestExit { reply } => {
                let result = self.leave_market();
                let granted = result.is_ok();
                match &result {
                    Ok(()) => self
                        .observer
                        .on_notification(&format!("{} left the market", self.me)),
                    Err(e) => log::info!("[{}] Exit refused: {}", self.me, e),
                }
                let _ = reply.send(result);
                granted
            }
            BuyerCommand::LeaveMarket { reply } => {
                let _ = reply.send(self.leave_market());
                false
            }
            BuyerCommand::RejoinMarket { reply } => {
                let _ = reply.send(self.join_market().map_err(BuyerError::from));
                false
            }
            BuyerCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
                false
            }
        }
    }

    fn snapshot(&self) -> BuyerSnapshot {
        BuyerSnapshot {
            preferences: self
                .engine
                .preferences()
                .iter()
                .map(|(item, price)| (item.clone(), *price))
                .collect(),
            winning: self.engine.winning(),
            pending: self.engine.pending(),
            purchases: self.engine.purchases().to_vec(),
            auctions: self.view.snapshots(),
            in_market: self.in_market,
            can_exit: self.engine.can_exit(),
        }
    }

    fn publish(&self, snapshot: AuctionSnapshot) {
        self.observer.on_auction_event(&snapshot.item, &snapshot);
    }

    fn notify(&self, text: String) {
        log::info!("[{}] {}", self.me, text);
        self.observer.on_notification(&text);
    }

    async fn handle_envelope(&mut self, envelope: Envelope) {
        let seller = envelope.sender.clone();
        match envelope.kind {
            MessageKind::AuctionStart => {
                if let Some(start) = self.decoded::<AuctionStart>(&envelope).await {
                    if self.engine.on_auction_start(&seller, &start.item) {
                        log::warn!(
                            "[{}] {} reopened {} before our agreement landed",
                            self.me,
                            seller,
                            start.item
                        );
                    }
                    let snapshot = self.view.on_start(&seller, &start);
                    self.publish(snapshot);
                    self.notify(format!(
                        "{} opened {} at {} (+{})",
                        seller, start.item, start.starting_price, start.increment
                    ));
                }
            }
            MessageKind::CallForBids => {
                if let Some(cfp) = self.decoded::<CallForBids>(&envelope).await {
                    let participate = self.engine.should_participate(&cfp.item, cfp.price);
                    log::debug!(
                        "[{}] {} at {}: {}",
                        self.me,
                        cfp.item,
                        cfp.price,
                        if participate { "bid" } else { "pass" }
                    );
                    let snapshot = self.view.on_call(&seller, &cfp);
                    self.publish(snapshot);
                    self.outbox
                        .reply(
                            &envelope,
                            &BidReply {
                                item: cfp.item,
                                participate,
                            },
                        )
                        .await;
                }
            }
            MessageKind::ProvisionalAccept => {
                if let Some(accept) = self.decoded::<ProvisionalAccept>(&envelope).await {
                    log::debug!("[{}] Holding {} at {}", self.me, accept.item, accept.price);
                    self.engine.on_provisional(&accept.item, true);
                }
            }
            MessageKind::ProvisionalReject => {
                if let Some(reject) = self.decoded::<ProvisionalReject>(&envelope).await {
                    self.engine.on_provisional(&reject.item, false);
                }
            }
            MessageKind::RoundResult => {
                if let Some(result) = self.decoded::<RoundResult>(&envelope).await {
                    let snapshot = self.view.on_round(&seller, &result);
                    self.publish(snapshot);
                }
            }
            MessageKind::FinalResult => {
                if let Some(result) = self.decoded::<FinalResult>(&envelope).await {
                    self.engine
                        .on_final_result(&result.item, &result.winner, &self.me);
                    let snapshot = self.view.on_final(&seller, &result);
                    self.publish(snapshot);
                    self.notify(format!(
                        "{} won {} at {} in round {}",
                        result.winner, result.item, result.final_price, result.round
                    ));
                }
            }
            MessageKind::PurchaseRequest => {
                if let Some(request) = self.decoded::<PurchaseRequest>(&envelope).await {
                    self.answer_purchase_request(&envelope, request).await;
                }
            }
            MessageKind::PurchaseFinalized => {
                if let Some(done) = self.decoded::<PurchaseFinalized>(&envelope).await {
                    if let Some(purchase) =
                        self.engine
                            .on_purchase_finalized(&seller, &done.item, done.price)
                    {
                        self.notify(format!(
                            "Bought {} from {} at {}",
                            purchase.item, purchase.seller, purchase.price
                        ));
                    }
                    let snapshot = self.view.on_finalized(&seller, &done);
                    self.publish(snapshot);
                }
            }
            MessageKind::MalformedMessage => match envelope.decode::<MalformedMessage>() {
                Ok(notice) => self.notify(format!(
                    "{} did not understand message {}: {}",
                    seller, notice.in_reply_to, notice.reason
                )),
                Err(e) => log::warn!(
                    "[{}] Unreadable not-understood notice from {}: {}",
                    self.me,
                    seller,
                    e
                ),
            },
            kind => {
                self.outbox
                    .not_understood(&envelope, format!("{} is not handled by a buyer", kind))
                    .await;
            }
        }
    }

    async fn answer_purchase_request(&mut self, envelope: &Envelope, request: PurchaseRequest) {
        let decision = self
            .engine
            .on_purchase_request(&envelope.sender, &request.item, request.price);
        match decision {
            PurchaseDecision::Agree => {
                log::info!(
                    "[{}] Agreeing to buy {} at {}",
                    self.me,
                    request.item,
                    request.price
                );
                self.outbox
                    .reply(
                        envelope,
                        &PurchaseAgree {
                            item: request.item,
                            price: request.price,
                            contact_info: self.config.contact_info.clone(),
                        },
                    )
                    .await;
            }
            PurchaseDecision::Refuse => {
                self.notify(format!(
                    "Refusing {} at {} from {}",
                    request.item, request.price, envelope.sender
                ));
                self.outbox
                    .reply(envelope, &PurchaseRefuse { item: request.item })
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
}
