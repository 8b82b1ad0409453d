//! Auction Market Integration Tests
//!
//! Whole-market scenarios on tokio's paused clock: one seller, real buyer
//! agents and hand-scripted participants talking over the channel router.
//! Round ticks are 10s and the confirmation deadline 30s, as in production.

use std::sync::Arc;
use std::time::Duration;

use gavel_buyer::BuyerError;
use gavel_core::{AgentId, AuctionPhase, ItemId};
use gavel_gateway::{
    BidReply, CallForBids, Capabilities, Envelope, FinalResult, Mailbox, MessageKind, Outbox,
    PurchaseAgree, PurchaseFinalized, PurchaseRefuse, PurchaseRequest,
};
use gavel_ports::Directory;
use gavel_runner::{
    AuctionSpec, BuyerSpec, ConfigError, MarketBootstrap, MarketSimulation, RecordingObserver,
    RunnerError, ScenarioConfig,
};
use gavel_seller::SellerConfig;
use rust_decimal_macros::dec;

fn foo() -> ItemId {
    ItemId::from("Foo")
}

fn scenario(buyers: Vec<BuyerSpec>, duration_secs: u64) -> ScenarioConfig {
    ScenarioConfig {
        seller: SellerConfig::new("seller"),
        auctions: vec![AuctionSpec::new("Foo", dec!(10), dec!(2))],
        buyers,
        duration_secs,
    }
}

/// A participant driven step by step from the test body
struct Scripted {
    id: AgentId,
    mailbox: Mailbox,
    outbox: Outbox,
}

impl Scripted {
    fn join(market: &MarketBootstrap, name: &str) -> Self {
        let id = AgentId::from(name);
        market
            .directory
            .register(&id, Capabilities::AUCTION_PARTICIPANT)
            .unwrap();
        let mailbox = market.router.register(id.clone(), 100).unwrap();
        let outbox = Outbox::new(id.clone(), Arc::new(market.router.clone()));
        Self {
            id,
            mailbox,
            outbox,
        }
    }

    /// Next envelope of `kind`, skipping everything else
    async fn expect(&mut self, kind: MessageKind) -> Envelope {
        loop {
            let envelope = self.mailbox.next().await.unwrap();
            if envelope.kind == kind {
                return envelope;
            }
        }
    }

    async fn bid(&mut self, participate: bool) -> CallForBids {
        let envelope = self.expect(MessageKind::CallForBids).await;
        let cfp: CallForBids = envelope.decode().unwrap();
        self.outbox
            .reply(
                &envelope,
                &BidReply {
                    item: cfp.item.clone(),
                    participate,
                },
            )
            .await;
        cfp
    }
}

fn start_market(config: &ScenarioConfig, observer: Arc<RecordingObserver>) -> MarketBootstrap {
    let _ = env_logger::try_init();
    MarketBootstrap::start(config, observer).unwrap()
}

/// Seller opens "Foo" at 10 (+2); ceilings 20 and 15. Both bid at 10, 12
/// and 14; at 16 only the 20-ceiling buyer is left and wins there.
#[tokio::test(start_paused = true)]
async fn test_highest_ceiling_wins_at_first_uncontested_price() {
    let _ = env_logger::try_init();
    let observer = Arc::new(RecordingObserver::new());
    let config = scenario(
        vec![
            BuyerSpec::new("b20", "555-0020").wants("Foo", dec!(20)),
            BuyerSpec::new("b15", "555-0015").wants("Foo", dec!(15)),
        ],
        120,
    );

    let results = MarketSimulation::with_observer(config, observer.clone())
        .run()
        .await
        .unwrap();

    let sale = results.sale_of(&foo()).expect("Foo should be sold");
    assert_eq!(sale.buyer, AgentId::from("b20"));
    assert_eq!(sale.price, dec!(16));
    assert_eq!(sale.contact_info, "555-0020");
    assert!(results.unsold.is_empty());

    assert_eq!(results.purchases_of(&AgentId::from("b20")).len(), 1);
    assert!(results.purchases_of(&AgentId::from("b15")).is_empty());
    let loser = &results.buyers[&AgentId::from("b15")];
    assert_eq!(loser.preferences, vec![(foo(), dec!(15))]);
    assert!(loser.can_exit);

    // Round 1 was contested by both at the starting price
    assert!(observer.events().iter().any(|s| s.round == 1
        && s.bidders.len() == 2
        && s.current_price == dec!(10)
        && s.phase == AuctionPhase::Bidding));
    // Nobody ever bid above their ceiling: b15 is absent from every bidder list above 15
    assert!(
        observer
            .events()
            .iter()
            .filter(|s| s.current_price > dec!(15))
            .all(|s| !s.bidders.contains(&AgentId::from("b15")))
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_participants_waits_at_starting_price() {
    let observer = Arc::new(RecordingObserver::new());
    let results = MarketSimulation::with_observer(scenario(Vec::new(), 95), observer.clone())
        .run()
        .await
        .unwrap();

    assert!(results.sales.is_empty());
    let auction = &results.unsold[0];
    assert_eq!(auction.phase, AuctionPhase::AwaitingParticipants);
    assert_eq!(auction.current_price, dec!(10));
    assert_eq!(auction.round, 0);
    assert!(
        !observer
            .phases_of(&foo())
            .contains(&AuctionPhase::Bidding)
    );
}

/// The winner refuses; after the 30s deadline the auction starts over at
/// the original 10 (+2), not at the escalated 16.
#[tokio::test(start_paused = true)]
async fn test_refused_purchase_restarts_at_original_terms() {
    let observer = Arc::new(RecordingObserver::new());
    let config = scenario(vec![BuyerSpec::new("ben", "555-0102").wants("Foo", dec!(14))], 0);
    let market = start_market(&config, observer.clone());

    let mut mallory = Scripted::join(&market, "mallory");
    tokio::spawn(async move {
        loop {
            let Ok(envelope) = mallory.mailbox.next().await else {
                break;
            };
            match envelope.kind {
                MessageKind::CallForBids => {
                    let cfp: CallForBids = envelope.decode().unwrap();
                    mallory
                        .outbox
                        .reply(
                            &envelope,
                            &BidReply {
                                item: cfp.item,
                                participate: true,
                            },
                        )
                        .await;
                }
                MessageKind::PurchaseRequest => {
                    let request: PurchaseRequest = envelope.decode().unwrap();
                    mallory
                        .outbox
                        .reply(&envelope, &PurchaseRefuse { item: request.item })
                        .await;
                }
                _ => {}
            }
        }
    });
    market.open_auctions(&config.auctions).await.unwrap();

    // Rounds at 10, 12 and 14 are contested; at 16 only mallory bids and wins at t=50
    tokio::time::sleep(Duration::from_secs(65)).await;
    let snapshot = market.seller.snapshot().await.unwrap();
    let auction = snapshot.auction(&foo()).unwrap();
    assert_eq!(auction.phase, AuctionPhase::AwaitingConfirmation);
    assert_eq!(auction.winner, Some(AgentId::from("mallory")));
    assert_eq!(auction.current_price, dec!(16));
    assert!(observer.has_notification("refused"));

    // Deadline passes at t=80
    tokio::time::sleep(Duration::from_secs(20)).await;
    let snapshot = market.seller.snapshot().await.unwrap();
    let auction = snapshot.auction(&foo()).unwrap();
    assert_eq!(auction.phase, AuctionPhase::Restarted);
    assert_eq!(auction.current_price, dec!(10));
    assert_eq!(auction.increment, dec!(2));
    assert_eq!(auction.round, 0);
    assert!(auction.winner.is_none());
    assert!(snapshot.sales.is_empty());
    assert!(observer.has_notification("restarted"));

    // ben lost to mallory, so it holds nothing and may leave
    let ben = market.buyer("ben").unwrap().snapshot().await.unwrap();
    assert!(ben.can_exit);
    assert!(ben.pending.is_empty());

    market.shutdown().await;
}

/// Agreement quoting the wrong price is answered with a fresh request
#[tokio::test(start_paused = true)]
async fn test_price_mismatch_reissues_purchase_request() {
    let observer = Arc::new(RecordingObserver::new());
    let config = scenario(Vec::new(), 0);
    let market = start_market(&config, observer);
    let mut pat = Scripted::join(&market, "pat");
    market.open_auctions(&config.auctions).await.unwrap();

    pat.bid(true).await;

    let envelope = pat.expect(MessageKind::PurchaseRequest).await;
    let request: PurchaseRequest = envelope.decode().unwrap();
    assert_eq!(request.price, dec!(10));
    pat.outbox
        .reply(
            &envelope,
            &PurchaseAgree {
                item: foo(),
                price: dec!(9),
                contact_info: "pat@example".to_string(),
            },
        )
        .await;

    let envelope = pat.expect(MessageKind::PurchaseRequest).await;
    let request: PurchaseRequest = envelope.decode().unwrap();
    assert_eq!(request.price, dec!(10));
    pat.outbox
        .reply(
            &envelope,
            &PurchaseAgree {
                item: foo(),
                price: request.price,
                contact_info: "pat@example".to_string(),
            },
        )
        .await;

    let done: PurchaseFinalized = pat
        .expect(MessageKind::PurchaseFinalized)
        .await
        .decode()
        .unwrap();
    assert_eq!(done.price, dec!(10));

    let snapshot = market.seller.snapshot().await.unwrap();
    let sale = snapshot.sale(&foo()).unwrap();
    assert_eq!(sale.buyer, pat.id);
    assert_eq!(sale.contact_info, "pat@example");
    assert!(snapshot.auction(&foo()).is_none());

    market.shutdown().await;
}

/// First bidder gets the provisional accept, but a silent round after a
/// contested one goes to the round's last bidder, one increment down.
#[tokio::test(start_paused = true)]
async fn test_silent_round_rolls_back_to_last_bidder() {
    let observer = Arc::new(RecordingObserver::new());
    let config = scenario(Vec::new(), 0);
    let market = start_market(&config, observer);
    let mut first = Scripted::join(&market, "first");
    let mut last = Scripted::join(&market, "last");
    market.open_auctions(&config.auctions).await.unwrap();

    // Round 1 at 10: replies reach the seller in this order
    first.bid(true).await;
    last.bid(true).await;
    first.expect(MessageKind::ProvisionalAccept).await;
    last.expect(MessageKind::ProvisionalReject).await;

    // Round 2 at 12: nobody
    assert_eq!(first.bid(false).await.price, dec!(12));
    assert_eq!(last.bid(false).await.price, dec!(12));

    let result: FinalResult = first
        .expect(MessageKind::FinalResult)
        .await
        .decode()
        .unwrap();
    assert_eq!(result.winner, last.id);
    assert_eq!(result.final_price, dec!(10));

    let request: PurchaseRequest = last
        .expect(MessageKind::PurchaseRequest)
        .await
        .decode()
        .unwrap();
    assert_eq!(request.price, dec!(10));

    market.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_exit_refused_while_provisional_winner() {
    let observer = Arc::new(RecordingObserver::new());
    let config = scenario(vec![BuyerSpec::new("ana", "555-0101").wants("Foo", dec!(20))], 0);
    let market = start_market(&config, observer);
    market.open_auctions(&config.auctions).await.unwrap();
    let ana = market.buyer("ana").unwrap().clone();

    // t=10: sole bid at 10, provisionally accepted
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(
        ana.request_exit().await,
        Err(BuyerError::StillWinning(vec![foo()]))
    );

    // t=20: won, agreed, finalized
    tokio::time::sleep(Duration::from_secs(10)).await;
    let snapshot = ana.snapshot().await.unwrap();
    assert_eq!(snapshot.purchases.len(), 1);
    assert!(snapshot.can_exit);

    ana.request_exit().await.unwrap();
    let listed = market
        .directory
        .lookup(Capabilities::AUCTION_PARTICIPANT)
        .unwrap();
    assert!(!listed.contains(&AgentId::from("ana")));

    market.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_demo_market_sells_every_book() {
    let observer = Arc::new(RecordingObserver::new());
    let results = MarketSimulation::with_observer(ScenarioConfig::demo(), observer)
        .run()
        .await
        .unwrap();

    let foundation = results.sale_of(&ItemId::from("Foundation")).unwrap();
    assert_eq!(foundation.buyer, AgentId::from("ana"));
    assert_eq!(foundation.price, dec!(16));

    let dune = results.sale_of(&ItemId::from("Dune")).unwrap();
    assert_eq!(dune.buyer, AgentId::from("cat"));
    assert_eq!(dune.price, dec!(35));

    assert!(results.unsold.is_empty());
}

/// Settings tokio cannot run with are refused before any agent starts
#[tokio::test]
async fn test_unusable_settings_fail_bootstrap() {
    let observer = Arc::new(RecordingObserver::new());

    let mut config = scenario(vec![BuyerSpec::new("ana", "555-0101")], 1);
    config.buyers[0].config.mailbox_capacity = 0;
    assert!(matches!(
        MarketBootstrap::start(&config, observer.clone()),
        Err(RunnerError::Config(ConfigError::Invalid(_)))
    ));

    let mut config = scenario(Vec::new(), 1);
    config.seller.round_interval_ms = 0;
    assert!(matches!(
        MarketBootstrap::start(&config, observer),
        Err(RunnerError::Config(ConfigError::Invalid(_)))
    ));
}
