//! Buyer decision engine
//!
//! Pure state: no messages are sent from here. The agent asks it what to
//! answer and reports what the seller said.

use std::collections::{BTreeMap, BTreeSet};

use gavel_core::{AgentId, ItemId, PreferenceBook, Price, Purchase, PurchaseCheck};

/// Answer to a purchase request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseDecision {
    Agree,
    Refuse,
}

/// Agreement sent, finalization not yet received
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingPurchase {
    seller: AgentId,
    ceiling: Price,
}

#[derive(Debug, Default)]
pub struct DecisionEngine {
    preferences: PreferenceBook,
    /// Items this buyer holds a provisional accept for
    winning: BTreeSet<ItemId>,
    pending: BTreeMap<ItemId, PendingPurchase>,
    purchases: Vec<Purchase>,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: PreferenceBook) -> Self {
        Self {
            preferences,
            ..Default::default()
        }
    }

    /// Add a title of interest, or change its ceiling
    pub fn add_preference(&mut self, item: ItemId, max_price: Price) -> Option<Price> {
        self.preferences.insert(item, max_price)
    }

    /// Bid iff the title is wanted at this price
    pub fn should_participate(&self, item: &ItemId, price: Price) -> bool {
        self.preferences.covers(item, price)
    }

    /// Seller's immediate answer to our bid
    pub fn on_provisional(&mut self, item: &ItemId, accepted: bool) {
        if !self.preferences.contains(item) {
            return;
        }
        if accepted {
            self.winning.insert(item.clone());
        } else {
            self.winning.remove(item);
        }
    }

    /// The seller (re)opened `item`; an agreement still pending for it was lost
    ///
    /// Returns whether a stale pending purchase was released. Its ceiling
    /// goes back into the preferences so the buyer can bid again.
    pub fn on_auction_start(&mut self, seller: &AgentId, item: &ItemId) -> bool {
        match self.pending.get(item) {
            Some(pending) if &pending.seller == seller => {
                let ceiling = pending.ceiling;
                self.pending.remove(item);
                self.preferences.insert(item.clone(), ceiling);
                self.winning.remove(item);
                true
            }
            _ => false,
        }
    }

    /// A round resolved; anyone else winning ends our claim
    pub fn on_final_result(&mut self, item: &ItemId, winner: &AgentId, me: &AgentId) {
        if winner != me {
            self.winning.remove(item);
        }
    }

    /// Commit to the purchase if the preference still covers the price
    pub fn on_purchase_request(
        &mut self,
        seller: &AgentId,
        item: &ItemId,
        price: Price,
    ) -> PurchaseDecision {
        // The seller asked again (e.g. our agreement quoted a stale price)
        if let Some(pending) = self.pending.get(item).cloned() {
            if &pending.seller == seller && price <= pending.ceiling {
                return PurchaseDecision::Agree;
            }
            self.pending.remove(item);
            self.preferences.insert(item.clone(), pending.ceiling);
            self.winning.remove(item);
            return PurchaseDecision::Refuse;
        }

        match self.preferences.commit(item, price) {
            PurchaseCheck::Committed { ceiling } => {
                self.pending.insert(
                    item.clone(),
                    PendingPurchase {
                        seller: seller.clone(),
                        ceiling,
                    },
                );
                PurchaseDecision::Agree
            }
            PurchaseCheck::NotInterested | PurchaseCheck::AboveCeiling { .. } => {
                self.winning.remove(item);
                PurchaseDecision::Refuse
            }
        }
    }

    /// Seller recorded the sale; returns the purchase when it was ours
    pub fn on_purchase_finalized(
        &mut self,
        seller: &AgentId,
        item: &ItemId,
        price: Price,
    ) -> Option<Purchase> {
        self.winning.remove(item);
        match self.pending.get(item) {
            Some(pending) if &pending.seller == seller => {
                self.pending.remove(item);
                let purchase = Purchase {
                    item: item.clone(),
                    seller: seller.clone(),
                    price,
                };
                self.purchases.push(purchase.clone());
                Some(purchase)
            }
            _ => None,
        }
    }

    /// Leaving the market is allowed only while winning nothing
    pub fn can_exit(&self) -> bool {
        self.winning.is_empty()
    }

    pub fn winning(&self) -> Vec<ItemId> {
        self.winning.iter().cloned().collect()
    }

    pub fn pending(&self) -> Vec<ItemId> {
        self.pending.keys().cloned().collect()
    }

    pub fn preferences(&self) -> &PreferenceBook {
        &self.preferences
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }
}
