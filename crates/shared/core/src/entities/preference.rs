use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::values::{ItemId, Price};

/// Answer to a purchase request checked against the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseCheck {
    /// Preference existed and covered the price; it has been removed
    Committed { ceiling: Price },
    /// No preference for the title
    NotInterested,
    /// Requested price is above the stored ceiling
    AboveCeiling { ceiling: Price },
}

/// A buyer's titles of interest with the most it will pay for each
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceBook {
    ceilings: BTreeMap<ItemId, Price>,
}

impl PreferenceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title or replace its ceiling
    pub fn insert(&mut self, item: impl Into<ItemId>, max_price: Price) -> Option<Price> {
        self.ceilings.insert(item.into(), max_price)
    }

    pub fn ceiling(&self, item: &ItemId) -> Option<Price> {
        self.ceilings.get(item).copied()
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.ceilings.contains_key(item)
    }

    /// Whether the buyer would bid on `item` at `price`
    pub fn covers(&self, item: &ItemId, price: Price) -> bool {
        self.ceiling(item).is_some_and(|ceiling| ceiling >= price)
    }

    /// Check and, when affordable, remove the preference in one step
    ///
    /// Removing on commit keeps a second purchase request for the same title
    /// from being agreed to twice.
    pub fn commit(&mut self, item: &ItemId, price: Price) -> PurchaseCheck {
        match self.ceiling(item) {
            None => PurchaseCheck::NotInterested,
            Some(ceiling) if ceiling < price => PurchaseCheck::AboveCeiling { ceiling },
            Some(ceiling) => {
                self.ceilings.remove(item);
                PurchaseCheck::Committed { ceiling }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Price)> {
        self.ceilings.iter()
    }

    pub fn len(&self) -> usize {
        self.ceilings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ceilings.is_empty()
    }
}
