mod auction;
mod preference;
mod sale;

pub use auction::{Auction, AuctionPhase, AuctionSnapshot, IdleOutcome, RoundOutcome};
pub use preference::{PreferenceBook, PurchaseCheck};
pub use sale::{Purchase, SaleRecord};
