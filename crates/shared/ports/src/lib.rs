//! Gavel Ports
//!
//! Port definitions (traits) for the Gavel auction market.
//! These define the boundaries between the negotiation protocol and its
//! external collaborators: the discovery directory, the presentation layer
//! and the time source.

mod clock;
mod directory;
mod error;
mod observer;

pub use clock::Clock;
pub use directory::Directory;
pub use error::{DirectoryError, DirectoryResult};
pub use observer::{AuctionObserver, NoopObserver};
