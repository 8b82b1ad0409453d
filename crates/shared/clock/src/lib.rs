//! Gavel Clock Infrastructure
//!
//! Time sources and timers for the auction agents:
//!
//! - [`SystemClock`]: wall-clock time for production
//! - [`FixedClock`]: time that only moves when told to, for tests
//! - [`Scheduler`]: periodic and one-shot timers keyed by an identifier,
//!   delivering events into the owning agent's queue
//!
//! ## Timers
//!
//! ```text
//! Scheduler ──every(key, period)──► tokio task ──event──┐
//!           ──once(key, delay)────► tokio task ──event──┤
//!                                                       ▼
//!                                        agent select! loop (single-threaded)
//! ```
//!
//! Cancelling a key aborts its task. An event that was already queued before
//! the cancel still arrives, so events should carry enough context (an epoch,
//! for instance) for the receiver to recognise stale wake-ups.

mod clocks;
mod scheduler;

pub use clocks::{FixedClock, SystemClock};
pub use scheduler::Scheduler;

// Re-export the Clock trait for convenience
pub use gavel_ports::Clock;
