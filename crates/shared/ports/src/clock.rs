use gavel_core::Timestamp;

/// Port for time abstraction
///
/// Sale records are stamped through this so tests can pin the time.
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
