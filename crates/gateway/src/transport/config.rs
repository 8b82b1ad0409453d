//! Transport configuration

/// Capability names advertised in the directory
///
/// Sellers look participants up by capability; buyers register under it.
pub struct Capabilities;

impl Capabilities {
    /// Buyers willing to receive auction announcements and calls for bids
    pub const AUCTION_PARTICIPANT: &'static str = "auction-participant";

    /// Capability scoped to one seller's market: `auction-participant.{seller}`
    pub fn participant_of(seller: &str) -> String {
        format!("{}.{}", Self::AUCTION_PARTICIPANT, seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert_eq!(Capabilities::AUCTION_PARTICIPANT, "auction-participant");
        assert_eq!(
            Capabilities::participant_of("seller-1"),
            "auction-participant.seller-1"
        );
    }
}
