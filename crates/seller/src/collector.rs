//! Bid collection for the running round
//!
//! The first affirmative bidder of a round is provisionally accepted and
//! recorded as `previous_bidder`; everyone after it is rejected. `last_bidder`
//! always follows the most recent affirmative bid, which is what a sole-bid
//! round resolves to.

use gavel_core::{AgentId, Auction, AuctionPhase};

/// Immediate answer owed to a bidder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidVerdict {
    /// First affirmative bid of the round
    Accepted,
    /// Declined, late, repeated, or beaten to the round by an earlier bidder
    Rejected,
}

/// Apply one bid reply to the auction's round tally
pub fn collect(auction: &mut Auction, bidder: &AgentId, participate: bool) -> BidVerdict {
    if !participate {
        return BidVerdict::Rejected;
    }

    // Replies arriving after the round closed (or before it opened) are not tallied
    if auction.phase != AuctionPhase::Bidding {
        log::debug!(
            "[{}] Late bid from {} while {}",
            auction.item,
            bidder,
            auction.phase
        );
        return BidVerdict::Rejected;
    }

    if !auction.bidders_this_round.insert(bidder.clone()) {
        log::debug!("[{}] Repeated bid from {} ignored", auction.item, bidder);
        return BidVerdict::Rejected;
    }
    auction.bids_this_round += 1;

    let verdict = if auction.last_bidder.is_none() {
        auction.previous_bidder = Some(bidder.clone());
        BidVerdict::Accepted
    } else {
        BidVerdict::Rejected
    };
    auction.last_bidder = Some(bidder.clone());
    verdict
}
