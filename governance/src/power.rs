//! Source of vote weight.

use cbank_membership::MembershipRegistry;
use cbank_types::{Address, Timestamp};

/// Checkpointed voting power, read as of a proposal snapshot.
pub trait VotingPower {
    /// Weight delegated to `account` at `at`.
    fn past_votes(&self, account: &Address, at: Timestamp) -> u64;
    /// Total voting supply at `at` (the quorum base).
    fn past_total_supply(&self, at: Timestamp) -> u64;
}

impl VotingPower for MembershipRegistry {
    fn past_votes(&self, account: &Address, at: Timestamp) -> u64 {
        self.get_past_votes(account, at)
    }

    fn past_total_supply(&self, at: Timestamp) -> u64 {
        self.get_past_total_supply(at)
    }
}
