//! Governance proposals and their lifecycle.

use crate::action::Action;
use crate::error::GovernanceError;
use cbank_types::{Address, ContentHash, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sequential proposal id, starting at 1.
pub type ProposalId = u64;

/// Lifecycle state of a proposal.
///
/// Discriminants are the external state codes, in the order clients decode them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProposalState {
    /// Created; voting has not started.
    Pending = 0,
    /// Voting window open: `vote_start <= now < vote_end`.
    Active = 1,
    /// Withdrawn by the proposer before voting ended.
    Canceled = 2,
    /// Voting ended without quorum or without a for-majority.
    Defeated = 3,
    /// Voting ended with quorum and more for than against votes.
    Succeeded = 4,
    /// Passed and waiting out the timelock.
    Queued = 5,
    /// Passed but not executed within the execution window.
    Expired = 6,
    /// Actions applied.
    Executed = 7,
}

impl ProposalState {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Canceled => "Canceled",
            Self::Defeated => "Defeated",
            Self::Succeeded => "Succeeded",
            Self::Queued => "Queued",
            Self::Expired => "Expired",
            Self::Executed => "Executed",
        }
    }

    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Canceled | Self::Defeated | Self::Expired | Self::Executed
        )
    }

    /// `execute` may be attempted in this state.
    pub fn is_executable(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Queued)
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ballot choice. Codes match the external `support` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VoteType {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl TryFrom<u8> for VoteType {
    type Error = GovernanceError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(GovernanceError::InvalidVoteType(other)),
        }
    }
}

/// Weighted vote totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub for_votes: u64,
    pub against_votes: u64,
    pub abstain_votes: u64,
}

impl Tally {
    /// Votes that count toward quorum (for + abstain).
    pub fn quorum_votes(&self) -> u64 {
        self.for_votes.saturating_add(self.abstain_votes)
    }

    /// A copy of the tally with `weight` added to `support`, or `None` on overflow.
    pub fn with_vote(&self, support: VoteType, weight: u64) -> Option<Self> {
        let mut next = *self;
        let bucket = match support {
            VoteType::Against => &mut next.against_votes,
            VoteType::For => &mut next.for_votes,
            VoteType::Abstain => &mut next.abstain_votes,
        };
        *bucket = bucket.checked_add(weight)?;
        Some(next)
    }
}

/// A recorded ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub support: VoteType,
    pub weight: u64,
}

/// A governance proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub actions: Vec<Action>,
    /// Off-chain retrieval identifier (e.g. a CID of a loan justification).
    pub description: String,
    pub description_hash: ContentHash,
    /// Hash of `actions` and `description_hash`; unique across proposals.
    pub content_hash: ContentHash,
    pub created_at: Timestamp,
    /// Voting opens here; vote weight is read as of this time.
    pub vote_start: Timestamp,
    /// Voting closes here (exclusive).
    pub vote_end: Timestamp,
    pub tally: Tally,
    pub receipts: BTreeMap<Address, VoteReceipt>,
    pub canceled: bool,
    pub executed: bool,
    /// Earliest execution time, once queued.
    pub eta: Option<Timestamp>,
}

impl Proposal {
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.receipts.contains_key(voter)
    }
}
