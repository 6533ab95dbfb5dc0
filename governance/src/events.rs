//! Observable side effects of governance operations.

use crate::action::Action;
use crate::proposal::{ProposalId, VoteType};
use cbank_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: Address,
        actions: Vec<Action>,
        vote_start: Timestamp,
        vote_end: Timestamp,
        /// Off-chain retrieval identifier; never interpreted.
        description: String,
    },
    VoteCast {
        voter: Address,
        id: ProposalId,
        support: VoteType,
        weight: u64,
    },
    ProposalQueued { id: ProposalId, eta: Timestamp },
    ProposalExecuted { id: ProposalId },
    ProposalCanceled { id: ProposalId },
}
