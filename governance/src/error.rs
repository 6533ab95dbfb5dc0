use crate::executor::ExecutionError;
use crate::proposal::{ProposalId, ProposalState};
use cbank_types::{Address, ContentHash, ErrorKind, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("no proposal matches content hash {0}")]
    UnknownProposal(ContentHash),

    #[error("proposal {id} is {state}, which does not allow this action")]
    WrongState { id: ProposalId, state: ProposalState },

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { voter: Address, id: ProposalId },

    #[error("{voter} had no delegated voting power at the snapshot of proposal {id}")]
    NoVotingPower { voter: Address, id: ProposalId },

    #[error("an identical proposal already exists: {0}")]
    ProposalExists(ProposalId),

    #[error("description hash does not match proposal {id}")]
    DescriptionMismatch { id: ProposalId },

    #[error("action {index} is invalid: {reason}")]
    InvalidAction { index: usize, reason: String },

    #[error("proposal arrays differ in length: {targets} targets, {values} values, {calls} calls")]
    LengthMismatch {
        targets: usize,
        values: usize,
        calls: usize,
    },

    #[error("a proposal must contain at least one action")]
    EmptyProposal,

    #[error("vote type {0} is not one of 0 (against), 1 (for), 2 (abstain)")]
    InvalidVoteType(u8),

    #[error("only the proposer can cancel proposal {id}")]
    NotProposer { caller: Address, id: ProposalId },

    #[error("proposal {id} is queued until {eta}")]
    NotReady { id: ProposalId, eta: Timestamp },

    #[error(transparent)]
    ExecutionFailed(#[from] ExecutionError),

    #[error("proposal encoding failed: {0}")]
    Encoding(String),

    #[error("arithmetic overflow in governance accounting")]
    Overflow,
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProposalNotFound(_) | Self::UnknownProposal(_) => ErrorKind::NotFound,
            Self::WrongState { .. } | Self::NotReady { .. } => ErrorKind::State,
            Self::AlreadyVoted { .. } | Self::ProposalExists(_) => ErrorKind::Duplicate,
            Self::NoVotingPower { .. } | Self::NotProposer { .. } => ErrorKind::Authorization,
            Self::DescriptionMismatch { .. }
            | Self::InvalidAction { .. }
            | Self::LengthMismatch { .. }
            | Self::EmptyProposal
            | Self::InvalidVoteType(_)
            | Self::Encoding(_) => ErrorKind::Validation,
            Self::ExecutionFailed(e) => e.kind,
            Self::Overflow => ErrorKind::Overflow,
        }
    }
}
