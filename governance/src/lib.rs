//! Governance for the cooperative.
//!
//! Proposal lifecycle (OpenZeppelin-style Governor, timestamp-based):
//! Pending -> Active -> Defeated | Succeeded -> (Queued) -> Executed,
//! with Canceled reachable from Pending/Active by the proposer and Expired
//! reached when a passed proposal is not executed within the execution window.
//!
//! Key principles:
//! - Anyone may propose; only delegated credential weight may vote.
//! - Vote weight is read as of the proposal's start (its snapshot).
//! - Proposals carry a closed set of privileged actions, checked against the
//!   component that may receive them, instead of opaque calldata.
//! - Execution is all-or-nothing; the executor seam guarantees it.

pub mod action;
pub mod engine;
pub mod error;
pub mod events;
pub mod executor;
pub mod power;
pub mod proposal;

pub use action::{actions_from_parts, hash_proposal, Action, Call, Component};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use events::GovernanceEvent;
pub use executor::{ActionExecutor, ExecutionError};
pub use power::VotingPower;
pub use proposal::{Proposal, ProposalId, ProposalState, Tally, VoteReceipt, VoteType};
