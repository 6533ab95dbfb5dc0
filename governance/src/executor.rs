//! Seam between the governor and the components it owns.

use crate::action::Action;
use crate::power::VotingPower;
use cbank_types::{Address, ErrorKind, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rejected action inside an execution batch.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("action {index} failed ({kind}): {message}")]
pub struct ExecutionError {
    /// Position of the failing action in the proposal.
    pub index: usize,
    pub kind: ErrorKind,
    pub message: String,
}

impl ExecutionError {
    pub fn new(index: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            message: message.into(),
        }
    }
}

/// The set of components a governor can act on.
///
/// Implementors must apply `execute_batch` atomically: either every action
/// takes effect, or none does and the error names the first failing action.
pub trait ActionExecutor {
    /// Voting power used to decide whether a proposal passed.
    fn voting_power(&self) -> &dyn VotingPower;

    /// Apply `actions` in order, authorized as `governor`.
    fn execute_batch(
        &mut self,
        governor: &Address,
        actions: &[Action],
        now: Timestamp,
    ) -> Result<(), ExecutionError>;
}
