//! The governor-owned component set and its all-or-nothing batch executor.

use cbank_governance::{Action, ActionExecutor, Call, ExecutionError, VotingPower};
use cbank_membership::MembershipRegistry;
use cbank_pool::LendingPool;
use cbank_types::{Address, Timestamp};

use crate::NodeError;

/// The components a governance proposal can act on.
#[derive(Clone, Debug)]
pub struct Components {
    pub registry: MembershipRegistry,
    pub pool: LendingPool,
}

impl Components {
    pub fn new(registry: MembershipRegistry, pool: LendingPool) -> Self {
        Self { registry, pool }
    }

    /// Apply a single action as `governor`.
    fn apply(&mut self, governor: &Address, index: usize, action: &Action, now: Timestamp) -> Result<(), NodeError> {
        action.validate(index)?;
        match &action.call {
            Call::MintMembership { to } => {
                self.registry.mint(governor, to, now)?;
            }
            Call::OpenBorrow { target, amount } => {
                self.pool.borrow(governor, target, *amount, now)?;
            }
            Call::SetInterestRateModel { model } => {
                self.pool.set_interest_rate_model(governor, *model, now)?;
            }
        }
        Ok(())
    }
}

impl ActionExecutor for Components {
    fn voting_power(&self) -> &dyn VotingPower {
        &self.registry
    }

    /// Stage every action on a copy of the components and commit only if all
    /// of them succeed. Events of a failed batch are discarded with the copy.
    fn execute_batch(
        &mut self,
        governor: &Address,
        actions: &[Action],
        now: Timestamp,
    ) -> Result<(), ExecutionError> {
        let mut staged = self.clone();
        for (index, action) in actions.iter().enumerate() {
            staged
                .apply(governor, index, action, now)
                .map_err(|e| ExecutionError::new(index, e.kind(), e.to_string()))?;
            tracing::debug!(index, call = action.call.name(), "action applied");
        }
        *self = staged;
        Ok(())
    }
}
