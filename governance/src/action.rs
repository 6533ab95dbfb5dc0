//! Privileged actions a proposal can carry.
//!
//! Instead of arbitrary calldata, a proposal holds a list of typed calls, each
//! addressed to one of the components the governor owns. The allow-list is the
//! pairing in [`Call::component`]: a call sent to any other component is
//! rejected when the proposal is created.

use crate::error::GovernanceError;
use cbank_crypto::blake2b_256_multi;
use cbank_types::{Address, Amount, ContentHash, InterestRateModel};
use serde::{Deserialize, Serialize};

/// A component the governor can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    /// The membership registry.
    Registry,
    /// The lending pool.
    Pool,
}

impl Component {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Pool => "pool",
        }
    }
}

/// The closed set of privileged operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Registry: admit a new member.
    MintMembership { to: Address },
    /// Pool: lend `amount` to `target` under the current rate model.
    OpenBorrow { target: Address, amount: Amount },
    /// Pool: install a new rate model for future positions.
    SetInterestRateModel { model: InterestRateModel },
}

impl Call {
    /// The only component allowed to receive this call.
    pub fn component(&self) -> Component {
        match self {
            Self::MintMembership { .. } => Component::Registry,
            Self::OpenBorrow { .. } | Self::SetInterestRateModel { .. } => Component::Pool,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MintMembership { .. } => "mint_membership",
            Self::OpenBorrow { .. } => "open_borrow",
            Self::SetInterestRateModel { .. } => "set_interest_rate_model",
        }
    }
}

/// One `(target, value, call)` entry of a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub target: Component,
    /// Native value forwarded with the call. The governor holds no balance,
    /// so this must be zero.
    pub value: u128,
    pub call: Call,
}

impl Action {
    /// An action with zero value, addressed to the component the call belongs to.
    pub fn new(call: Call) -> Self {
        Self {
            target: call.component(),
            value: 0,
            call,
        }
    }

    pub fn mint_membership(to: Address) -> Self {
        Self::new(Call::MintMembership { to })
    }

    pub fn open_borrow(target: Address, amount: Amount) -> Self {
        Self::new(Call::OpenBorrow { target, amount })
    }

    pub fn set_interest_rate_model(model: InterestRateModel) -> Self {
        Self::new(Call::SetInterestRateModel { model })
    }

    /// Check the action against the allow-list. `index` is used for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), GovernanceError> {
        let expected = self.call.component();
        if self.target != expected {
            return Err(GovernanceError::InvalidAction {
                index,
                reason: format!(
                    "{} must target the {}, not the {}",
                    self.call.name(),
                    expected.name(),
                    self.target.name()
                ),
            });
        }
        if self.value != 0 {
            return Err(GovernanceError::InvalidAction {
                index,
                reason: format!("value must be zero, got {}", self.value),
            });
        }
        if let Call::SetInterestRateModel { model } = &self.call {
            if !model.is_valid() {
                return Err(GovernanceError::InvalidAction {
                    index,
                    reason: "interest rate model must have a non-zero term".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Build actions from the parallel `targets`/`values`/`calls` arrays.
pub fn actions_from_parts(
    targets: &[Component],
    values: &[u128],
    calls: &[Call],
) -> Result<Vec<Action>, GovernanceError> {
    if targets.len() != values.len() || targets.len() != calls.len() {
        return Err(GovernanceError::LengthMismatch {
            targets: targets.len(),
            values: values.len(),
            calls: calls.len(),
        });
    }
    if targets.is_empty() {
        return Err(GovernanceError::EmptyProposal);
    }
    Ok(targets
        .iter()
        .zip(values)
        .zip(calls)
        .map(|((target, value), call)| Action {
            target: *target,
            value: *value,
            call: call.clone(),
        })
        .collect())
}

/// Content key of a proposal: Blake2b-256 over the encoded actions followed by
/// the description hash. Two proposals with the same key are the same proposal.
pub fn hash_proposal(
    actions: &[Action],
    description_hash: &ContentHash,
) -> Result<ContentHash, GovernanceError> {
    let encoded =
        bincode::serialize(actions).map_err(|e| GovernanceError::Encoding(e.to_string()))?;
    Ok(ContentHash::new(blake2b_256_multi(&[
        &encoded,
        description_hash.as_bytes(),
    ])))
}
