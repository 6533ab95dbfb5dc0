//! Observable side effects of registry operations.

use crate::credential::CredentialId;
use cbank_types::Address;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A credential was issued.
    Minted { id: CredentialId, to: Address },
    /// A holder changed who their voting unit counts for.
    DelegateChanged {
        delegator: Address,
        from: Option<Address>,
        to: Address,
    },
    /// A delegate's voting power changed.
    DelegateVotesChanged {
        delegate: Address,
        previous: u64,
        current: u64,
    },
    OwnershipTransferred { previous: Address, owner: Address },
}
