//! The authority slot itself.

use crate::error::AuthorityError;
use cbank_types::Address;
use serde::{Deserialize, Serialize};

/// Current owner of a component, transferable exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritySlot {
    owner: Address,
    transferred: bool,
}

impl AuthoritySlot {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            transferred: false,
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Whether the one allowed transfer has happened.
    pub fn is_transferred(&self) -> bool {
        self.transferred
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        &self.owner == caller
    }

    /// Reject `caller` unless it holds the slot.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), AuthorityError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(AuthorityError::NotOwner {
                caller: caller.clone(),
                owner: self.owner.clone(),
            })
        }
    }

    /// Hand the slot to `new_owner`. Returns the previous owner.
    ///
    /// Only the current owner may call this, and only once per slot lifetime.
    /// The frozen check runs first, so a second attempt fails the same way for
    /// the new owner and for the dispossessed one.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, AuthorityError> {
        if self.transferred {
            return Err(AuthorityError::AlreadyTransferred(self.owner.clone()));
        }
        self.ensure_owner(caller)?;
        let previous = std::mem::replace(&mut self.owner, new_owner);
        self.transferred = true;
        tracing::info!(previous = %previous, owner = %self.owner, "ownership transferred");
        Ok(previous)
    }
}
