use cbank_types::{Address, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    #[error("caller {caller} is not the owner ({owner})")]
    NotOwner { caller: Address, owner: Address },

    #[error("ownership was already transferred to {0}; the slot is frozen")]
    AlreadyTransferred(Address),
}

impl AuthorityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } => ErrorKind::Authorization,
            Self::AlreadyTransferred(_) => ErrorKind::State,
        }
    }
}
