use crate::credential::CredentialId;
use cbank_authority::AuthorityError;
use cbank_types::{Address, ErrorKind, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error("address {0} already holds a membership credential")]
    AlreadyMember(Address),

    #[error("membership credential {0} is not transferable")]
    NonTransferable(CredentialId),

    #[error("membership credential {0} not found")]
    CredentialNotFound(CredentialId),

    #[error("clock went backwards: {now} is before the last checkpoint at {last}")]
    ClockRegression { now: Timestamp, last: Timestamp },

    #[error("credential id space exhausted")]
    Overflow,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authority(e) => e.kind(),
            Self::AlreadyMember(_) => ErrorKind::Duplicate,
            Self::NonTransferable(_) => ErrorKind::State,
            Self::CredentialNotFound(_) => ErrorKind::NotFound,
            Self::ClockRegression { .. } => ErrorKind::State,
            Self::Overflow => ErrorKind::Overflow,
        }
    }
}
