use cbank_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("authority error: {0}")]
    Authority(#[from] cbank_authority::AuthorityError),

    #[error("registry error: {0}")]
    Registry(#[from] cbank_membership::RegistryError),

    #[error("governance error: {0}")]
    Governance(#[from] cbank_governance::GovernanceError),

    #[error("pool error: {0}")]
    Pool(#[from] cbank_pool::PoolError),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authority(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Governance(e) => e.kind(),
            Self::Pool(e) => e.kind(),
            Self::Config(_) | Self::Serialization(_) => ErrorKind::Validation,
            Self::Io(_) => ErrorKind::State,
        }
    }
}
