//! Membership credentials.

use cbank_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// Sequential credential id, starting at 0.
pub type CredentialId = u64;

/// A membership credential. Bound to its holder for life.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub holder: Address,
    pub minted_at: Timestamp,
}

impl Credential {
    /// Credentials are soulbound; there is no state in which this is true.
    pub const fn is_transferable(&self) -> bool {
        false
    }
}
