//! Account address type with `cb_` prefix.

use crate::error::AddressError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account address, always prefixed with `cb_`.
///
/// Members, the pool, the registry and the governor all share this namespace,
/// so a component can be the owner of another component.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all addresses.
    pub const PREFIX: &'static str = "cb_";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `cb_`. Use [`Address::parse`]
    /// for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with cb_");
        Self(s)
    }

    /// Parse an address from untrusted input (config files, CLI flags).
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let raw = raw.trim();
        if !raw.starts_with(Self::PREFIX) {
            return Err(AddressError::MissingPrefix(raw.to_string()));
        }
        if raw.len() == Self::PREFIX.len() {
            return Err(AddressError::Empty);
        }
        if !raw[Self::PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AddressError::InvalidCharacter(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
