//! The error taxonomy shared across crates.
//!
//! Each component keeps its own `thiserror` enum; every variant maps onto one
//! [`ErrorKind`] so callers can react to the class of failure without matching
//! on component-specific details.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Class of a rejected operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller lacks the authority required (non-owner, non-holder, non-proposer).
    Authorization,
    /// The operation would create something that already exists.
    Duplicate,
    /// The target is in the wrong lifecycle state for this operation.
    State,
    /// Not enough funds available to the pool or the payer.
    InsufficientLiquidity,
    /// Unknown or already-closed id.
    NotFound,
    /// A zero amount was supplied where a positive one is required.
    ZeroAmount,
    /// Malformed input.
    Validation,
    /// Checked arithmetic overflowed.
    Overflow,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Duplicate => "duplicate",
            Self::State => "state",
            Self::InsufficientLiquidity => "insufficient_liquidity",
            Self::NotFound => "not_found",
            Self::ZeroAmount => "zero_amount",
            Self::Validation => "validation",
            Self::Overflow => "overflow",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected address input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address {0:?} does not start with cb_")]
    MissingPrefix(String),

    #[error("address is empty after the cb_ prefix")]
    Empty,

    #[error("address {0:?} contains characters outside [A-Za-z0-9_]")]
    InvalidCharacter(String),
}

impl AddressError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
