//! Membership registry for the cooperative.
//!
//! Each address can hold at most one credential, ever. Credentials cannot be
//! transferred or burned. Minting is owner-gated; after bootstrap the owner is
//! the governor, so new members are admitted only through executed proposals.
//!
//! Voting power is explicit: a holder's credential counts for whoever the
//! holder has delegated to (usually themselves). Delegated power is
//! checkpointed over time so the governor can read it as of a proposal's
//! snapshot.

pub mod checkpoints;
pub mod credential;
pub mod error;
pub mod events;
pub mod registry;

pub use checkpoints::{Checkpoint, Checkpoints};
pub use credential::{Credential, CredentialId};
pub use error::RegistryError;
pub use events::RegistryEvent;
pub use registry::MembershipRegistry;
