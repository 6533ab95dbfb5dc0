//! Authority mediator.
//!
//! A component is constructed with an owner (the deployer). During bootstrap the
//! owner hands the slot to the governor exactly once; after that the slot is
//! frozen and every privileged call must come from the governor.

pub mod error;
pub mod slot;

pub use error::AuthorityError;
pub use slot::AuthoritySlot;
