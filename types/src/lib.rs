//! Fundamental types for the community banking cooperative.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, amounts, timestamps, content hashes, governance and interest-rate
//! parameters, and the error taxonomy every component maps its failures onto.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use error::{AddressError, ErrorKind};
pub use hash::ContentHash;
pub use params::{GovernorSettings, InterestRateModel, BPS_DENOMINATOR, RATE_PERIOD_SECS};
pub use time::{Clock, SystemClock, Timestamp};
