//! The cooperative's lending pool.
//!
//! The pool custodies a base asset and issues two kinds of positions
//! ("cashflows") from one id space:
//!
//! - **Deposit**: principal held by the pool plus an open-ended interest
//!   stream from the pool to the holder. Transferable.
//! - **Borrow**: principal lent out plus a fixed-term repayment stream from the
//!   borrower to the pool. Never transferable.
//!
//! Streams are never ticked. Each stores its start, optional end and rate, and
//! the amount owed is computed from elapsed time when someone settles it.

pub mod asset;
pub mod error;
pub mod events;
pub mod pool;
pub mod position;
pub mod stream;

pub use asset::AssetLedger;
pub use error::PoolError;
pub use events::PoolEvent;
pub use pool::{LendingPool, RepaySettlement};
pub use position::{Cashflow, CashflowId, CashflowKind, CashflowParams, CashflowTerms};
pub use stream::{Stream, StreamGrants};
