//! Deposit and borrow positions.

use crate::stream::Stream;
use cbank_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared, monotonic id space for both position kinds. Starts at 1.
pub type CashflowId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CashflowKind {
    Deposit = 0,
    Borrow = 1,
}

impl CashflowKind {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for CashflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => f.write_str("deposit"),
            Self::Borrow => f.write_str("borrow"),
        }
    }
}

/// Per-kind terms, fixed when the position opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashflowTerms {
    /// Interest streams from the pool to the holder until withdrawal.
    Deposit { supply_rate_bps: u32 },
    /// Repayment streams from the borrower to the pool until `obligation`
    /// has been paid, which happens at the latest after `term_secs`.
    Borrow {
        borrow_rate_bps: u32,
        term_secs: u64,
        obligation: Amount,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cashflow {
    pub id: CashflowId,
    /// Deposit holder, or the borrower.
    pub owner: Address,
    pub principal: Amount,
    pub opened_at: Timestamp,
    pub terms: CashflowTerms,
    pub stream: Stream,
}

impl Cashflow {
    pub fn kind(&self) -> CashflowKind {
        match self.terms {
            CashflowTerms::Deposit { .. } => CashflowKind::Deposit,
            CashflowTerms::Borrow { .. } => CashflowKind::Borrow,
        }
    }

    pub fn is_transferable(&self) -> bool {
        self.kind() == CashflowKind::Deposit
    }

    pub fn rate_bps(&self) -> u32 {
        match self.terms {
            CashflowTerms::Deposit { supply_rate_bps } => supply_rate_bps,
            CashflowTerms::Borrow { borrow_rate_bps, .. } => borrow_rate_bps,
        }
    }

    /// Remaining repayment owed on a borrow; zero for deposits.
    pub fn remaining_obligation(&self) -> Amount {
        match self.terms {
            CashflowTerms::Deposit { .. } => Amount::ZERO,
            CashflowTerms::Borrow { obligation, .. } => {
                obligation.saturating_sub(self.stream.settled)
            }
        }
    }

    pub fn params(&self) -> CashflowParams {
        let term_secs = match self.terms {
            CashflowTerms::Deposit { .. } => None,
            CashflowTerms::Borrow { term_secs, .. } => Some(term_secs),
        };
        CashflowParams {
            kind: self.kind(),
            owner: self.owner.clone(),
            amount: self.principal,
            rate_bps: self.rate_bps(),
            term_secs,
            start: self.stream.start,
            end: self.stream.end,
            settled: self.stream.settled,
        }
    }
}

/// Read-only summary of a position, as returned by `cashflows`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowParams {
    pub kind: CashflowKind,
    pub owner: Address,
    pub amount: Amount,
    pub rate_bps: u32,
    pub term_secs: Option<u64>,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub settled: Amount,
}
