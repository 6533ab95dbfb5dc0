//! Lazily settled payment streams.

use cbank_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A continuous transfer from `payer` to `payee`.
///
/// The flow rate is `numerator / denominator` raw units per second. Keeping
/// the rate as a fraction means the cumulative amount is computed in one
/// rounding step, `floor(numerator × elapsed / denominator)`, and settlement
/// only ever moves the difference against `settled`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub payer: Address,
    pub payee: Address,
    pub start: Timestamp,
    /// Accrual stops here. `None` streams run until closed.
    pub end: Option<Timestamp>,
    pub numerator: u128,
    pub denominator: u128,
    /// Amount already settled (paid or credited) out of the accrued total.
    pub settled: Amount,
}

impl Stream {
    pub fn new(
        payer: Address,
        payee: Address,
        start: Timestamp,
        end: Option<Timestamp>,
        numerator: u128,
        denominator: u128,
    ) -> Self {
        Self {
            payer,
            payee,
            start,
            end,
            numerator,
            denominator,
            settled: Amount::ZERO,
        }
    }

    /// Seconds of accrual up to `now`, clamped to the stream window.
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        let until = match self.end {
            Some(end) if end < now => end,
            _ => now,
        };
        self.start.elapsed_since(until)
    }

    /// Cumulative amount streamed from `start` to `now`.
    pub fn accrued(&self, now: Timestamp) -> Option<Amount> {
        if self.denominator == 0 {
            return None;
        }
        let product = self.numerator.checked_mul(u128::from(self.elapsed(now)))?;
        Some(Amount::new(product / self.denominator))
    }

    /// Accrued but not yet settled.
    pub fn due(&self, now: Timestamp) -> Option<Amount> {
        Some(self.accrued(now)?.saturating_sub(self.settled))
    }

    /// Total the stream will ever carry, if it has an end.
    pub fn total(&self) -> Option<Amount> {
        let end = self.end?;
        self.accrued(end)
    }

    pub fn is_finished(&self, now: Timestamp) -> bool {
        self.end.is_some_and(|end| now >= end)
    }
}

/// Payers that have allowed the pool to open streams debiting them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StreamGrants {
    payers: BTreeSet<Address>,
}

impl StreamGrants {
    /// Returns `false` if the grant already existed.
    pub fn grant(&mut self, payer: &Address) -> bool {
        self.payers.insert(payer.clone())
    }

    /// Returns `false` if there was no grant. Streams already open keep running.
    pub fn revoke(&mut self, payer: &Address) -> bool {
        self.payers.remove(payer)
    }

    pub fn is_granted(&self, payer: &Address) -> bool {
        self.payers.contains(payer)
    }
}
