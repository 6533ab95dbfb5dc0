//! Governance and interest-rate parameters.
//!
//! Both parameter sets are plain data: the governor reads [`GovernorSettings`]
//! at construction, and the pool applies an [`InterestRateModel`] to every
//! position it opens. A new rate model only affects positions opened after it
//! is installed.

use serde::{Deserialize, Serialize};

/// Basis-points denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// The period a supply rate is quoted over: 365 days.
pub const RATE_PERIOD_SECS: u64 = 60 * 60 * 24 * 365;

/// Rates applied to newly opened positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestRateModel {
    /// Interest paid to depositors, in bps per [`RATE_PERIOD_SECS`].
    pub supply_rate_bps: u32,
    /// Interest charged on a loan over its full `term_secs`, in bps.
    pub borrow_rate_bps: u32,
    /// Loan term in seconds. The repayment stream completes at the end of it.
    pub term_secs: u64,
}

impl InterestRateModel {
    /// A model is usable only if loans have a non-zero term.
    pub fn is_valid(&self) -> bool {
        self.term_secs > 0
    }
}

impl Default for InterestRateModel {
    /// 1% supply, 2% borrow, one-year term.
    fn default() -> Self {
        Self {
            supply_rate_bps: 100,
            borrow_rate_bps: 200,
            term_secs: RATE_PERIOD_SECS,
        }
    }
}

/// Timing and quorum settings for the governor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorSettings {
    /// Delay between proposal creation and the start of voting.
    pub voting_delay_secs: u64,
    /// Length of the voting window.
    pub voting_period_secs: u64,
    /// Minimum participation (for + abstain) as bps of total voting supply
    /// at the proposal snapshot.
    pub quorum_bps: u32,
    /// How long a succeeded or queued proposal stays executable.
    pub execution_window_secs: u64,
    /// Delay between queueing and earliest execution of a queued proposal.
    pub timelock_delay_secs: u64,
}

impl GovernorSettings {
    /// Fast timelines used by local test deployments.
    pub fn testnet_defaults() -> Self {
        Self {
            voting_delay_secs: 1,
            voting_period_secs: 60,
            quorum_bps: 400,
            execution_window_secs: 3600,
            timelock_delay_secs: 0,
        }
    }
}

impl Default for GovernorSettings {
    /// One-day delay, one-week vote, 4% quorum, two-week execution window.
    fn default() -> Self {
        Self {
            voting_delay_secs: 86_400,
            voting_period_secs: 7 * 86_400,
            quorum_bps: 400,
            execution_window_secs: 14 * 86_400,
            timelock_delay_secs: 0,
        }
    }
}
