use crate::position::CashflowId;
use cbank_types::{Address, Amount, InterestRateModel, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Deposit {
        id: CashflowId,
        from: Address,
        owner: Address,
        amount: Amount,
    },
    Withdraw {
        id: CashflowId,
        to: Address,
        principal: Amount,
        interest: Amount,
        /// Interest the reserves could not cover, credited as claimable.
        deferred: Amount,
    },
    Borrow {
        id: CashflowId,
        target: Address,
        amount: Amount,
        rate_bps: u32,
        term_secs: u64,
    },
    Repay {
        id: CashflowId,
        payer: Address,
        amount: Amount,
        remaining: Amount,
    },
    InterestRateModelUpdated {
        model: InterestRateModel,
        effective_from: Timestamp,
    },
    /// Position token movement. `from: None` is a mint, `to: None` a burn.
    Transfer {
        id: CashflowId,
        from: Option<Address>,
        to: Option<Address>,
    },
    StreamOpened {
        id: CashflowId,
        payer: Address,
        payee: Address,
        start: Timestamp,
        end: Option<Timestamp>,
    },
    StreamClosed { id: CashflowId, settled: Amount },
    StreamRedirected {
        id: CashflowId,
        from: Address,
        to: Address,
        credited: Amount,
    },
    InterestClaimed {
        account: Address,
        amount: Amount,
        at: Timestamp,
    },
    OwnershipTransferred { previous: Address, owner: Address },
}
