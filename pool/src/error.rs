use crate::position::{CashflowId, CashflowKind};
use cbank_authority::AuthorityError;
use cbank_types::{Address, Amount, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("cashflow {0} not found or already closed")]
    CashflowNotFound(CashflowId),

    #[error("cashflow {id} is a {actual} position, expected {expected}")]
    WrongKind {
        id: CashflowId,
        expected: CashflowKind,
        actual: CashflowKind,
    },

    #[error("{caller} does not own cashflow {id}")]
    NotPositionOwner { caller: Address, id: CashflowId },

    #[error("borrow position {0} is not transferable")]
    BorrowNotTransferable(CashflowId),

    #[error("insufficient pool liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: Amount, available: Amount },

    #[error("insufficient balance for {account}: needed {needed}, available {available}")]
    InsufficientBalance {
        account: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("{0} has not authorized the pool to open a stream")]
    StreamNotAuthorized(Address),

    #[error("the pool cannot be the counterparty of its own position")]
    PoolAsCounterparty,

    #[error("interest rate model must have a non-zero term")]
    InvalidRateModel,

    #[error("{0} has no interest to claim")]
    NothingToClaim(Address),

    #[error("arithmetic overflow in pool accounting")]
    Overflow,
}

impl PoolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authority(e) => e.kind(),
            Self::ZeroAmount | Self::NothingToClaim(_) => ErrorKind::ZeroAmount,
            Self::CashflowNotFound(_) => ErrorKind::NotFound,
            Self::WrongKind { .. } | Self::BorrowNotTransferable(_) | Self::StreamNotAuthorized(_) => {
                ErrorKind::State
            }
            Self::NotPositionOwner { .. } => ErrorKind::Authorization,
            Self::InsufficientLiquidity { .. } | Self::InsufficientBalance { .. } => {
                ErrorKind::InsufficientLiquidity
            }
            Self::PoolAsCounterparty | Self::InvalidRateModel => ErrorKind::Validation,
            Self::Overflow => ErrorKind::Overflow,
        }
    }
}
