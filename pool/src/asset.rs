//! Fungible balances of the pool's base asset.

use crate::error::PoolError;
use cbank_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetLedger {
    symbol: String,
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl AssetLedger {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            balances: HashMap::new(),
            total_supply: Amount::ZERO,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Create `amount` out of thin air for `to`. Used to fund accounts.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), PoolError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(to.clone(), balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`. Nothing changes on error.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), PoolError> {
        self.ensure_balance(from, amount)?;
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let from_balance = self.balance_of(from) - amount;
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        self.balances.insert(from.clone(), from_balance);
        self.balances.insert(to.clone(), to_balance);
        Ok(())
    }

    pub fn ensure_balance(&self, account: &Address, needed: Amount) -> Result<(), PoolError> {
        let available = self.balance_of(account);
        if available < needed {
            return Err(PoolError::InsufficientBalance {
                account: account.clone(),
                needed,
                available,
            });
        }
        Ok(())
    }
}
