//! The lending pool state machine.
//!
//! Liquidity model: the pool's held balance backs the principal of every open
//! deposit. Only the surplus (`held − open deposit principal`) can be lent out
//! or paid as interest, so deposit principal never exceeds the held balance.

use crate::asset::AssetLedger;
use crate::error::PoolError;
use crate::events::PoolEvent;
use crate::position::{Cashflow, CashflowId, CashflowKind, CashflowParams, CashflowTerms};
use crate::stream::{Stream, StreamGrants};
use cbank_authority::AuthoritySlot;
use cbank_types::{Address, Amount, InterestRateModel, Timestamp, BPS_DENOMINATOR, RATE_PERIOD_SECS};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Outcome of a `repay` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaySettlement {
    pub id: CashflowId,
    /// Settled by this call.
    pub paid: Amount,
    /// Settled over the life of the position, this call included.
    pub total_repaid: Amount,
    pub remaining: Amount,
    pub closed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LendingPool {
    address: Address,
    name: String,
    symbol: String,
    authority: AuthoritySlot,
    asset: AssetLedger,
    model: InterestRateModel,
    cashflows: BTreeMap<CashflowId, Cashflow>,
    next_id: CashflowId,
    total_borrows: Amount,
    deposit_principal: Amount,
    claimable: HashMap<Address, Amount>,
    grants: StreamGrants,
    #[serde(skip)]
    events: Vec<PoolEvent>,
}

impl LendingPool {
    pub fn new(
        address: Address,
        owner: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        asset: AssetLedger,
        model: InterestRateModel,
    ) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            authority: AuthoritySlot::new(owner),
            asset,
            model,
            cashflows: BTreeMap::new(),
            next_id: 1,
            total_borrows: Amount::ZERO,
            deposit_principal: Amount::ZERO,
            claimable: HashMap::new(),
            grants: StreamGrants::default(),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> &Address {
        self.authority.owner()
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), PoolError> {
        let previous = self.authority.transfer_ownership(caller, new_owner)?;
        self.events.push(PoolEvent::OwnershipTransferred {
            previous,
            owner: self.authority.owner().clone(),
        });
        Ok(())
    }

    // ── Base asset ──────────────────────────────────────────────────────

    pub fn asset(&self) -> &AssetLedger {
        &self.asset
    }

    /// Fund `to` with newly created base asset.
    pub fn mint_asset(&mut self, to: &Address, amount: Amount) -> Result<(), PoolError> {
        self.asset.mint(to, amount)
    }

    /// Plain base-asset transfer between two accounts.
    pub fn transfer_asset(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), PoolError> {
        self.asset.transfer(caller, to, amount)
    }

    /// Base asset held by the pool.
    pub fn held(&self) -> Amount {
        self.asset.balance_of(&self.address)
    }

    /// Held balance not backing deposit principal.
    pub fn available_liquidity(&self) -> Amount {
        self.held().saturating_sub(self.deposit_principal)
    }

    fn ensure_liquidity(&self, requested: Amount) -> Result<(), PoolError> {
        let available = self.available_liquidity();
        if requested > available {
            return Err(PoolError::InsufficientLiquidity { requested, available });
        }
        Ok(())
    }

    // ── Stream authorization ────────────────────────────────────────────

    /// Allow the pool to open repayment streams debiting `payer`.
    pub fn authorize_stream(&mut self, payer: &Address) {
        if self.grants.grant(payer) {
            tracing::debug!(payer = %payer, "stream authorization granted");
        }
    }

    pub fn revoke_stream_authorization(&mut self, payer: &Address) {
        if self.grants.revoke(payer) {
            tracing::debug!(payer = %payer, "stream authorization revoked");
        }
    }

    pub fn is_stream_authorized(&self, payer: &Address) -> bool {
        self.grants.is_granted(payer)
    }

    // ── Positions ───────────────────────────────────────────────────────

    /// Deposit `amount` from `caller` and open an interest stream to `target`.
    pub fn deposit(
        &mut self,
        caller: &Address,
        amount: Amount,
        target: &Address,
        now: Timestamp,
    ) -> Result<CashflowId, PoolError> {
        if amount.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        if target == &self.address || caller == &self.address {
            return Err(PoolError::PoolAsCounterparty);
        }
        self.asset.ensure_balance(caller, amount)?;

        let supply_rate_bps = self.model.supply_rate_bps;
        let numerator = amount
            .raw()
            .checked_mul(u128::from(supply_rate_bps))
            .ok_or(PoolError::Overflow)?;
        let denominator = BPS_DENOMINATOR * u128::from(RATE_PERIOD_SECS);
        let deposit_principal = self
            .deposit_principal
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(PoolError::Overflow)?;

        self.asset.transfer(caller, &self.address, amount)?;
        self.next_id = next_id;
        self.deposit_principal = deposit_principal;
        let stream = Stream::new(self.address.clone(), target.clone(), now, None, numerator, denominator);
        self.cashflows.insert(
            id,
            Cashflow {
                id,
                owner: target.clone(),
                principal: amount,
                opened_at: now,
                terms: CashflowTerms::Deposit { supply_rate_bps },
                stream,
            },
        );

        self.events.push(PoolEvent::Deposit {
            id,
            from: caller.clone(),
            owner: target.clone(),
            amount,
        });
        self.events.push(PoolEvent::StreamOpened {
            id,
            payer: self.address.clone(),
            payee: target.clone(),
            start: now,
            end: None,
        });
        self.events.push(PoolEvent::Transfer {
            id,
            from: None,
            to: Some(target.clone()),
        });
        tracing::info!(id, owner = %target, %amount, supply_rate_bps, "deposit opened");
        Ok(id)
    }

    /// Close a deposit, paying principal plus unsettled interest to its owner.
    /// Returns the payout.
    ///
    /// The principal always comes back. Interest the reserves cannot cover is
    /// credited to the owner as claimable instead of blocking the exit.
    pub fn withdraw(&mut self, caller: &Address, id: CashflowId, now: Timestamp) -> Result<Amount, PoolError> {
        let cf = self.open(id, CashflowKind::Deposit)?;
        if &cf.owner != caller {
            return Err(PoolError::NotPositionOwner {
                caller: caller.clone(),
                id,
            });
        }
        let due = cf.stream.due(now).ok_or(PoolError::Overflow)?;
        let interest = due.min(self.available_liquidity());
        let deferred = due.saturating_sub(interest);
        let principal = cf.principal;
        let payout = principal.checked_add(interest).ok_or(PoolError::Overflow)?;
        let settled = cf.stream.settled.checked_add(due).ok_or(PoolError::Overflow)?;
        let claimable = self
            .claimable_interest(caller)
            .checked_add(deferred)
            .ok_or(PoolError::Overflow)?;

        self.asset.transfer(&self.address, caller, payout)?;
        self.deposit_principal = self.deposit_principal.saturating_sub(principal);
        self.cashflows.remove(&id);
        if !deferred.is_zero() {
            self.claimable.insert(caller.clone(), claimable);
            tracing::warn!(id, owner = %caller, %deferred, "reserves short, interest credited as claimable");
        }

        self.events.push(PoolEvent::Withdraw {
            id,
            to: caller.clone(),
            principal,
            interest,
            deferred,
        });
        self.events.push(PoolEvent::StreamClosed { id, settled });
        self.events.push(PoolEvent::Transfer {
            id,
            from: Some(caller.clone()),
            to: None,
        });
        tracing::info!(id, owner = %caller, %principal, %interest, "deposit withdrawn");
        Ok(payout)
    }

    /// Lend `amount` to `target` under the current rate model. Owner only.
    pub fn borrow(
        &mut self,
        caller: &Address,
        target: &Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<CashflowId, PoolError> {
        if let Err(e) = self.authority.ensure_owner(caller) {
            tracing::warn!(caller = %caller, target = %target, "rejected borrow from non-owner");
            return Err(e.into());
        }
        if amount.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        if target == &self.address {
            return Err(PoolError::PoolAsCounterparty);
        }
        self.ensure_liquidity(amount)?;
        if !self.grants.is_granted(target) {
            return Err(PoolError::StreamNotAuthorized(target.clone()));
        }

        let InterestRateModel {
            borrow_rate_bps,
            term_secs,
            ..
        } = self.model;
        if term_secs == 0 {
            return Err(PoolError::InvalidRateModel);
        }
        let factor = BPS_DENOMINATOR + u128::from(borrow_rate_bps);
        let numerator = amount.raw().checked_mul(factor).ok_or(PoolError::Overflow)?;
        let denominator = BPS_DENOMINATOR * u128::from(term_secs);
        let obligation = Amount::new(numerator / BPS_DENOMINATOR);
        let end = now
            .as_secs()
            .checked_add(term_secs)
            .map(Timestamp::new)
            .ok_or(PoolError::Overflow)?;
        let total_borrows = self
            .total_borrows
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(PoolError::Overflow)?;

        self.asset.transfer(&self.address, target, amount)?;
        self.next_id = next_id;
        self.total_borrows = total_borrows;
        let stream = Stream::new(target.clone(), self.address.clone(), now, Some(end), numerator, denominator);
        self.cashflows.insert(
            id,
            Cashflow {
                id,
                owner: target.clone(),
                principal: amount,
                opened_at: now,
                terms: CashflowTerms::Borrow {
                    borrow_rate_bps,
                    term_secs,
                    obligation,
                },
                stream,
            },
        );

        self.events.push(PoolEvent::Borrow {
            id,
            target: target.clone(),
            amount,
            rate_bps: borrow_rate_bps,
            term_secs,
        });
        self.events.push(PoolEvent::StreamOpened {
            id,
            payer: target.clone(),
            payee: self.address.clone(),
            start: now,
            end: Some(end),
        });
        tracing::info!(id, target = %target, %amount, %obligation, %end, "borrow opened");
        Ok(id)
    }

    /// Settle the repayment stream of a borrow up to `now`. Anyone may call.
    ///
    /// The position closes once the full obligation has been settled.
    pub fn repay(&mut self, caller: &Address, id: CashflowId, now: Timestamp) -> Result<RepaySettlement, PoolError> {
        let cf = self.open(id, CashflowKind::Borrow)?;
        let obligation = match cf.terms {
            CashflowTerms::Borrow { obligation, .. } => obligation,
            CashflowTerms::Deposit { .. } => Amount::ZERO,
        };
        let borrower = cf.stream.payer.clone();
        let principal = cf.principal;
        let paid = cf.stream.due(now).ok_or(PoolError::Overflow)?;
        self.asset.ensure_balance(&borrower, paid)?;
        let total_repaid = cf
            .stream
            .settled
            .checked_add(paid)
            .ok_or(PoolError::Overflow)?;
        let remaining = obligation.saturating_sub(total_repaid);
        let closed = remaining.is_zero();

        self.asset.transfer(&borrower, &self.address, paid)?;
        if closed {
            self.cashflows.remove(&id);
            self.total_borrows = self.total_borrows.saturating_sub(principal);
        } else if let Some(cf) = self.cashflows.get_mut(&id) {
            cf.stream.settled = total_repaid;
        }

        self.events.push(PoolEvent::Repay {
            id,
            payer: borrower.clone(),
            amount: paid,
            remaining,
        });
        if closed {
            self.events.push(PoolEvent::StreamClosed {
                id,
                settled: total_repaid,
            });
        }
        tracing::info!(id, caller = %caller, borrower = %borrower, %paid, %remaining, closed, "borrow repaid");
        Ok(RepaySettlement {
            id,
            paid,
            total_repaid,
            remaining,
            closed,
        })
    }

    /// Move a deposit position from `from` to `to`.
    ///
    /// Interest accrued up to `now` stays with `from` as a claimable credit;
    /// the stream keeps running and pays `to` from here on.
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: CashflowId,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        let cf = self
            .cashflows
            .get(&id)
            .ok_or(PoolError::CashflowNotFound(id))?;
        if !cf.is_transferable() {
            tracing::warn!(id, caller = %caller, "rejected transfer of borrow position");
            return Err(PoolError::BorrowNotTransferable(id));
        }
        if caller != from || &cf.owner != from {
            return Err(PoolError::NotPositionOwner {
                caller: caller.clone(),
                id,
            });
        }
        if to == &self.address {
            return Err(PoolError::PoolAsCounterparty);
        }
        let credited = cf.stream.due(now).ok_or(PoolError::Overflow)?;
        let settled = cf
            .stream
            .settled
            .checked_add(credited)
            .ok_or(PoolError::Overflow)?;
        let claimable = self
            .claimable_interest(from)
            .checked_add(credited)
            .ok_or(PoolError::Overflow)?;

        if !credited.is_zero() {
            self.claimable.insert(from.clone(), claimable);
        }
        if let Some(cf) = self.cashflows.get_mut(&id) {
            cf.stream.settled = settled;
            cf.stream.payee = to.clone();
            cf.owner = to.clone();
        }

        self.events.push(PoolEvent::Transfer {
            id,
            from: Some(from.clone()),
            to: Some(to.clone()),
        });
        self.events.push(PoolEvent::StreamRedirected {
            id,
            from: from.clone(),
            to: to.clone(),
            credited,
        });
        tracing::info!(id, from = %from, to = %to, %credited, "deposit transferred");
        Ok(())
    }

    /// Pay out interest credited to `caller` by earlier transfers or by
    /// withdrawals the reserves could not fully cover.
    pub fn claim_interest(&mut self, caller: &Address, now: Timestamp) -> Result<Amount, PoolError> {
        let amount = self.claimable_interest(caller);
        if amount.is_zero() {
            return Err(PoolError::NothingToClaim(caller.clone()));
        }
        self.ensure_liquidity(amount)?;
        self.asset.transfer(&self.address, caller, amount)?;
        self.claimable.remove(caller);
        self.events.push(PoolEvent::InterestClaimed {
            account: caller.clone(),
            amount,
            at: now,
        });
        tracing::info!(account = %caller, %amount, "interest claimed");
        Ok(amount)
    }

    /// Install a new rate model. Open positions keep the terms they opened with.
    pub fn set_interest_rate_model(
        &mut self,
        caller: &Address,
        model: InterestRateModel,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        if let Err(e) = self.authority.ensure_owner(caller) {
            tracing::warn!(caller = %caller, "rejected rate model change from non-owner");
            return Err(e.into());
        }
        if !model.is_valid() {
            return Err(PoolError::InvalidRateModel);
        }
        self.model = model;
        self.events.push(PoolEvent::InterestRateModelUpdated {
            model,
            effective_from: now,
        });
        tracing::info!(
            supply_rate_bps = model.supply_rate_bps,
            borrow_rate_bps = model.borrow_rate_bps,
            term_secs = model.term_secs,
            "interest rate model updated"
        );
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────────

    fn open(&self, id: CashflowId, expected: CashflowKind) -> Result<&Cashflow, PoolError> {
        let cf = self
            .cashflows
            .get(&id)
            .ok_or(PoolError::CashflowNotFound(id))?;
        if cf.kind() != expected {
            return Err(PoolError::WrongKind {
                id,
                expected,
                actual: cf.kind(),
            });
        }
        Ok(cf)
    }

    pub fn interest_rate_model(&self) -> InterestRateModel {
        self.model
    }

    pub fn cashflow(&self, id: CashflowId) -> Option<&Cashflow> {
        self.cashflows.get(&id)
    }

    pub fn owner_of(&self, id: CashflowId) -> Result<&Address, PoolError> {
        self.cashflows
            .get(&id)
            .map(|cf| &cf.owner)
            .ok_or(PoolError::CashflowNotFound(id))
    }

    /// Ids and parameters of every open position owned by `owner`, in id order.
    pub fn cashflows(&self, owner: &Address) -> (Vec<CashflowId>, Vec<CashflowParams>) {
        self.cashflows
            .values()
            .filter(|cf| &cf.owner == owner)
            .map(|cf| (cf.id, cf.params()))
            .unzip()
    }

    pub fn open_cashflows(&self) -> impl Iterator<Item = &Cashflow> {
        self.cashflows.values()
    }

    /// Principal of open borrows.
    pub fn total_borrows(&self) -> Amount {
        self.total_borrows
    }

    /// Principal of open deposits.
    pub fn total_deposits(&self) -> Amount {
        self.deposit_principal
    }

    /// Remaining obligation across `borrower`'s open borrows.
    pub fn borrow_balance(&self, borrower: &Address) -> Amount {
        self.cashflows
            .values()
            .filter(|cf| cf.kind() == CashflowKind::Borrow && &cf.owner == borrower)
            .map(Cashflow::remaining_obligation)
            .sum()
    }

    /// Unsettled interest on a deposit at `now`.
    pub fn accrued_interest(&self, id: CashflowId, now: Timestamp) -> Result<Amount, PoolError> {
        self.open(id, CashflowKind::Deposit)?
            .stream
            .due(now)
            .ok_or(PoolError::Overflow)
    }

    /// Repayment a `repay` at `now` would settle.
    pub fn repayable(&self, id: CashflowId, now: Timestamp) -> Result<Amount, PoolError> {
        self.open(id, CashflowKind::Borrow)?
            .stream
            .due(now)
            .ok_or(PoolError::Overflow)
    }

    /// Remaining obligation of a borrow.
    pub fn outstanding(&self, id: CashflowId) -> Result<Amount, PoolError> {
        Ok(self.open(id, CashflowKind::Borrow)?.remaining_obligation())
    }

    pub fn claimable_interest(&self, account: &Address) -> Amount {
        self.claimable.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Drain the event journal.
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbank_types::ErrorKind;

    const YEAR: u64 = RATE_PERIOD_SECS;

    fn addr(name: &str) -> Address {
        Address::new(format!("cb_{name}"))
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn amt(raw: u128) -> Amount {
        Amount::new(raw)
    }

    fn pool() -> LendingPool {
        LendingPool::new(
            addr("pool"),
            addr("governor"),
            "DAI Pool",
            "pDAI",
            AssetLedger::new("DAI"),
            InterestRateModel::default(),
        )
    }

    /// Pool with `reserves` of surplus liquidity and `balance` for alice.
    fn funded(reserves: u128, balance: u128) -> LendingPool {
        let mut p = pool();
        p.mint_asset(&addr("pool"), amt(reserves)).unwrap();
        p.mint_asset(&addr("alice"), amt(balance)).unwrap();
        p
    }

    #[test]
    fn deposit_then_immediate_withdraw_returns_amount() {
        let mut p = funded(0, 500);
        let id = p.deposit(&addr("alice"), amt(500), &addr("alice"), ts(10)).unwrap();
        assert_eq!(id, 1);
        assert_eq!(p.asset().balance_of(&addr("alice")), Amount::ZERO);
        assert_eq!(p.total_deposits(), amt(500));

        let payout = p.withdraw(&addr("alice"), id, ts(10)).unwrap();
        assert_eq!(payout, amt(500));
        assert_eq!(p.asset().balance_of(&addr("alice")), amt(500));
        assert_eq!(p.total_deposits(), Amount::ZERO);
        assert!(p.cashflow(id).is_none());
    }

    #[test]
    fn deposit_emits_position_mint() {
        let mut p = funded(0, 5);
        let id = p.deposit(&addr("alice"), amt(5), &addr("bob"), ts(0)).unwrap();
        let events = p.take_events();
        assert!(matches!(events[0], PoolEvent::Deposit { .. }));
        assert!(events.contains(&PoolEvent::Transfer {
            id,
            from: None,
            to: Some(addr("bob")),
        }));
        assert_eq!(p.owner_of(id).unwrap(), &addr("bob"));
    }

    #[test]
    fn zero_deposit_is_rejected() {
        let mut p = funded(0, 5);
        let err = p.deposit(&addr("alice"), Amount::ZERO, &addr("alice"), ts(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZeroAmount);
    }

    #[test]
    fn deposit_beyond_balance_is_rejected() {
        let mut p = funded(0, 5);
        let err = p.deposit(&addr("alice"), amt(6), &addr("alice"), ts(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);
        assert_eq!(p.total_deposits(), Amount::ZERO);
        assert!(p.take_events().is_empty());
    }

    #[test]
    fn deposit_earns_supply_rate() {
        let mut p = funded(100_000, 1_000_000);
        let id = p.deposit(&addr("alice"), amt(1_000_000), &addr("alice"), ts(0)).unwrap();
        assert_eq!(p.accrued_interest(id, ts(YEAR / 2)).unwrap(), amt(5_000));
        assert_eq!(p.accrued_interest(id, ts(YEAR)).unwrap(), amt(10_000));

        let payout = p.withdraw(&addr("alice"), id, ts(YEAR)).unwrap();
        assert_eq!(payout, amt(1_010_000));
        assert_eq!(p.held(), amt(90_000));
    }

    #[test]
    fn withdraw_checks_owner_and_existence() {
        let mut p = funded(0, 10);
        let id = p.deposit(&addr("alice"), amt(10), &addr("alice"), ts(0)).unwrap();

        let err = p.withdraw(&addr("mallory"), id, ts(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let err = p.withdraw(&addr("alice"), 99, ts(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        p.withdraw(&addr("alice"), id, ts(0)).unwrap();
        let err = p.withdraw(&addr("alice"), id, ts(0)).unwrap_err();
        assert_eq!(err, PoolError::CashflowNotFound(id));
    }

    #[test]
    fn interest_beyond_reserves_is_deferred_on_withdraw() {
        let mut p = funded(400, 1_000_000);
        let id = p.deposit(&addr("alice"), amt(1_000_000), &addr("alice"), ts(0)).unwrap();
        p.take_events();

        let payout = p.withdraw(&addr("alice"), id, ts(YEAR)).unwrap();
        assert_eq!(payout, amt(1_000_400));
        assert!(p.cashflow(id).is_none());
        assert_eq!(p.asset().balance_of(&addr("alice")), amt(1_000_400));
        assert_eq!(p.claimable_interest(&addr("alice")), amt(9_600));
        assert!(p.take_events().contains(&PoolEvent::Withdraw {
            id,
            to: addr("alice"),
            principal: amt(1_000_000),
            interest: amt(400),
            deferred: amt(9_600),
        }));

        let err = p.claim_interest(&addr("alice"), ts(YEAR)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);
        p.mint_asset(&addr("pool"), amt(9_600)).unwrap();
        assert_eq!(p.claim_interest(&addr("alice"), ts(YEAR)).unwrap(), amt(9_600));
    }

    #[test]
    fn withdraw_with_empty_reserves_still_returns_principal() {
        let mut p = funded(0, 1_000_000);
        let id = p.deposit(&addr("alice"), amt(1_000_000), &addr("alice"), ts(0)).unwrap();
        assert_eq!(p.withdraw(&addr("alice"), id, ts(YEAR)).unwrap(), amt(1_000_000));
        assert_eq!(p.held(), Amount::ZERO);
        assert_eq!(p.claimable_interest(&addr("alice")), amt(10_000));
    }

    fn borrow_ready(reserves: u128) -> LendingPool {
        let mut p = funded(reserves, 0);
        p.authorize_stream(&addr("member1"));
        p
    }

    #[test]
    fn borrow_is_owner_gated() {
        let mut p = borrow_ready(1_000);
        let err = p
            .borrow(&addr("member1"), &addr("member1"), amt(10), ts(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(p.total_borrows(), Amount::ZERO);
    }

    #[test]
    fn borrow_requires_stream_authorization() {
        let mut p = funded(1_000, 0);
        let err = p
            .borrow(&addr("governor"), &addr("member1"), amt(10), ts(0))
            .unwrap_err();
        assert_eq!(err, PoolError::StreamNotAuthorized(addr("member1")));
        assert_eq!(err.kind(), ErrorKind::State);

        p.authorize_stream(&addr("member1"));
        p.revoke_stream_authorization(&addr("member1"));
        assert!(!p.is_stream_authorized(&addr("member1")));
    }

    #[test]
    fn borrow_cannot_touch_deposit_principal() {
        let mut p = borrow_ready(0);
        p.mint_asset(&addr("alice"), amt(1_000)).unwrap();
        p.deposit(&addr("alice"), amt(1_000), &addr("alice"), ts(0)).unwrap();
        let err = p
            .borrow(&addr("governor"), &addr("member1"), amt(1), ts(0))
            .unwrap_err();
        assert_eq!(
            err,
            PoolError::InsufficientLiquidity {
                requested: amt(1),
                available: Amount::ZERO
            }
        );
    }

    #[test]
    fn borrow_rejects_zero_and_pool_target() {
        let mut p = borrow_ready(1_000);
        let err = p
            .borrow(&addr("governor"), &addr("member1"), Amount::ZERO, ts(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZeroAmount);
        let err = p
            .borrow(&addr("governor"), &addr("pool"), amt(1), ts(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn borrow_repaid_in_full_at_term() {
        let mut p = borrow_ready(1_000);
        let id = p
            .borrow(&addr("governor"), &addr("member1"), amt(1_000), ts(0))
            .unwrap();
        assert_eq!(p.total_borrows(), amt(1_000));
        assert_eq!(p.asset().balance_of(&addr("member1")), amt(1_000));
        assert_eq!(p.borrow_balance(&addr("member1")), amt(1_020));

        p.mint_asset(&addr("member1"), amt(20)).unwrap();
        let s = p.repay(&addr("anyone"), id, ts(YEAR)).unwrap();
        assert_eq!(s.paid, amt(1_020));
        assert_eq!(s.total_repaid, amt(1_020));
        assert!(s.closed);
        assert_eq!(p.total_borrows(), Amount::ZERO);
        assert_eq!(p.borrow_balance(&addr("member1")), Amount::ZERO);
        assert_eq!(p.held(), amt(1_020));
        assert!(p.cashflow(id).is_none());
    }

    #[test]
    fn partial_repayments_add_up() {
        let mut p = borrow_ready(1_000);
        let id = p
            .borrow(&addr("governor"), &addr("member1"), amt(1_000), ts(0))
            .unwrap();
        p.mint_asset(&addr("member1"), amt(20)).unwrap();

        let first = p.repay(&addr("member1"), id, ts(YEAR / 2)).unwrap();
        assert_eq!(first.paid, amt(510));
        assert_eq!(first.remaining, amt(510));
        assert!(!first.closed);
        assert_eq!(p.outstanding(id).unwrap(), amt(510));
        assert_eq!(p.repayable(id, ts(YEAR / 2)).unwrap(), Amount::ZERO);

        let second = p.repay(&addr("member1"), id, ts(YEAR * 3)).unwrap();
        assert_eq!(second.paid, amt(510));
        assert!(second.closed);

        let err = p.repay(&addr("member1"), id, ts(YEAR * 4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn repay_short_balance_changes_nothing() {
        let mut p = borrow_ready(1_000);
        let id = p
            .borrow(&addr("governor"), &addr("member1"), amt(1_000), ts(0))
            .unwrap();
        p.transfer_asset(&addr("member1"), &addr("elsewhere"), amt(1_000))
            .unwrap();
        let err = p.repay(&addr("member1"), id, ts(YEAR)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);
        assert_eq!(p.outstanding(id).unwrap(), amt(1_020));
    }

    #[test]
    fn borrow_positions_never_transfer() {
        let mut p = borrow_ready(1_000);
        let id = p
            .borrow(&addr("governor"), &addr("member1"), amt(100), ts(0))
            .unwrap();
        for (caller, to) in [
            ("member1", "member2"),
            ("governor", "member2"),
            ("member1", "pool"),
            ("mallory", "mallory"),
        ] {
            let err = p
                .transfer_from(&addr(caller), &addr("member1"), &addr(to), id, ts(5))
                .unwrap_err();
            assert_eq!(err, PoolError::BorrowNotTransferable(id));
            assert_eq!(err.kind(), ErrorKind::State);
        }
        assert_eq!(p.owner_of(id).unwrap(), &addr("member1"));
    }

    #[test]
    fn deposit_transfer_preserves_accrued_interest() {
        let mut p = funded(100_000, 1_000_000);
        let id = p.deposit(&addr("alice"), amt(1_000_000), &addr("alice"), ts(0)).unwrap();

        p.transfer_from(&addr("alice"), &addr("alice"), &addr("bob"), id, ts(YEAR / 2))
            .unwrap();
        assert_eq!(p.owner_of(id).unwrap(), &addr("bob"));
        assert_eq!(p.cashflow(id).unwrap().stream.payee, addr("bob"));
        assert_eq!(p.claimable_interest(&addr("alice")), amt(5_000));
        assert_eq!(p.accrued_interest(id, ts(YEAR / 2)).unwrap(), Amount::ZERO);

        let payout = p.withdraw(&addr("bob"), id, ts(YEAR)).unwrap();
        assert_eq!(payout, amt(1_005_000));
        assert_eq!(p.claim_interest(&addr("alice"), ts(YEAR)).unwrap(), amt(5_000));
        assert_eq!(p.held(), amt(90_000));

        let err = p.claim_interest(&addr("alice"), ts(YEAR)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZeroAmount);
    }

    #[test]
    fn deposit_transfer_checks_caller_and_recipient() {
        let mut p = funded(0, 10);
        let id = p.deposit(&addr("alice"), amt(10), &addr("alice"), ts(0)).unwrap();
        let err = p
            .transfer_from(&addr("mallory"), &addr("alice"), &addr("mallory"), id, ts(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let err = p
            .transfer_from(&addr("alice"), &addr("alice"), &addr("pool"), id, ts(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(p.owner_of(id).unwrap(), &addr("alice"));
    }

    #[test]
    fn rate_model_changes_are_not_retroactive() {
        let mut p = borrow_ready(10_000);
        let first = p
            .borrow(&addr("governor"), &addr("member1"), amt(1_000), ts(0))
            .unwrap();

        let err = p
            .set_interest_rate_model(&addr("member1"), InterestRateModel::default(), ts(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let invalid = InterestRateModel {
            term_secs: 0,
            ..InterestRateModel::default()
        };
        let err = p
            .set_interest_rate_model(&addr("governor"), invalid, ts(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let model = InterestRateModel {
            supply_rate_bps: 300,
            borrow_rate_bps: 1_000,
            term_secs: 100,
        };
        p.take_events();
        p.set_interest_rate_model(&addr("governor"), model, ts(1)).unwrap();
        assert_eq!(p.interest_rate_model(), model);
        assert_eq!(
            p.take_events(),
            vec![PoolEvent::InterestRateModelUpdated {
                model,
                effective_from: ts(1),
            }]
        );

        let second = p
            .borrow(&addr("governor"), &addr("member1"), amt(1_000), ts(2))
            .unwrap();
        assert_eq!(p.outstanding(first).unwrap(), amt(1_020));
        assert_eq!(p.outstanding(second).unwrap(), amt(1_100));
    }

    #[test]
    fn cashflows_lists_positions_by_owner() {
        let mut p = borrow_ready(1_000);
        p.mint_asset(&addr("member1"), amt(50)).unwrap();
        let d = p.deposit(&addr("member1"), amt(50), &addr("member1"), ts(0)).unwrap();
        let b = p
            .borrow(&addr("governor"), &addr("member1"), amt(100), ts(0))
            .unwrap();

        let (ids, params) = p.cashflows(&addr("member1"));
        assert_eq!(ids, vec![d, b]);
        assert_eq!(params[0].kind.code(), 0);
        assert_eq!(params[0].amount, amt(50));
        assert_eq!(params[1].kind.code(), 1);
        assert_eq!(params[1].term_secs, Some(YEAR));
        assert!(p.cashflows(&addr("nobody")).0.is_empty());
    }

    #[test]
    fn ownership_transfers_once() {
        let mut p = pool();
        p.transfer_ownership(&addr("governor"), addr("dao")).unwrap();
        assert_eq!(p.owner(), &addr("dao"));
        let err = p.transfer_ownership(&addr("dao"), addr("other")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn snapshot_excludes_event_journal() {
        let mut p = funded(0, 10);
        let id = p.deposit(&addr("alice"), amt(10), &addr("alice"), ts(0)).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("\"events\""));

        let mut restored: LendingPool = serde_json::from_str(&json).unwrap();
        assert!(restored.take_events().is_empty());
        assert_eq!(restored.owner_of(id).unwrap(), &addr("alice"));
    }
}
