//! The membership registry state machine.

use crate::checkpoints::Checkpoints;
use crate::credential::{Credential, CredentialId};
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use cbank_authority::AuthoritySlot;
use cbank_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Registry of membership credentials and delegated voting power.
///
/// Every mutating operation validates all of its preconditions before the first
/// write, so a rejected call leaves the registry untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MembershipRegistry {
    /// The registry's own address (the target of governance mint actions).
    address: Address,
    authority: AuthoritySlot,
    credentials: BTreeMap<CredentialId, Credential>,
    /// Holder → their one credential.
    holders: HashMap<Address, CredentialId>,
    next_id: CredentialId,
    /// Delegator → delegate. A holder absent here contributes no weight.
    delegates: HashMap<Address, Address>,
    /// Delegate → voting power history.
    votes: HashMap<Address, Checkpoints>,
    total_supply: Checkpoints,
    /// Time of the newest checkpoint written; writes never go below it.
    last_write: Timestamp,
    #[serde(skip)]
    events: Vec<RegistryEvent>,
}

impl MembershipRegistry {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            authority: AuthoritySlot::new(owner),
            credentials: BTreeMap::new(),
            holders: HashMap::new(),
            next_id: 0,
            delegates: HashMap::new(),
            votes: HashMap::new(),
            total_supply: Checkpoints::new(),
            last_write: Timestamp::EPOCH,
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    // ── Authority ───────────────────────────────────────────────────────

    pub fn owner(&self) -> &Address {
        self.authority.owner()
    }

    /// Hand minting authority to `new_owner`. Allowed once per registry lifetime.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        let previous = self.authority.transfer_ownership(caller, new_owner)?;
        self.events.push(RegistryEvent::OwnershipTransferred {
            previous,
            owner: self.authority.owner().clone(),
        });
        Ok(())
    }

    // ── Credentials ─────────────────────────────────────────────────────

    /// Issue a credential to `to`. Owner only; one credential per address, ever.
    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        now: Timestamp,
    ) -> Result<CredentialId, RegistryError> {
        if let Err(e) = self.authority.ensure_owner(caller) {
            tracing::warn!(caller = %caller, to = %to, "rejected mint from non-owner");
            return Err(e.into());
        }
        if self.holders.contains_key(to) {
            return Err(RegistryError::AlreadyMember(to.clone()));
        }
        self.ensure_clock(now)?;
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(RegistryError::Overflow)?;

        self.next_id = next_id;
        self.last_write = now;
        self.credentials.insert(
            id,
            Credential {
                id,
                holder: to.clone(),
                minted_at: now,
            },
        );
        self.holders.insert(to.clone(), id);
        self.total_supply.push(now, self.total_supply.latest() + 1);
        self.events.push(RegistryEvent::Minted {
            id,
            to: to.clone(),
        });

        // A holder who delegated before being admitted gets their weight now.
        let delegate = self.delegates.get(to).cloned();
        self.move_voting_power(None, delegate.as_ref(), 1, now);

        tracing::info!(id, to = %to, "membership credential minted");
        Ok(id)
    }

    /// Credentials are soulbound: every transfer attempt fails.
    pub fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: CredentialId,
    ) -> Result<(), RegistryError> {
        tracing::warn!(
            caller = %caller,
            from = %from,
            to = %to,
            id,
            "rejected credential transfer"
        );
        Err(RegistryError::NonTransferable(id))
    }

    /// 0 or 1.
    pub fn balance_of(&self, address: &Address) -> u64 {
        u64::from(self.holders.contains_key(address))
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.holders.contains_key(address)
    }

    pub fn owner_of(&self, id: CredentialId) -> Result<&Address, RegistryError> {
        self.credentials
            .get(&id)
            .map(|c| &c.holder)
            .ok_or(RegistryError::CredentialNotFound(id))
    }

    pub fn credential_of(&self, address: &Address) -> Option<&Credential> {
        self.holders
            .get(address)
            .and_then(|id| self.credentials.get(id))
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply.latest()
    }

    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.credentials.values().map(|c| &c.holder)
    }

    // ── Delegation ──────────────────────────────────────────────────────

    /// Let `caller`'s voting unit count for `delegatee` (self-delegation included).
    ///
    /// Anyone may delegate; an address without a credential simply moves no weight.
    pub fn delegate(
        &mut self,
        caller: &Address,
        delegatee: &Address,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.ensure_clock(now)?;
        self.last_write = now;
        let previous = self.delegates.insert(caller.clone(), delegatee.clone());
        self.events.push(RegistryEvent::DelegateChanged {
            delegator: caller.clone(),
            from: previous.clone(),
            to: delegatee.clone(),
        });
        let units = self.balance_of(caller);
        self.move_voting_power(previous.as_ref(), Some(delegatee), units, now);
        tracing::debug!(delegator = %caller, delegatee = %delegatee, units, "delegation updated");
        Ok(())
    }

    fn ensure_clock(&self, now: Timestamp) -> Result<(), RegistryError> {
        if now < self.last_write {
            tracing::warn!(%now, last = %self.last_write, "rejected checkpoint write from the past");
            return Err(RegistryError::ClockRegression {
                now,
                last: self.last_write,
            });
        }
        Ok(())
    }

    pub fn delegates(&self, address: &Address) -> Option<&Address> {
        self.delegates.get(address)
    }

    /// Current voting power of `address`.
    pub fn get_votes(&self, address: &Address) -> u64 {
        self.votes.get(address).map(|c| c.latest()).unwrap_or(0)
    }

    /// Voting power of `address` as of `at`.
    pub fn get_past_votes(&self, address: &Address, at: Timestamp) -> u64 {
        self.votes
            .get(address)
            .map(|c| c.value_at(at))
            .unwrap_or(0)
    }

    /// Total credential supply as of `at`.
    pub fn get_past_total_supply(&self, at: Timestamp) -> u64 {
        self.total_supply.value_at(at)
    }

    fn move_voting_power(
        &mut self,
        from: Option<&Address>,
        to: Option<&Address>,
        units: u64,
        now: Timestamp,
    ) {
        if from == to || units == 0 {
            return;
        }
        if let Some(from) = from {
            let history = self.votes.entry(from.clone()).or_default();
            let previous = history.latest();
            let current = previous.saturating_sub(units);
            history.push(now, current);
            self.events.push(RegistryEvent::DelegateVotesChanged {
                delegate: from.clone(),
                previous,
                current,
            });
        }
        if let Some(to) = to {
            let history = self.votes.entry(to.clone()).or_default();
            let previous = history.latest();
            let current = previous.saturating_add(units);
            history.push(now, current);
            self.events.push(RegistryEvent::DelegateVotesChanged {
                delegate: to.clone(),
                previous,
                current,
            });
        }
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Drain the event journal.
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }
}
