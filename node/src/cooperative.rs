//! The cooperative: every component behind one sequential entry point.
//!
//! Each method applies exactly one operation, fully or not at all, then
//! drains the component journals onto the event bus. Time comes from the
//! injected clock.

use cbank_governance::{
    actions_from_parts, Action, Call, Component, GovernanceEngine, ProposalId, ProposalState,
    VoteType,
};
use cbank_membership::{CredentialId, MembershipRegistry};
use cbank_pool::{CashflowId, CashflowParams, LendingPool, RepaySettlement};
use cbank_types::{Address, Amount, Clock, ContentHash, InterestRateModel, Timestamp};
use serde::Serialize;

use crate::events::{EventBus, ProtocolEvent};
use crate::executor::Components;
use crate::NodeError;

/// Point-in-time overview of the cooperative.
#[derive(Clone, Debug, Serialize)]
pub struct CoopSummary {
    pub now: Timestamp,
    pub governor: Address,
    pub registry_owner: Address,
    pub pool_owner: Address,
    pub members: Vec<Address>,
    pub pool_name: String,
    pub pool_symbol: String,
    pub asset_symbol: String,
    pub held: Amount,
    pub available_liquidity: Amount,
    pub total_deposits: Amount,
    pub total_borrows: Amount,
    pub interest_rate_model: InterestRateModel,
    pub proposal_count: usize,
}

pub struct Cooperative<C: Clock> {
    clock: C,
    components: Components,
    governor: GovernanceEngine,
    bus: EventBus,
}

impl<C: Clock> Cooperative<C> {
    pub fn new(clock: C, components: Components, governor: GovernanceEngine) -> Self {
        Self {
            clock,
            components,
            governor,
            bus: EventBus::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn registry(&self) -> &MembershipRegistry {
        &self.components.registry
    }

    pub fn pool(&self) -> &LendingPool {
        &self.components.pool
    }

    pub fn governor(&self) -> &GovernanceEngine {
        &self.governor
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ProtocolEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Drain every component journal onto the bus, registry first.
    pub fn flush_events(&mut self) {
        let registry = self.components.registry.take_events().into_iter().map(ProtocolEvent::Registry);
        let governance = self.governor.take_events().into_iter().map(ProtocolEvent::Governance);
        let pool = self.components.pool.take_events().into_iter().map(ProtocolEvent::Pool);
        let events: Vec<ProtocolEvent> = registry.chain(governance).chain(pool).collect();
        for event in &events {
            tracing::trace!(source = event.source(), "event published");
            self.bus.emit(event);
        }
    }

    fn finish<T>(&mut self, result: Result<T, NodeError>) -> Result<T, NodeError> {
        self.flush_events();
        result
    }

    // ── Membership ──────────────────────────────────────────────────────

    /// Owner-gated. After bootstrap only the governor holds the registry.
    pub fn mint(&mut self, caller: &Address, to: &Address) -> Result<CredentialId, NodeError> {
        let now = self.now();
        let result = self.components.registry.mint(caller, to, now).map_err(NodeError::from);
        self.finish(result)
    }

    pub fn delegate(&mut self, caller: &Address, delegatee: &Address) -> Result<(), NodeError> {
        let now = self.now();
        let result = self
            .components
            .registry
            .delegate(caller, delegatee, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    /// Always fails: credentials are not transferable.
    pub fn transfer_credential(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: CredentialId,
    ) -> Result<(), NodeError> {
        Ok(self.components.registry.transfer_from(caller, from, to, id)?)
    }

    pub fn transfer_registry_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), NodeError> {
        let result = self
            .components
            .registry
            .transfer_ownership(caller, new_owner)
            .map_err(NodeError::from);
        self.finish(result)
    }

    // ── Governance ──────────────────────────────────────────────────────

    pub fn propose(
        &mut self,
        caller: &Address,
        actions: Vec<Action>,
        description: &str,
    ) -> Result<ProposalId, NodeError> {
        let now = self.now();
        let result = self
            .governor
            .propose(caller, actions, description, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    /// `propose` with the parallel `targets`/`values`/`calls` arrays.
    pub fn propose_parts(
        &mut self,
        caller: &Address,
        targets: &[Component],
        values: &[u128],
        calls: &[Call],
        description: &str,
    ) -> Result<ProposalId, NodeError> {
        let actions = actions_from_parts(targets, values, calls)?;
        self.propose(caller, actions, description)
    }

    pub fn cast_vote(&mut self, caller: &Address, id: ProposalId, support: VoteType) -> Result<u64, NodeError> {
        let now = self.now();
        let result = self
            .governor
            .cast_vote(caller, id, support, &self.components.registry, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    pub fn state(&self, id: ProposalId) -> Result<ProposalState, NodeError> {
        Ok(self.governor.state(id, &self.components.registry, self.now())?)
    }

    pub fn queue(&mut self, actions: &[Action], description_hash: &ContentHash) -> Result<ProposalId, NodeError> {
        let now = self.now();
        let result = self
            .governor
            .queue(actions, description_hash, &self.components.registry, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    /// Anyone may execute a passed proposal.
    pub fn execute(&mut self, actions: &[Action], description_hash: &ContentHash) -> Result<ProposalId, NodeError> {
        let now = self.now();
        let result = self
            .governor
            .execute(actions, description_hash, &mut self.components, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    pub fn cancel(&mut self, caller: &Address, id: ProposalId) -> Result<(), NodeError> {
        let now = self.now();
        let result = self
            .governor
            .cancel(caller, id, &self.components.registry, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    // ── Pool ────────────────────────────────────────────────────────────

    /// Deposit on behalf of `target`, or of the caller when `target` is `None`.
    pub fn deposit(
        &mut self,
        caller: &Address,
        amount: Amount,
        target: Option<&Address>,
    ) -> Result<CashflowId, NodeError> {
        let now = self.now();
        let target = target.unwrap_or(caller).clone();
        let result = self
            .components
            .pool
            .deposit(caller, amount, &target, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    pub fn withdraw(&mut self, caller: &Address, id: CashflowId) -> Result<Amount, NodeError> {
        let now = self.now();
        let result = self.components.pool.withdraw(caller, id, now).map_err(NodeError::from);
        self.finish(result)
    }

    /// Owner-gated. After bootstrap borrows only happen through governance.
    pub fn borrow(&mut self, caller: &Address, target: &Address, amount: Amount) -> Result<CashflowId, NodeError> {
        let now = self.now();
        let result = self
            .components
            .pool
            .borrow(caller, target, amount, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    pub fn repay(&mut self, caller: &Address, id: CashflowId) -> Result<RepaySettlement, NodeError> {
        let now = self.now();
        let result = self.components.pool.repay(caller, id, now).map_err(NodeError::from);
        self.finish(result)
    }

    pub fn transfer_position(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: CashflowId,
    ) -> Result<(), NodeError> {
        let now = self.now();
        let result = self
            .components
            .pool
            .transfer_from(caller, from, to, id, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    pub fn claim_interest(&mut self, caller: &Address) -> Result<Amount, NodeError> {
        let now = self.now();
        let result = self.components.pool.claim_interest(caller, now).map_err(NodeError::from);
        self.finish(result)
    }

    pub fn set_interest_rate_model(&mut self, caller: &Address, model: InterestRateModel) -> Result<(), NodeError> {
        let now = self.now();
        let result = self
            .components
            .pool
            .set_interest_rate_model(caller, model, now)
            .map_err(NodeError::from);
        self.finish(result)
    }

    /// `caller` allows the pool to open repayment streams debiting them.
    pub fn authorize_stream(&mut self, caller: &Address) {
        self.components.pool.authorize_stream(caller);
    }

    pub fn revoke_stream_authorization(&mut self, caller: &Address) {
        self.components.pool.revoke_stream_authorization(caller);
    }

    pub fn transfer_pool_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), NodeError> {
        let result = self
            .components
            .pool
            .transfer_ownership(caller, new_owner)
            .map_err(NodeError::from);
        self.finish(result)
    }

    /// Mint base asset to `to`.
    pub fn fund(&mut self, to: &Address, amount: Amount) -> Result<(), NodeError> {
        Ok(self.components.pool.mint_asset(to, amount)?)
    }

    pub fn transfer_asset(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), NodeError> {
        Ok(self.components.pool.transfer_asset(caller, to, amount)?)
    }

    pub fn asset_balance(&self, account: &Address) -> Amount {
        self.components.pool.asset().balance_of(account)
    }

    pub fn cashflows(&self, owner: &Address) -> (Vec<CashflowId>, Vec<CashflowParams>) {
        self.components.pool.cashflows(owner)
    }

    pub fn summary(&self) -> CoopSummary {
        let registry = &self.components.registry;
        let pool = &self.components.pool;
        CoopSummary {
            now: self.now(),
            governor: self.governor.address().clone(),
            registry_owner: registry.owner().clone(),
            pool_owner: pool.owner().clone(),
            members: registry.members().cloned().collect(),
            pool_name: pool.name().to_string(),
            pool_symbol: pool.symbol().to_string(),
            asset_symbol: pool.asset().symbol().to_string(),
            held: pool.held(),
            available_liquidity: pool.available_liquidity(),
            total_deposits: pool.total_deposits(),
            total_borrows: pool.total_borrows(),
            interest_rate_model: pool.interest_rate_model(),
            proposal_count: self.governor.proposal_count(),
        }
    }
}
