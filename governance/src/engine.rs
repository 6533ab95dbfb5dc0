//! Governance engine: proposal storage, voting and the state machine.
//!
//! State is derived on every read from the proposal record, the clock and
//! the voting power source; nothing advances on a timer.

use crate::action::{hash_proposal, Action};
use crate::error::GovernanceError;
use crate::events::GovernanceEvent;
use crate::executor::ActionExecutor;
use crate::power::VotingPower;
use crate::proposal::{Proposal, ProposalId, ProposalState, Tally, VoteReceipt, VoteType};
use cbank_crypto::hash_description;
use cbank_types::{Address, ContentHash, GovernorSettings, Timestamp, BPS_DENOMINATOR};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
pub struct GovernanceEngine {
    address: Address,
    settings: GovernorSettings,
    proposals: BTreeMap<ProposalId, Proposal>,
    by_content: HashMap<ContentHash, ProposalId>,
    next_id: ProposalId,
    events: Vec<GovernanceEvent>,
}

fn add_secs(t: Timestamp, secs: u64) -> Result<Timestamp, GovernanceError> {
    t.as_secs()
        .checked_add(secs)
        .map(Timestamp::new)
        .ok_or(GovernanceError::Overflow)
}

/// Last second whose checkpoints count for a proposal opening at `vote_start`.
///
/// Voting opens at `vote_start`, so checkpoints written during that second
/// are excluded. `None` when nothing can precede the snapshot.
fn power_cutoff(vote_start: Timestamp) -> Option<Timestamp> {
    vote_start.as_secs().checked_sub(1).map(Timestamp::new)
}

impl GovernanceEngine {
    /// `address` is the identity the governor acts under when executing.
    pub fn new(address: Address, settings: GovernorSettings) -> Self {
        Self {
            address,
            settings,
            proposals: BTreeMap::new(),
            by_content: HashMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn settings(&self) -> &GovernorSettings {
        &self.settings
    }

    /// Create a proposal. Anyone may propose.
    ///
    /// Voting opens `voting_delay_secs` after `now` and lasts
    /// `voting_period_secs`.
    pub fn propose(
        &mut self,
        proposer: &Address,
        actions: Vec<Action>,
        description: &str,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        if actions.is_empty() {
            return Err(GovernanceError::EmptyProposal);
        }
        for (index, action) in actions.iter().enumerate() {
            action.validate(index)?;
        }

        let description_hash = hash_description(description);
        let content_hash = hash_proposal(&actions, &description_hash)?;
        if let Some(existing) = self.by_content.get(&content_hash) {
            return Err(GovernanceError::ProposalExists(*existing));
        }

        let vote_start = add_secs(now, self.settings.voting_delay_secs)?;
        let vote_end = add_secs(vote_start, self.settings.voting_period_secs)?;

        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(GovernanceError::Overflow)?;

        self.events.push(GovernanceEvent::ProposalCreated {
            id,
            proposer: proposer.clone(),
            actions: actions.clone(),
            vote_start,
            vote_end,
            description: description.to_string(),
        });
        self.by_content.insert(content_hash, id);
        self.proposals.insert(
            id,
            Proposal {
                id,
                proposer: proposer.clone(),
                actions,
                description: description.to_string(),
                description_hash,
                content_hash,
                created_at: now,
                vote_start,
                vote_end,
                tally: Tally::default(),
                receipts: BTreeMap::new(),
                canceled: false,
                executed: false,
                eta: None,
            },
        );
        tracing::info!(id, proposer = %proposer, %vote_start, %vote_end, "proposal created");
        Ok(id)
    }

    /// Quorum at `at`: the configured fraction of the voting supply, rounded down.
    pub fn quorum(&self, at: Timestamp, power: &dyn VotingPower) -> u64 {
        let supply = u128::from(power.past_total_supply(at));
        let q = supply * u128::from(self.settings.quorum_bps) / BPS_DENOMINATOR;
        u64::try_from(q).unwrap_or(u64::MAX)
    }

    /// Current lifecycle state of a proposal.
    pub fn state(
        &self,
        id: ProposalId,
        power: &dyn VotingPower,
        now: Timestamp,
    ) -> Result<ProposalState, GovernanceError> {
        let proposal = self.get(id)?;
        Ok(self.state_of(proposal, power, now))
    }

    fn state_of(&self, p: &Proposal, power: &dyn VotingPower, now: Timestamp) -> ProposalState {
        if p.executed {
            return ProposalState::Executed;
        }
        if p.canceled {
            return ProposalState::Canceled;
        }
        if now < p.vote_start {
            return ProposalState::Pending;
        }
        if now < p.vote_end {
            return ProposalState::Active;
        }
        let window = self.settings.execution_window_secs;
        if let Some(eta) = p.eta {
            return if now >= eta.saturating_add_secs(window) {
                ProposalState::Expired
            } else {
                ProposalState::Queued
            };
        }
        let quorum = power_cutoff(p.vote_start)
            .map(|at| self.quorum(at, power))
            .unwrap_or(0);
        let quorum_reached = p.tally.quorum_votes() >= quorum;
        let majority = p.tally.for_votes > p.tally.against_votes;
        if !(quorum_reached && majority) {
            ProposalState::Defeated
        } else if now >= p.vote_end.saturating_add_secs(window) {
            ProposalState::Expired
        } else {
            ProposalState::Succeeded
        }
    }

    /// Record a vote weighted by the voter's delegated power at the snapshot.
    /// Returns the weight counted.
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        id: ProposalId,
        support: VoteType,
        power: &dyn VotingPower,
        now: Timestamp,
    ) -> Result<u64, GovernanceError> {
        let proposal = self.get(id)?;
        let state = self.state_of(proposal, power, now);
        if state != ProposalState::Active {
            return Err(GovernanceError::WrongState { id, state });
        }
        if proposal.has_voted(voter) {
            return Err(GovernanceError::AlreadyVoted {
                voter: voter.clone(),
                id,
            });
        }
        let weight = power_cutoff(proposal.vote_start)
            .map(|at| power.past_votes(voter, at))
            .unwrap_or(0);
        if weight == 0 {
            tracing::warn!(voter = %voter, id, "rejected vote without voting power");
            return Err(GovernanceError::NoVotingPower {
                voter: voter.clone(),
                id,
            });
        }
        let tally = proposal
            .tally
            .with_vote(support, weight)
            .ok_or(GovernanceError::Overflow)?;

        let proposal = self.get_mut(id)?;
        proposal.tally = tally;
        proposal
            .receipts
            .insert(voter.clone(), VoteReceipt { support, weight });
        self.events.push(GovernanceEvent::VoteCast {
            voter: voter.clone(),
            id,
            support,
            weight,
        });
        tracing::debug!(voter = %voter, id, ?support, weight, "vote cast");
        Ok(weight)
    }

    /// Queue a succeeded proposal behind the timelock.
    pub fn queue(
        &mut self,
        actions: &[Action],
        description_hash: &ContentHash,
        power: &dyn VotingPower,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let id = self.resolve(actions, description_hash)?;
        let state = self.state(id, power, now)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::WrongState { id, state });
        }
        let eta = add_secs(now, self.settings.timelock_delay_secs)?;
        self.get_mut(id)?.eta = Some(eta);
        self.events.push(GovernanceEvent::ProposalQueued { id, eta });
        tracing::info!(id, %eta, "proposal queued");
        Ok(id)
    }

    /// Execute a passed proposal, identified by its actions and description hash.
    ///
    /// The executor applies the batch atomically; on failure the proposal is
    /// left unexecuted and may be retried while it remains in its window.
    pub fn execute(
        &mut self,
        actions: &[Action],
        description_hash: &ContentHash,
        executor: &mut dyn ActionExecutor,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let id = self.resolve(actions, description_hash)?;
        let state = self.state(id, executor.voting_power(), now)?;
        match state {
            ProposalState::Succeeded => {}
            ProposalState::Queued => {
                let eta = self.get(id)?.eta.unwrap_or(Timestamp::EPOCH);
                if now < eta {
                    return Err(GovernanceError::NotReady { id, eta });
                }
            }
            state => return Err(GovernanceError::WrongState { id, state }),
        }

        if let Err(e) = executor.execute_batch(&self.address, actions, now) {
            tracing::warn!(id, error = %e, "proposal execution failed");
            return Err(e.into());
        }

        self.get_mut(id)?.executed = true;
        self.events.push(GovernanceEvent::ProposalExecuted { id });
        tracing::info!(id, actions = actions.len(), "proposal executed");
        Ok(id)
    }

    /// Cancel a proposal. Only the proposer may cancel, and only before voting ends.
    pub fn cancel(
        &mut self,
        caller: &Address,
        id: ProposalId,
        power: &dyn VotingPower,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get(id)?;
        if &proposal.proposer != caller {
            return Err(GovernanceError::NotProposer {
                caller: caller.clone(),
                id,
            });
        }
        let state = self.state_of(proposal, power, now);
        if !matches!(state, ProposalState::Pending | ProposalState::Active) {
            return Err(GovernanceError::WrongState { id, state });
        }
        self.get_mut(id)?.canceled = true;
        self.events.push(GovernanceEvent::ProposalCanceled { id });
        tracing::info!(id, "proposal canceled");
        Ok(())
    }

    /// Id of the proposal with these exact contents, if any.
    pub fn proposal_id_of(
        &self,
        actions: &[Action],
        description_hash: &ContentHash,
    ) -> Option<ProposalId> {
        let content = hash_proposal(actions, description_hash).ok()?;
        self.by_content.get(&content).copied()
    }

    fn resolve(
        &self,
        actions: &[Action],
        description_hash: &ContentHash,
    ) -> Result<ProposalId, GovernanceError> {
        let content = hash_proposal(actions, description_hash)?;
        if let Some(id) = self.by_content.get(&content) {
            return Ok(*id);
        }
        match self.proposals.values().find(|p| p.actions == actions) {
            Some(p) => Err(GovernanceError::DescriptionMismatch { id: p.id }),
            None => Err(GovernanceError::UnknownProposal(content)),
        }
    }

    fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn proposal_snapshot(&self, id: ProposalId) -> Result<Timestamp, GovernanceError> {
        Ok(self.get(id)?.vote_start)
    }

    pub fn proposal_deadline(&self, id: ProposalId) -> Result<Timestamp, GovernanceError> {
        Ok(self.get(id)?.vote_end)
    }

    pub fn proposal_eta(&self, id: ProposalId) -> Result<Option<Timestamp>, GovernanceError> {
        Ok(self.get(id)?.eta)
    }

    pub fn proposal_votes(&self, id: ProposalId) -> Result<Tally, GovernanceError> {
        Ok(self.get(id)?.tally)
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> Result<bool, GovernanceError> {
        Ok(self.get(id)?.has_voted(voter))
    }

    /// Drain the event journal.
    pub fn take_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }
}
