//! Integration tests exercising the full cooperative:
//! bootstrap → membership → proposals → governed pool operations → events.
//!
//! These tests wire together the registry, governor and pool the way the
//! node does, verifying the authority hand-over and the governed paths
//! end-to-end, not just in isolation.

use std::sync::{Arc, Mutex};

use cbank_crypto::hash_description;
use cbank_governance::{Action, Call, Component, ProposalState, VoteType};
use cbank_membership::RegistryEvent;
use cbank_node::{bootstrap, CoopConfig, Cooperative, ProtocolEvent};
use cbank_nullables::NullClock;
use cbank_pool::PoolEvent;
use cbank_governance::GovernanceEvent;
use cbank_types::{Address, Amount, ErrorKind, GovernorSettings, InterestRateModel, Timestamp, RATE_PERIOD_SECS};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn addr(name: &str) -> Address {
    Address::new(format!("cb_{name}"))
}

fn members() -> Vec<Address> {
    (1..=4).map(|i| addr(&format!("member{i}"))).collect()
}

fn config(reserves: u64) -> CoopConfig {
    CoopConfig {
        genesis_members: members(),
        initial_reserves: reserves,
        governor: GovernorSettings::testnet_defaults(),
        ..CoopConfig::default()
    }
}

fn coop(reserves: u64) -> Cooperative<NullClock> {
    bootstrap(&config(reserves), NullClock::new(1_000)).expect("bootstrap")
}

fn governor() -> Address {
    CoopConfig::default().governor_address
}

/// Self-delegate every genesis member.
fn delegate_all(c: &mut Cooperative<NullClock>) {
    for m in members() {
        c.delegate(&m, &m).expect("delegate");
    }
}

/// Propose `actions`, have `voters` vote For, and move past the voting window.
fn pass(c: &mut Cooperative<NullClock>, proposer: &Address, actions: Vec<Action>, description: &str, voters: &[&str]) -> u64 {
    let id = c.propose(proposer, actions, description).expect("propose");
    assert_eq!(c.state(id).unwrap(), ProposalState::Pending);
    let settings = *c.governor().settings();
    c.clock().advance(settings.voting_delay_secs);
    assert_eq!(c.state(id).unwrap(), ProposalState::Active);
    for v in voters {
        c.cast_vote(&addr(v), id, VoteType::For).expect("vote");
    }
    c.clock().advance(settings.voting_period_secs);
    id
}

fn collect_events(c: &mut Cooperative<NullClock>) -> Arc<Mutex<Vec<ProtocolEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    c.subscribe(Box::new(move |event| {
        sink.lock().expect("lock").push(event.clone());
    }));
    seen
}

// ---------------------------------------------------------------------------
// Bootstrap and authority
// ---------------------------------------------------------------------------

#[test]
fn bootstrap_mints_genesis_and_hands_authority_to_governor() {
    let mut c = coop(0);
    for m in members() {
        assert_eq!(c.registry().balance_of(&m), 1);
    }
    assert_eq!(c.registry().owner(), &governor());
    assert_eq!(c.pool().owner(), &governor());
    assert_eq!(c.pool().name(), "DAI Pool");
    assert_eq!(c.pool().symbol(), "pDAI");

    let deployer = CoopConfig::default().deployer;
    let err = c.mint(&deployer, &addr("late")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    let err = c.transfer_registry_ownership(&governor(), addr("other")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    let err = c.transfer_pool_ownership(&deployer, deployer.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    let summary = c.summary();
    assert_eq!(summary.members.len(), 4);
    assert_eq!(summary.proposal_count, 0);
}

#[test]
fn bootstrap_rejects_invalid_config() {
    let mut cfg = config(0);
    cfg.genesis_members.push(addr("member1"));
    assert!(bootstrap(&cfg, NullClock::new(0)).is_err());
}

#[test]
fn owner_mint_then_duplicate_fails() {
    let mut c = coop(0);
    c.mint(&governor(), &addr("newbie")).expect("owner mints");
    assert_eq!(c.registry().balance_of(&addr("newbie")), 1);
    let err = c.mint(&governor(), &addr("newbie")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
}

#[test]
fn credentials_never_transfer() {
    let mut c = coop(0);
    let m1 = addr("member1");
    let err = c.transfer_credential(&m1, &m1, &addr("buyer"), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(c.registry().balance_of(&m1), 1);
    assert_eq!(c.registry().balance_of(&addr("buyer")), 0);
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

#[test]
fn outsider_joins_through_a_membership_proposal() {
    let mut c = coop(0);
    delegate_all(&mut c);
    let outsider = addr("applicant");
    let description = "QmMembershipApplication";
    let actions = vec![Action::mint_membership(outsider.clone())];

    let id = c.propose(&outsider, actions.clone(), description).expect("anyone may propose");
    let desc_hash = hash_description(description);
    let err = c.execute(&actions, &desc_hash).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    c.clock().advance(1);
    c.cast_vote(&addr("member1"), id, VoteType::For).unwrap();
    c.cast_vote(&addr("member2"), id, VoteType::For).unwrap();
    c.clock().advance(60);
    assert_eq!(c.state(id).unwrap(), ProposalState::Succeeded);

    assert_eq!(c.execute(&actions, &desc_hash).unwrap(), id);
    assert_eq!(c.registry().balance_of(&outsider), 1);
    assert_eq!(c.state(id).unwrap(), ProposalState::Executed);
}

#[test]
fn votes_need_delegated_power_and_count_once() {
    let mut c = coop(0);
    c.delegate(&addr("member1"), &addr("member1")).expect("delegate");
    let id = c
        .propose(&addr("member1"), vec![Action::mint_membership(addr("x"))], "QmX")
        .unwrap();
    c.clock().advance(1);

    let err = c.cast_vote(&addr("member2"), id, VoteType::For).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    let err = c.cast_vote(&addr("stranger"), id, VoteType::For).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    assert_eq!(c.cast_vote(&addr("member1"), id, VoteType::For).unwrap(), 1);
    let err = c.cast_vote(&addr("member1"), id, VoteType::Against).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
}

#[test]
fn delegation_after_snapshot_does_not_count() {
    let mut c = coop(0);
    let id = c
        .propose(&addr("member1"), vec![Action::mint_membership(addr("x"))], "QmLate")
        .unwrap();
    c.clock().advance(5);
    c.delegate(&addr("member1"), &addr("member1")).expect("delegate");
    let err = c.cast_vote(&addr("member1"), id, VoteType::For).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn redelegating_in_the_opening_second_cannot_vote_twice() {
    let mut c = coop(0);
    let m1 = addr("member1");
    c.delegate(&m1, &m1).expect("delegate");
    let id = c
        .propose(&m1, vec![Action::mint_membership(addr("x"))], "QmOpen")
        .unwrap();
    let settings = *c.governor().settings();
    c.clock().advance(settings.voting_delay_secs);
    assert_eq!(c.state(id).unwrap(), ProposalState::Active);

    c.delegate(&m1, &addr("a")).expect("delegate");
    let err = c.cast_vote(&addr("a"), id, VoteType::For).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    c.delegate(&m1, &addr("b")).expect("delegate");
    let err = c.cast_vote(&addr("b"), id, VoteType::For).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    // a late mint moves neither the weight nor the quorum base
    let outsider = addr("late");
    assert!(c.mint(&governor(), &outsider).is_ok());
    assert_eq!(c.cast_vote(&m1, id, VoteType::For).unwrap(), 1);
    assert_eq!(c.governor().proposal_votes(id).unwrap().for_votes, 1);
    assert_eq!(c.registry().get_past_total_supply(Timestamp::new(1_000)), 4);
}

#[test]
fn defeated_proposal_cannot_execute() {
    let mut c = coop(0);
    delegate_all(&mut c);
    let actions = vec![Action::mint_membership(addr("x"))];
    let id = c.propose(&addr("member1"), actions.clone(), "QmNo").unwrap();
    c.clock().advance(1);
    c.cast_vote(&addr("member1"), id, VoteType::For).unwrap();
    c.cast_vote(&addr("member2"), id, VoteType::Against).unwrap();
    c.cast_vote(&addr("member3"), id, VoteType::Against).unwrap();
    c.clock().advance(60);
    assert_eq!(c.state(id).unwrap(), ProposalState::Defeated);
    let err = c.execute(&actions, &hash_description("QmNo")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(c.registry().balance_of(&addr("x")), 0);
}

#[test]
fn mismatched_description_hash_is_rejected() {
    let mut c = coop(0);
    delegate_all(&mut c);
    let actions = vec![Action::mint_membership(addr("x"))];
    pass(&mut c, &addr("x"), actions.clone(), "QmReal", &["member1"]);
    let err = c.execute(&actions, &hash_description("QmFake")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn proposer_can_cancel_before_the_vote_ends() {
    let mut c = coop(0);
    let id = c
        .propose(&addr("x"), vec![Action::mint_membership(addr("x"))], "QmCancel")
        .unwrap();
    let err = c.cancel(&addr("member1"), id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    c.cancel(&addr("x"), id).unwrap();
    assert_eq!(c.state(id).unwrap(), ProposalState::Canceled);
}

#[test]
fn proposals_from_parallel_arrays() {
    let mut c = coop(0);
    let err = c
        .propose_parts(&addr("x"), &[Component::Registry], &[0, 0], &[Call::MintMembership { to: addr("x") }], "QmBad")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = c
        .propose_parts(&addr("x"), &[Component::Pool], &[0], &[Call::MintMembership { to: addr("x") }], "QmBad")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let id = c
        .propose_parts(&addr("x"), &[Component::Registry], &[0], &[Call::MintMembership { to: addr("x") }], "QmOk")
        .unwrap();
    assert_eq!(id, 1);
}

// ---------------------------------------------------------------------------
// Governed lending
// ---------------------------------------------------------------------------

#[test]
fn governed_borrow_is_repaid_with_interest_at_term() {
    let mut c = coop(1_000);
    delegate_all(&mut c);
    let m1 = addr("member1");
    c.authorize_stream(&m1);

    let actions = vec![Action::open_borrow(m1.clone(), Amount::new(1_000))];
    pass(&mut c, &m1, actions.clone(), "QmLoanJustification", &["member1", "member2"]);
    c.execute(&actions, &hash_description("QmLoanJustification")).unwrap();

    assert_eq!(c.pool().total_borrows(), Amount::new(1_000));
    assert_eq!(c.asset_balance(&m1), Amount::new(1_000));
    let (ids, params) = c.cashflows(&m1);
    assert_eq!(params[0].kind.code(), 1);
    let id = ids[0];

    c.fund(&m1, Amount::new(20)).unwrap();
    c.clock().advance(RATE_PERIOD_SECS);
    let settlement = c.repay(&addr("anyone"), id).unwrap();
    assert_eq!(settlement.total_repaid, Amount::new(1_020));
    assert!(settlement.closed);
    assert_eq!(c.pool().total_borrows(), Amount::ZERO);
    assert_eq!(c.pool().borrow_balance(&m1), Amount::ZERO);
}

#[test]
fn direct_borrow_after_bootstrap_is_rejected() {
    let mut c = coop(1_000);
    let deployer = CoopConfig::default().deployer;
    c.authorize_stream(&addr("member1"));
    let err = c.borrow(&deployer, &addr("member1"), Amount::new(10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn failed_action_leaves_every_component_untouched() {
    let mut c = coop(1_000);
    delegate_all(&mut c);
    let m2 = addr("member2");
    let actions = vec![
        Action::mint_membership(addr("applicant")),
        Action::open_borrow(m2.clone(), Amount::new(500)),
    ];
    let id = pass(&mut c, &addr("applicant"), actions.clone(), "QmCombo", &["member1", "member2"]);
    let desc_hash = hash_description("QmCombo");

    let err = c.execute(&actions, &desc_hash).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(c.registry().balance_of(&addr("applicant")), 0);
    assert_eq!(c.pool().total_borrows(), Amount::ZERO);
    assert_eq!(c.state(id).unwrap(), ProposalState::Succeeded);

    c.authorize_stream(&m2);
    c.execute(&actions, &desc_hash).unwrap();
    assert_eq!(c.registry().balance_of(&addr("applicant")), 1);
    assert_eq!(c.pool().total_borrows(), Amount::new(500));
}

#[test]
fn borrow_beyond_reserves_fails_on_execute() {
    let mut c = coop(100);
    delegate_all(&mut c);
    c.authorize_stream(&addr("member1"));
    let actions = vec![Action::open_borrow(addr("member1"), Amount::new(101))];
    pass(&mut c, &addr("member1"), actions.clone(), "QmTooMuch", &["member1"]);
    let err = c.execute(&actions, &hash_description("QmTooMuch")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);
}

#[test]
fn rate_model_change_through_governance() {
    let mut c = coop(0);
    delegate_all(&mut c);
    let model = InterestRateModel {
        supply_rate_bps: 250,
        borrow_rate_bps: 700,
        term_secs: 90 * 86_400,
    };
    let actions = vec![Action::set_interest_rate_model(model)];
    pass(&mut c, &addr("member3"), actions.clone(), "QmRates", &["member3", "member4"]);
    c.execute(&actions, &hash_description("QmRates")).unwrap();
    assert_eq!(c.pool().interest_rate_model(), model);

    let err = c.set_interest_rate_model(&addr("member3"), model).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

#[test]
fn deposit_round_trip_at_zero_elapsed() {
    let mut c = coop(0);
    let m1 = addr("member1");
    c.fund(&m1, Amount::new(777)).unwrap();
    let id = c.deposit(&m1, Amount::new(777), None).unwrap();
    assert_eq!(c.withdraw(&m1, id).unwrap(), Amount::new(777));
    assert_eq!(c.asset_balance(&m1), Amount::new(777));

    let err = c.deposit(&m1, Amount::ZERO, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ZeroAmount);
}

#[test]
fn deposit_transfer_redirects_stream_without_loss() {
    let mut c = coop(100_000);
    let (m1, m2) = (addr("member1"), addr("member2"));
    c.fund(&m1, Amount::new(1_000_000)).unwrap();
    let id = c.deposit(&m1, Amount::new(1_000_000), None).unwrap();

    c.clock().advance(RATE_PERIOD_SECS / 2);
    c.transfer_position(&m1, &m1, &m2, id).unwrap();
    assert_eq!(c.pool().owner_of(id).unwrap(), &m2);

    c.clock().advance(RATE_PERIOD_SECS / 2);
    let payout = c.withdraw(&m2, id).unwrap();
    let claimed = c.claim_interest(&m1).unwrap();
    assert_eq!(payout, Amount::new(1_005_000));
    assert_eq!(claimed, Amount::new(5_000));
    // one year at 1% on 1,000,000, split between the two holders
    assert_eq!((payout - Amount::new(1_000_000)) + claimed, Amount::new(10_000));
}

#[test]
fn borrow_transfer_fails_for_every_caller() {
    let mut c = coop(1_000);
    delegate_all(&mut c);
    let m1 = addr("member1");
    c.authorize_stream(&m1);
    let actions = vec![Action::open_borrow(m1.clone(), Amount::new(100))];
    pass(&mut c, &m1, actions.clone(), "QmSmallLoan", &["member1"]);
    c.execute(&actions, &hash_description("QmSmallLoan")).unwrap();
    let id = c.cashflows(&m1).0[0];

    let pool_address = CoopConfig::default().pool_address;
    for caller in [m1.clone(), governor(), addr("member2")] {
        let err = c.transfer_position(&caller, &m1, &addr("member2"), id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }
    let err = c.transfer_position(&m1, &m1, &pool_address, id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[test]
fn events_reach_subscribers() {
    let mut c = coop(0);
    let seen = collect_events(&mut c);
    c.flush_events();
    {
        let events = seen.lock().unwrap();
        let minted = events
            .iter()
            .filter(|e| matches!(e, ProtocolEvent::Registry(RegistryEvent::Minted { .. })))
            .count();
        assert_eq!(minted, 4);
    }

    let m1 = addr("member1");
    c.fund(&m1, Amount::new(5)).unwrap();
    c.deposit(&m1, Amount::new(5), None).unwrap();
    c.propose(&m1, vec![Action::mint_membership(addr("y"))], "QmY").unwrap();
    // rejected operations publish nothing new
    let before = seen.lock().unwrap().len();
    let _ = c.deposit(&m1, Amount::ZERO, None);
    assert_eq!(seen.lock().unwrap().len(), before);

    let events = seen.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, ProtocolEvent::Pool(PoolEvent::Deposit { .. }))));
    assert!(events
        .iter()
        .any(|e| matches!(e, ProtocolEvent::Governance(GovernanceEvent::ProposalCreated { id: 1, .. }))));
}
