//! Deployment sequence: components, genesis members, then hand-over of
//! authority to the governor.

use cbank_governance::GovernanceEngine;
use cbank_membership::MembershipRegistry;
use cbank_pool::{AssetLedger, LendingPool};
use cbank_types::{Amount, Clock};

use crate::config::CoopConfig;
use crate::cooperative::Cooperative;
use crate::executor::Components;
use crate::NodeError;

/// Deploy a cooperative from `config`.
///
/// The deployer owns both components while the genesis members are minted
/// and the pool is funded, then transfers ownership of each to the governor.
/// The deployer keeps no authority afterwards. Bootstrap events stay in the
/// component journals until [`Cooperative::flush_events`] or the next
/// operation publishes them, so listeners subscribed in between receive them.
pub fn bootstrap<C: Clock>(config: &CoopConfig, clock: C) -> Result<Cooperative<C>, NodeError> {
    config.validate()?;
    let now = clock.now();
    let deployer = &config.deployer;

    let mut registry = MembershipRegistry::new(config.registry_address.clone(), deployer.clone());
    let mut pool = LendingPool::new(
        config.pool_address.clone(),
        deployer.clone(),
        config.pool_name.clone(),
        config.pool_symbol.clone(),
        AssetLedger::new(config.asset_symbol.clone()),
        config.interest_rate_model,
    );
    let governor = GovernanceEngine::new(config.governor_address.clone(), config.governor);

    if config.initial_reserves > 0 {
        let reserves_account = pool.address().clone();
        pool.mint_asset(&reserves_account, Amount::new(u128::from(config.initial_reserves)))?;
    }
    for member in &config.genesis_members {
        registry.mint(deployer, member, now)?;
    }
    registry.transfer_ownership(deployer, config.governor_address.clone())?;
    pool.transfer_ownership(deployer, config.governor_address.clone())?;

    tracing::info!(
        members = config.genesis_members.len(),
        governor = %config.governor_address,
        reserves = config.initial_reserves,
        "cooperative bootstrapped"
    );

    Ok(Cooperative::new(clock, Components::new(registry, pool), governor))
}
