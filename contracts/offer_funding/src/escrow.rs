//! # Escrow ledger
//!
//! One contribution per accepted fill. Principal stays in the contract and
//! reaches the beneficiary through the vesting schedule:
//!
//! ```text
//! Escrowed ──► (PartiallyReleased)* ──► FullyReleased
//! Escrowed ──► Cancelled            (terminal)
//! ```
//!
//! `released_so_far` only grows, never exceeds the principal, and is frozen
//! once a contribution is cancelled. Fully released and cancelled
//! contributions leave the beneficiary's live index.
//!
//! When a reward token is configured, every payment of principal to a
//! beneficiary also mints `amount · rate_ppm / 1_000_000` reward units.

use soroban_sdk::{log, token, Address, BytesN, Env, Vec};

use crate::math;
use crate::storage;
use crate::types::{ContributionState, ContributionTerms, FundingConfig, FundingOptions, VestingTerms};
use crate::vesting;
use crate::Error;

/// Outcome of cancelling a batch of contributions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Settlement {
    /// Unvested principal owed back to the taker.
    pub refund: i128,
    /// Vested, not yet released principal owed to the beneficiary.
    pub vested: i128,
}

/// Principal paid to a beneficiary and the reward minted alongside it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Payout {
    pub amount: i128,
    pub reward: i128,
}

pub fn record_contribution(
    env: &Env,
    offer_hash: &BytesN<32>,
    beneficiary: &Address,
    contributor: &Address,
    fill_units: u64,
    amount_principal: i128,
    options: &FundingOptions,
) -> ContributionTerms {
    let terms = ContributionTerms {
        id: storage::get_and_increment_contribution_id(env),
        offer_hash: offer_hash.clone(),
        sequence: storage::next_offer_sequence(env, offer_hash),
        beneficiary: beneficiary.clone(),
        contributor: contributor.clone(),
        fill_units,
        amount_principal,
        timestamp: env.ledger().timestamp(),
        vesting: VestingTerms::from(options),
    };
    storage::save_contribution(env, &terms);
    terms
}

/// Amount vested for `terms` at the current ledger time.
pub fn vested_now(env: &Env, terms: &ContributionTerms) -> i128 {
    let elapsed = env.ledger().timestamp().saturating_sub(terms.timestamp);
    vesting::released_amount(&terms.vesting, terms.amount_principal, elapsed)
}

/// Released-to-date amount of contribution `id` owned by `beneficiary`.
///
/// Cancelled contributions report their frozen release.
pub fn released_amount(env: &Env, beneficiary: &Address, id: u64) -> Result<i128, Error> {
    let terms = storage::load_contribution_terms(env, id)?;
    if terms.beneficiary != *beneficiary {
        return Err(Error::ContributionNotFound);
    }
    let state = storage::load_contribution_state(env, id)?;
    if state.cancelled {
        return Ok(state.released_so_far);
    }
    Ok(vested_now(env, &terms))
}

/// Advances every live contribution of `beneficiary` to its vested amount and
/// pays out the total.
pub fn release_all(env: &Env, config: &FundingConfig, beneficiary: &Address) -> Result<Payout, Error> {
    let mut total: i128 = 0;
    let ids = storage::contributions_of(env, beneficiary);
    let mut live = Vec::new(env);

    for id in ids.iter() {
        let mut state = storage::load_contribution_state(env, id)?;
        if state.cancelled {
            continue;
        }
        let terms = storage::load_contribution_terms(env, id)?;
        let vested = vested_now(env, &terms);
        if vested > state.released_so_far {
            total += vested - state.released_so_far;
            state.released_so_far = vested;
            storage::save_contribution_state(env, id, &state);
        }
        if state.released_so_far < vesting::final_amount(&terms.vesting, terms.amount_principal) {
            live.push_back(id);
        }
    }

    if total == 0 {
        return Err(Error::NothingToRelease);
    }

    if live.len() != ids.len() {
        storage::set_contributions_of(env, beneficiary, &live);
    }
    pay_beneficiary(env, config, beneficiary, total)
}

/// Cancels `ids`, which must all belong to `offer_hash`, have been funded by
/// `taker`, and together account for exactly `reversed_units` fill units.
/// Each contribution is frozen at its vested amount.
pub fn cancel_contributions(
    env: &Env,
    offer_hash: &BytesN<32>,
    beneficiary: &Address,
    taker: &Address,
    ids: &Vec<u64>,
    reversed_units: u64,
) -> Result<Settlement, Error> {
    let mut settlement = Settlement::default();
    let mut units: u64 = 0;

    for id in ids.iter() {
        let terms = storage::load_contribution_terms(env, id)?;
        if terms.offer_hash != *offer_hash {
            return Err(Error::ContributionNotFound);
        }
        if terms.contributor != *taker {
            return Err(Error::NotContributor);
        }
        let state = storage::load_contribution_state(env, id)?;
        if state.cancelled {
            return Err(Error::ContributionAlreadyCancelled);
        }

        let vested = vested_now(env, &terms).max(state.released_so_far);
        settlement.vested += vested - state.released_so_far;
        settlement.refund += terms.amount_principal - vested;
        units += terms.fill_units;

        storage::save_contribution_state(
            env,
            id,
            &ContributionState {
                released_so_far: vested,
                cancelled: true,
            },
        );
    }

    // Refunds must match the fills the reversal call actually undid.
    if units != reversed_units {
        log!(env, "cancelled units differ from reversed fill", units, reversed_units);
        return Err(Error::ValidatorRejected);
    }

    let mut live = Vec::new(env);
    for id in storage::contributions_of(env, beneficiary).iter() {
        if !ids.contains(id) {
            live.push_back(id);
        }
    }
    storage::set_contributions_of(env, beneficiary, &live);

    Ok(settlement)
}

/// Pays escrowed principal to `beneficiary` and mints the matching reward.
pub fn pay_beneficiary(
    env: &Env,
    config: &FundingConfig,
    beneficiary: &Address,
    amount: i128,
) -> Result<Payout, Error> {
    if amount <= 0 {
        return Ok(Payout::default());
    }
    pay_out(env, &config.payment_token, beneficiary, amount);

    let Some(reward) = storage::get_reward(env) else {
        return Ok(Payout { amount, reward: 0 });
    };
    let minted = math::mul_div(amount as u128, reward.rate_ppm as u128, vesting::PPM_DENOMINATOR)
        .and_then(|m| i128::try_from(m).ok())
        .ok_or(Error::RewardOverflow)?;
    if minted > 0 {
        token::StellarAssetClient::new(env, &reward.token).mint(beneficiary, &minted);
    }
    Ok(Payout {
        amount,
        reward: minted,
    })
}

/// Transfers `amount` of the escrowed token out of the contract.
pub fn pay_out(env: &Env, payment_token: &Address, to: &Address, amount: i128) {
    if amount <= 0 {
        return;
    }
    token::Client::new(env, payment_token).transfer(&env.current_contract_address(), to, &amount);
}
