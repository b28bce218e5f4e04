//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the engine:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key                 | Type             | Description                           |
//! |---------------------|------------------|---------------------------------------|
//! | `Config`            | `FundingConfig`  | Admin, payment token, treasury, fee   |
//! | `Domain`            | `SigningDomain`  | Name and version bound into digests   |
//! | `ContributionCount` | `u64`            | Auto-increment contribution ID        |
//! | `Reward`            | `RewardConfig`   | Optional reward token and rate        |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                         | Type                 | Description                       |
//! |-----------------------------|----------------------|-----------------------------------|
//! | `OfferFill(hash)`           | `u64`                | Cumulative fill of an offer       |
//! | `OfferContributions(hash)`  | `u32`                | Contributions recorded per offer  |
//! | `ContribTerms(id)`          | `ContributionTerms`  | Immutable contribution data       |
//! | `ContribState(id)`          | `ContributionState`  | Released amount, cancelled flag   |
//! | `BeneficiaryContribs(addr)` | `Vec<u64>`           | Live IDs per beneficiary          |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! Releases touch only the small `ContribState` entry; the terms are written
//! once. The beneficiary index holds only contributions that can still pay
//! out: ids leave it once fully released or cancelled, so its size tracks
//! live escrow rather than history.

use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use crate::types::{
    Contribution, ContributionState, ContributionTerms, FundingConfig, RewardConfig,
    SigningDomain,
};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Contract configuration (Instance).
    Config,
    /// Signing domain (Instance).
    Domain,
    /// Global auto-increment counter for contribution IDs (Instance).
    ContributionCount,
    /// Reward token settings (Instance).
    Reward,
    /// Cumulative fill keyed by offer digest (Persistent).
    OfferFill(BytesN<32>),
    /// Number of contributions recorded for an offer (Persistent).
    OfferContributions(BytesN<32>),
    /// Immutable contribution terms keyed by ID (Persistent).
    ContribTerms(u64),
    /// Mutable contribution state keyed by ID (Persistent).
    ContribState(u64),
    /// Live contribution IDs payable to a beneficiary (Persistent).
    BeneficiaryContribs(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &FundingConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn get_config(env: &Env) -> Result<FundingConfig, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn set_domain(env: &Env, domain: &SigningDomain) {
    env.storage().instance().set(&DataKey::Domain, domain);
    bump_instance(env);
}

pub fn get_domain(env: &Env) -> Result<SigningDomain, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Domain)
        .ok_or(Error::NotInitialized)
}

pub fn set_reward(env: &Env, reward: &RewardConfig) {
    env.storage().instance().set(&DataKey::Reward, reward);
    bump_instance(env);
}

pub fn get_reward(env: &Env) -> Option<RewardConfig> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Reward)
}

/// Atomically reads, increments, and stores the contribution counter.
/// Returns the ID to use for the *current* contribution (pre-increment value).
pub fn get_and_increment_contribution_id(env: &Env) -> u64 {
    bump_instance(env);
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::ContributionCount)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::ContributionCount, &(current + 1));
    current
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn read_persistent<T>(env: &Env, key: &DataKey) -> Option<T>
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

pub fn get_offer_fill(env: &Env, offer_hash: &BytesN<32>) -> u64 {
    read_persistent(env, &DataKey::OfferFill(offer_hash.clone())).unwrap_or(0)
}

pub fn set_offer_fill(env: &Env, offer_hash: &BytesN<32>, fill: u64) {
    let key = DataKey::OfferFill(offer_hash.clone());
    env.storage().persistent().set(&key, &fill);
    bump_persistent(env, &key);
}

pub fn get_offer_contributions(env: &Env, offer_hash: &BytesN<32>) -> u32 {
    read_persistent(env, &DataKey::OfferContributions(offer_hash.clone())).unwrap_or(0)
}

/// Returns the per-offer sequence number for the next contribution.
pub fn next_offer_sequence(env: &Env, offer_hash: &BytesN<32>) -> u32 {
    let current = get_offer_contributions(env, offer_hash);
    let key = DataKey::OfferContributions(offer_hash.clone());
    env.storage().persistent().set(&key, &(current + 1));
    bump_persistent(env, &key);
    current
}

pub fn contributions_of(env: &Env, beneficiary: &Address) -> Vec<u64> {
    read_persistent(env, &DataKey::BeneficiaryContribs(beneficiary.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

/// Replace the live index of `beneficiary`; an empty index is removed.
pub fn set_contributions_of(env: &Env, beneficiary: &Address, ids: &Vec<u64>) {
    let key = DataKey::BeneficiaryContribs(beneficiary.clone());
    if ids.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, ids);
        bump_persistent(env, &key);
    }
}

/// Save the terms and initial state of a new contribution and index it under
/// its beneficiary.
pub fn save_contribution(env: &Env, terms: &ContributionTerms) {
    let terms_key = DataKey::ContribTerms(terms.id);
    let state_key = DataKey::ContribState(terms.id);
    let state = ContributionState {
        released_so_far: 0,
        cancelled: false,
    };

    env.storage().persistent().set(&terms_key, terms);
    env.storage().persistent().set(&state_key, &state);
    bump_persistent(env, &terms_key);
    bump_persistent(env, &state_key);

    let mut ids = contributions_of(env, &terms.beneficiary);
    ids.push_back(terms.id);
    set_contributions_of(env, &terms.beneficiary, &ids);
}

pub fn load_contribution_terms(env: &Env, id: u64) -> Result<ContributionTerms, Error> {
    read_persistent(env, &DataKey::ContribTerms(id)).ok_or(Error::ContributionNotFound)
}

pub fn load_contribution_state(env: &Env, id: u64) -> Result<ContributionState, Error> {
    read_persistent(env, &DataKey::ContribState(id)).ok_or(Error::ContributionNotFound)
}

pub fn save_contribution_state(env: &Env, id: u64, state: &ContributionState) {
    let key = DataKey::ContribState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

/// Load the full `Contribution` by combining terms and state.
pub fn load_contribution(env: &Env, id: u64) -> Result<Contribution, Error> {
    let terms = load_contribution_terms(env, id)?;
    let state = load_contribution_state(env, id)?;
    Ok(Contribution {
        id: terms.id,
        offer_hash: terms.offer_hash,
        sequence: terms.sequence,
        beneficiary: terms.beneficiary,
        contributor: terms.contributor,
        fill_units: terms.fill_units,
        amount_principal: terms.amount_principal,
        timestamp: terms.timestamp,
        vesting: terms.vesting,
        released_so_far: state.released_so_far,
        cancelled: state.cancelled,
    })
}
