//! # Events
//!
//! | Topic                        | Payload                  |
//! |------------------------------|--------------------------|
//! | `("funded", offer_hash)`     | [`OfferFunded`]          |
//! | `("contrib", beneficiary)`   | [`ContributionRegistered`] |
//! | `("released", beneficiary)`  | [`FundsReleased`]        |
//! | `("cancelled", offer_hash)`  | [`FundingCancelled`]     |
//! | `("config",)`                | [`ConfigUpdated`]        |
//! | `("reward",)`                | [`RewardConfig`]         |

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Vec};

use crate::types::RewardConfig;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OfferFunded {
    pub offer_hash: BytesN<32>,
    pub maker: BytesN<20>,
    pub taker: Address,
    pub quantity: u64,
    pub new_fill: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionRegistered {
    pub contribution_id: u64,
    pub offer_hash: BytesN<32>,
    pub contributor: Address,
    /// Escrowed amount, collateral included.
    pub amount_principal: i128,
    pub additional_collateral: i128,
    pub protocol_fee: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsReleased {
    pub beneficiary: Address,
    pub amount: i128,
    /// Reward units minted with the release.
    pub reward: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingCancelled {
    pub offer_hash: BytesN<32>,
    pub taker: Address,
    pub contribution_ids: Vec<u64>,
    /// Unvested principal returned to the taker.
    pub refunded: i128,
    /// Vested principal paid out to the beneficiary at cancellation.
    pub paid_to_beneficiary: i128,
    pub reward: i128,
    pub new_fill: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigUpdated {
    pub treasury: Address,
    pub protocol_fee_bps: u32,
}

pub fn emit_offer_funded(env: &Env, event: OfferFunded) {
    env.events()
        .publish((symbol_short!("funded"), event.offer_hash.clone()), event);
}

pub fn emit_contribution_registered(env: &Env, beneficiary: &Address, event: ContributionRegistered) {
    env.events()
        .publish((symbol_short!("contrib"), beneficiary.clone()), event);
}

pub fn emit_funds_released(env: &Env, beneficiary: &Address, amount: i128, reward: i128) {
    env.events().publish(
        (symbol_short!("released"), beneficiary.clone()),
        FundsReleased {
            beneficiary: beneficiary.clone(),
            amount,
            reward,
        },
    );
}

pub fn emit_funding_cancelled(env: &Env, event: FundingCancelled) {
    env.events()
        .publish((symbol_short!("cancelled"), event.offer_hash.clone()), event);
}

pub fn emit_config_updated(env: &Env, treasury: &Address, protocol_fee_bps: u32) {
    env.events().publish(
        (symbol_short!("config"),),
        ConfigUpdated {
            treasury: treasury.clone(),
            protocol_fee_bps,
        },
    );
}

pub fn emit_reward_configured(env: &Env, reward: &RewardConfig) {
    env.events().publish((symbol_short!("reward"),), reward.clone());
}
