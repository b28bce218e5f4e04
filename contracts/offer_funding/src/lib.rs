//! # Offer Funding Contract
//!
//! Signature-authorized, bonding-curve-priced funding of off-chain offers.
//!
//! A maker signs an [`Offer`] describing a fundable side effect, a pricing
//! curve and a vesting schedule. Any taker may fund it up to its maximum fill;
//! the price follows the curve, a protocol fee goes to the treasury, and the
//! principal is escrowed here and released to the beneficiary as it vests.
//!
//! | Phase        | Entry Point(s)                                                  |
//! |--------------|-----------------------------------------------------------------|
//! | Bootstrap    | [`OfferFunding::init`]                                          |
//! | Admin        | `set_treasury`, `set_protocol_fee`, `set_reward`                |
//! | Offers       | `hash_offer`, `validate_offer_parameters`, `validate_offer_authorization` |
//! | Pricing      | `get_offer_funding_cost`                                        |
//! | Funding      | [`OfferFunding::fund_offer`], `fund_offer_with_collateral`, [`OfferFunding::cancel_funding`] |
//! | Escrow       | `release_all_to_beneficiary`, `calculate_released_amount`       |
//! | Queries      | `config`, `domain`, `reward`, `get_contribution`, `contributions_of`, `offer_fill`, `total_contributions_by_hash`, `builtin_validator_selector` |
//!
//! ## Architecture
//!
//! This file contains **only** the public entry points. Fill orchestration
//! lives in [`funding`], escrow accounting in [`escrow`], pricing in
//! [`pricing`], and storage access in [`storage`].

#![no_std]

#[cfg(test)]
extern crate std;

use soroban_sdk::{contract, contracterror, contractimpl, Address, Bytes, BytesN, Env, Vec};

mod collaborators;
mod digest;
mod escrow;
mod events;
mod funding;
mod math;
mod pricing;
mod signature;
mod storage;
mod types;
mod validators;
mod vesting;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_funding;

pub use collaborators::{CallValidator, ProxyRegistry};
pub use events::{
    ConfigUpdated, ContributionRegistered, FundingCancelled, FundsReleased, OfferFunded,
};
pub use types::{
    BuiltinValidator, CallKind, Contribution, FundingConfig, FundingCost, FundingOptions, Offer,
    RewardConfig, SideEffectCall, SigningDomain, ValidatorContext, ValidatorSpec, VestingTerms,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized           = 1,
    NotInitialized               = 2,
    InvalidProtocolFee           = 3,
    InvalidOfferParameters       = 4,
    OfferExpiredOrNotListed      = 5,
    OfferFullyFilled             = 6,
    InvalidSignature             = 7,
    InvalidCurveParameters       = 8,
    PriceOverflow                = 9,
    FillExceedsMaximum           = 10,
    ValidatorRejected            = 11,
    UnknownValidator             = 12,
    InsufficientPayment          = 13,
    SideEffectCallFailed         = 14,
    NothingToRelease             = 15,
    ContributionNotFound         = 16,
    ContributionAlreadyCancelled = 17,
    CancellationDisabled         = 18,
    NotContributor               = 19,
    EmptyContributionList        = 20,
    InvalidCollateral            = 21,
    RewardOverflow               = 22,
}

#[contract]
pub struct OfferFunding;

#[contractimpl]
impl OfferFunding {
    // ─────────────────────────────────────────────────────────
    // Initialisation and admin
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract.
    ///
    /// Must be called exactly once immediately after deployment. `domain`
    /// is bound into every offer digest together with the network ID and
    /// this contract's address.
    pub fn init(
        env: Env,
        admin: Address,
        payment_token: Address,
        treasury: Address,
        protocol_fee_bps: u32,
        domain: SigningDomain,
    ) -> Result<(), Error> {
        admin.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if protocol_fee_bps > funding::MAX_PROTOCOL_FEE_BPS {
            return Err(Error::InvalidProtocolFee);
        }

        storage::set_config(
            &env,
            &FundingConfig {
                admin,
                payment_token,
                treasury: treasury.clone(),
                protocol_fee_bps,
            },
        );
        storage::set_domain(&env, &domain);
        events::emit_config_updated(&env, &treasury, protocol_fee_bps);
        Ok(())
    }

    /// Route future protocol fees to `treasury`. Admin only.
    pub fn set_treasury(env: Env, treasury: Address) -> Result<(), Error> {
        let mut config = storage::get_config(&env)?;
        config.admin.require_auth();
        config.treasury = treasury;
        storage::set_config(&env, &config);
        events::emit_config_updated(&env, &config.treasury, config.protocol_fee_bps);
        Ok(())
    }

    /// Change the protocol fee. Admin only; at most 10 000 bps.
    pub fn set_protocol_fee(env: Env, protocol_fee_bps: u32) -> Result<(), Error> {
        let mut config = storage::get_config(&env)?;
        config.admin.require_auth();
        if protocol_fee_bps > funding::MAX_PROTOCOL_FEE_BPS {
            return Err(Error::InvalidProtocolFee);
        }
        config.protocol_fee_bps = protocol_fee_bps;
        storage::set_config(&env, &config);
        events::emit_config_updated(&env, &config.treasury, protocol_fee_bps);
        Ok(())
    }

    /// Mint `token` to beneficiaries at `rate_ppm` reward units per unit of
    /// principal they receive. Admin only; this contract must administer
    /// `token`.
    pub fn set_reward(env: Env, token: Address, rate_ppm: u64) -> Result<(), Error> {
        let config = storage::get_config(&env)?;
        config.admin.require_auth();
        let reward = RewardConfig { token, rate_ppm };
        storage::set_reward(&env, &reward);
        events::emit_reward_configured(&env, &reward);
        Ok(())
    }

    pub fn reward(env: Env) -> Option<RewardConfig> {
        storage::get_reward(&env)
    }

    pub fn config(env: Env) -> Result<FundingConfig, Error> {
        storage::get_config(&env)
    }

    pub fn domain(env: Env) -> Result<SigningDomain, Error> {
        storage::get_domain(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Offers
    // ─────────────────────────────────────────────────────────

    /// Digest the maker signs; also the on-chain identity of the offer.
    pub fn hash_offer(env: Env, offer: Offer) -> Result<BytesN<32>, Error> {
        funding::offer_hash(&env, &offer)
    }

    /// `true` if `offer` could be funded right now, signature aside.
    pub fn validate_offer_parameters(env: Env, offer: Offer) -> bool {
        match funding::offer_hash(&env, &offer) {
            Ok(hash) => funding::check_offer_parameters(&env, &offer, &hash).is_ok(),
            Err(_) => false,
        }
    }

    /// `true` iff `signature` over `offer_hash` recovers to `maker`.
    /// Never fails; malformed signatures yield `false`.
    pub fn validate_offer_authorization(
        env: Env,
        offer_hash: BytesN<32>,
        maker: BytesN<20>,
        signature: Bytes,
    ) -> bool {
        signature::is_valid_signature(&env, &offer_hash, &maker, &signature)
    }

    /// Quote for `quantity` fills at the offer's current fill. Matches what
    /// `fund_offer` charges in the same ledger state.
    ///
    /// The fill counter is keyed by `offer_hash` alone, so `_maker` does not
    /// change the quote; it is accepted so callers can pass the same
    /// arguments offer tooling already carries.
    pub fn get_offer_funding_cost(
        env: Env,
        _maker: BytesN<20>,
        offer_hash: BytesN<32>,
        funding_options: FundingOptions,
        quantity: u64,
    ) -> Result<FundingCost, Error> {
        funding::quote(&env, &offer_hash, &funding_options, quantity)
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Fund `offer` by having the maker's proxy perform `call`.
    ///
    /// `value` is the most the taker is willing to pay; only the quoted price
    /// is transferred. Returns the ID of the new contribution.
    pub fn fund_offer(
        env: Env,
        taker: Address,
        offer: Offer,
        signature: Bytes,
        call: SideEffectCall,
        value: i128,
    ) -> Result<u64, Error> {
        taker.require_auth();
        funding::fund_offer(&env, &taker, &offer, &signature, &call, value, 0)
    }

    /// [`OfferFunding::fund_offer`] with `additional_collateral` escrowed on
    /// top of the price. The collateral vests with the principal and carries
    /// no protocol fee; `value` must cover price plus collateral.
    pub fn fund_offer_with_collateral(
        env: Env,
        taker: Address,
        offer: Offer,
        signature: Bytes,
        call: SideEffectCall,
        value: i128,
        additional_collateral: i128,
    ) -> Result<u64, Error> {
        taker.require_auth();
        funding::fund_offer(
            &env,
            &taker,
            &offer,
            &signature,
            &call,
            value,
            additional_collateral,
        )
    }

    /// Reverse `call` and cancel the listed contributions of `taker`.
    ///
    /// The listed contributions must account for exactly the fill units the
    /// reversal removes. Vested principal goes to the beneficiary and the
    /// unvested remainder is refunded to `taker`. Returns the refunded amount.
    pub fn cancel_funding(
        env: Env,
        taker: Address,
        offer: Offer,
        signature: Bytes,
        call: SideEffectCall,
        contribution_ids: Vec<u64>,
    ) -> Result<i128, Error> {
        taker.require_auth();
        funding::cancel_funding(&env, &taker, &offer, &signature, &call, &contribution_ids)
    }

    // ─────────────────────────────────────────────────────────
    // Escrow
    // ─────────────────────────────────────────────────────────

    /// Pay `beneficiary` everything vested and not yet released.
    pub fn release_all_to_beneficiary(env: Env, beneficiary: Address) -> Result<i128, Error> {
        beneficiary.require_auth();
        let config = storage::get_config(&env)?;
        let payout = escrow::release_all(&env, &config, &beneficiary)?;
        events::emit_funds_released(&env, &beneficiary, payout.amount, payout.reward);
        Ok(payout.amount)
    }

    /// Released-to-date amount of one contribution under its vesting schedule.
    pub fn calculate_released_amount(env: Env, beneficiary: Address, id: u64) -> Result<i128, Error> {
        escrow::released_amount(&env, &beneficiary, id)
    }

    pub fn total_contributions_by_hash(env: Env, offer_hash: BytesN<32>) -> u32 {
        storage::get_offer_contributions(&env, &offer_hash)
    }

    pub fn get_contribution(env: Env, id: u64) -> Result<Contribution, Error> {
        storage::load_contribution(&env, id)
    }

    /// IDs of `beneficiary`'s contributions that can still pay out.
    pub fn contributions_of(env: Env, beneficiary: Address) -> Vec<u64> {
        storage::contributions_of(&env, &beneficiary)
    }

    pub fn offer_fill(env: Env, offer_hash: BytesN<32>) -> u64 {
        storage::get_offer_fill(&env, &offer_hash)
    }

    /// Selector addressing a built-in validator hosted by this contract.
    pub fn builtin_validator_selector(env: Env, kind: BuiltinValidator) -> BytesN<4> {
        kind.selector(&env)
    }
}
