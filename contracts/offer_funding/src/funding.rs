//! # Funding orchestrator
//!
//! Drives a fill through its per-invocation states:
//!
//! ```text
//! Parsed ──► ParametersValid ──► SignatureValid ──► ValidatorApproved ──► Priced ──► Settled
//! ```
//!
//! Any failed transition returns an error and the host discards every write
//! made by the invocation. The side-effect call runs before any token moves,
//! so a failing proxy call never leaves escrow or fee transfers behind.

use soroban_sdk::{log, token, Address, Bytes, BytesN, Env, Vec};

use crate::collaborators::ProxyRegistryClient;
use crate::events::{self, ContributionRegistered, FundingCancelled, OfferFunded};
use crate::types::{FundingCost, FundingOptions, Offer, SideEffectCall, ValidatorContext};
use crate::{digest, escrow, math, pricing, signature, storage, validators, vesting, Error};

pub const MAX_PROTOCOL_FEE_BPS: u32 = 10_000;

/// Static checks that do not depend on time or fill state.
fn check_static_parameters(offer: &Offer) -> Result<(), Error> {
    let options = &offer.funding_options;
    if offer.maker.to_array() == [0u8; 20]
        || offer.contribution_validator.target.is_none()
        || offer.maximum_fill == 0
        || offer.expiration_time <= offer.listing_time
        || options.upfront_payment_bps as u64 + options.cliff_payment_bps as u64
            > vesting::BPS_DENOMINATOR as u64
        || options.vesting_ratio_ppm as u128 > vesting::PPM_DENOMINATOR
    {
        return Err(Error::InvalidOfferParameters);
    }
    pricing::check_curve(options)
}

/// Full parameter check: static shape, listing window, remaining capacity.
pub fn check_offer_parameters(env: &Env, offer: &Offer, offer_hash: &BytesN<32>) -> Result<(), Error> {
    check_static_parameters(offer)?;

    let now = env.ledger().timestamp();
    if now < offer.listing_time || now >= offer.expiration_time {
        return Err(Error::OfferExpiredOrNotListed);
    }
    if storage::get_offer_fill(env, offer_hash) >= offer.maximum_fill {
        return Err(Error::OfferFullyFilled);
    }
    Ok(())
}

pub fn offer_hash(env: &Env, offer: &Offer) -> Result<BytesN<32>, Error> {
    let domain = storage::get_domain(env)?;
    Ok(digest::offer_digest(env, &domain, offer))
}

/// Price of `quantity` fills at the offer's current fill, split into fee and
/// principal.
pub fn quote(
    env: &Env,
    offer_hash: &BytesN<32>,
    options: &FundingOptions,
    quantity: u64,
) -> Result<FundingCost, Error> {
    let config = storage::get_config(env)?;
    let fill = storage::get_offer_fill(env, offer_hash);
    let funding_cost = pricing::cost(options, fill, quantity)?;
    let protocol_fee = math::mul_div(
        funding_cost as u128,
        config.protocol_fee_bps as u128,
        vesting::BPS_DENOMINATOR,
    )
    .ok_or(Error::PriceOverflow)? as i128;

    Ok(FundingCost {
        funding_cost,
        protocol_fee,
        principal: funding_cost - protocol_fee,
    })
}

fn validator_context(
    offer: &Offer,
    call: &SideEffectCall,
    counterparty: &Address,
    value: i128,
    current_fill: u64,
) -> ValidatorContext {
    ValidatorContext {
        beneficiary: offer.beneficiary.clone(),
        registry: offer.registry.clone(),
        maker: offer.maker.clone(),
        target: call.target.clone(),
        counterparty: counterparty.clone(),
        call_kind: call.call_kind,
        value,
        maximum_fill: offer.maximum_fill,
        listing_time: offer.listing_time,
        expiration_time: offer.expiration_time,
        current_fill,
    }
}

/// Runs `call` through the maker's proxy registry.
fn execute_side_effect(env: &Env, offer: &Offer, call: &SideEffectCall) -> Result<(), Error> {
    let registry = ProxyRegistryClient::new(env, &offer.registry);
    match registry.try_execute(&offer.maker, &call.target, &call.call_kind, &call.data) {
        Ok(Ok(true)) => Ok(()),
        _ => {
            log!(env, "side-effect call failed", call.target.clone());
            Err(Error::SideEffectCallFailed)
        }
    }
}

fn require_authentic(
    env: &Env,
    offer: &Offer,
    offer_hash: &BytesN<32>,
    signature: &Bytes,
) -> Result<(), Error> {
    if signature::is_valid_signature(env, offer_hash, &offer.maker, signature) {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}

/// Funds `offer` with the fill units `call` represents. Returns the new
/// contribution ID.
///
/// `additional_collateral` is escrowed on top of the price and vests with
/// it; no protocol fee is taken on it.
pub fn fund_offer(
    env: &Env,
    taker: &Address,
    offer: &Offer,
    signature: &Bytes,
    call: &SideEffectCall,
    value: i128,
    additional_collateral: i128,
) -> Result<u64, Error> {
    if additional_collateral < 0 {
        return Err(Error::InvalidCollateral);
    }
    let config = storage::get_config(env)?;
    let offer_hash = offer_hash(env, offer)?;

    check_offer_parameters(env, offer, &offer_hash)?;
    require_authentic(env, offer, &offer_hash, signature)?;

    let current_fill = storage::get_offer_fill(env, &offer_hash);
    let ctx = validator_context(offer, call, taker, value, current_fill);
    let new_fill = validators::evaluate(env, &offer.contribution_validator, &ctx, call)?;
    if new_fill <= current_fill {
        return Err(Error::ValidatorRejected);
    }
    if new_fill > offer.maximum_fill {
        return Err(Error::FillExceedsMaximum);
    }
    let quantity = new_fill - current_fill;

    let cost = quote(env, &offer_hash, &offer.funding_options, quantity)?;
    let required = cost
        .funding_cost
        .checked_add(additional_collateral)
        .ok_or(Error::InvalidCollateral)?;
    if value < required {
        return Err(Error::InsufficientPayment);
    }
    let principal = cost.principal + additional_collateral;

    execute_side_effect(env, offer, call)?;

    // Only price and collateral are pulled; any excess of `value` stays with
    // the taker.
    let payment = token::Client::new(env, &config.payment_token);
    if cost.protocol_fee > 0 {
        payment.transfer(taker, &config.treasury, &cost.protocol_fee);
    }
    if principal > 0 {
        payment.transfer(taker, &env.current_contract_address(), &principal);
    }

    storage::set_offer_fill(env, &offer_hash, new_fill);
    let terms = escrow::record_contribution(
        env,
        &offer_hash,
        &offer.beneficiary,
        taker,
        quantity,
        principal,
        &offer.funding_options,
    );

    events::emit_offer_funded(
        env,
        OfferFunded {
            offer_hash: offer_hash.clone(),
            maker: offer.maker.clone(),
            taker: taker.clone(),
            quantity,
            new_fill,
        },
    );
    events::emit_contribution_registered(
        env,
        &offer.beneficiary,
        ContributionRegistered {
            contribution_id: terms.id,
            offer_hash,
            contributor: taker.clone(),
            amount_principal: principal,
            additional_collateral,
            protocol_fee: cost.protocol_fee,
        },
    );

    Ok(terms.id)
}

/// Reverses `call` and cancels `contribution_ids`, whose fill units must add
/// up to the fill the cancellation validator removes. Returns the amount
/// refunded to the taker.
pub fn cancel_funding(
    env: &Env,
    taker: &Address,
    offer: &Offer,
    signature: &Bytes,
    call: &SideEffectCall,
    contribution_ids: &Vec<u64>,
) -> Result<i128, Error> {
    let config = storage::get_config(env)?;
    let offer_hash = offer_hash(env, offer)?;

    if contribution_ids.is_empty() {
        return Err(Error::EmptyContributionList);
    }
    require_authentic(env, offer, &offer_hash, signature)?;
    if offer.cancellation_validator.target.is_none() {
        return Err(Error::CancellationDisabled);
    }

    let current_fill = storage::get_offer_fill(env, &offer_hash);
    let ctx = validator_context(offer, call, taker, 0, current_fill);
    let new_fill = validators::evaluate(env, &offer.cancellation_validator, &ctx, call)?;
    if new_fill > current_fill {
        return Err(Error::ValidatorRejected);
    }

    execute_side_effect(env, offer, call)?;

    let settlement = escrow::cancel_contributions(
        env,
        &offer_hash,
        &offer.beneficiary,
        taker,
        contribution_ids,
        current_fill - new_fill,
    )?;
    escrow::pay_out(env, &config.payment_token, taker, settlement.refund);
    let payout = escrow::pay_beneficiary(env, &config, &offer.beneficiary, settlement.vested)?;
    storage::set_offer_fill(env, &offer_hash, new_fill);

    events::emit_funding_cancelled(
        env,
        FundingCancelled {
            offer_hash,
            taker: taker.clone(),
            contribution_ids: contribution_ids.clone(),
            refunded: settlement.refund,
            paid_to_beneficiary: payout.amount,
            reward: payout.reward,
            new_fill,
        },
    );

    Ok(settlement.refund)
}
