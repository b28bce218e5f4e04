extern crate std;

use soroban_sdk::{testutils::Address as _, vec, Address, Bytes, BytesN};

use crate::invariants::{assert_escrow_covers_outstanding, assert_fill_within_maximum};
use crate::testutils::{
    target_and_selector_extradata, Fixture, MockValidator, MockValidatorClient, MINT_SIGNATURE,
    UNIT,
};
use crate::{BuiltinValidator, Error, FundingCost, SigningDomain, ValidatorSpec};

#[test]
fn test_fixed_price_quotes_scale_linearly() {
    let f = Fixture::new(100);
    let mut options = f.options();
    options.bonding_supply = 100_000;
    options.bonding_reserve_balance = 1_000 * UNIT;
    let offer = f.offer(options.clone(), 5);
    let hash = f.client.hash_offer(&offer);

    let one = f.client.get_offer_funding_cost(&f.maker, &hash, &options, &1);
    let two = f.client.get_offer_funding_cost(&f.maker, &hash, &options, &2);
    let five = f.client.get_offer_funding_cost(&f.maker, &hash, &options, &5);

    assert_eq!(one.funding_cost, UNIT / 100);
    assert_eq!(two.funding_cost, 2 * UNIT / 100);
    assert_eq!(five.funding_cost, 5 * UNIT / 100);
}

#[test]
fn test_quote_splits_fee_and_principal() {
    let f = Fixture::new(500);
    let options = f.options();
    let hash = f.client.hash_offer(&f.offer(options.clone(), 1));
    assert_eq!(
        f.client.get_offer_funding_cost(&f.maker, &hash, &options, &1),
        FundingCost {
            funding_cost: UNIT,
            protocol_fee: UNIT / 20,
            principal: UNIT - UNIT / 20,
        }
    );
}

#[test]
fn test_fund_moves_fee_to_treasury_and_principal_to_escrow() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 1);
    let taker_before = f.balance(&f.taker);

    let id = f.fund(&offer, 1);

    assert_eq!(f.balance(&f.treasury), UNIT / 100);
    assert_eq!(f.balance(&f.client.address), UNIT - UNIT / 100);
    assert_eq!(f.balance(&f.taker), taker_before - UNIT);
    assert_eq!(f.balance(&f.beneficiary), 0);

    let contribution = f.client.get_contribution(&id);
    assert_eq!(contribution.amount_principal, UNIT - UNIT / 100);
    assert_eq!(contribution.released_so_far, 0);
    assert!(!contribution.cancelled);
    assert_eq!(contribution.contributor, f.taker);
    assert_eq!(contribution.beneficiary, f.beneficiary);
    assert_eq!(contribution.timestamp, 1_000);
    assert_escrow_covers_outstanding(&f.client, &f.token, &f.beneficiary);
}

#[test]
fn test_fund_executes_side_effect_through_registry() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 1);
    f.fund(&offer, 77);

    let calls = f.proxy.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls.get(0).unwrap(), f.mint_call(77));
    assert_eq!(f.proxy.last_maker(), Some(f.maker.clone()));
}

#[test]
fn test_fund_updates_fill_and_contribution_count() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 3);
    let hash = f.client.hash_offer(&offer);

    let first = f.fund(&offer, 1);
    let second = f.fund(&offer, 2);

    assert_eq!(f.client.offer_fill(&hash), 2);
    assert_eq!(f.client.total_contributions_by_hash(&hash), 2);
    assert_eq!(f.client.get_contribution(&first).sequence, 0);
    assert_eq!(f.client.get_contribution(&second).sequence, 1);
    assert_eq!(f.client.contributions_of(&f.beneficiary), vec![&f.env, first, second]);
    assert_fill_within_maximum(&f.client, &offer);
}

#[test]
fn test_excess_payment_stays_with_taker() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 1);
    let signature = f.sign(&offer);
    let before = f.balance(&f.taker);

    f.client
        .fund_offer(&f.taker, &offer, &signature, &f.mint_call(1), &(500 * UNIT));

    assert_eq!(f.balance(&f.taker), before - UNIT);
}

#[test]
fn test_insufficient_payment() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 1);
    let signature = f.sign(&offer);

    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &f.mint_call(1), &(UNIT - 1));
    assert_eq!(result, Err(Ok(Error::InsufficientPayment)));
    assert_eq!(f.proxy.calls().len(), 0);
}

#[test]
fn test_fully_filled_offer_rejects_further_fills() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 1);
    f.fund(&offer, 1);

    let signature = f.sign(&offer);
    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &f.mint_call(2), &(10 * UNIT));
    assert_eq!(result, Err(Ok(Error::OfferFullyFilled)));
    assert!(!f.client.validate_offer_parameters(&offer));
}

#[test]
fn test_fill_beyond_maximum_is_rejected() {
    let f = Fixture::new(100);
    let mut offer = f.offer(f.options(), 2);
    offer.contribution_validator = f.builtin(
        BuiltinValidator::TargetAndSelector,
        target_and_selector_extradata(&f.env, &f.asset, MINT_SIGNATURE, 3),
    );
    let signature = f.sign(&offer);

    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &f.mint_call(1), &(10 * UNIT));
    assert_eq!(result, Err(Ok(Error::FillExceedsMaximum)));
}

#[test]
fn test_multi_unit_fill_is_priced_per_unit() {
    let f = Fixture::new(0);
    let mut offer = f.offer(f.options(), 10);
    offer.contribution_validator = f.builtin(
        BuiltinValidator::TargetAndSelector,
        target_and_selector_extradata(&f.env, &f.asset, MINT_SIGNATURE, 4),
    );
    let hash = f.client.hash_offer(&offer);
    f.fund(&offer, 1);

    assert_eq!(f.client.offer_fill(&hash), 4);
    assert_eq!(f.balance(&f.client.address), 4 * UNIT);
}

#[test]
fn test_rejected_call_changes_nothing() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 1);
    let hash = f.client.hash_offer(&offer);
    let signature = f.sign(&offer);
    let before = f.balance(&f.taker);

    let elsewhere = crate::testutils::mint_call(&f.env, &Address::generate(&f.env), &f.taker, 1);
    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &elsewhere, &(10 * UNIT));

    assert_eq!(result, Err(Ok(Error::ValidatorRejected)));
    assert_eq!(f.client.offer_fill(&hash), 0);
    assert_eq!(f.client.total_contributions_by_hash(&hash), 0);
    assert_eq!(f.balance(&f.taker), before);
    assert_eq!(f.proxy.calls().len(), 0);
}

#[test]
fn test_failed_side_effect_aborts_funding() {
    let f = Fixture::new(100);
    f.proxy.set_outcome(&false);
    let offer = f.offer(f.options(), 1);
    let hash = f.client.hash_offer(&offer);
    let signature = f.sign(&offer);
    let before = f.balance(&f.taker);

    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &f.mint_call(1), &(10 * UNIT));

    assert_eq!(result, Err(Ok(Error::SideEffectCallFailed)));
    assert_eq!(f.balance(&f.taker), before);
    assert_eq!(f.balance(&f.treasury), 0);
    assert_eq!(f.client.offer_fill(&hash), 0);
}

#[test]
fn test_unknown_builtin_selector() {
    let f = Fixture::new(100);
    let mut offer = f.offer(f.options(), 1);
    offer.contribution_validator.selector = BytesN::from_array(&f.env, &[0xde, 0xad, 0xbe, 0xef]);
    let signature = f.sign(&offer);

    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &f.mint_call(1), &(10 * UNIT));
    assert_eq!(result, Err(Ok(Error::UnknownValidator)));
}

#[test]
fn test_external_validator_decides_fill() {
    let f = Fixture::new(100);
    let validator_id = f.env.register(MockValidator, ());
    let validator = MockValidatorClient::new(&f.env, &validator_id);

    let mut offer = f.offer(f.options(), 5);
    offer.contribution_validator = ValidatorSpec {
        target: Some(validator_id.clone()),
        selector: BytesN::from_array(&f.env, &[1, 2, 3, 4]),
        extradata: Bytes::new(&f.env),
    };
    let hash = f.client.hash_offer(&offer);
    let signature = f.sign(&offer);

    validator.set_response(&Some(2));
    f.client
        .fund_offer(&f.taker, &offer, &signature, &f.mint_call(1), &(10 * UNIT));
    assert_eq!(f.client.offer_fill(&hash), 2);

    validator.set_response(&None);
    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &f.mint_call(2), &(10 * UNIT));
    assert_eq!(result, Err(Ok(Error::ValidatorRejected)));

    // a validator that does not advance the fill is a rejection too
    validator.set_response(&Some(2));
    let result = f
        .client
        .try_fund_offer(&f.taker, &offer, &signature, &f.mint_call(3), &(10 * UNIT));
    assert_eq!(result, Err(Ok(Error::ValidatorRejected)));
}

#[test]
fn test_quote_matches_charge_on_bonding_curve() {
    let f = Fixture::new(250);
    let mut options = f.options();
    options.bonding_reserve_weight_ppm = 500_000;
    let offer = f.offer(options.clone(), 5);
    let hash = f.client.hash_offer(&offer);

    for id in 1..=3u64 {
        let quote = f.client.get_offer_funding_cost(&f.maker, &hash, &options, &1);
        let taker_before = f.balance(&f.taker);
        let treasury_before = f.balance(&f.treasury);

        f.fund(&offer, id);

        assert_eq!(taker_before - f.balance(&f.taker), quote.funding_cost);
        assert_eq!(f.balance(&f.treasury) - treasury_before, quote.protocol_fee);
    }

    // later fills cost more on a convex curve
    let first = f.client.get_contribution(&0).amount_principal;
    let third = f.client.get_contribution(&2).amount_principal;
    assert!(third > first);
}

#[test]
fn test_init_twice_fails() {
    let f = Fixture::new(100);
    let result = f.client.try_init(
        &f.admin,
        &f.token.address,
        &f.treasury,
        &100,
        &SigningDomain {
            name: Bytes::from_slice(&f.env, b"OfferFunding"),
            version: Bytes::from_slice(&f.env, b"1"),
        },
    );
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_admin_updates_fee_and_treasury() {
    let f = Fixture::new(100);
    assert_eq!(f.client.try_set_protocol_fee(&10_001), Err(Ok(Error::InvalidProtocolFee)));

    let new_treasury = Address::generate(&f.env);
    f.client.set_treasury(&new_treasury);
    f.client.set_protocol_fee(&1_000);

    let config = f.client.config();
    assert_eq!(config.treasury, new_treasury);
    assert_eq!(config.protocol_fee_bps, 1_000);

    let offer = f.offer(f.options(), 1);
    f.fund(&offer, 1);
    assert_eq!(f.balance(&new_treasury), UNIT / 10);
    assert_eq!(f.balance(&f.treasury), 0);
}

#[test]
fn test_quote_does_not_depend_on_maker() {
    let f = Fixture::new(100);
    let options = f.options();
    let hash = f.client.hash_offer(&f.offer(options.clone(), 3));
    let other_maker = BytesN::from_array(&f.env, &[0xab; 20]);

    assert_eq!(
        f.client.get_offer_funding_cost(&f.maker, &hash, &options, &2),
        f.client.get_offer_funding_cost(&other_maker, &hash, &options, &2)
    );
}

#[test]
fn test_collateral_is_escrowed_without_fee() {
    let f = Fixture::new(500);
    let offer = f.offer(f.options(), 1);
    let signature = f.sign(&offer);
    let taker_before = f.balance(&f.taker);

    let id = f.client.fund_offer_with_collateral(
        &f.taker,
        &offer,
        &signature,
        &f.mint_call(1),
        &(10 * UNIT),
        &(2 * UNIT),
    );

    assert_eq!(f.balance(&f.treasury), UNIT / 20);
    assert_eq!(f.balance(&f.client.address), UNIT - UNIT / 20 + 2 * UNIT);
    assert_eq!(f.balance(&f.taker), taker_before - 3 * UNIT);
    assert_eq!(
        f.client.get_contribution(&id).amount_principal,
        UNIT - UNIT / 20 + 2 * UNIT
    );
    assert_escrow_covers_outstanding(&f.client, &f.token, &f.beneficiary);
}

#[test]
fn test_collateral_must_be_covered_by_payment() {
    let f = Fixture::new(100);
    let offer = f.offer(f.options(), 1);
    let signature = f.sign(&offer);

    let result = f.client.try_fund_offer_with_collateral(
        &f.taker,
        &offer,
        &signature,
        &f.mint_call(1),
        &(3 * UNIT - 1),
        &(2 * UNIT),
    );
    assert_eq!(result, Err(Ok(Error::InsufficientPayment)));

    let result = f.client.try_fund_offer_with_collateral(
        &f.taker,
        &offer,
        &signature,
        &f.mint_call(1),
        &(3 * UNIT),
        &-1,
    );
    assert_eq!(result, Err(Ok(Error::InvalidCollateral)));
    assert_eq!(f.proxy.calls().len(), 0);
    assert_eq!(f.client.offer_fill(&f.client.hash_offer(&offer)), 0);
}
