#![allow(dead_code)]

extern crate std;

use soroban_sdk::{token, Address};

use crate::types::{Contribution, Offer};
use crate::OfferFundingClient;

/// Released amount never exceeds the escrowed principal.
pub fn assert_released_within_principal(contribution: &Contribution) {
    assert!(
        contribution.released_so_far >= 0
            && contribution.released_so_far <= contribution.amount_principal,
        "contribution {} released {} of principal {}",
        contribution.id,
        contribution.released_so_far,
        contribution.amount_principal
    );
}

/// A cancelled contribution keeps the release it had when it was cancelled.
pub fn assert_cancelled_frozen(before: &Contribution, after: &Contribution) {
    if before.cancelled {
        assert!(after.cancelled, "contribution {} was un-cancelled", after.id);
        assert_eq!(
            before.released_so_far, after.released_so_far,
            "cancelled contribution {} moved its release",
            after.id
        );
    }
}

/// Cumulative fill never passes the offer's maximum.
pub fn assert_fill_within_maximum(client: &OfferFundingClient, offer: &Offer) {
    let hash = client.hash_offer(offer);
    let fill = client.offer_fill(&hash);
    assert!(
        fill <= offer.maximum_fill,
        "fill {} exceeds maximum {}",
        fill,
        offer.maximum_fill
    );
}

/// The contract holds at least the unreleased principal of every live
/// contribution payable to `beneficiary`.
pub fn assert_escrow_covers_outstanding(
    client: &OfferFundingClient,
    token: &token::Client,
    beneficiary: &Address,
) {
    let mut outstanding: i128 = 0;
    for id in client.contributions_of(beneficiary).iter() {
        let contribution = client.get_contribution(&id);
        assert_released_within_principal(&contribution);
        if !contribution.cancelled {
            outstanding += contribution.amount_principal - contribution.released_so_far;
        }
    }
    let held = token.balance(&client.address);
    assert!(
        held >= outstanding,
        "escrow holds {} but owes {}",
        held,
        outstanding
    );
}

/// Release is monotone: a later snapshot never shows less released.
pub fn assert_release_monotone(before: &Contribution, after: &Contribution) {
    assert!(
        after.released_so_far >= before.released_so_far,
        "contribution {} release went from {} to {}",
        after.id,
        before.released_so_far,
        after.released_so_far
    );
}
