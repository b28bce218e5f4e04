//! # Vesting schedule
//!
//! Maps the time elapsed since a contribution to the amount of its principal
//! released to date:
//!
//! ```text
//! elapsed < cliff                    → upfront
//! cliff ≤ elapsed < cliff + period   → upfront + cliff_payment + vested · (elapsed − cliff) / period
//! elapsed ≥ cliff + period           → upfront + cliff_payment + vested
//! ```
//!
//! where `vested = (P − upfront − cliff_payment) · ratio_ppm / 1_000_000`.
//! Every division floors and the result never exceeds the principal.

use crate::math;
use crate::types::VestingTerms;

pub const BPS_DENOMINATOR: u128 = 10_000;
pub const PPM_DENOMINATOR: u128 = 1_000_000;

/// `⌊amount · numerator / denominator⌋`, clamped to `amount`.
fn portion(amount: u128, numerator: u128, denominator: u128) -> u128 {
    math::mul_div(amount, numerator, denominator)
        .unwrap_or(amount)
        .min(amount)
}

/// Amount of `principal` released after `elapsed` seconds.
pub fn released_amount(terms: &VestingTerms, principal: i128, elapsed: u64) -> i128 {
    if principal <= 0 {
        return 0;
    }
    let p = principal as u128;

    let upfront = portion(p, terms.upfront_payment_bps as u128, BPS_DENOMINATOR);
    if elapsed < terms.cliff_period_secs {
        return upfront as i128;
    }

    let cliff = portion(p, terms.cliff_payment_bps as u128, BPS_DENOMINATOR);
    let remainder = p.saturating_sub(upfront).saturating_sub(cliff);
    let vested = portion(remainder, terms.vesting_ratio_ppm as u128, PPM_DENOMINATOR);

    let since_cliff = elapsed - terms.cliff_period_secs;
    let linear = if since_cliff < terms.vesting_period_secs {
        portion(vested, since_cliff as u128, terms.vesting_period_secs as u128)
    } else {
        vested
    };

    upfront.saturating_add(cliff).saturating_add(linear).min(p) as i128
}

/// Amount of `principal` the schedule ever releases.
pub fn final_amount(terms: &VestingTerms, principal: i128) -> i128 {
    released_amount(terms, principal, u64::MAX)
}
