//! # Bonding-curve pricer
//!
//! Constant-reserve-ratio pricing of successive fills.
//!
//! With initial supply `S`, initial reserve `R₀` and reserve weight
//! `w = weight_ppm / 1_000_000`, the reserve backing `S + f` units is
//!
//! ```text
//! R(f) = R₀ · ((S + f) / S)^(1/w)
//! ```
//!
//! and buying `q` units at fill `f` costs `R(f + q) − R(f)`, i.e.
//! `R(f) · ((1 + q/(S+f))^(1/w) − 1)`.
//!
//! A weight of `1_000_000` is the fixed-price curve: the cost collapses to
//! `R₀ · q / S` and is computed with a single integer mul-div so that it is
//! exact up to the final floor.

use crate::math;
use crate::types::FundingOptions;
use crate::Error;

/// Reserve weight of the linear (fixed-price) curve.
pub const LINEAR_WEIGHT_PPM: u32 = 1_000_000;

/// Rejects curve parameters the pricer cannot evaluate.
pub fn check_curve(options: &FundingOptions) -> Result<(), Error> {
    if options.bonding_supply == 0
        || options.bonding_reserve_weight_ppm == 0
        || options.bonding_reserve_weight_ppm > LINEAR_WEIGHT_PPM
        || options.bonding_reserve_balance < 0
    {
        return Err(Error::InvalidCurveParameters);
    }
    Ok(())
}

/// Cost of buying `quantity` fills when `fill_before` fills already exist.
pub fn cost(options: &FundingOptions, fill_before: u64, quantity: u64) -> Result<i128, Error> {
    check_curve(options)?;

    let supply = options.bonding_supply as u128;
    let reserve = options.bonding_reserve_balance as u128;
    let weight = options.bonding_reserve_weight_ppm as u128;

    if quantity == 0 || reserve == 0 {
        return Ok(0);
    }

    let raw = if weight == LINEAR_WEIGHT_PPM as u128 {
        math::mul_div(reserve, quantity as u128, supply)
    } else {
        curve_cost(supply, reserve, weight, fill_before as u128, quantity as u128)
    };

    raw.and_then(|c| i128::try_from(c).ok())
        .ok_or(Error::PriceOverflow)
}

fn curve_cost(supply: u128, reserve: u128, weight: u128, fill: u128, quantity: u128) -> Option<u128> {
    let start = supply.checked_add(fill)?;
    let end = start.checked_add(quantity)?;

    // Exponents are ln(ratio) / w, both in ray.
    let grown_exp = math::mul_div(math::ln_ratio(start, supply)?, 1_000_000, weight)?;
    let step_exp = math::mul_div(math::ln_ratio(end, start)?, 1_000_000, weight)?;

    let reserve_at_fill = math::scale_by_exp(reserve, grown_exp)?;
    math::scale_by_expm1(reserve_at_fill, step_exp)
}
