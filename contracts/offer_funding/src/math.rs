//! # Fixed-point math
//!
//! Unsigned 27-decimal ("ray") fixed point used by the bonding-curve pricer.
//!
//! Every operation is checked: overflow yields `None` instead of trapping, so
//! callers can surface a contract error. All divisions floor.
//!
//! | Function        | Result                                   |
//! |-----------------|------------------------------------------|
//! | [`mul_div`]     | `⌊a·b/d⌋` through a 256-bit intermediate |
//! | [`ln_ratio`]    | `ln(n/d)` in ray, for `n ≥ d > 0`        |
//! | [`exp_ray`]     | `eʸ` split as `(mantissa, 2ᵏ)`           |
//! | [`expm1_small`] | `eʳ − 1` for `0 ≤ r < ln 2`              |

/// 1.0 in ray precision.
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

/// ln(2) in ray precision.
pub const LN2_RAY: u128 = 693_147_180_559_945_309_417_232_121;

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 128×128 → 256-bit product, returned as `(high, low)`.
fn full_mul(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LOW_MASK);
    let (b1, b0) = (b >> 64, b & LOW_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    let mid = (p00 >> 64) + (p01 & LOW_MASK) + (p10 & LOW_MASK);
    let low = (p00 & LOW_MASK) | ((mid & LOW_MASK) << 64);
    let high = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (high, low)
}

/// `⌊a·b/d⌋`, or `None` when `d == 0` or the quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let (high, low) = full_mul(a, b);
    if high == 0 {
        return Some(low / d);
    }
    if high >= d {
        return None;
    }

    // Restoring long division of (high:low) by d; the remainder stays below d.
    let mut rem = high;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((low >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1;
        }
    }
    Some(quot)
}

/// `v · 2ᵏ`, or `None` if any set bit would be shifted out.
pub fn shl_checked(v: u128, k: u32) -> Option<u128> {
    if v == 0 {
        return Some(0);
    }
    if k >= 128 || v.leading_zeros() < k {
        return None;
    }
    Some(v << k)
}

fn bit_len(v: u128) -> u32 {
    128 - v.leading_zeros()
}

/// Natural logarithm of `n/d` in ray, for `n ≥ d > 0`.
///
/// Range-reduces to `n/d = 2ᵏ·m` with `m ∈ [1, 2)` and evaluates
/// `ln m = 2·atanh((m−1)/(m+1))`, whose series converges by a factor of at
/// least 9 per term.
pub fn ln_ratio(n: u128, d: u128) -> Option<u128> {
    if d == 0 || n < d {
        return None;
    }
    if bit_len(n) >= 127 {
        return None;
    }

    let mut k = bit_len(n) - bit_len(d);
    let mut scaled = d << k;
    if scaled > n {
        k -= 1;
        scaled = d << k;
    }

    let m = mul_div(n, RAY, scaled)?;
    let z = mul_div(m - RAY, RAY, m + RAY)?;
    let z2 = mul_div(z, z, RAY)?;

    let mut sum = 0u128;
    let mut power = z;
    let mut odd = 1u128;
    while power > 0 {
        sum = sum.checked_add(power / odd)?;
        power = mul_div(power, z2, RAY)?;
        odd += 2;
    }

    sum.checked_mul(2)?
        .checked_add((k as u128).checked_mul(LN2_RAY)?)
}

/// `eʳ − 1` in ray for `0 ≤ r < ln 2` (Taylor series, no cancellation).
pub fn expm1_small(r: u128) -> Option<u128> {
    let mut sum = 0u128;
    let mut term = r;
    let mut n = 1u128;
    while term > 0 {
        sum = sum.checked_add(term)?;
        n += 1;
        term = mul_div(term, r, RAY)? / n;
    }
    Some(sum)
}

/// Splits `eʸ` (with `y` in ray) into `(eʳ − 1, k)` where `y = k·ln2 + r`.
///
/// `eʸ = 2ᵏ · (1 + (eʳ − 1))`. Keeping the fractional excess separate keeps
/// full precision for tiny exponents.
pub fn exp_ray(y: u128) -> Option<(u128, u32)> {
    let k = y / LN2_RAY;
    if k >= 128 {
        return None;
    }
    let r = y - k * LN2_RAY;
    Some((expm1_small(r)?, k as u32))
}

/// `amount · eʸ`, floored.
pub fn scale_by_exp(amount: u128, y: u128) -> Option<u128> {
    let (excess, k) = exp_ray(y)?;
    let grown = mul_div(amount, RAY.checked_add(excess)?, RAY)?;
    shl_checked(grown, k)
}

/// `amount · (eʸ − 1)`, floored.
pub fn scale_by_expm1(amount: u128, y: u128) -> Option<u128> {
    let (excess, k) = exp_ray(y)?;
    if k == 0 {
        return mul_div(amount, excess, RAY);
    }
    let factor = shl_checked(RAY.checked_add(excess)?, k)?.checked_sub(RAY)?;
    mul_div(amount, factor, RAY)
}
