use cosmwasm_std::{Uint128, Uint256};

use crate::error::PoolError;

/// Fixed coin count. The pool never generalizes beyond a three-asset basket.
pub const N: usize = 3;

/// Newton iteration budget for both `compute_d` and `compute_y`.
pub const MAX_ITER: u32 = 255;

/// Canonical fixed-point scale (18 decimals) all internal math is expressed in.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

pub(crate) fn abs_diff(a: Uint256, b: Uint256) -> Uint256 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Converts a native-unit balance into canonical (18-decimal) units.
///
/// `mul` is the asset's immutable precision multiplier: `1` for the
/// 18-decimal asset, `10^12` for a 6-decimal asset.
pub fn to_canonical(balance: Uint128, mul: Uint256) -> Uint256 {
    Uint256::from(balance) * mul
}

/// Converts a canonical-unit amount back to native units, truncating.
pub fn from_canonical(value: Uint256, mul: Uint256) -> Result<Uint128, PoolError> {
    let native = value.checked_div(mul)?;
    Uint128::try_from(native).map_err(Into::into)
}

/// Scales a whole balance vector into canonical units.
pub fn to_canonical_vec(balances: &[Uint128; N], mul: &[Uint256; N]) -> [Uint256; N] {
    let mut xp = [Uint256::zero(); N];
    for i in 0..N {
        xp[i] = to_canonical(balances[i], mul[i]);
    }
    xp
}

/// Solves the StableSwap invariant `D` for a canonical-balance vector `xp` under
/// amplification `amp`.
///
/// Multiplication is ordered exactly as the StableSwap reference does it: each
/// intermediate product is computed before any division, so truncation happens
/// once per step rather than compounding across a reassociated expression.
pub fn compute_d(xp: &[Uint256; N], amp: u64) -> Result<Uint256, PoolError> {
    let n = Uint256::from(N as u128);
    let sum = xp
        .iter()
        .try_fold(Uint256::zero(), |acc, x| acc.checked_add(*x))?;
    if sum.is_zero() {
        return Ok(Uint256::zero());
    }

    let ann = Uint256::from(amp).checked_mul(n)?;
    let mut d = sum;

    for _ in 0..MAX_ITER {
        let mut d_p = d;
        for x in xp {
            // d_p = d_p * d / (x * n)
            d_p = d_p.checked_mul(d)?.checked_div(x.checked_mul(n)?)?;
        }
        let d_prev = d;

        // d = ((ann * sum + d_p * n) * d) / ((ann - 1) * d + (n + 1) * d_p)
        let numerator = ann
            .checked_mul(sum)?
            .checked_add(d_p.checked_mul(n)?)?
            .checked_mul(d)?;
        let denominator = ann
            .checked_sub(Uint256::one())?
            .checked_mul(d)?
            .checked_add(n.checked_add(Uint256::one())?.checked_mul(d_p)?)?;
        d = numerator.checked_div(denominator)?;

        if abs_diff(d, d_prev) <= Uint256::one() {
            return Ok(d);
        }
    }

    Err(PoolError::ConvergenceFailure {})
}

/// Solves for the new canonical balance of asset `j` that keeps the invariant
/// `D` unchanged, given that asset `i`'s balance has become `x_new` and the
/// other balances hold as in `xp`.
pub fn compute_y(
    i: usize,
    j: usize,
    x_new: Uint256,
    xp: &[Uint256; N],
    amp: u64,
) -> Result<Uint256, PoolError> {
    if i == j {
        return Err(PoolError::SameCoin {});
    }
    if i >= N || j >= N {
        return Err(PoolError::InvalidIndex {});
    }

    let n = Uint256::from(N as u128);
    let d = compute_d(xp, amp)?;
    let ann = Uint256::from(amp).checked_mul(n)?;

    let mut s_ = Uint256::zero();
    let mut c = d;
    for (k, xp_k) in xp.iter().enumerate() {
        if k == j {
            continue;
        }
        let v = if k == i { x_new } else { *xp_k };
        s_ = s_.checked_add(v)?;
        c = c.checked_mul(d)?.checked_div(v.checked_mul(n)?)?;
    }
    c = c.checked_mul(d)?.checked_div(ann.checked_mul(n)?)?;
    let b = s_.checked_add(d.checked_div(ann)?)?;

    newton_y(c, b, d)
}

/// Solves for the balance of `target_index` that makes the invariant equal to
/// an externally supplied `d`, holding every other asset's balance in `xp`
/// fixed. This is the single-unknown counterpart of [`compute_y`], used to
/// price a one-sided withdrawal against a target invariant rather than to
/// preserve the invariant implied by `xp` itself.
pub fn compute_y_given_d(
    target_index: usize,
    d: Uint256,
    xp: &[Uint256; N],
    amp: u64,
) -> Result<Uint256, PoolError> {
    if target_index >= N {
        return Err(PoolError::InvalidIndex {});
    }

    let n = Uint256::from(N as u128);
    let ann = Uint256::from(amp).checked_mul(n)?;

    let mut s_ = Uint256::zero();
    let mut c = d;
    for (k, xp_k) in xp.iter().enumerate() {
        if k == target_index {
            continue;
        }
        s_ = s_.checked_add(*xp_k)?;
        c = c.checked_mul(d)?.checked_div(xp_k.checked_mul(n)?)?;
    }
    c = c.checked_mul(d)?.checked_div(ann.checked_mul(n)?)?;
    let b = s_.checked_add(d.checked_div(ann)?)?;

    newton_y(c, b, d)
}

/// Shared Newton loop for `y = (y^2 + c) / (2y + b - d)`, used by both
/// [`compute_y`] and [`compute_y_given_d`].
fn newton_y(c: Uint256, b: Uint256, d: Uint256) -> Result<Uint256, PoolError> {
    let mut y = d;
    for _ in 0..MAX_ITER {
        let y_prev = y;
        let numerator = y.checked_mul(y)?.checked_add(c)?;
        let denominator = Uint256::from(2u8)
            .checked_mul(y)?
            .checked_add(b)?
            .checked_sub(d)?;
        y = numerator.checked_div(denominator)?;

        if abs_diff(y, y_prev) <= Uint256::one() {
            return Ok(y);
        }
    }

    Err(PoolError::ConvergenceFailure {})
}

/// Applies the mandatory one-unit safety margin to a raw swap output:
/// `xp[j] - y - 1`, clamped to zero instead of underflowing when `y` lands
/// within one unit of `xp[j]` (a boundary case at 1-unit swaps).
pub fn output_with_margin(xp_j: Uint256, y: Uint256) -> Uint256 {
    match xp_j.checked_sub(y) {
        Ok(raw) if raw > Uint256::one() => raw - Uint256::one(),
        _ => Uint256::zero(),
    }
}
