use cosmwasm_std::Uint256;

use crate::error::PoolError;
use crate::math::N;

/// Denominator trading and admin fees are expressed against.
pub const FEE_DENOM: u128 = 10_000_000_000;

/// Upper bound on the trading fee (0.5%), expressed as a numerator over [`FEE_DENOM`].
pub const MAX_FEE: u64 = 5_000_000_000;

/// Upper bound on the admin's share of collected fees (10%).
pub const MAX_ADMIN_FEE: u64 = 10_000_000_000;

/// Trading-fee and liquidity-imbalance-fee arithmetic, all in canonical units.
pub struct FeeMath;

impl FeeMath {
    /// The trading-fee portion of a raw canonical swap output.
    pub fn trading_fee(dy_raw: Uint256, fee: u64) -> Result<Uint256, PoolError> {
        dy_raw
            .checked_mul(Uint256::from(fee))?
            .checked_div(Uint256::from(FEE_DENOM))
            .map_err(Into::into)
    }

    /// The admin's cut of a fee amount already collected.
    pub fn admin_portion(fee_amount: Uint256, admin_fee: u64) -> Result<Uint256, PoolError> {
        fee_amount
            .checked_mul(Uint256::from(admin_fee))?
            .checked_div(Uint256::from(FEE_DENOM))
            .map_err(Into::into)
    }

    /// The elevated per-asset fee rate applied to imbalanced deposits and
    /// withdrawals: `fee * N / (4 * (N - 1))`.
    pub fn imbalance_fee_rate(fee: u64) -> Result<Uint256, PoolError> {
        Uint256::from(fee)
            .checked_mul(Uint256::from(N as u128))?
            .checked_div(Uint256::from(4 * (N as u128 - 1)))
            .map_err(Into::into)
    }

    /// The imbalance fee charged against one asset's deviation from its ideal,
    /// proportionally-rebalanced value.
    pub fn imbalance_fee(rate: Uint256, deviation: Uint256) -> Result<Uint256, PoolError> {
        rate.checked_mul(deviation)?
            .checked_div(Uint256::from(FEE_DENOM))
            .map_err(Into::into)
    }
}
