use cosmwasm_std::{Uint128, Uint256};

use crate::amp::{AmpSchedule, MAX_A};
use crate::error::PoolError;
use crate::fee::{MAX_ADMIN_FEE, MAX_FEE};
use crate::governance::GovernanceSchedule;
use crate::math::N;

/// Immutable, per-asset configuration fixed at pool construction: each
/// asset's precision multiplier into canonical (18-decimal) units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub mul: [Uint256; N],
}

impl PoolConfig {
    /// Builds the precision multipliers from each asset's native decimal
    /// count. The multiplier for an 18-decimal asset is `1`; for a 6-decimal
    /// asset it is `10^12`.
    pub fn from_decimals(decimals: [u8; N]) -> Result<Self, PoolError> {
        let mut mul = [Uint256::one(); N];
        for (i, d) in decimals.iter().enumerate() {
            if *d > 18 {
                return Err(PoolError::InvalidConfig(format!(
                    "asset {i} decimals {d} exceeds canonical precision 18"
                )));
            }
            mul[i] = Uint256::from(10u128.pow((18 - d) as u32));
        }
        Ok(Self { mul })
    }
}

/// Mutable pool state: balances, the amplification ramp, the fee governance
/// schedule, active fees, and the kill switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub balances: [Uint128; N],
    pub fee: u64,
    pub admin_fee: u64,
    pub amp_schedule: AmpSchedule,
    pub gov_schedule: GovernanceSchedule,
    pub killed: bool,
}

impl PoolState {
    /// Constructs a fresh, empty pool. Validates `initial_a`, `fee`, and
    /// `admin_fee` against their caps (spec §6 constructor configuration).
    pub fn new(initial_a: u64, fee: u64, admin_fee: u64, now: u64) -> Result<Self, PoolError> {
        if initial_a == 0 || initial_a >= MAX_A {
            return Err(PoolError::InvalidConfig(format!(
                "initial_a must be in (0, {MAX_A})"
            )));
        }
        if fee > MAX_FEE {
            return Err(PoolError::InvalidConfig(format!(
                "fee must not exceed {MAX_FEE}"
            )));
        }
        if admin_fee > MAX_ADMIN_FEE {
            return Err(PoolError::InvalidConfig(format!(
                "admin_fee must not exceed {MAX_ADMIN_FEE}"
            )));
        }

        Ok(Self {
            balances: [Uint128::zero(); N],
            fee,
            admin_fee,
            amp_schedule: AmpSchedule::constant(initial_a, now),
            gov_schedule: GovernanceSchedule::default(),
            killed: false,
        })
    }
}
