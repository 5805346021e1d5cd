use cosmwasm_std::{ConversionOverflowError, DivideByZeroError, OverflowError};
use thiserror::Error;

use crate::amp::{MAX_A, MAX_A_CHANGE, MIN_RAMP_TIME};

/// Every way a [`crate::engine::PoolEngine`] operation can refuse to commit.
///
/// Policy is fail-fast and all-or-nothing: raising any of these aborts the
/// operation before any balance, supply, or schedule mutation is applied.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum PoolError {
    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    DivideByZero(#[from] DivideByZeroError),

    #[error("{0}")]
    ConversionOverflow(#[from] ConversionOverflowError),

    #[error("Newton iteration did not converge within the iteration budget")]
    ConvergenceFailure {},

    #[error("Constructor parameters out of bounds: {0}")]
    InvalidConfig(String),

    #[error("Pool is killed")]
    Killed {},

    #[error("Asset index out of range")]
    InvalidIndex {},

    #[error("Offer and ask asset must differ")]
    SameCoin {},

    #[error("Amount must be non-zero")]
    ZeroAmount {},

    #[error("Initial deposit must supply every asset")]
    InitialDepositIncomplete {},

    #[error("Invariant did not grow after deposit")]
    InvariantDidNotGrow {},

    #[error("Result violates the caller's slippage bound")]
    Slippage {},

    #[error("Withdrawal amount is below the caller's floor")]
    InsufficientOutput {},

    #[error("Caller is not authorized for this operation")]
    Unauthorized {},

    #[error("Amp ramp requested too soon after the last change (minimum {} seconds)", MIN_RAMP_TIME)]
    RampTooSoon {},

    #[error(
        "Amp ramp rate exceeds the allowed {}x change per ramp, or exceeds the hard cap of {}",
        MAX_A_CHANGE,
        MAX_A
    )]
    RampTooFast {},

    #[error("A fee change is already pending; apply or let it lapse before committing another")]
    PendingActionExists {},

    #[error("No fee change is pending")]
    NoPendingAction {},

    #[error("Pending fee change cannot be applied before its timelock deadline")]
    DelayNotMet {},

    #[error("Nested entry into a state-mutating operation")]
    Reentrancy {},
}
