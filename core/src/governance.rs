use crate::error::PoolError;
use crate::fee::{MAX_ADMIN_FEE, MAX_FEE};

/// Timelock for governance-controlled parameter changes: 3 days.
pub const ADMIN_ACTIONS_DELAY: u64 = 3 * 86_400;

/// Time-locked commit/apply schedule for the trading and admin fees.
///
/// `deadline == 0` means no change is pending. A pending change is neither
/// observable in the active fee nor re-committable until it is applied; there
/// is no revocation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GovernanceSchedule {
    pub deadline: u64,
    pub pending_fee: u64,
    pub pending_admin_fee: u64,
}

impl GovernanceSchedule {
    /// Commits a new `(fee, admin_fee)` pair, to become active once [`Self::apply`]
    /// is called no sooner than [`ADMIN_ACTIONS_DELAY`] seconds from `now`.
    pub fn commit(&mut self, new_fee: u64, new_admin_fee: u64, now: u64) -> Result<(), PoolError> {
        if self.deadline != 0 {
            return Err(PoolError::PendingActionExists {});
        }
        if new_fee > MAX_FEE || new_admin_fee > MAX_ADMIN_FEE {
            return Err(PoolError::InvalidConfig(
                "fee or admin_fee exceeds the allowed cap".into(),
            ));
        }
        self.deadline = now + ADMIN_ACTIONS_DELAY;
        self.pending_fee = new_fee;
        self.pending_admin_fee = new_admin_fee;
        Ok(())
    }

    /// Applies the pending change once its deadline has passed, returning the
    /// newly active `(fee, admin_fee)` pair for the caller to store.
    pub fn apply(&mut self, now: u64) -> Result<(u64, u64), PoolError> {
        if self.deadline == 0 {
            return Err(PoolError::NoPendingAction {});
        }
        if now < self.deadline {
            return Err(PoolError::DelayNotMet {});
        }
        let applied = (self.pending_fee, self.pending_admin_fee);
        self.deadline = 0;
        Ok(applied)
    }
}
