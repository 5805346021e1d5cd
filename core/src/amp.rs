use crate::error::PoolError;

/// Hard ceiling on the amplification coefficient.
pub const MAX_A: u64 = 1_000_000;

/// Maximum allowed ratio between an old and a newly requested amplification.
pub const MAX_A_CHANGE: u64 = 10;

/// Minimum time an amp ramp must span, and the minimum cooldown between ramps.
pub const MIN_RAMP_TIME: u64 = 86_400;

/// Linear interpolation schedule for the amplification coefficient.
///
/// When no ramp is in flight, `initial_a == future_a` and both timestamps equal
/// the most recent `ramp_to`/`stop` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmpSchedule {
    pub initial_a: u64,
    pub future_a: u64,
    pub initial_time: u64,
    pub future_time: u64,
}

impl AmpSchedule {
    /// A schedule pinned at a constant `a`, as produced by pool construction.
    pub fn constant(a: u64, now: u64) -> Self {
        Self {
            initial_a: a,
            future_a: a,
            initial_time: now,
            future_time: now,
        }
    }

    /// The effective amplification at time `now`: `future_a` once `now` reaches
    /// `future_time`, otherwise the floor-divided linear interpolation between
    /// `initial_a` and `future_a` over `[initial_time, future_time]`.
    pub fn effective(&self, now: u64) -> u64 {
        if now >= self.future_time {
            return self.future_a;
        }
        let elapsed = (now - self.initial_time) as u128;
        let span = (self.future_time - self.initial_time) as u128;
        if self.future_a > self.initial_a {
            let range = (self.future_a - self.initial_a) as u128;
            self.initial_a + (range * elapsed / span) as u64
        } else {
            let range = (self.initial_a - self.future_a) as u128;
            self.initial_a - (range * elapsed / span) as u64
        }
    }

    /// Begins a ramp toward `new_a`, to complete at `future_time`.
    ///
    /// Requires the prior ramp to have settled for at least [`MIN_RAMP_TIME`],
    /// the new ramp to span at least [`MIN_RAMP_TIME`], and the requested `new_a`
    /// to lie within a factor of [`MAX_A_CHANGE`] of the current effective `A` in
    /// either direction.
    pub fn ramp_to(&mut self, new_a: u64, future_time: u64, now: u64) -> Result<(), PoolError> {
        if now < self.initial_time + MIN_RAMP_TIME {
            return Err(PoolError::RampTooSoon {});
        }
        if future_time < now + MIN_RAMP_TIME {
            return Err(PoolError::RampTooSoon {});
        }
        if new_a == 0 || new_a >= MAX_A {
            return Err(PoolError::RampTooFast {});
        }

        let current = self.effective(now);
        let current = current as u128;
        let new = new_a as u128;
        if new > current * MAX_A_CHANGE as u128 || current > new * MAX_A_CHANGE as u128 {
            return Err(PoolError::RampTooFast {});
        }

        self.initial_a = current as u64;
        self.future_a = new_a;
        self.initial_time = now;
        self.future_time = future_time;
        Ok(())
    }

    /// Pins `A` at its current effective value and cancels any ramp in flight.
    pub fn stop(&mut self, now: u64) {
        let a = self.effective(now);
        self.initial_a = a;
        self.future_a = a;
        self.initial_time = now;
        self.future_time = now;
    }
}
