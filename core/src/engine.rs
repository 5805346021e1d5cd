use cosmwasm_std::{Uint128, Uint256};
use itertools::izip;

use crate::error::PoolError;
use crate::events::PoolEvent;
use crate::fee::FeeMath;
use crate::ledger::AssetLedger;
use crate::math::{
    self, compute_d, compute_y, compute_y_given_d, from_canonical, output_with_margin,
    to_canonical, to_canonical_vec, N, PRECISION,
};
use crate::state::{PoolConfig, PoolState};

/// Intermediate result of distributing the §4.3 liquidity-imbalance fee
/// across a deposit or a withdrawal. Shared by [`PoolEngine::add_liquidity`],
/// [`PoolEngine::remove_liquidity_imbalance`] and [`PoolEngine::quote_share`]
/// so the fee math is written exactly once.
struct ImbalanceResult {
    d0: Uint256,
    d2: Uint256,
    /// Balances to actually store: `new_bal` with the admin's cut of the
    /// per-asset fee already excluded.
    book_balances: [Uint128; N],
    /// Full per-asset fee charged (admin's cut plus the LP-retained portion),
    /// in native units, reported on the [`PoolEvent`].
    fees: [Uint128; N],
}

/// Orchestrates deposit, withdrawal, swap, and governance operations over a
/// fixed three-asset StableSwap pool. Generic over the [`AssetLedger`]
/// implementation that actually custodies tokens and mints/burns shares —
/// this type never inspects token identities or performs I/O itself.
pub struct PoolEngine<L: AssetLedger> {
    pub config: PoolConfig,
    pub state: PoolState,
    ledger: L,
    assets: [L::Asset; N],
    owner: L::Account,
    /// The pool's own account handle, used only to read back its true
    /// custody balance for admin-fee accounting.
    pool_account: L::Account,
    busy: bool,
}

impl<L: AssetLedger> PoolEngine<L> {
    pub fn new(
        config: PoolConfig,
        state: PoolState,
        ledger: L,
        assets: [L::Asset; N],
        owner: L::Account,
        pool_account: L::Account,
    ) -> Self {
        Self {
            config,
            state,
            ledger,
            assets,
            owner,
            pool_account,
            busy: false,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Runs `f` under the re-entrancy guard: nested entry through a
    /// callback-capable [`AssetLedger`] fails fast with [`PoolError::Reentrancy`]
    /// instead of being allowed to observe or mutate half-applied state.
    fn guarded<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        if self.busy {
            return Err(PoolError::Reentrancy {});
        }
        self.busy = true;
        let result = f(self);
        self.busy = false;
        result
    }

    fn require_owner(&self, caller: &L::Account) -> Result<(), PoolError> {
        if *caller != self.owner {
            return Err(PoolError::Unauthorized {});
        }
        Ok(())
    }

    fn require_not_killed(&self) -> Result<(), PoolError> {
        if self.state.killed {
            return Err(PoolError::Killed {});
        }
        Ok(())
    }

    fn effective_amp(&self, now: u64) -> u64 {
        self.state.amp_schedule.effective(now)
    }

    fn canonical_balances(&self) -> [Uint256; N] {
        to_canonical_vec(&self.state.balances, &self.config.mul)
    }

    /// Shared §4.3 fee distribution for a deposit or withdrawal: `old_bal` is
    /// the balance vector before the operation, `new_bal` is the target
    /// vector before any fee is applied. Returns `D0`/`D2` and the balances
    /// and per-asset fees to actually book.
    fn imbalance_adjustment(
        &self,
        old_bal: [Uint128; N],
        new_bal: [Uint128; N],
        amp: u64,
        supply: Uint128,
    ) -> Result<ImbalanceResult, PoolError> {
        let old_xp = to_canonical_vec(&old_bal, &self.config.mul);
        let new_xp = to_canonical_vec(&new_bal, &self.config.mul);
        let d1 = compute_d(&new_xp, amp)?;

        if supply.is_zero() {
            return Ok(ImbalanceResult {
                d0: Uint256::zero(),
                d2: d1,
                book_balances: new_bal,
                fees: [Uint128::zero(); N],
            });
        }

        let d0 = compute_d(&old_xp, amp)?;
        let rate = FeeMath::imbalance_fee_rate(self.state.fee)?;

        let mut book_xp = new_xp;
        let mut book_balances = new_bal;
        let mut fees = [Uint128::zero(); N];
        let per_asset = izip!(old_xp.iter(), new_xp.iter(), self.config.mul.iter());
        for (i, (old_xp_i, new_xp_i, mul_i)) in per_asset.enumerate() {
            let ideal_i = d1.checked_mul(*old_xp_i)?.checked_div(d0)?;
            let deviation = math::abs_diff(*new_xp_i, ideal_i);
            let fee_i = FeeMath::imbalance_fee(rate, deviation)?;
            let admin_fee_i = FeeMath::admin_portion(fee_i, self.state.admin_fee)?;

            book_xp[i] = new_xp_i.checked_sub(fee_i)?;
            let stored_xp_i = new_xp_i.checked_sub(admin_fee_i)?;
            book_balances[i] = from_canonical(stored_xp_i, *mul_i)?;
            fees[i] = from_canonical(fee_i, *mul_i)?;
        }
        let d2 = compute_d(&book_xp, amp)?;

        Ok(ImbalanceResult {
            d0,
            d2,
            book_balances,
            fees,
        })
    }

    /// Deposits `amounts` (native units, one per asset) and mints pool
    /// shares. The very first deposit into an empty pool must supply every
    /// asset and mints `D1` shares directly; later deposits pay the §4.3
    /// imbalance fee on any deviation from the proportional composition.
    pub fn add_liquidity(
        &mut self,
        caller: L::Account,
        amounts: [Uint128; N],
        min_mint: Uint128,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_not_killed()?;
            let supply = engine.ledger.share_supply()?;

            if supply.is_zero() && amounts.iter().any(Uint128::is_zero) {
                return Err(PoolError::InitialDepositIncomplete {});
            }

            let old_bal = engine.state.balances;
            let mut new_bal = old_bal;
            for i in 0..N {
                if !amounts[i].is_zero() {
                    engine
                        .ledger
                        .move_in(&engine.assets[i], &caller, amounts[i])?;
                }
                new_bal[i] = old_bal[i].checked_add(amounts[i])?;
            }

            let amp = engine.effective_amp(now);
            let adj = engine.imbalance_adjustment(old_bal, new_bal, amp, supply)?;
            if adj.d2 <= adj.d0 {
                return Err(PoolError::InvariantDidNotGrow {});
            }

            let mint = if supply.is_zero() {
                Uint128::try_from(adj.d2)?
            } else {
                let supply_wide = Uint256::from(supply);
                let minted = supply_wide
                    .checked_mul(adj.d2.checked_sub(adj.d0)?)?
                    .checked_div(adj.d0)?;
                Uint128::try_from(minted)?
            };
            if mint < min_mint {
                return Err(PoolError::Slippage {});
            }

            engine.state.balances = adj.book_balances;
            engine.ledger.mint_shares(&caller, mint)?;
            let new_supply = supply.checked_add(mint)?;

            Ok(PoolEvent::AddLiquidity {
                provider: caller,
                amounts,
                fees: adj.fees,
                invariant: adj.d2,
                new_supply,
            })
        })
    }

    /// Proportional withdrawal: burns `shares` and returns that share of each
    /// asset's balance. Permitted even while the pool is killed — it is the
    /// last-resort exit the kill switch leaves open.
    pub fn remove_liquidity(
        &mut self,
        caller: L::Account,
        shares: Uint128,
        min_amounts: [Uint128; N],
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            let supply = engine.ledger.share_supply()?;
            if shares.is_zero() || shares > supply {
                return Err(PoolError::ZeroAmount {});
            }

            let mut amounts = [Uint128::zero(); N];
            for i in 0..N {
                let amount = engine.state.balances[i].multiply_ratio(shares, supply);
                if amount < min_amounts[i] {
                    return Err(PoolError::InsufficientOutput {});
                }
                engine.state.balances[i] = engine.state.balances[i].checked_sub(amount)?;
                amounts[i] = amount;
            }

            for i in 0..N {
                if !amounts[i].is_zero() {
                    engine
                        .ledger
                        .move_out(&engine.assets[i], &caller, amounts[i])?;
                }
            }
            engine.ledger.burn_shares(&caller, shares)?;
            let new_supply = supply.checked_sub(shares)?;

            Ok(PoolEvent::RemoveLiquidity {
                provider: caller,
                amounts,
                new_supply,
            })
        })
    }

    /// Withdraws an exact, possibly imbalanced, set of native-unit `amounts`,
    /// burning at most `max_burn` shares. Refused while killed.
    pub fn remove_liquidity_imbalance(
        &mut self,
        caller: L::Account,
        amounts: [Uint128; N],
        max_burn: Uint128,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_not_killed()?;
            let supply = engine.ledger.share_supply()?;
            if supply.is_zero() {
                return Err(PoolError::ZeroAmount {});
            }

            let old_bal = engine.state.balances;
            let mut new_bal = old_bal;
            for i in 0..N {
                new_bal[i] = old_bal[i].checked_sub(amounts[i])?;
            }

            let amp = engine.effective_amp(now);
            let adj = engine.imbalance_adjustment(old_bal, new_bal, amp, supply)?;
            if adj.d2 >= adj.d0 {
                return Err(PoolError::InvariantDidNotGrow {});
            }

            let supply_wide = Uint256::from(supply);
            let burn_wide = supply_wide
                .checked_mul(adj.d0.checked_sub(adj.d2)?)?
                .checked_div(adj.d0)?;
            let burn = Uint128::try_from(burn_wide)?;
            if burn > max_burn {
                return Err(PoolError::Slippage {});
            }

            engine.state.balances = adj.book_balances;
            for i in 0..N {
                if !amounts[i].is_zero() {
                    engine
                        .ledger
                        .move_out(&engine.assets[i], &caller, amounts[i])?;
                }
            }
            engine.ledger.burn_shares(&caller, burn)?;
            let new_supply = supply.checked_sub(burn)?;

            Ok(PoolEvent::RemoveLiquidityImbalance {
                provider: caller,
                amounts,
                fees: adj.fees,
                invariant: adj.d2,
                new_supply,
            })
        })
    }

    /// Burns `shares` and withdraws their full value in a single asset `i`.
    /// Refused while killed.
    pub fn remove_liquidity_one_coin(
        &mut self,
        caller: L::Account,
        shares: Uint128,
        i: usize,
        min_amount: Uint128,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_not_killed()?;
            if i >= N {
                return Err(PoolError::InvalidIndex {});
            }
            let supply = engine.ledger.share_supply()?;
            if shares.is_zero() || shares > supply {
                return Err(PoolError::ZeroAmount {});
            }

            let amp = engine.effective_amp(now);
            let old_xp = engine.canonical_balances();
            let d0 = compute_d(&old_xp, amp)?;
            let d1 = d0.checked_sub(
                d0.checked_mul(Uint256::from(shares))?
                    .checked_div(Uint256::from(supply))?,
            )?;

            let new_xp_i = compute_y_given_d(i, d1, &old_xp, amp)?;
            let reduction = math::abs_diff(old_xp[i], new_xp_i);

            let ideal_i = d1.checked_mul(old_xp[i])?.checked_div(d0)?;
            let post_withdraw_i = old_xp[i].checked_sub(reduction).unwrap_or(Uint256::zero());
            let deviation = math::abs_diff(post_withdraw_i, ideal_i);
            let rate = FeeMath::imbalance_fee_rate(engine.state.fee)?;
            let fee = FeeMath::imbalance_fee(rate, deviation)?;
            let admin_fee = FeeMath::admin_portion(fee, engine.state.admin_fee)?;

            let payout_canonical = reduction.checked_sub(fee)?;
            let amount = from_canonical(payout_canonical, engine.config.mul[i])?;
            if amount < min_amount {
                return Err(PoolError::Slippage {});
            }

            let admin_fee_native = from_canonical(admin_fee, engine.config.mul[i])?;
            engine.state.balances[i] = engine.state.balances[i]
                .checked_sub(amount)?
                .checked_sub(admin_fee_native)?;

            engine.ledger.move_out(&engine.assets[i], &caller, amount)?;
            engine.ledger.burn_shares(&caller, shares)?;

            Ok(PoolEvent::RemoveLiquidityOne {
                provider: caller,
                index: i,
                amount,
            })
        })
    }

    /// Pure view: the native-unit output of exchanging `dx` of asset `i` for
    /// asset `j`, net of the trading fee, with the mandatory one-unit safety
    /// margin applied. Computed from a single snapshot of balances and amp.
    pub fn quote(&self, i: usize, j: usize, dx: Uint128, now: u64) -> Result<Uint128, PoolError> {
        if i == j {
            return Err(PoolError::SameCoin {});
        }
        if i >= N || j >= N {
            return Err(PoolError::InvalidIndex {});
        }
        let amp = self.effective_amp(now);
        let xp = self.canonical_balances();
        let x_new = xp[i].checked_add(to_canonical(dx, self.config.mul[i]))?;
        let y = compute_y(i, j, x_new, &xp, amp)?;
        let dy_raw = output_with_margin(xp[j], y);
        let trading_fee = FeeMath::trading_fee(dy_raw, self.state.fee)?;
        let net = dy_raw.checked_sub(trading_fee)?;
        from_canonical(net, self.config.mul[j])
    }

    /// Pure view approximating the share delta a deposit (`is_deposit =
    /// true`) or an exact-amounts withdrawal (`is_deposit = false`) of
    /// `amounts` would produce, without moving any asset or mutating state.
    pub fn quote_share(
        &self,
        amounts: [Uint128; N],
        is_deposit: bool,
        now: u64,
    ) -> Result<Uint128, PoolError> {
        let supply = self.ledger.share_supply()?;
        let old_bal = self.state.balances;
        let mut new_bal = old_bal;
        for i in 0..N {
            new_bal[i] = if is_deposit {
                old_bal[i].checked_add(amounts[i])?
            } else {
                old_bal[i].checked_sub(amounts[i])?
            };
        }

        let amp = self.effective_amp(now);
        let adj = self.imbalance_adjustment(old_bal, new_bal, amp, supply)?;

        if supply.is_zero() {
            return Uint128::try_from(adj.d2).map_err(Into::into);
        }
        let supply_wide = Uint256::from(supply);
        let delta = if is_deposit {
            supply_wide
                .checked_mul(adj.d2.checked_sub(adj.d0)?)?
                .checked_div(adj.d0)?
        } else {
            supply_wide
                .checked_mul(adj.d0.checked_sub(adj.d2)?)?
                .checked_div(adj.d0)?
        };
        Uint128::try_from(delta).map_err(Into::into)
    }

    /// Executes a swap of `dx` of asset `i` for at least `min_dy` of asset
    /// `j`, paying the trading fee and routing the admin's share to the
    /// admin-fee reserve (the custody/booked-balance gap `withdraw_admin_fees`
    /// later sweeps).
    pub fn exchange(
        &mut self,
        caller: L::Account,
        i: usize,
        j: usize,
        dx: Uint128,
        min_dy: Uint128,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_not_killed()?;
            if i == j {
                return Err(PoolError::SameCoin {});
            }
            if i >= N || j >= N {
                return Err(PoolError::InvalidIndex {});
            }
            if dx.is_zero() {
                return Err(PoolError::ZeroAmount {});
            }

            engine.ledger.move_in(&engine.assets[i], &caller, dx)?;

            let amp = engine.effective_amp(now);
            let xp = engine.canonical_balances();
            let x_new = xp[i].checked_add(to_canonical(dx, engine.config.mul[i]))?;
            let y = compute_y(i, j, x_new, &xp, amp)?;
            let dy_raw = output_with_margin(xp[j], y);

            let trading_fee = FeeMath::trading_fee(dy_raw, engine.state.fee)?;
            let admin_fee = FeeMath::admin_portion(trading_fee, engine.state.admin_fee)?;
            let net = dy_raw.checked_sub(trading_fee)?;

            let dy_native = from_canonical(net, engine.config.mul[j])?;
            if dy_native < min_dy {
                return Err(PoolError::Slippage {});
            }
            let admin_fee_native = from_canonical(admin_fee, engine.config.mul[j])?;

            engine.state.balances[i] = engine.state.balances[i].checked_add(dx)?;
            engine.state.balances[j] = engine.state.balances[j]
                .checked_sub(dy_native)?
                .checked_sub(admin_fee_native)?;

            engine
                .ledger
                .move_out(&engine.assets[j], &caller, dy_native)?;

            Ok(PoolEvent::TokenExchange {
                buyer: caller,
                offer_index: i,
                offer_amount: dx,
                ask_index: j,
                return_amount: dy_native,
            })
        })
    }

    /// `D * PRECISION / supply`, the monotone non-decreasing measure of
    /// share value (spec invariant I1). Zero for an empty pool.
    pub fn virtual_price(&self, now: u64) -> Result<Uint256, PoolError> {
        let supply = self.ledger.share_supply()?;
        if supply.is_zero() {
            return Ok(Uint256::zero());
        }
        let amp = self.effective_amp(now);
        let d = compute_d(&self.canonical_balances(), amp)?;
        d.checked_mul(Uint256::from(PRECISION))?
            .checked_div(Uint256::from(supply))
            .map_err(Into::into)
    }

    /// The difference between the ledger's true custody balance and the
    /// pool's booked balance for asset `i`: accrued, unswept admin fees.
    pub fn admin_balance(&self, i: usize) -> Result<Uint128, PoolError> {
        if i >= N {
            return Err(PoolError::InvalidIndex {});
        }
        let custody = self
            .ledger
            .balance_of(&self.assets[i], &self.pool_account)?;
        Ok(custody.saturating_sub(self.state.balances[i]))
    }

    /// Owner-only: sweeps each asset's accrued admin-fee reserve to the owner.
    pub fn withdraw_admin_fees(&mut self, caller: L::Account) -> Result<(), PoolError> {
        self.guarded(|engine| {
            engine.require_owner(&caller)?;
            engine.require_not_killed()?;
            for i in 0..N {
                let amount = engine.admin_balance(i)?;
                if !amount.is_zero() {
                    engine.ledger.move_out(&engine.assets[i], &caller, amount)?;
                }
            }
            Ok(())
        })
    }

    /// Owner-only: begins ramping `A` toward `new_a`, completing at
    /// `future_time`.
    pub fn ramp_a(
        &mut self,
        caller: L::Account,
        new_a: u64,
        future_time: u64,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_owner(&caller)?;
            engine.require_not_killed()?;
            let old_a = engine.effective_amp(now);
            engine.state.amp_schedule.ramp_to(new_a, future_time, now)?;
            Ok(PoolEvent::RampA {
                old_a,
                new_a,
                initial_time: now,
                future_time,
            })
        })
    }

    /// Owner-only: pins `A` at its current effective value and cancels any
    /// ramp in flight.
    pub fn stop_ramp_a(
        &mut self,
        caller: L::Account,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_owner(&caller)?;
            engine.state.amp_schedule.stop(now);
            Ok(PoolEvent::StopRampA {
                amp: engine.state.amp_schedule.future_a,
                time: now,
            })
        })
    }

    /// Owner-only: commits a new `(fee, admin_fee)` pair, applyable after the
    /// governance timelock.
    pub fn commit_fee(
        &mut self,
        caller: L::Account,
        new_fee: u64,
        new_admin_fee: u64,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_owner(&caller)?;
            engine
                .state
                .gov_schedule
                .commit(new_fee, new_admin_fee, now)?;
            Ok(PoolEvent::CommitNewFee {
                deadline: engine.state.gov_schedule.deadline,
                fee: new_fee,
                admin_fee: new_admin_fee,
            })
        })
    }

    /// Owner-only: applies a previously committed fee change once its
    /// timelock deadline has passed.
    pub fn apply_fee(
        &mut self,
        caller: L::Account,
        now: u64,
    ) -> Result<PoolEvent<L::Account>, PoolError> {
        self.guarded(|engine| {
            engine.require_owner(&caller)?;
            let (fee, admin_fee) = engine.state.gov_schedule.apply(now)?;
            engine.state.fee = fee;
            engine.state.admin_fee = admin_fee;
            Ok(PoolEvent::NewFee { fee, admin_fee })
        })
    }

    /// Owner-only kill switch: refuses deposits, swaps, imbalanced/one-coin
    /// withdrawals, and admin-fee sweeps. Proportional withdrawal remains
    /// open as a last-resort exit.
    pub fn kill(&mut self, caller: L::Account) -> Result<(), PoolError> {
        self.guarded(|engine| {
            engine.require_owner(&caller)?;
            engine.state.killed = true;
            Ok(())
        })
    }

    /// Owner-only: clears the kill switch.
    pub fn unkill(&mut self, caller: L::Account) -> Result<(), PoolError> {
        self.guarded(|engine| {
            engine.require_owner(&caller)?;
            engine.state.killed = false;
            Ok(())
        })
    }
}
