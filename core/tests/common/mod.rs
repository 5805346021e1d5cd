use std::collections::HashMap;

use cosmwasm_std::Uint128;
use tripeg_stableswap_core::{AssetLedger, PoolError};

/// In-memory stand-in for real token custody: one balance table per asset
/// plus a share ledger, keyed by opaque string accounts. Lets pool tests
/// exercise `PoolEngine` without any on-chain context.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    balances: HashMap<(u8, String), Uint128>,
    shares: HashMap<String, Uint128>,
    share_supply: Uint128,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `account` with `amount` of asset `asset` outside of any pool
    /// operation, as if a prior transfer had already settled.
    pub fn fund(&mut self, asset: u8, account: &str, amount: Uint128) {
        *self
            .balances
            .entry((asset, account.to_string()))
            .or_insert_with(Uint128::zero) += amount;
    }

    pub fn share_balance(&self, account: &str) -> Uint128 {
        *self.shares.get(account).unwrap_or(&Uint128::zero())
    }
}

impl AssetLedger for MockLedger {
    type Account = String;
    type Asset = u8;

    fn move_in(
        &mut self,
        asset: &Self::Asset,
        from: &Self::Account,
        amount: Uint128,
    ) -> Result<(), PoolError> {
        let from_key = (*asset, from.clone());
        let from_balance = self.balances.entry(from_key).or_insert_with(Uint128::zero);
        *from_balance = from_balance.checked_sub(amount)?;

        let pool_key = (*asset, POOL.to_string());
        let pool_balance = self.balances.entry(pool_key).or_insert_with(Uint128::zero);
        *pool_balance = pool_balance.checked_add(amount)?;
        Ok(())
    }

    fn move_out(
        &mut self,
        asset: &Self::Asset,
        to: &Self::Account,
        amount: Uint128,
    ) -> Result<(), PoolError> {
        let pool_key = (*asset, POOL.to_string());
        let pool_balance = self.balances.entry(pool_key).or_insert_with(Uint128::zero);
        *pool_balance = pool_balance.checked_sub(amount)?;

        let to_key = (*asset, to.clone());
        let to_balance = self.balances.entry(to_key).or_insert_with(Uint128::zero);
        *to_balance = to_balance.checked_add(amount)?;
        Ok(())
    }

    fn balance_of(&self, asset: &Self::Asset, who: &Self::Account) -> Result<Uint128, PoolError> {
        Ok(*self
            .balances
            .get(&(*asset, who.clone()))
            .unwrap_or(&Uint128::zero()))
    }

    fn mint_shares(&mut self, to: &Self::Account, amount: Uint128) -> Result<(), PoolError> {
        let balance = self.shares.entry(to.clone()).or_insert_with(Uint128::zero);
        *balance = balance.checked_add(amount)?;
        self.share_supply = self.share_supply.checked_add(amount)?;
        Ok(())
    }

    fn burn_shares(&mut self, from: &Self::Account, amount: Uint128) -> Result<(), PoolError> {
        let balance = self
            .shares
            .entry(from.clone())
            .or_insert_with(Uint128::zero);
        *balance = balance.checked_sub(amount)?;
        self.share_supply = self.share_supply.checked_sub(amount)?;
        Ok(())
    }

    fn share_supply(&self) -> Result<Uint128, PoolError> {
        Ok(self.share_supply)
    }
}

/// Pool custody here is tracked implicitly by the `MockLedger`'s own
/// `(asset, account)` balance table: a pool account is just another account.
pub const POOL: &str = "pool";
pub const OWNER: &str = "owner";
pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

/// The three fixed assets, by native decimals: one 18-decimal asset (index 0)
/// and two 6-decimal assets (indices 1 and 2), matching the pool's required
/// composition.
pub const ASSET_18: u8 = 0;
pub const ASSET_6_A: u8 = 1;
pub const ASSET_6_B: u8 = 2;
