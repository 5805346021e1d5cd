use cosmwasm_std::Uint128;

use crate::error::PoolError;

/// Abstract token-custody and share-unit authority the core consumes.
///
/// The engine never inspects token addresses or performs network I/O itself;
/// every balance movement and every share mint/burn is delegated here. An
/// implementation backed by a real custody system may re-enter the engine
/// from within these calls (e.g. a callback-capable transfer) — the engine's
/// re-entrancy guard, not this trait, is responsible for rejecting that.
pub trait AssetLedger {
    /// Opaque account identifier (caller, receiver, owner, ...).
    type Account: PartialEq + Clone;
    /// Opaque per-asset identifier.
    type Asset: Clone;

    /// Transfers `amount` of `asset` from `from` into the pool's custody.
    /// Must either fully succeed or fail without side effects.
    fn move_in(
        &mut self,
        asset: &Self::Asset,
        from: &Self::Account,
        amount: Uint128,
    ) -> Result<(), PoolError>;

    /// Transfers `amount` of `asset` out of the pool's custody to `to`.
    fn move_out(
        &mut self,
        asset: &Self::Asset,
        to: &Self::Account,
        amount: Uint128,
    ) -> Result<(), PoolError>;

    /// The true custody balance of `asset` held for `who`, used for admin-fee
    /// accounting (the excess over the pool's booked `balance[i]`).
    fn balance_of(&self, asset: &Self::Asset, who: &Self::Account) -> Result<Uint128, PoolError>;

    /// Mints `amount` share units to `to`.
    fn mint_shares(&mut self, to: &Self::Account, amount: Uint128) -> Result<(), PoolError>;

    /// Burns `amount` share units from `from`.
    fn burn_shares(&mut self, from: &Self::Account, amount: Uint128) -> Result<(), PoolError>;

    /// The current total share-unit supply.
    fn share_supply(&self) -> Result<Uint128, PoolError>;
}
