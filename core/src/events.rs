use cosmwasm_std::{Uint128, Uint256};

use crate::math::N;

/// Observable outcome of a state-mutating [`crate::engine::PoolEngine`]
/// operation, returned to the caller the way a CosmWasm contract would
/// attach `attr(...)` pairs to its `Response` — this core has no transaction
/// context of its own to attach them to, so the event is the return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent<Account> {
    TokenExchange {
        buyer: Account,
        offer_index: usize,
        offer_amount: Uint128,
        ask_index: usize,
        return_amount: Uint128,
    },
    AddLiquidity {
        provider: Account,
        amounts: [Uint128; N],
        fees: [Uint128; N],
        invariant: Uint256,
        new_supply: Uint128,
    },
    RemoveLiquidity {
        provider: Account,
        amounts: [Uint128; N],
        new_supply: Uint128,
    },
    RemoveLiquidityImbalance {
        provider: Account,
        amounts: [Uint128; N],
        fees: [Uint128; N],
        invariant: Uint256,
        new_supply: Uint128,
    },
    RemoveLiquidityOne {
        provider: Account,
        index: usize,
        amount: Uint128,
    },
    RampA {
        old_a: u64,
        new_a: u64,
        initial_time: u64,
        future_time: u64,
    },
    StopRampA {
        amp: u64,
        time: u64,
    },
    CommitNewFee {
        deadline: u64,
        fee: u64,
        admin_fee: u64,
    },
    NewFee {
        fee: u64,
        admin_fee: u64,
    },
}
