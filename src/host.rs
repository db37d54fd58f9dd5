//! Capabilities the engine consumes from its execution environment.
//!
//! The engine never reaches the chain directly. Everything it reads or moves
//! goes through these traits, so the same engine runs against a live adapter
//! or an in-memory chain.

use alloy_primitives::{Address, U256};

use crate::errors::EngineResult;
use crate::models::TradeRequest;

/// Fungible token balances.
pub trait TokenLedger {
    fn balance_of(&self, token: Address, holder: Address) -> U256;

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> EngineResult<()>;
}

/// Read side of a concentrated-liquidity pool.
pub trait TickOracle {
    fn current_tick(&self, pool: Address) -> EngineResult<i32>;

    /// Cumulative tick sums at each of `seconds_agos`, in the same order.
    fn observe(&self, pool: Address, seconds_agos: [u32; 2]) -> EngineResult<[i64; 2]>;
}

/// Write side of the exchange.
pub trait SwapVenue {
    /// Executes the trade and returns the output delivered to `request.recipient`.
    /// Stops early when the sqrt price limit is reached instead of failing.
    fn trade(&mut self, request: &TradeRequest) -> EngineResult<U256>;
}

/// First-generation custodians: the recipient is passed explicitly.
pub trait LegacyFeeCustodian {
    fn collect_fees(
        &mut self,
        custodian: Address,
        recipient: Address,
        position_id: U256,
    ) -> EngineResult<()>;

    fn collect_fees_batch(
        &mut self,
        collector: Address,
        recipient: Address,
        positions: &[(Address, U256)],
    ) -> EngineResult<()>;
}

/// Second-generation custodians: fees go to the address registered with the custodian.
pub trait RewardFeeCustodian {
    fn collect_rewards(&mut self, custodian: Address, position_id: U256) -> EngineResult<()>;

    fn collect_rewards_batch(
        &mut self,
        custodian: Address,
        position_ids: &[U256],
    ) -> EngineResult<()>;
}

/// State capture used to roll an action back.
pub trait Checkpoint {
    type Snapshot;

    fn checkpoint(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot);
}

/// Everything a buyback action touches.
pub trait Host:
    TokenLedger + TickOracle + SwapVenue + LegacyFeeCustodian + RewardFeeCustodian + Checkpoint
{
}

impl<T> Host for T where
    T: TokenLedger + TickOracle + SwapVenue + LegacyFeeCustodian + RewardFeeCustodian + Checkpoint
{
}
