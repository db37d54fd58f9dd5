//! Shared data structures used throughout the engine.

use alloy_primitives::{Address, U256, address};

/// Fixed destination for burned assets. Nothing ever spends from it.
pub const BURN_ADDRESS: Address = address!("000000000000000000000000000000000000dEaD");

/// Upper bound for any basis-point parameter.
pub const MAX_BPS: u16 = 10_000;

/// Identity and clock of the unit of execution triggering an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller of the entrypoint.
    pub caller: Address,
    /// Principal that originated the whole operation.
    pub originator: Address,
    /// Current timestamp of the execution environment, in seconds.
    pub now: u64,
}

impl CallContext {
    /// Context for a call made directly by an externally owned account.
    pub fn direct(account: Address, now: u64) -> Self {
        Self {
            caller: account,
            originator: account,
            now,
        }
    }
}

/// Current tick alongside the time-weighted mean over the look-back window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceObservation {
    pub current_tick: i32,
    pub reference_mean_tick: i32,
}

impl PriceObservation {
    /// Signed distance of the current tick above the mean.
    pub fn deviation(&self) -> i64 {
        self.current_tick as i64 - self.reference_mean_tick as i64
    }
}

/// Worst acceptable execution price for a buy, as a tick and its Q64.96 sqrt price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLimit {
    pub tick: i32,
    pub sqrt_price_x96: U256,
}

/// Single-pool exact-input trade submitted to the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    pub token_in: Address,
    pub token_out: Address,
    /// Pool fee tier in hundredths of a bip (e.g. 3000 = 0.3%).
    pub fee_tier: u32,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

/// Amounts settled by one bounded swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapFill {
    /// Amount offered to the exchange after applying the per-action cap.
    pub amount_in: U256,
    /// Base asset that actually left custody; lower than `amount_in` on a partial fill.
    pub amount_spent: U256,
    pub amount_out: U256,
}

impl SwapFill {
    pub fn is_partial(&self) -> bool {
        self.amount_spent < self.amount_in
    }
}

/// Outcome of a successful buyback action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuybackReceipt {
    /// Whether fee revenue was harvested as part of this action.
    pub harvested: bool,
    pub amount_in: U256,
    pub amount_spent: U256,
    /// Target asset bought and sent to the burn destination.
    pub amount_out: U256,
    pub observation: PriceObservation,
    pub limit: PriceLimit,
    pub timestamp: u64,
}
