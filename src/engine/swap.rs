//! Bounded single-pool conversion of base asset into target asset.

use alloy_primitives::{Address, U256};
use tracing::info;

use crate::engine::store::RiskParams;
use crate::errors::{EngineError, EngineResult};
use crate::host::{SwapVenue, TokenLedger};
use crate::models::{PriceLimit, SwapFill, TradeRequest};

/// Route of the buyback trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRoute {
    pub base_token: Address,
    pub target_token: Address,
    /// Pool fee tier in hundredths of a bip.
    pub fee_tier: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SwapExecutor {
    route: SwapRoute,
}

impl SwapExecutor {
    pub fn new(route: SwapRoute) -> Self {
        Self { route }
    }

    pub fn route(&self) -> &SwapRoute {
        &self.route
    }

    /// Trades `min(balance, max_amount_per_action)` of base held by `custody`.
    ///
    /// No minimum output is requested: the sqrt price limit is the only
    /// bound, so a thin book yields a partial fill rather than a revert.
    pub fn swap<H>(
        &self,
        host: &mut H,
        custody: Address,
        params: &RiskParams,
        limit: &PriceLimit,
    ) -> EngineResult<SwapFill>
    where
        H: TokenLedger + SwapVenue + ?Sized,
    {
        let available = host.balance_of(self.route.base_token, custody);
        let amount_in = available.min(params.max_amount_per_action);
        if amount_in.is_zero() {
            return Err(EngineError::NoFundsAvailable);
        }

        let request = TradeRequest {
            token_in: self.route.base_token,
            token_out: self.route.target_token,
            fee_tier: self.route.fee_tier,
            recipient: custody,
            amount_in,
            amount_out_minimum: U256::ZERO,
            sqrt_price_limit_x96: limit.sqrt_price_x96,
        };
        let amount_out = host.trade(&request)?;

        let remaining = host.balance_of(self.route.base_token, custody);
        let amount_spent = available.saturating_sub(remaining);
        let fill = SwapFill {
            amount_in,
            amount_spent,
            amount_out,
        };

        info!(
            %amount_in,
            %amount_spent,
            %amount_out,
            limit_tick = limit.tick,
            partial = fill.is_partial(),
            "[SWAP] buyback trade settled"
        );
        Ok(fill)
    }
}
