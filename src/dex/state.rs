use alloy_primitives::{Address, U256};

use crate::errors::{EngineError, EngineResult};
use crate::host::TickOracle;

/// Lowest tick a Uniswap V3 pool can represent.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick a Uniswap V3 pool can represent.
pub const MAX_TICK: i32 = 887_272;

/// Immutable snapshot of the pool state the price guard needs, captured
/// for a single look-back window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub pool: Address,
    /// Current tick index (Uniswap V3 `slot0.tick`).
    pub tick: i32,
    /// Current sqrt(price1/price0) in Q96 (Uniswap V3 `slot0.sqrtPriceX96`).
    pub sqrt_price_x96: U256,
    /// Look-back window the cumulatives were observed over, in seconds.
    pub window_secs: u32,
    /// `observe([window_secs, 0])` tick cumulatives.
    pub tick_cumulatives: [i64; 2],
    /// Pool fee tier in hundredths of a bip.
    pub fee: u32,
}

impl TickOracle for PoolSnapshot {
    fn current_tick(&self, pool: Address) -> EngineResult<i32> {
        self.ensure_pool(pool)?;
        Ok(self.tick)
    }

    fn observe(&self, pool: Address, seconds_agos: [u32; 2]) -> EngineResult<[i64; 2]> {
        self.ensure_pool(pool)?;
        if seconds_agos != [self.window_secs, 0] {
            return Err(EngineError::ExternalCall(format!(
                "snapshot holds window [{}, 0], asked for {:?}",
                self.window_secs, seconds_agos
            )));
        }
        Ok(self.tick_cumulatives)
    }
}

impl PoolSnapshot {
    fn ensure_pool(&self, pool: Address) -> EngineResult<()> {
        if pool != self.pool {
            return Err(EngineError::ExternalCall(format!(
                "snapshot is for pool {}, not {}",
                self.pool, pool
            )));
        }
        Ok(())
    }
}

/// Exact sqrtPriceX96 at `tick`, using the Uniswap V3 TickMath port.
pub fn sqrt_price_x96_at_tick(tick: i64) -> EngineResult<U256> {
    if tick < MIN_TICK as i64 || tick > MAX_TICK as i64 {
        return Err(EngineError::TickOutOfRange(tick));
    }
    let ratio = uniswap_v3_math::tick_math::get_sqrt_ratio_at_tick(tick as i32)
        .map_err(|_| EngineError::TickOutOfRange(tick))?;
    // The math crate may pin a different alloy release; go through bytes.
    Ok(U256::from_be_bytes(ratio.to_be_bytes::<32>()))
}
