//! Time-weighted deviation guard and execution price bound.

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::dex::state::sqrt_price_x96_at_tick;
use crate::errors::{EngineError, EngineResult};
use crate::host::TickOracle;
use crate::models::{PriceLimit, PriceObservation};

/// Look-back covering the current second and the one before it.
pub const DEFAULT_WINDOW_SECS: u32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct PriceGuard {
    window_secs: u32,
}

impl Default for PriceGuard {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

impl PriceGuard {
    pub fn new(window_secs: u32) -> EngineResult<Self> {
        if window_secs == 0 {
            return Err(EngineError::InvalidParameter {
                field: "window_secs",
                reason: "look-back window must be non-zero".into(),
            });
        }
        Ok(Self { window_secs })
    }

    pub fn window_secs(&self) -> u32 {
        self.window_secs
    }

    /// Reads the current tick and the mean tick over the look-back window.
    pub fn observe<O>(&self, oracle: &O, pool: Address) -> EngineResult<PriceObservation>
    where
        O: TickOracle + ?Sized,
    {
        let current_tick = oracle.current_tick(pool)?;
        let [previous, current] = oracle.observe(pool, [self.window_secs, 0])?;

        // Integer division truncates toward zero, also for negative deltas.
        let mean = (current - previous) / self.window_secs as i64;
        let reference_mean_tick =
            i32::try_from(mean).map_err(|_| EngineError::TickOutOfRange(mean))?;

        Ok(PriceObservation {
            current_tick,
            reference_mean_tick,
        })
    }

    /// Ceiling price for a buy: the sqrt price `max_deviation_bps` ticks above
    /// the current tick. Fails when the current tick already sits more than
    /// that far above the mean. Downward moves are not checked.
    pub fn limit_price(
        &self,
        observation: &PriceObservation,
        max_deviation_bps: u16,
    ) -> EngineResult<PriceLimit> {
        let deviation = observation.deviation();
        if deviation > max_deviation_bps as i64 {
            warn!(
                current_tick = observation.current_tick,
                reference_tick = observation.reference_mean_tick,
                deviation,
                max_deviation_bps,
                "[GUARD] price moved too far above its mean"
            );
            return Err(EngineError::PriceDeviationExceeded {
                current_tick: observation.current_tick,
                reference_tick: observation.reference_mean_tick,
                max_deviation_bps,
            });
        }

        let limit_tick = observation.current_tick as i64 + max_deviation_bps as i64;
        let sqrt_price_x96 = sqrt_price_x96_at_tick(limit_tick)?;
        debug!(deviation, limit_tick, %sqrt_price_x96, "[GUARD] limit computed");

        Ok(PriceLimit {
            tick: limit_tick as i32,
            sqrt_price_x96,
        })
    }

    /// Observe and bound in one step.
    pub fn compute_limit<O>(
        &self,
        oracle: &O,
        pool: Address,
        max_deviation_bps: u16,
    ) -> EngineResult<(PriceObservation, PriceLimit)>
    where
        O: TickOracle + ?Sized,
    {
        let observation = self.observe(oracle, pool)?;
        let limit = self.limit_price(&observation, max_deviation_bps)?;
        Ok((observation, limit))
    }
}
