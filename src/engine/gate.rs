//! Admission control evaluated before any funds move.

use tracing::debug;

use crate::engine::store::ConfigStore;
use crate::errors::{EngineError, EngineResult};
use crate::models::CallContext;

/// Whether the immediate caller must be the originating principal.
///
/// Rejecting relayed calls blocks same-transaction composition (sandwiching
/// the buyback from a contract). Environments that rule that out on their own
/// can switch it off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OriginCheck {
    #[default]
    Enforced,
    Disabled,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionGate {
    origin_check: OriginCheck,
}

impl ExecutionGate {
    pub fn new(origin_check: OriginCheck) -> Self {
        Self { origin_check }
    }

    pub fn origin_check(&self) -> OriginCheck {
        self.origin_check
    }

    /// Checks, in order: originator, rate limit, pause flag. Read-only.
    pub fn admit(&self, ctx: &CallContext, store: &ConfigStore) -> EngineResult<()> {
        if self.origin_check == OriginCheck::Enforced && ctx.caller != ctx.originator {
            return Err(EngineError::CallerNotOriginator {
                caller: ctx.caller,
                originator: ctx.originator,
            });
        }

        let params = store.params()?;
        let elapsed = ctx.now.saturating_sub(store.last_action_timestamp());
        if elapsed < params.min_action_delay {
            return Err(EngineError::RateLimited {
                elapsed,
                required: params.min_action_delay,
            });
        }

        if params.paused {
            return Err(EngineError::Paused);
        }

        debug!(caller = %ctx.caller, now = ctx.now, elapsed, "[GATE] admitted");
        Ok(())
    }
}
