//! Owner-controlled, versioned risk parameters.

use std::path::Path;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{EngineError, EngineResult, Result};
use crate::models::MAX_BPS;

/// Risk parameters the owner may change. The last action timestamp is
/// deliberately absent: only a successful swap moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Upper bound on base asset spent in one action, in base units.
    pub max_amount_per_action: U256,
    /// Minimum seconds between two successful actions.
    pub min_action_delay: u64,
    /// Bound on upward tick movement against the time-weighted mean.
    pub max_deviation_bps: u16,
    pub paused: bool,
}

impl RiskParams {
    pub fn validate(&self) -> EngineResult<()> {
        validate_deviation(self.max_deviation_bps)
    }
}

fn validate_deviation(bps: u16) -> EngineResult<()> {
    if bps > MAX_BPS {
        return Err(EngineError::InvalidParameter {
            field: "max_deviation_bps",
            reason: format!("{bps} exceeds {MAX_BPS}"),
        });
    }
    Ok(())
}

/// Persistent configuration record.
///
/// `version == 0` means uninitialized. Every mutator checks the caller
/// against `owner` before touching anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStore {
    owner: Address,
    version: u64,
    params: Option<RiskParams>,
    last_action_timestamp: u64,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-time setup, equivalent to applying version 1.
    pub fn initialize(&mut self, owner: Address, params: RiskParams) -> EngineResult<()> {
        if self.version >= 1 || self.params.is_some() {
            return Err(EngineError::VersionAlreadyApplied {
                requested: 1,
                current: self.version,
            });
        }
        params.validate()?;
        self.owner = owner;
        self.params = Some(params);
        self.version = 1;
        info!(%owner, ?params, "[CONFIG] initialized");
        Ok(())
    }

    /// Upgrade step replacing the risk parameters under a strictly higher version.
    pub fn reinitialize(
        &mut self,
        caller: Address,
        version: u64,
        params: RiskParams,
    ) -> EngineResult<()> {
        self.ensure_owner(caller)?;
        if version <= self.version {
            return Err(EngineError::VersionAlreadyApplied {
                requested: version,
                current: self.version,
            });
        }
        params.validate()?;
        self.params = Some(params);
        self.version = version;
        info!(version, ?params, "[CONFIG] reinitialized");
        Ok(())
    }

    pub fn ensure_owner(&self, caller: Address) -> EngineResult<()> {
        if self.params.is_none() {
            return Err(EngineError::NotInitialized);
        }
        if caller != self.owner {
            return Err(EngineError::AccessDenied { caller });
        }
        Ok(())
    }

    fn params_mut(&mut self, caller: Address) -> EngineResult<&mut RiskParams> {
        self.ensure_owner(caller)?;
        self.params.as_mut().ok_or(EngineError::NotInitialized)
    }

    pub fn set_params(&mut self, caller: Address, params: RiskParams) -> EngineResult<()> {
        params.validate()?;
        *self.params_mut(caller)? = params;
        info!(?params, "[CONFIG] parameters replaced");
        Ok(())
    }

    pub fn set_max_amount_per_action(&mut self, caller: Address, amount: U256) -> EngineResult<()> {
        self.params_mut(caller)?.max_amount_per_action = amount;
        info!(%amount, "[CONFIG] max amount per action updated");
        Ok(())
    }

    pub fn set_min_action_delay(&mut self, caller: Address, delay: u64) -> EngineResult<()> {
        self.params_mut(caller)?.min_action_delay = delay;
        info!(delay, "[CONFIG] min action delay updated");
        Ok(())
    }

    pub fn set_max_deviation_bps(&mut self, caller: Address, bps: u16) -> EngineResult<()> {
        validate_deviation(bps)?;
        self.params_mut(caller)?.max_deviation_bps = bps;
        info!(bps, "[CONFIG] max deviation updated");
        Ok(())
    }

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> EngineResult<()> {
        self.params_mut(caller)?.paused = paused;
        info!(paused, "[CONFIG] pause flag updated");
        Ok(())
    }

    pub fn pause(&mut self, caller: Address) -> EngineResult<()> {
        self.set_paused(caller, true)
    }

    pub fn unpause(&mut self, caller: Address) -> EngineResult<()> {
        self.set_paused(caller, false)
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> EngineResult<()> {
        self.ensure_owner(caller)?;
        if new_owner == Address::ZERO {
            return Err(EngineError::InvalidParameter {
                field: "owner",
                reason: "zero address".into(),
            });
        }
        info!(previous = %self.owner, %new_owner, "[CONFIG] ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// Stamp a successful action. The timestamp never moves backwards.
    pub(crate) fn record_action(&mut self, now: u64) {
        self.last_action_timestamp = self.last_action_timestamp.max(now);
    }

    /// A store holds parameters exactly when its version is non-zero.
    pub fn check_consistency(&self) -> EngineResult<()> {
        match (self.version, self.params) {
            (0, Some(_)) => Err(EngineError::InvalidParameter {
                field: "version",
                reason: "parameters present at version 0".into(),
            }),
            (version, None) if version > 0 => Err(EngineError::InvalidParameter {
                field: "params",
                reason: format!("missing at version {version}"),
            }),
            (_, Some(params)) => params.validate(),
            (_, None) => Ok(()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.params.is_some()
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn params(&self) -> EngineResult<RiskParams> {
        self.params.ok_or(EngineError::NotInitialized)
    }

    pub fn max_amount_per_action(&self) -> EngineResult<U256> {
        Ok(self.params()?.max_amount_per_action)
    }

    pub fn min_action_delay(&self) -> EngineResult<u64> {
        Ok(self.params()?.min_action_delay)
    }

    pub fn max_deviation_bps(&self) -> EngineResult<u16> {
        Ok(self.params()?.max_deviation_bps)
    }

    pub fn paused(&self) -> EngineResult<bool> {
        Ok(self.params()?.paused)
    }

    pub fn last_action_timestamp(&self) -> u64 {
        self.last_action_timestamp
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let store: Self = serde_json::from_str(raw)?;
        store.check_consistency()?;
        Ok(store)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
