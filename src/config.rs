//! Configuration loader and application settings.

use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use url::Url;

use crate::engine::{DEFAULT_WINDOW_SECS, RiskParams};
use crate::errors::{AppError, Result};
use crate::utils::parse_amount;

/// Consolidated settings of the guard monitor.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// RPC endpoint for the Ethereum-compatible node.
    pub rpc_url: Url,
    /// Pool observed by the price guard.
    pub pool_address: Address,
    /// Persisted configuration store; overrides the env risk parameters when set.
    pub state_path: Option<PathBuf>,
    /// Risk parameters used when no persisted store is given.
    pub params: RiskParams,
    /// Look-back window for the mean tick, in seconds.
    pub twap_window_secs: u32,
    /// Seconds between two evaluations.
    pub poll_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AppError::Config(format!("{key} must be set")))
        };

        let rpc_url = Url::parse(&required("RPC_URL")?)?;
        let pool_address: Address = required("POOL_ADDRESS")?
            .parse()
            .map_err(|e| AppError::Config(format!("POOL_ADDRESS: {e}")))?;
        let state_path = lookup("ENGINE_STATE_PATH").map(PathBuf::from);

        let max_amount_per_action = match lookup("MAX_AMOUNT_PER_ACTION") {
            Some(raw) => parse_amount(&raw).ok_or_else(|| {
                AppError::Config(format!("MAX_AMOUNT_PER_ACTION is not an integer: {raw}"))
            })?,
            None => U256::from(1_000_000_000_000_000_000u128),
        };
        let params = RiskParams {
            max_amount_per_action,
            min_action_delay: parse_or(&lookup, "MIN_ACTION_DELAY", 3600)?,
            max_deviation_bps: parse_or(&lookup, "MAX_DEVIATION_BPS", 10)?,
            paused: parse_or(&lookup, "PAUSED", false)?,
        };
        params.validate()?;

        Ok(Self {
            rpc_url,
            pool_address,
            state_path,
            params,
            twap_window_secs: parse_or(&lookup, "TWAP_WINDOW_SECS", DEFAULT_WINDOW_SECS)?,
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", 12)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}
