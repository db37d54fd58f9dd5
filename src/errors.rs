use alloy_primitives::Address;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failure kinds of a single engine action. Every variant aborts the whole
/// action; nothing partial is ever committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Access denied: {caller} is not the owner")]
    AccessDenied { caller: Address },

    #[error("Caller {caller} is not the transaction originator {originator}")]
    CallerNotOriginator { caller: Address, originator: Address },

    #[error("Rate limited: {elapsed}s elapsed, {required}s required")]
    RateLimited { elapsed: u64, required: u64 },

    #[error("Engine is paused")]
    Paused,

    #[error("Price deviation exceeded: tick {current_tick} vs mean {reference_tick} (max {max_deviation_bps})")]
    PriceDeviationExceeded {
        current_tick: i32,
        reference_tick: i32,
        max_deviation_bps: u16,
    },

    #[error("No funds available to swap")]
    NoFundsAvailable,

    #[error("Invalid fee source configuration: {0}")]
    InvalidFeeSourceConfiguration(String),

    #[error("Version {requested} already applied (current {current})")]
    VersionAlreadyApplied { requested: u64, current: u64 },

    #[error("Configuration store is not initialized")]
    NotInitialized,

    #[error("Invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Tick {0} is outside the representable range")]
    TickOutOfRange(i64),

    #[error("External call failed: {0}")]
    ExternalCall(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Provider error: {0}")]
    Provider(#[from] ethers::providers::ProviderError),

    #[error("Contract error: {0}")]
    Contract(
        #[from]
        ethers::contract::ContractError<ethers::providers::Provider<ethers::providers::Http>>,
    ),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Math error: {0}")]
    Math(#[from] uniswap_v3_math::error::UniswapV3MathError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}
