//! Miscellaneous helper utilities.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Raw token amount scaled down by `decimals`, for log output.
pub fn format_units(amount: U256, decimals: u8) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &amount.to_be_bytes::<32>());
    if digits.is_zero() {
        return BigDecimal::zero();
    }
    BigDecimal::new(digits, decimals as i64).normalized()
}

/// Parse a decimal integer string into a raw amount.
pub fn parse_amount(raw: &str) -> Option<U256> {
    U256::from_str_radix(raw.trim(), 10).ok()
}
