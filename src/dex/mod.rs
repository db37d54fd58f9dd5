//! Exchange-side plumbing for Uniswap V3 pools.

pub mod client;
pub mod state;

pub use client::{Dex, spawn_snapshot_watcher};
pub use state::{MAX_TICK, MIN_TICK, PoolSnapshot, sqrt_price_x96_at_tick};
