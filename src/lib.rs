//! Core library for the buyback-burner project.
//!
//! The engine harvests fee revenue, buys the target asset through a
//! concentrated-liquidity pool under a time-weighted price guard, and sends
//! what it bought to a burn address. Chain access goes through the traits in
//! [`host`]; [`dex`] holds the live pool reader used by the monitor binary.

pub mod config;
pub mod dex;
pub mod engine;
pub mod errors;
pub mod host;
pub mod models;
pub mod utils;
