//! Core pipeline types and logic.
//!
//! Data flows one way: bars → [`indicator`] → [`signal`] → [`simulate`]
//! → [`stats`]. Every stage is a pure batch transformation over the whole
//! series, so [`sweep`] can fan parameter variations out in parallel.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod simulate;
pub mod stats;
pub mod sweep;
pub mod config;
pub mod error;
