//! rsrslab — RSRS timing-strategy research backtester.
//!
//! Reproduces the RSRS (resistance support relative strength) indicator
//! family and its long/flat timing strategies over daily OHLCV bars:
//! rolling regression slope and fit quality, standardized score variants,
//! threshold signal generation with optional entry gates, NAV simulation
//! net of transaction costs, and summary performance statistics.
//!
//! Hexagonal architecture: pipeline logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
