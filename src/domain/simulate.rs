//! NAV simulation.
//!
//! Replays a position sequence against the close series. Exposure during
//! bar i comes from the position decided at bar i−1, so a signal can
//! never profit from the bar that produced it.

use crate::domain::error::RsrsError;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::Position;

/// Walk the bars once and produce the NAV series, NAV[0] = 1.0.
///
/// NAV[i] = NAV[i-1] × (1 + daily_return × weight(positions[i-1])), then
/// × (1 − cost_rate) whenever positions[i] ≠ positions[i-1]. Change
/// detection starts at bar 1, so a sequence that is Long from bar 0
/// (buy-and-hold) never pays the cost and its NAV equals
/// close[i] / close[0] exactly.
pub fn simulate(
    bars: &[Bar],
    positions: &[Position],
    cost_rate: f64,
) -> Result<Vec<f64>, RsrsError> {
    if positions.len() != bars.len() {
        return Err(RsrsError::MisalignedLength {
            positions: positions.len(),
            bars: bars.len(),
        });
    }

    let mut nav = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return Ok(nav);
    }

    nav.push(1.0);
    for i in 1..bars.len() {
        let daily_return = bars[i].daily_return(bars[i - 1].close);
        let mut value = nav[i - 1] * (1.0 + daily_return * positions[i - 1].weight());
        if positions[i] != positions[i - 1] {
            value *= 1.0 - cost_rate;
        }
        nav.push(value);
    }

    Ok(nav)
}
