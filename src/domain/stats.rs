//! Summary performance statistics.
//!
//! The record is fixed-shape: metrics that cannot be computed come back
//! as NaN, never omitted, so tables over many strategies always line up.
//! Standard deviations are sample (ddof = 1) throughout; win rate is
//! per-day (positive-return bars while exposed over exposed bars).

use crate::domain::error::RsrsError;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::Position;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyStats {
    pub label: String,
    pub final_nav: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub trade_count: usize,
}

impl StrategyStats {
    /// Log the record the way the report prints its statistics block.
    pub fn log(&self) {
        tracing::info!(
            label = %self.label,
            final_nav = format_args!("{:.4}", self.final_nav),
            annualized_return = format_args!("{:.2}%", self.annualized_return * 100.0),
            annualized_volatility = format_args!("{:.2}%", self.annualized_volatility * 100.0),
            sharpe_ratio = format_args!("{:.3}", self.sharpe_ratio),
            max_drawdown = format_args!("{:.2}%", self.max_drawdown * 100.0),
            win_rate = format_args!("{:.2}%", self.win_rate * 100.0),
            trade_count = self.trade_count,
            "strategy statistics"
        );
    }
}

/// Derive the summary record for one (series, strategy) pair.
///
/// `positions` must be the sequence that produced `nav`; lengths must
/// match the bars. An empty series yields an all-NaN record.
pub fn summarize(
    bars: &[Bar],
    positions: &[Position],
    nav: &[f64],
    label: &str,
) -> Result<StrategyStats, RsrsError> {
    if positions.len() != bars.len() {
        return Err(RsrsError::MisalignedLength {
            positions: positions.len(),
            bars: bars.len(),
        });
    }
    if nav.len() != bars.len() {
        return Err(RsrsError::MisalignedLength {
            positions: nav.len(),
            bars: bars.len(),
        });
    }

    let trade_count = (1..positions.len())
        .filter(|&i| positions[i] != positions[i - 1])
        .count();

    let Some(&final_nav) = nav.last() else {
        return Ok(StrategyStats {
            label: label.to_string(),
            final_nav: f64::NAN,
            total_return: f64::NAN,
            annualized_return: f64::NAN,
            annualized_volatility: f64::NAN,
            sharpe_ratio: f64::NAN,
            max_drawdown: f64::NAN,
            win_rate: f64::NAN,
            trade_count,
        });
    };

    let total_return = final_nav - 1.0;
    let annualized_return = final_nav.powf(TRADING_DAYS_PER_YEAR / nav.len() as f64) - 1.0;

    let returns: Vec<f64> = nav.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    let annualized_volatility = if returns.len() >= 2 {
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0);
        variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        f64::NAN
    };

    let sharpe_ratio = if annualized_volatility > 0.0 {
        annualized_return / annualized_volatility
    } else {
        f64::NAN
    };

    let mut exposed_days = 0usize;
    let mut winning_days = 0usize;
    for i in 1..nav.len() {
        if positions[i - 1] == Position::Long {
            exposed_days += 1;
            if nav[i] > nav[i - 1] {
                winning_days += 1;
            }
        }
    }
    let win_rate = if exposed_days > 0 {
        winning_days as f64 / exposed_days as f64
    } else {
        f64::NAN
    };

    Ok(StrategyStats {
        label: label.to_string(),
        final_nav,
        total_return,
        annualized_return,
        annualized_volatility,
        sharpe_ratio,
        max_drawdown: max_drawdown(nav),
        win_rate,
        trade_count,
    })
}

/// Largest peak-to-trough decline, tracked with a running maximum.
pub fn max_drawdown(nav: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &value in nav {
        if value > peak {
            peak = value;
        } else {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
