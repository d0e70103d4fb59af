//! Parameter-sensitivity and cost-sensitivity sweeps.
//!
//! Every pipeline stage is a pure function of (series, parameters), so
//! sweeps fan the variations out across a rayon pool; each worker runs
//! the full indicator → signal → simulate → summarize chain on its own
//! parameter value.

use rayon::prelude::*;

use crate::domain::config::PipelineConfig;
use crate::domain::error::RsrsError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::{generate_positions, Position, ScoreColumn, SignalRule};
use crate::domain::simulate::simulate;
use crate::domain::stats::{summarize, StrategyStats};

/// One pipeline pass: signals, NAV, statistics for a single rule.
pub fn run_rule(
    bars: &[Bar],
    frame: &IndicatorFrame,
    rule: &SignalRule,
    cost_rate: f64,
) -> Result<StrategyStats, RsrsError> {
    let signals = generate_positions(bars, frame, rule)?;
    let nav = simulate(bars, &signals.positions, cost_rate)?;
    summarize(bars, &signals.positions, &nav, &rule.name)
}

#[derive(Debug, Clone)]
pub struct SweepRow {
    pub param: usize,
    pub stats: StrategyStats,
}

/// The report's slope-window range (figure 11/12, N = 14..24).
pub fn default_slope_windows() -> Vec<usize> {
    (14..=24).collect()
}

/// The report's standardization-window range (figure 28, M = 450..800).
pub fn default_score_windows() -> Vec<usize> {
    (450..=800).step_by(50).collect()
}

/// Re-run the slope strategy for each regression window n.
pub fn sweep_slope_window(
    bars: &[Bar],
    config: &PipelineConfig,
    n_values: &[usize],
) -> Result<Vec<SweepRow>, RsrsError> {
    n_values
        .par_iter()
        .map(|&n| {
            let mut cfg = config.clone();
            cfg.indicator.slope_window = n;
            let frame = IndicatorFrame::compute(bars, &cfg.indicator);
            let mut rule = SignalRule::base(ScoreColumn::Slope, &cfg);
            rule.name = format!("Slope N={n}");
            let stats = run_rule(bars, &frame, &rule, cfg.cost_rate)?;
            Ok(SweepRow { param: n, stats })
        })
        .collect()
}

/// Re-run a score strategy for each standardization window m.
pub fn sweep_score_window(
    bars: &[Bar],
    config: &PipelineConfig,
    column: ScoreColumn,
    m_values: &[usize],
) -> Result<Vec<SweepRow>, RsrsError> {
    m_values
        .par_iter()
        .map(|&m| {
            let mut cfg = config.clone();
            cfg.indicator.score_window = m;
            let frame = IndicatorFrame::compute(bars, &cfg.indicator);
            let mut rule = SignalRule::base(column, &cfg);
            rule.name = format!("{column} M={m}");
            let stats = run_rule(bars, &frame, &rule, cfg.cost_rate)?;
            Ok(SweepRow { param: m, stats })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CostRow {
    pub cost_rate: f64,
    pub stats: StrategyStats,
}

/// The report's cost scenarios: free, single, and double rate.
pub fn default_cost_rates() -> Vec<f64> {
    vec![0.0, 0.0005, 0.001]
}

/// Simulate one fixed position sequence under several cost rates.
pub fn cost_sensitivity(
    bars: &[Bar],
    positions: &[Position],
    cost_rates: &[f64],
) -> Result<Vec<CostRow>, RsrsError> {
    cost_rates
        .iter()
        .map(|&cost_rate| {
            let nav = simulate(bars, positions, cost_rate)?;
            let stats = summarize(bars, positions, &nav, &format!("cost={cost_rate}"))?;
            Ok(CostRow { cost_rate, stats })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(len: usize) -> Vec<Bar> {
        // Deterministic trending series with enough wiggle for the
        // regression and z-score windows to stay non-degenerate.
        (0..len)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.5 + ((i % 5) as f64 - 2.0);
                Bar {
                    date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    open: base,
                    high: base + 1.0 + (i % 3) as f64,
                    low: base - 1.0 - ((i + 1) % 4) as f64 * 0.5,
                    close: base + 0.2,
                    volume: 1_000.0 + (i % 7) as f64 * 50.0,
                }
            })
            .collect()
    }

    fn small_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.indicator.slope_window = 5;
        config.indicator.score_window = 10;
        config.indicator.volume_corr_window = 4;
        config.indicator.price_ma_window = 3;
        config
    }

    #[test]
    fn slope_sweep_keeps_parameter_order() {
        let bars = make_bars(80);
        let config = small_config();
        let rows = sweep_slope_window(&bars, &config, &[4, 6, 8]).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].param, 4);
        assert_eq!(rows[1].param, 6);
        assert_eq!(rows[2].param, 8);
        for row in &rows {
            assert!(row.stats.final_nav.is_finite());
            assert!(row.stats.final_nav > 0.0);
        }
    }

    #[test]
    fn score_sweep_labels_rows() {
        let bars = make_bars(80);
        let config = small_config();
        let rows =
            sweep_score_window(&bars, &config, ScoreColumn::Standard, &[8, 12]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stats.label, "Standard Score M=8");
        assert_eq!(rows[1].stats.label, "Standard Score M=12");
    }

    #[test]
    fn cost_sensitivity_is_monotone_in_cost() {
        let bars = make_bars(60);
        // Alternate every 10 bars to force position changes.
        let positions: Vec<Position> = (0..60)
            .map(|i| {
                if (i / 10) % 2 == 0 {
                    Position::Long
                } else {
                    Position::Flat
                }
            })
            .collect();

        let rows = cost_sensitivity(&bars, &positions, &[0.0, 0.0005, 0.001]).unwrap();
        assert_eq!(rows.len(), 3);
        // Same signals, higher cost, lower final NAV.
        assert!(rows[0].stats.final_nav > rows[1].stats.final_nav);
        assert!(rows[1].stats.final_nav > rows[2].stats.final_nav);
        // Trade count is cost-independent.
        assert_eq!(rows[0].stats.trade_count, rows[2].stats.trade_count);
    }
}
