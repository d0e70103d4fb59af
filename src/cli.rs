//! CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::PipelineConfig;
use crate::domain::error::RsrsError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::{buy_and_hold, report_catalogue, ScoreColumn, SignalRule};
use crate::domain::simulate::simulate;
use crate::domain::stats::summarize;
use crate::domain::sweep::{
    self, cost_sensitivity, default_cost_rates, default_score_windows, default_slope_windows,
};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "rsrslab", about = "RSRS timing-strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Strategy variant selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Slope,
    Standard,
    Modified,
    RightSkewed,
}

impl StrategyArg {
    fn column(self) -> ScoreColumn {
        match self {
            StrategyArg::Slope => ScoreColumn::Slope,
            StrategyArg::Standard => ScoreColumn::Standard,
            StrategyArg::Modified => ScoreColumn::Modified,
            StrategyArg::RightSkewed => ScoreColumn::RightSkewed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepParam {
    /// Regression window n of the slope.
    N,
    /// Standardization window m of the z-score.
    M,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest one strategy variant against buy-and-hold
    Backtest {
        /// CSV file with date,open,high,low,close,volume columns
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "right-skewed")]
        strategy: StrategyArg,
        /// Gate entries on close > its moving average
        #[arg(long)]
        price_gate: bool,
        /// Gate entries on score/volume correlation
        #[arg(long)]
        volume_gate: bool,
        /// Also report NAV under the standard cost scenarios
        #[arg(long)]
        with_costs: bool,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// Run every report variant plus buy-and-hold and compare
    Compare {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// Parameter-sensitivity sweep over the n or m window
    Sweep {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum)]
        param: SweepParam,
        /// Windows to test, comma separated (defaults to the report range)
        #[arg(long, value_delimiter = ',')]
        values: Option<Vec<usize>>,
        /// Score column for m sweeps
        #[arg(long, value_enum, default_value = "standard")]
        strategy: StrategyArg,
    },
    /// Show the date range of a data file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            data,
            config,
            strategy,
            price_gate,
            volume_gate,
            with_costs,
            start_date,
            end_date,
        } => run_backtest(
            &data,
            config.as_deref(),
            strategy,
            price_gate,
            volume_gate,
            with_costs,
            start_date,
            end_date,
        ),
        Command::Compare {
            data,
            config,
            start_date,
            end_date,
        } => run_compare(&data, config.as_deref(), start_date, end_date),
        Command::Sweep {
            data,
            config,
            param,
            values,
            strategy,
        } => run_sweep(&data, config.as_deref(), param, values, strategy),
        Command::Info { data } => run_info(&data),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn load_pipeline_config(path: Option<&std::path::Path>) -> Result<PipelineConfig, RsrsError> {
    match path {
        Some(path) => {
            let adapter =
                FileConfigAdapter::from_file(path).map_err(|e| RsrsError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            PipelineConfig::from_config(&adapter)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn load_bars(
    data: &std::path::Path,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<Bar>, RsrsError> {
    let adapter = CsvAdapter::new(data);
    let bars = adapter.load_bars(start_date, end_date)?;
    tracing::info!(file = %data.display(), bars = bars.len(), "loaded bar series");
    Ok(bars)
}

/// Bars needed before the governing column produces its first value.
fn required_bars(config: &PipelineConfig, column: ScoreColumn) -> usize {
    match column {
        ScoreColumn::Slope => config.indicator.slope_window + 1,
        _ => config.indicator.slope_window + config.indicator.score_window,
    }
}

fn check_length(
    bars: &[Bar],
    config: &PipelineConfig,
    column: ScoreColumn,
) -> Result<(), RsrsError> {
    let minimum = required_bars(config, column);
    if bars.len() < minimum {
        return Err(RsrsError::InsufficientData {
            bars: bars.len(),
            minimum,
        });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_backtest(
    data: &std::path::Path,
    config_path: Option<&std::path::Path>,
    strategy: StrategyArg,
    price_gate: bool,
    volume_gate: bool,
    with_costs: bool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), RsrsError> {
    let config = load_pipeline_config(config_path)?;
    let bars = load_bars(data, start_date, end_date)?;
    let column = strategy.column();
    check_length(&bars, &config, column)?;

    let mut rule = SignalRule::base(column, &config);
    if price_gate {
        rule = SignalRule::price_optimized(column, &config);
    }
    if volume_gate {
        let gated = SignalRule::volume_optimized(column, &config);
        rule.name = if price_gate {
            format!("Price & Volume Optimized {column}")
        } else {
            gated.name.clone()
        };
        rule.gates.extend(gated.gates);
    }

    let frame = IndicatorFrame::compute(&bars, &config.indicator);
    let signals = crate::domain::signal::generate_positions(&bars, &frame, &rule)?;
    tracing::info!(rule = %rule.name, warm_up = signals.warm_up, "generated signals");

    let nav = simulate(&bars, &signals.positions, config.cost_rate)?;
    let stats = summarize(&bars, &signals.positions, &nav, &rule.name)?;
    stats.log();

    let bh = buy_and_hold(bars.len());
    let bh_nav = simulate(&bars, &bh, config.cost_rate)?;
    let bh_stats = summarize(&bars, &bh, &bh_nav, "Buy & Hold")?;
    bh_stats.log();

    if with_costs {
        for row in cost_sensitivity(&bars, &signals.positions, &default_cost_rates())? {
            tracing::info!(
                cost_rate = row.cost_rate,
                final_nav = format_args!("{:.4}", row.stats.final_nav),
                "cost scenario"
            );
        }
    }

    Ok(())
}

fn run_compare(
    data: &std::path::Path,
    config_path: Option<&std::path::Path>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), RsrsError> {
    let config = load_pipeline_config(config_path)?;
    let bars = load_bars(data, start_date, end_date)?;
    check_length(&bars, &config, ScoreColumn::Standard)?;

    let frame = IndicatorFrame::compute(&bars, &config.indicator);

    let bh = buy_and_hold(bars.len());
    let bh_nav = simulate(&bars, &bh, config.cost_rate)?;
    let bh_stats = summarize(&bars, &bh, &bh_nav, "Buy & Hold")?;
    bh_stats.log();

    for rule in report_catalogue(&config) {
        let stats = sweep::run_rule(&bars, &frame, &rule, config.cost_rate)?;
        stats.log();
        let outperformance =
            (stats.final_nav - bh_stats.final_nav) / bh_stats.final_nav * 100.0;
        tracing::info!(
            strategy = %stats.label,
            final_nav = format_args!("{:.4}", stats.final_nav),
            vs_buy_hold = format_args!("{outperformance:+.1}%"),
            trades = stats.trade_count,
            "comparison row"
        );
    }

    Ok(())
}

fn run_sweep(
    data: &std::path::Path,
    config_path: Option<&std::path::Path>,
    param: SweepParam,
    values: Option<Vec<usize>>,
    strategy: StrategyArg,
) -> Result<(), RsrsError> {
    let config = load_pipeline_config(config_path)?;
    let bars = load_bars(data, None, None)?;

    let rows = match param {
        SweepParam::N => {
            check_length(&bars, &config, ScoreColumn::Slope)?;
            let windows = values.unwrap_or_else(default_slope_windows);
            sweep::sweep_slope_window(&bars, &config, &windows)?
        }
        SweepParam::M => {
            let column = strategy.column();
            check_length(&bars, &config, column)?;
            let windows = values.unwrap_or_else(default_score_windows);
            sweep::sweep_score_window(&bars, &config, column, &windows)?
        }
    };

    for row in &rows {
        tracing::info!(
            param = row.param,
            final_nav = format_args!("{:.4}", row.stats.final_nav),
            max_drawdown = format_args!("{:.2}%", row.stats.max_drawdown * 100.0),
            trades = row.stats.trade_count,
            "sweep row"
        );
    }

    Ok(())
}

fn run_info(data: &std::path::Path) -> Result<(), RsrsError> {
    let adapter = CsvAdapter::new(data);
    match adapter.data_range()? {
        Some((first, last, count)) => {
            println!("{}: {count} bars, {first} to {last}", data.display());
        }
        None => println!("{}: no bars", data.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_bars_slope_vs_score() {
        let config = PipelineConfig::default();
        assert_eq!(required_bars(&config, ScoreColumn::Slope), 19);
        assert_eq!(required_bars(&config, ScoreColumn::RightSkewed), 618);
    }

    #[test]
    fn cli_parses_backtest_args() {
        let cli = Cli::try_parse_from([
            "rsrslab",
            "backtest",
            "--data",
            "hs300.csv",
            "--strategy",
            "right-skewed",
            "--price-gate",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                strategy,
                price_gate,
                volume_gate,
                ..
            } => {
                assert_eq!(strategy, StrategyArg::RightSkewed);
                assert!(price_gate);
                assert!(!volume_gate);
            }
            other => panic!("expected backtest, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_sweep_values_list() {
        let cli = Cli::try_parse_from([
            "rsrslab",
            "sweep",
            "--data",
            "hs300.csv",
            "--param",
            "n",
            "--values",
            "14,18,24",
        ])
        .unwrap();
        match cli.command {
            Command::Sweep { param, values, .. } => {
                assert_eq!(param, SweepParam::N);
                assert_eq!(values, Some(vec![14, 18, 24]));
            }
            other => panic!("expected sweep, got {other:?}"),
        }
    }
}
