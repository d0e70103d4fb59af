//! Pipeline configuration.
//!
//! One explicit value passed into each pipeline call, never ambient
//! state, so parameter sweeps and tests can vary it without cross-call
//! interference. Defaults reproduce the research report's published
//! parameters (n = 18, m = 600, slope band 1.0/0.8, score band 0.7/−0.7).

use crate::domain::error::RsrsError;
use crate::domain::indicator::IndicatorParams;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub indicator: IndicatorParams,
    pub slope_buy_threshold: f64,
    pub slope_sell_threshold: f64,
    pub score_buy_threshold: f64,
    pub score_sell_threshold: f64,
    /// Minimum score/volume correlation for the volume entry gate.
    pub min_volume_correlation: f64,
    /// Fractional transaction cost per position change.
    pub cost_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            indicator: IndicatorParams::default(),
            slope_buy_threshold: 1.0,
            slope_sell_threshold: 0.8,
            score_buy_threshold: 0.7,
            score_sell_threshold: -0.7,
            min_volume_correlation: 0.1,
            cost_rate: 0.0005,
        }
    }
}

impl PipelineConfig {
    /// Read a config file's `[indicator]` / `[strategy]` / `[backtest]`
    /// sections, falling back to report defaults for absent keys, then
    /// validate every field.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RsrsError> {
        let defaults = PipelineConfig::default();
        let value = PipelineConfig {
            indicator: IndicatorParams {
                slope_window: config.get_int(
                    "indicator",
                    "slope_window",
                    defaults.indicator.slope_window as i64,
                ) as usize,
                score_window: config.get_int(
                    "indicator",
                    "score_window",
                    defaults.indicator.score_window as i64,
                ) as usize,
                volume_corr_window: config.get_int(
                    "indicator",
                    "volume_correlation_window",
                    defaults.indicator.volume_corr_window as i64,
                ) as usize,
                price_ma_window: config.get_int(
                    "indicator",
                    "price_ma_window",
                    defaults.indicator.price_ma_window as i64,
                ) as usize,
            },
            slope_buy_threshold: config.get_double(
                "strategy",
                "slope_buy_threshold",
                defaults.slope_buy_threshold,
            ),
            slope_sell_threshold: config.get_double(
                "strategy",
                "slope_sell_threshold",
                defaults.slope_sell_threshold,
            ),
            score_buy_threshold: config.get_double(
                "strategy",
                "score_buy_threshold",
                defaults.score_buy_threshold,
            ),
            score_sell_threshold: config.get_double(
                "strategy",
                "score_sell_threshold",
                defaults.score_sell_threshold,
            ),
            min_volume_correlation: config.get_double(
                "strategy",
                "min_volume_correlation",
                defaults.min_volume_correlation,
            ),
            cost_rate: config.get_double("backtest", "cost_rate", defaults.cost_rate),
        };
        value.validate()?;
        Ok(value)
    }

    pub fn validate(&self) -> Result<(), RsrsError> {
        validate_window("slope_window", self.indicator.slope_window)?;
        validate_window("score_window", self.indicator.score_window)?;
        validate_window("volume_correlation_window", self.indicator.volume_corr_window)?;
        if self.indicator.price_ma_window == 0 {
            return Err(invalid(
                "indicator",
                "price_ma_window",
                "window must be at least 1",
            ));
        }
        validate_band(
            "slope_buy_threshold",
            self.slope_buy_threshold,
            self.slope_sell_threshold,
        )?;
        validate_band(
            "score_buy_threshold",
            self.score_buy_threshold,
            self.score_sell_threshold,
        )?;
        if !(-1.0..=1.0).contains(&self.min_volume_correlation) {
            return Err(invalid(
                "strategy",
                "min_volume_correlation",
                "correlation threshold must be in [-1, 1]",
            ));
        }
        if !(0.0..1.0).contains(&self.cost_rate) {
            return Err(invalid(
                "backtest",
                "cost_rate",
                "cost_rate must be in [0, 1)",
            ));
        }
        Ok(())
    }
}

fn validate_window(key: &str, value: usize) -> Result<(), RsrsError> {
    if value < 2 {
        return Err(invalid("indicator", key, "window must be at least 2"));
    }
    Ok(())
}

fn validate_band(buy_key: &str, buy: f64, sell: f64) -> Result<(), RsrsError> {
    if buy <= sell {
        return Err(invalid(
            "strategy",
            buy_key,
            "buy threshold must exceed sell threshold",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> RsrsError {
    RsrsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
