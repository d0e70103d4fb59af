//! Signal generation.
//!
//! One parameterized rule covers the whole family of report strategies:
//! a score column selector plus a buy/sell threshold band, optionally
//! AND-gated on entries by a price-trend or volume-correlation
//! confirmation. The generator is a two-state machine (Flat/Long) with
//! level-comparison hysteresis: value at or above the buy threshold
//! enters, at or below the sell threshold exits, anything inside the dead
//! band holds the current state. Undefined indicator values also hold
//! state, so the warm-up range stays Flat.

use std::fmt;

use crate::domain::config::PipelineConfig;
use crate::domain::error::RsrsError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Flat,
    Long,
}

impl Position {
    /// Exposure weight applied to the daily return.
    pub fn weight(self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }
}

/// Which indicator column governs the threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreColumn {
    Slope,
    Standard,
    Modified,
    RightSkewed,
}

impl ScoreColumn {
    pub fn select(self, frame: &IndicatorFrame) -> &[Option<f64>] {
        match self {
            ScoreColumn::Slope => &frame.slope,
            ScoreColumn::Standard => &frame.standard_score,
            ScoreColumn::Modified => &frame.modified_standard_score,
            ScoreColumn::RightSkewed => &frame.right_skewed_standard_score,
        }
    }
}

impl fmt::Display for ScoreColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreColumn::Slope => write!(f, "Slope"),
            ScoreColumn::Standard => write!(f, "Standard Score"),
            ScoreColumn::Modified => write!(f, "Modified Score"),
            ScoreColumn::RightSkewed => write!(f, "Right Skewed Score"),
        }
    }
}

/// Extra confirmation required before a Flat→Long entry. Exits are never
/// gated.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryGate {
    /// Close must sit above its own moving average.
    PriceTrend,
    /// Score/volume correlation must exceed the threshold.
    VolumeCorrelation { min_correlation: f64 },
}

impl EntryGate {
    fn passes(&self, bars: &[Bar], frame: &IndicatorFrame, i: usize) -> bool {
        match self {
            EntryGate::PriceTrend => match frame.close_ma[i] {
                Some(ma) => bars[i].close > ma,
                None => false,
            },
            EntryGate::VolumeCorrelation { min_correlation } => {
                match frame.volume_correlation[i] {
                    Some(corr) => corr > *min_correlation,
                    None => false,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRule {
    pub name: String,
    pub column: ScoreColumn,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub gates: Vec<EntryGate>,
}

impl SignalRule {
    /// Ungated threshold rule on one column, thresholds from config
    /// (slope band for the slope column, score band otherwise).
    pub fn base(column: ScoreColumn, config: &PipelineConfig) -> Self {
        let (buy, sell) = match column {
            ScoreColumn::Slope => (config.slope_buy_threshold, config.slope_sell_threshold),
            _ => (config.score_buy_threshold, config.score_sell_threshold),
        };
        SignalRule {
            name: column.to_string(),
            column,
            buy_threshold: buy,
            sell_threshold: sell,
            gates: Vec::new(),
        }
    }

    /// Entry additionally requires close above its moving average.
    pub fn price_optimized(column: ScoreColumn, config: &PipelineConfig) -> Self {
        let mut rule = Self::base(column, config);
        rule.name = format!("Price Optimized {}", rule.name);
        rule.gates.push(EntryGate::PriceTrend);
        rule
    }

    /// Entry additionally requires score/volume correlation above the
    /// configured minimum.
    pub fn volume_optimized(column: ScoreColumn, config: &PipelineConfig) -> Self {
        let mut rule = Self::base(column, config);
        rule.name = format!("Volume Optimized {}", rule.name);
        rule.gates.push(EntryGate::VolumeCorrelation {
            min_correlation: config.min_volume_correlation,
        });
        rule
    }
}

/// Every strategy variant the report compares, in presentation order.
pub fn report_catalogue(config: &PipelineConfig) -> Vec<SignalRule> {
    let scores = [
        ScoreColumn::Standard,
        ScoreColumn::Modified,
        ScoreColumn::RightSkewed,
    ];
    let mut rules = vec![SignalRule::base(ScoreColumn::Slope, config)];
    rules.extend(scores.iter().map(|&c| SignalRule::base(c, config)));
    rules.extend(scores.iter().map(|&c| SignalRule::price_optimized(c, config)));
    rules.extend(scores.iter().map(|&c| SignalRule::volume_optimized(c, config)));
    rules
}

/// A generated position sequence plus its warm-up length (bars before the
/// governing column's first defined value).
#[derive(Debug, Clone)]
pub struct Signals {
    pub positions: Vec<Position>,
    pub warm_up: usize,
}

/// Run the rule's state machine over the series. The position at bar i
/// uses information up to bar i only.
pub fn generate_positions(
    bars: &[Bar],
    frame: &IndicatorFrame,
    rule: &SignalRule,
) -> Result<Signals, RsrsError> {
    if frame.len() != bars.len() {
        return Err(RsrsError::MisalignedLength {
            positions: frame.len(),
            bars: bars.len(),
        });
    }

    let column = rule.column.select(frame);
    let warm_up = column
        .iter()
        .position(Option::is_some)
        .unwrap_or(bars.len());

    let mut positions = Vec::with_capacity(bars.len());
    let mut state = Position::Flat;
    for i in 0..bars.len() {
        // Index 0 is always Flat; transitions start from the second bar.
        if i > 0 && let Some(value) = column[i] {
            match state {
                Position::Flat => {
                    if value >= rule.buy_threshold
                        && rule.gates.iter().all(|g| g.passes(bars, frame, i))
                    {
                        state = Position::Long;
                    }
                }
                Position::Long => {
                    if value <= rule.sell_threshold {
                        state = Position::Flat;
                    }
                }
            }
        }
        positions.push(state);
    }

    Ok(Signals { positions, warm_up })
}

/// Constant-Long baseline for comparison against every rule.
pub fn buy_and_hold(len: usize) -> Vec<Position> {
    vec![Position::Long; len]
}
