//! RSRS indicator engine.
//!
//! Every derived column is a `Vec<Option<f64>>` aligned with the input
//! bars: `None` while the defining window has too few preceding values
//! (warm-up) or a ratio degenerates (zero variance), `Some` once the value
//! is a pure function of the trailing window. `None` propagates through
//! any further window that includes it, so downstream code can never
//! compute on an undefined value.

use crate::domain::ohlcv::Bar;

/// Window parameters for one indicator pass.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    /// Regression window n for the RSRS slope.
    pub slope_window: usize,
    /// Standardization window m for the z-score.
    pub score_window: usize,
    /// Trailing window for the score/volume correlation.
    pub volume_corr_window: usize,
    /// Close moving-average window for the price-trend gate.
    pub price_ma_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            slope_window: 18,
            score_window: 600,
            volume_corr_window: 10,
            price_ma_window: 20,
        }
    }
}

/// All derived columns for one bar series.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub slope: Vec<Option<f64>>,
    pub r_squared: Vec<Option<f64>>,
    pub standard_score: Vec<Option<f64>>,
    pub modified_standard_score: Vec<Option<f64>>,
    pub right_skewed_standard_score: Vec<Option<f64>>,
    /// Rolling correlation of `standard_score` against volume.
    pub volume_correlation: Vec<Option<f64>>,
    /// Close SMA used by the price-trend entry gate.
    pub close_ma: Vec<Option<f64>>,
}

impl IndicatorFrame {
    pub fn compute(bars: &[Bar], params: &IndicatorParams) -> Self {
        let (slope, r_squared) = rolling_slope(bars, params.slope_window);
        let standard_score = standardize(&slope, &r_squared, params.score_window);
        let modified_standard_score = modified_score(&standard_score, &r_squared);
        let right_skewed_standard_score = right_skewed_score(&modified_standard_score, &slope);
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let volume_correlation =
            volume_correlation(&standard_score, &volumes, params.volume_corr_window);
        let close_ma = close_sma(bars, params.price_ma_window);

        IndicatorFrame {
            slope,
            r_squared,
            standard_score,
            modified_standard_score,
            right_skewed_standard_score,
            volume_correlation,
            close_ma,
        }
    }

    pub fn len(&self) -> usize {
        self.slope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slope.is_empty()
    }
}

/// Rolling OLS of high regressed on low over trailing windows of `n`.
///
/// Returns `(slope, r_squared)`. Both are `None` for the first n−1 bars
/// and wherever the low window has zero variance; `r_squared` is also
/// `None` when the high window has zero variance (0/0 correlation).
pub fn rolling_slope(bars: &[Bar], n: usize) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let len = bars.len();
    let mut slopes = vec![None; len];
    let mut r_squareds = vec![None; len];
    if n < 2 {
        return (slopes, r_squareds);
    }

    for i in (n - 1)..len {
        let window = &bars[i + 1 - n..=i];
        let mean_low: f64 = window.iter().map(|b| b.low).sum::<f64>() / n as f64;
        let mean_high: f64 = window.iter().map(|b| b.high).sum::<f64>() / n as f64;

        let mut cov = 0.0;
        let mut var_low = 0.0;
        let mut var_high = 0.0;
        for bar in window {
            let dx = bar.low - mean_low;
            let dy = bar.high - mean_high;
            cov += dx * dy;
            var_low += dx * dx;
            var_high += dy * dy;
        }

        if var_low > 0.0 {
            slopes[i] = Some(cov / var_low);
            if var_high > 0.0 {
                r_squareds[i] = Some((cov * cov) / (var_low * var_high));
            }
        }
    }

    (slopes, r_squareds)
}

/// Rolling z-score of the slope, scaled by R².
///
/// The window at index i is the `m` most recent defined slope values
/// ending at i, so the score is defined only once m valid slopes exist
/// and the slope at i itself is defined. Sample standard deviation
/// (ddof = 1); zero deviation or a missing R² yields `None`.
pub fn standardize(
    slope: &[Option<f64>],
    r_squared: &[Option<f64>],
    m: usize,
) -> Vec<Option<f64>> {
    let mut scores = vec![None; slope.len()];
    if m < 2 {
        return scores;
    }

    let mut valid: Vec<f64> = Vec::with_capacity(slope.len());
    for i in 0..slope.len() {
        let Some(current) = slope[i] else { continue };
        valid.push(current);
        if valid.len() < m {
            continue;
        }

        let window = &valid[valid.len() - m..];
        let mean: f64 = window.iter().sum::<f64>() / m as f64;
        let variance: f64 =
            window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (m - 1) as f64;
        let std = variance.sqrt();
        if std > 0.0 {
            scores[i] = r_squared[i].map(|r2| (current - mean) / std * r2);
        }
    }

    scores
}

/// Standard score weighted again by R².
pub fn modified_score(
    standard_score: &[Option<f64>],
    r_squared: &[Option<f64>],
) -> Vec<Option<f64>> {
    standard_score
        .iter()
        .zip(r_squared)
        .map(|(score, r2)| match (score, r2) {
            (Some(s), Some(r)) => Some(s * r),
            _ => None,
        })
        .collect()
}

/// Modified score weighted by the absolute slope magnitude.
pub fn right_skewed_score(
    modified_score: &[Option<f64>],
    slope: &[Option<f64>],
) -> Vec<Option<f64>> {
    modified_score
        .iter()
        .zip(slope)
        .map(|(score, s)| match (score, s) {
            (Some(m), Some(k)) => Some(m * k.abs()),
            _ => None,
        })
        .collect()
}

/// Trailing Pearson correlation between a score column and volume.
///
/// `None` when the window is shorter than 2, contains any undefined
/// score, or either side has zero variance.
pub fn volume_correlation(
    score: &[Option<f64>],
    volume: &[f64],
    window: usize,
) -> Vec<Option<f64>> {
    let len = score.len().min(volume.len());
    let mut result = vec![None; score.len()];
    if window < 2 {
        return result;
    }

    for i in (window - 1)..len {
        let start = i + 1 - window;
        let Some(scores) = score[start..=i]
            .iter()
            .copied()
            .collect::<Option<Vec<f64>>>()
        else {
            continue;
        };
        let volumes = &volume[start..=i];

        let mean_s: f64 = scores.iter().sum::<f64>() / window as f64;
        let mean_v: f64 = volumes.iter().sum::<f64>() / window as f64;

        let mut cov = 0.0;
        let mut var_s = 0.0;
        let mut var_v = 0.0;
        for (s, v) in scores.iter().zip(volumes) {
            let ds = s - mean_s;
            let dv = v - mean_v;
            cov += ds * dv;
            var_s += ds * ds;
            var_v += dv * dv;
        }

        if var_s > 0.0 && var_v > 0.0 {
            result[i] = Some(cov / (var_s * var_v).sqrt());
        }
    }

    result
}

/// Simple moving average of the close over trailing windows.
pub fn close_sma(bars: &[Bar], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; bars.len()];
    if window == 0 {
        return result;
    }
    for i in (window - 1)..bars.len() {
        let sum: f64 = bars[i + 1 - window..=i].iter().map(|b| b.close).sum();
        result[i] = Some(sum / window as f64);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(lows: &[f64], highs: &[f64]) -> Vec<Bar> {
        lows.iter()
            .zip(highs)
            .enumerate()
            .map(|(i, (&low, &high))| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: low,
                high,
                low,
                close: (low + high) / 2.0,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn slope_perfect_linear_relationship() {
        // high = 1.05 * low + 2 exactly: every full window must give
        // slope = 1.05 and R² = 1.
        let lows: Vec<f64> = (0..10).map(|i| 90.0 + i as f64).collect();
        let highs: Vec<f64> = lows.iter().map(|l| 1.05 * l + 2.0).collect();
        let bars = make_bars(&lows, &highs);

        let (slope, r2) = rolling_slope(&bars, 4);

        for i in 0..3 {
            assert!(slope[i].is_none());
            assert!(r2[i].is_none());
        }
        for i in 3..10 {
            assert_relative_eq!(slope[i].unwrap(), 1.05, epsilon = 1e-12);
            assert_relative_eq!(r2[i].unwrap(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn slope_zero_low_variance_is_undefined() {
        let lows = vec![100.0; 6];
        let highs = vec![101.0, 102.0, 103.0, 104.0, 105.0, 106.0];
        let bars = make_bars(&lows, &highs);

        let (slope, r2) = rolling_slope(&bars, 3);
        for i in 2..6 {
            assert!(slope[i].is_none());
            assert!(r2[i].is_none());
        }
    }

    #[test]
    fn slope_window_larger_than_series() {
        let bars = make_bars(&[100.0, 101.0], &[102.0, 103.0]);
        let (slope, r2) = rolling_slope(&bars, 5);
        assert!(slope.iter().all(Option::is_none));
        assert!(r2.iter().all(Option::is_none));
    }

    #[test]
    fn standardize_known_window() {
        let slope = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let r2 = vec![Some(1.0); 4];

        let scores = standardize(&slope, &r2, 3);

        assert!(scores[0].is_none());
        assert!(scores[1].is_none());
        // Window [1,2,3]: mean 2, sample std 1, z = (3-2)/1 = 1.
        assert_relative_eq!(scores[2].unwrap(), 1.0, epsilon = 1e-12);
        // Window [2,3,4]: mean 3, sample std 1, z = 1.
        assert_relative_eq!(scores[3].unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn standardize_scales_by_r_squared() {
        let slope = vec![Some(1.0), Some(2.0), Some(3.0)];
        let r2 = vec![Some(1.0), Some(1.0), Some(0.5)];

        let scores = standardize(&slope, &r2, 3);
        assert_relative_eq!(scores[2].unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn standardize_constant_slope_is_undefined() {
        let slope = vec![Some(1.5); 6];
        let r2 = vec![Some(1.0); 6];

        let scores = standardize(&slope, &r2, 3);
        assert!(scores.iter().all(Option::is_none));
    }

    #[test]
    fn standardize_counts_only_valid_slopes() {
        // Two leading Nones: the third valid value arrives at index 4.
        let slope = vec![None, None, Some(1.0), Some(2.0), Some(3.0)];
        let r2 = vec![None, None, Some(1.0), Some(1.0), Some(1.0)];

        let scores = standardize(&slope, &r2, 3);
        assert!(scores[2].is_none());
        assert!(scores[3].is_none());
        assert_relative_eq!(scores[4].unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn modified_and_right_skewed_products() {
        let standard = vec![Some(2.0), None, Some(-1.0)];
        let r2 = vec![Some(0.5), Some(0.9), Some(0.8)];
        let slope = vec![Some(-3.0), Some(1.0), None];

        let modified = modified_score(&standard, &r2);
        assert_relative_eq!(modified[0].unwrap(), 1.0, epsilon = 1e-12);
        assert!(modified[1].is_none());
        assert_relative_eq!(modified[2].unwrap(), -0.8, epsilon = 1e-12);

        let skewed = right_skewed_score(&modified, &slope);
        // |slope| weighting keeps the score's sign.
        assert_relative_eq!(skewed[0].unwrap(), 3.0, epsilon = 1e-12);
        assert!(skewed[1].is_none());
        assert!(skewed[2].is_none());
    }

    #[test]
    fn volume_correlation_perfectly_correlated() {
        let score: Vec<Option<f64>> = (0..6).map(|i| Some(i as f64)).collect();
        let volume: Vec<f64> = (0..6).map(|i| 10.0 + 2.0 * i as f64).collect();

        let corr = volume_correlation(&score, &volume, 4);
        assert!(corr[2].is_none());
        for i in 3..6 {
            assert_relative_eq!(corr[i].unwrap(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn volume_correlation_anti_correlated() {
        let score: Vec<Option<f64>> = (0..5).map(|i| Some(i as f64)).collect();
        let volume: Vec<f64> = (0..5).map(|i| 100.0 - 3.0 * i as f64).collect();

        let corr = volume_correlation(&score, &volume, 3);
        assert_relative_eq!(corr[4].unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn volume_correlation_undefined_score_propagates() {
        let score = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let volume = vec![10.0, 20.0, 30.0, 40.0];

        let corr = volume_correlation(&score, &volume, 3);
        // Windows touching the None stay undefined.
        assert!(corr[2].is_none());
        assert!(corr[3].is_none());
    }

    #[test]
    fn volume_correlation_zero_variance_volume() {
        let score: Vec<Option<f64>> = (0..5).map(|i| Some(i as f64)).collect();
        let volume = vec![500.0; 5];

        let corr = volume_correlation(&score, &volume, 3);
        assert!(corr.iter().all(Option::is_none));
    }

    #[test]
    fn close_sma_basic() {
        let bars = make_bars(&[10.0, 20.0, 30.0], &[10.0, 20.0, 30.0]);
        let ma = close_sma(&bars, 2);
        assert!(ma[0].is_none());
        assert_relative_eq!(ma[1].unwrap(), 15.0, epsilon = 1e-12);
        assert_relative_eq!(ma[2].unwrap(), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn frame_columns_align_with_bars() {
        let lows: Vec<f64> = (0..40).map(|i| 90.0 + (i % 7) as f64).collect();
        // Non-linear highs so the slope series itself has variance.
        let highs: Vec<f64> = lows
            .iter()
            .enumerate()
            .map(|(i, l)| l * 1.02 + 1.0 + (i % 3) as f64)
            .collect();
        let bars = make_bars(&lows, &highs);

        let params = IndicatorParams {
            slope_window: 5,
            score_window: 10,
            volume_corr_window: 4,
            price_ma_window: 3,
        };
        let frame = IndicatorFrame::compute(&bars, &params);

        assert_eq!(frame.len(), bars.len());
        assert_eq!(frame.r_squared.len(), bars.len());
        assert_eq!(frame.standard_score.len(), bars.len());
        assert_eq!(frame.modified_standard_score.len(), bars.len());
        assert_eq!(frame.right_skewed_standard_score.len(), bars.len());
        assert_eq!(frame.volume_correlation.len(), bars.len());
        assert_eq!(frame.close_ma.len(), bars.len());

        // Warm-up: slope defined from index 4, score 9 windows later.
        assert!(frame.slope[3].is_none());
        assert!(frame.slope[4].is_some());
        assert!(frame.standard_score[12].is_none());
        assert!(frame.standard_score[13].is_some());
    }
}
