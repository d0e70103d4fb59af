//! Daily OHLCV bar representation.

use chrono::NaiveDate;

use crate::domain::error::RsrsError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Close-to-close return against the previous bar's close.
    pub fn daily_return(&self, prev_close: f64) -> f64 {
        (self.close - prev_close) / prev_close
    }
}

/// Check the bar-series invariants: dates strictly increasing, all price
/// fields positive. Violations are data errors reported with the row index.
pub fn validate_bars(bars: &[Bar]) -> Result<(), RsrsError> {
    for (i, bar) in bars.iter().enumerate() {
        if bar.open <= 0.0 || bar.high <= 0.0 || bar.low <= 0.0 || bar.close <= 0.0 {
            return Err(RsrsError::Data {
                row: i,
                reason: format!("non-positive price on {}", bar.date),
            });
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(RsrsError::Data {
                row: i,
                reason: format!(
                    "date {} not after previous date {}",
                    bar.date,
                    bars[i - 1].date
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn daily_return_basic() {
        let bar = make_bar(2, 110.0);
        assert!((bar.daily_return(100.0) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn validate_accepts_increasing_dates() {
        let bars = vec![make_bar(1, 100.0), make_bar(2, 101.0), make_bar(3, 99.0)];
        assert!(validate_bars(&bars).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_date() {
        let bars = vec![make_bar(1, 100.0), make_bar(1, 101.0)];
        let err = validate_bars(&bars).unwrap_err();
        assert!(matches!(err, RsrsError::Data { row: 1, .. }));
    }

    #[test]
    fn validate_rejects_non_positive_price() {
        let mut bars = vec![make_bar(1, 100.0), make_bar(2, 101.0)];
        bars[1].low = 0.0;
        let err = validate_bars(&bars).unwrap_err();
        assert!(matches!(err, RsrsError::Data { row: 1, .. }));
    }

    #[test]
    fn validate_empty_series() {
        assert!(validate_bars(&[]).is_ok());
    }
}
