//! CSV file data adapter.
//!
//! Expects a header row with at least `date,open,high,low,close,volume`
//! (any order, extra columns ignored, matching is case-insensitive).
//! Missing columns fail fast by name; rows are sorted chronologically and
//! the series invariants are enforced before the bars leave the adapter.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::error::RsrsError;
use crate::domain::ohlcv::{validate_bars, Bar};
use crate::ports::data_port::DataPort;

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn column_indices(&self, headers: &csv::StringRecord) -> Result<[usize; 6], RsrsError> {
        let mut indices = [0usize; 6];
        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            indices[slot] = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| RsrsError::MissingColumn {
                    column: name.to_string(),
                    file: self.path.display().to_string(),
                })?;
        }
        Ok(indices)
    }

    fn parse_field(
        &self,
        record: &csv::StringRecord,
        index: usize,
        name: &str,
        row: usize,
    ) -> Result<f64, RsrsError> {
        let raw = record.get(index).ok_or_else(|| RsrsError::Data {
            row,
            reason: format!("row too short, no {name} field"),
        })?;
        raw.trim().parse().map_err(|e| RsrsError::Data {
            row,
            reason: format!("invalid {name} value '{raw}': {e}"),
        })
    }
}

impl DataPort for CsvAdapter {
    fn load_bars(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, RsrsError> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let [date_i, open_i, high_i, low_i, close_i, volume_i] =
            self.column_indices(rdr.headers()?)?;

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            // 1-based file row, plus the header line.
            let row = idx + 2;
            let record = result?;

            let raw_date = record.get(date_i).ok_or_else(|| RsrsError::Data {
                row,
                reason: "row too short, no date field".into(),
            })?;
            let date =
                NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").map_err(|e| {
                    RsrsError::Data {
                        row,
                        reason: format!("invalid date '{raw_date}': {e}"),
                    }
                })?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(Bar {
                date,
                open: self.parse_field(&record, open_i, "open", row)?,
                high: self.parse_field(&record, high_i, "high", row)?,
                low: self.parse_field(&record, low_i, "low", row)?,
                close: self.parse_field(&record, close_i, "close", row)?,
                volume: self.parse_field(&record, volume_i, "volume", row)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        validate_bars(&bars)?;
        Ok(bars)
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RsrsError> {
        let bars = self.load_bars(None, None)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
