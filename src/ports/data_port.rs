//! Bar-series access port trait.

use chrono::NaiveDate;

use crate::domain::error::RsrsError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Load the series, optionally restricted to a date range. The
    /// returned bars satisfy the series invariants (chronological,
    /// positive prices).
    fn load_bars(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, RsrsError>;

    /// First date, last date, and bar count; `None` for an empty source.
    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RsrsError>;
}
