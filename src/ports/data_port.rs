//! Bar source port.

use crate::domain::error::BarsignalError;
use crate::domain::ohlcv::BarSeries;
use chrono::NaiveDate;

/// Loads daily bars for a symbol over an inclusive date range.
///
/// Implementations hand back a validated [`BarSeries`]: dates strictly
/// ascending with no duplicates. The engine never re-sorts.
pub trait DataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, BarsignalError>;
}

impl<T: DataPort + ?Sized> DataPort for &T {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, BarsignalError> {
        (**self).fetch_bars(symbol, start_date, end_date)
    }
}
