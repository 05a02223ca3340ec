//! CSV file data adapter.
//!
//! Reads `<base_path>/<SYMBOL>.csv` with a header row naming at least
//! `date,open,high,low,close`. A `volume` column is optional and column
//! order is free. Dates are `YYYY-MM-DD`.

use crate::domain::error::BarsignalError;
use crate::domain::ohlcv::{Bar, BarSeries, RawBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info};

pub struct CsvAdapter {
    base_path: PathBuf,
    invert: bool,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, path: &str) -> Result<Self, BarsignalError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| BarsignalError::Data {
                reason: format!("{}: missing '{}' column", path, name),
            })
        };
        Ok(Self {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }

    /// Unparseable or empty cells become `None` and are reported by
    /// `Bar::from_raw` with the offending field name.
    fn raw_bar(&self, record: &StringRecord) -> RawBar {
        let cell = |i: usize| record.get(i).map(str::trim).filter(|s| !s.is_empty());
        let price = |i: usize| cell(i).and_then(|s| s.parse::<f64>().ok());
        RawBar {
            date: cell(self.date).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            open: price(self.open),
            high: price(self.high),
            low: price(self.low),
            close: price(self.close),
            volume: self.volume.and_then(cell).and_then(parse_volume),
        }
    }
}

/// Whole-number volumes only; `"1200.0"` is accepted, `"12.5"` and `"NaN"` are not.
fn parse_volume(cell: &str) -> Option<i64> {
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    let v = cell.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            invert: false,
        }
    }

    /// Serve reciprocal quotes (e.g. USDEUR from an EURUSD file).
    pub fn with_inversion(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, BarsignalError> {
        let path = self.csv_path(symbol);
        let shown = path.display().to_string();
        let file = File::open(&path).map_err(|e| BarsignalError::Data {
            reason: format!("failed to read {}: {}", shown, e),
        })?;

        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let columns = Columns::from_headers(rdr.headers()?, &shown)?;

        let mut bars = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let record = result?;
            let bar = Bar::from_raw(index, columns.raw_bar(&record))?;
            if bar.date < start_date || bar.date > end_date {
                continue;
            }
            let bar = if self.invert {
                bar.inverted().ok_or_else(|| BarsignalError::Data {
                    reason: format!("cannot invert zero price on {}", bar.date),
                })?
            } else {
                bar
            };
            bars.push(bar);
        }

        debug!(symbol, path = %shown, bars = bars.len(), "read csv bars");
        let series = BarSeries::new(bars)?;
        info!(
            symbol,
            bars = series.len(),
            invert = self.invert,
            "loaded bars"
        );
        Ok(series)
    }
}
