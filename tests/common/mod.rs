#![allow(dead_code)]

use barsignal::domain::error::BarsignalError;
pub use barsignal::domain::ohlcv::{Bar, BarSeries};
use barsignal::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, BarsignalError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BarsignalError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        BarSeries::new(bars)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> Bar {
    Bar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: Some(1000),
    }
}

/// One bar per calendar day from `start`, closing at each price in turn.
pub fn bars_from_closes(start: &str, closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        })
        .collect()
}

/// A gently oscillating trend, long enough for the slow default windows.
pub fn generate_bars(start: &str, count: usize, start_price: f64) -> Vec<Bar> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = start_price + 0.2 * t + 5.0 * (t / 7.0).sin();
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0 + (t / 5.0).cos().abs(),
                low: close - 1.0,
                close,
                volume: Some(1000 + i as i64),
            }
        })
        .collect()
}

pub fn series(bars: Vec<Bar>) -> BarSeries {
    BarSeries::new(bars).unwrap()
}
