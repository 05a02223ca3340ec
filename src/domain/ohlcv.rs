//! OHLCV bar representation and the validated bar series.

use crate::domain::error::BarsignalError;
use chrono::NaiveDate;
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

/// A bar as delivered by a loader, before required fields are checked.
#[derive(Debug, Clone, Default)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

fn required(value: Option<f64>, index: usize, field: &'static str) -> Result<f64, BarsignalError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(BarsignalError::MalformedBarData { index, field }),
    }
}

impl Bar {
    /// Convert a loader row into a bar. `index` is the row position, used
    /// only for error reporting.
    pub fn from_raw(index: usize, raw: RawBar) -> Result<Self, BarsignalError> {
        let date = raw.date.ok_or(BarsignalError::MalformedBarData {
            index,
            field: "date",
        })?;
        Ok(Self {
            date,
            open: required(raw.open, index, "open")?,
            high: required(raw.high, index, "high")?,
            low: required(raw.low, index, "low")?,
            close: required(raw.close, index, "close")?,
            volume: raw.volume,
        })
    }

    /// high - low
    pub fn daily_range(&self) -> f64 {
        self.high - self.low
    }

    /// Reciprocal quote (e.g. USD/EUR from EUR/USD). High and low swap
    /// places since 1/x is decreasing. Returns `None` if any price is zero.
    pub fn inverted(&self) -> Option<Bar> {
        if self.open == 0.0 || self.high == 0.0 || self.low == 0.0 || self.close == 0.0 {
            return None;
        }
        Some(Bar {
            date: self.date,
            open: 1.0 / self.open,
            high: 1.0 / self.low,
            low: 1.0 / self.high,
            close: 1.0 / self.close,
            volume: self.volume,
        })
    }
}

/// Bars in strictly ascending date order with finite prices.
///
/// The series is never re-sorted or deduplicated here: a loader that hands
/// over unordered data has broken its contract and gets an error back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarsignalError> {
        for (i, bar) in bars.iter().enumerate() {
            for (field, value) in [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ] {
                if !value.is_finite() {
                    return Err(BarsignalError::MalformedBarData { index: i, field });
                }
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(BarsignalError::UnorderedBars { index: i });
            }
        }
        Ok(Self { bars })
    }

    pub fn from_raw(raw: Vec<RawBar>) -> Result<Self, BarsignalError> {
        let bars = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| Bar::from_raw(i, r))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(bars)
    }

    /// Wrap bars derived from an already validated series.
    pub(crate) fn from_validated(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn into_inner(self) -> Vec<Bar> {
        self.bars
    }
}

impl Deref for BarSeries {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: Some(50_000),
        }
    }

    fn raw(day: u32, close: Option<f64>) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day),
            open: Some(1.0),
            high: Some(2.0),
            low: Some(0.5),
            close,
            volume: None,
        }
    }

    #[test]
    fn daily_range() {
        assert!((sample_bar().daily_range() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_swaps_high_and_low() {
        let inv = sample_bar().inverted().unwrap();
        assert!((inv.open - 0.01).abs() < 1e-12);
        assert!((inv.high - 1.0 / 90.0).abs() < 1e-12);
        assert!((inv.low - 1.0 / 110.0).abs() < 1e-12);
        assert!((inv.close - 1.0 / 105.0).abs() < 1e-12);
        assert!(inv.low <= inv.high);
    }

    #[test]
    fn inverted_zero_price_is_none() {
        let mut bar = sample_bar();
        bar.low = 0.0;
        assert!(bar.inverted().is_none());
    }

    #[test]
    fn from_raw_missing_close() {
        let err = Bar::from_raw(7, raw(1, None)).unwrap_err();
        assert!(matches!(
            err,
            BarsignalError::MalformedBarData {
                index: 7,
                field: "close"
            }
        ));
    }

    #[test]
    fn from_raw_nan_is_malformed() {
        let err = Bar::from_raw(0, raw(1, Some(f64::NAN))).unwrap_err();
        assert!(matches!(
            err,
            BarsignalError::MalformedBarData { field: "close", .. }
        ));
    }

    #[test]
    fn from_raw_missing_date() {
        let mut r = raw(1, Some(1.0));
        r.date = None;
        assert!(matches!(
            Bar::from_raw(2, r),
            Err(BarsignalError::MalformedBarData {
                index: 2,
                field: "date"
            })
        ));
    }

    #[test]
    fn series_from_raw_reports_first_bad_row() {
        let rows = vec![raw(1, Some(1.0)), raw(2, None), raw(3, None)];
        assert!(matches!(
            BarSeries::from_raw(rows),
            Err(BarsignalError::MalformedBarData { index: 1, .. })
        ));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let bar = sample_bar();
        let err = BarSeries::new(vec![bar.clone(), bar]).unwrap_err();
        assert!(matches!(err, BarsignalError::UnorderedBars { index: 1 }));
    }

    #[test]
    fn series_rejects_descending_dates() {
        let a = sample_bar();
        let mut b = sample_bar();
        b.date = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();
        assert!(BarSeries::new(vec![a, b]).is_err());
    }

    #[test]
    fn empty_series_is_valid() {
        let series = BarSeries::new(vec![]).unwrap();
        assert!(series.is_empty());
    }
}
