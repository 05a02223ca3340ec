//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

/// Trailing arithmetic mean over `window` values. Indices before the window
/// fills, and every index when `window` is zero, are `None`.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    IndicatorSeries::from_simple(
        IndicatorType::Sma(period),
        bars,
        trailing_mean(&closes, period),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorValue;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.len(), 4);
        assert!(!series.values[0].is_valid());
        assert!(!series.values[1].is_valid());
        assert_eq!(series.values[2].value, Some(IndicatorValue::Simple(20.0)));
        assert_eq!(series.values[3].value, Some(IndicatorValue::Simple(30.0)));
    }

    #[test]
    fn sma_shorter_than_window_is_all_undefined() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 5);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn sma_zero_window() {
        assert_eq!(trailing_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn sma_window_one_is_passthrough() {
        assert_eq!(
            trailing_mean(&[1.0, 2.0, 3.0], 1),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn sma_empty() {
        let series = calculate_sma(&[], 3);
        assert!(series.is_empty());
        assert_eq!(series.indicator_type, IndicatorType::Sma(3));
    }
}
