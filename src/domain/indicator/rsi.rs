//! RSI (Relative Strength Index) indicator.
//!
//! Simple trailing means over the last n price changes (not Wilder's
//! smoothing):
//! - avg_gain = mean(max(delta, 0)), avg_loss = mean(max(-delta, 0))
//! - RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! Degenerate windows: avg_loss == 0 with avg_gain > 0 gives 100; a window
//! with no movement at all gives 50.
//!
//! Warmup: first n bars are undefined (n changes need n+1 closes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 { 100.0 } else { NEUTRAL_RSI }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() <= period {
        return IndicatorSeries::undefined(IndicatorType::Rsi(period), bars);
    }

    // changes[i] is the change into bar i; changes[0] is a placeholder.
    let changes: Vec<f64> = std::iter::once(0.0)
        .chain(bars.windows(2).map(|w| w[1].close - w[0].close))
        .collect();

    let values = (0..bars.len())
        .map(|i| {
            if i < period {
                return None;
            }
            let window = &changes[i + 1 - period..=i];
            let avg_gain = window.iter().map(|d| d.max(0.0)).sum::<f64>() / period as f64;
            let avg_loss = window.iter().map(|d| (-d).max(0.0)).sum::<f64>() / period as f64;
            Some(rsi_from_averages(avg_gain, avg_loss))
        })
        .collect();

    IndicatorSeries::from_simple(IndicatorType::Rsi(period), bars, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn rsi_window_2_known_values() {
        let bars = make_bars(&[10.0, 11.0, 9.0, 9.0]);
        let values = calculate_rsi(&bars, 2).primary();

        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        // gains [1, 0] -> 0.5, losses [0, 2] -> 1.0
        assert_relative_eq!(values[2].unwrap(), 100.0 - 100.0 / 1.5, epsilon = 1e-10);
        // gains [0, 0] -> 0, losses [2, 0] -> 1.0
        assert_relative_eq!(values[3].unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + (i % 5) as f64 * 2.0).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);

        assert_eq!(series.len(), 15);
        for i in 0..14 {
            assert!(!series.values[i].is_valid(), "bar {} should be undefined", i);
        }
        assert!(series.values[14].is_valid());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let values = calculate_rsi(&make_bars(&prices), 14).primary();
        assert_eq!(values[14], Some(100.0));
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let values = calculate_rsi(&make_bars(&prices), 14).primary();
        assert_relative_eq!(values[14].unwrap(), 0.0);
    }

    #[test]
    fn rsi_flat_market_is_neutral() {
        let values = calculate_rsi(&make_bars(&[100.0; 20]), 14).primary();
        for v in values.iter().skip(14) {
            assert_eq!(*v, Some(NEUTRAL_RSI));
        }
    }

    #[test]
    fn rsi_series_shorter_than_window() {
        let series = calculate_rsi(&make_bars(&[1.0, 2.0, 3.0]), 14);
        assert_eq!(series.len(), 3);
        assert!(series.values.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&make_bars(&[1.0, 2.0]), 0);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn rsi_empty_bars() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_from_averages_conventions() {
        assert_eq!(rsi_from_averages(1.0, 0.0), 100.0);
        assert_eq!(rsi_from_averages(0.0, 0.0), 50.0);
        assert_eq!(rsi_from_averages(0.0, 1.0), 0.0);
        assert_relative_eq!(rsi_from_averages(1.0, 1.0), 50.0);
    }

    proptest! {
        #[test]
        fn rsi_stays_in_range(
            closes in prop::collection::vec(1.0f64..500.0, 0..80),
            period in 1usize..20,
        ) {
            let values = calculate_rsi(&make_bars(&closes), period).primary();
            prop_assert_eq!(values.len(), closes.len());
            for v in values.into_iter().flatten() {
                prop_assert!((0.0..=100.0).contains(&v));
            }
        }
    }
}
