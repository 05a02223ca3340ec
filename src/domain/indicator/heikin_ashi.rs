//! Heikin-Ashi candle transform.
//!
//! HA_close[i] = (O + H + L + C) / 4
//! HA_open[0]  = (O[0] + C[0]) / 2
//! HA_open[i]  = (HA_open[i-1] + HA_close[i-1]) / 2
//! HA_high[i]  = max(H, HA_open, HA_close)
//! HA_low[i]   = min(L, HA_open, HA_close)
//!
//! The result is a bar series, not an indicator series, and can be passed
//! to any indicator in place of the raw bars.

use crate::domain::ohlcv::{Bar, BarSeries};

/// The HA open recurrence as a left scan. `seed` is HA_open[0]; each later
/// value averages the previous HA open and HA close.
pub fn heikin_ashi_open_scan(seed: f64, ha_closes: &[f64]) -> Vec<f64> {
    let Some((_, preceding)) = ha_closes.split_last() else {
        return Vec::new();
    };
    std::iter::once(seed)
        .chain(preceding.iter().scan(seed, |open, &close| {
            *open = (*open + close) / 2.0;
            Some(*open)
        }))
        .collect()
}

pub fn heikin_ashi(bars: &BarSeries) -> BarSeries {
    let Some(first) = bars.first() else {
        return BarSeries::default();
    };

    let ha_closes: Vec<f64> = bars
        .iter()
        .map(|b| (b.open + b.high + b.low + b.close) / 4.0)
        .collect();
    let ha_opens = heikin_ashi_open_scan((first.open + first.close) / 2.0, &ha_closes);

    let candles = bars
        .iter()
        .zip(ha_opens.into_iter().zip(ha_closes))
        .map(|(bar, (open, close))| Bar {
            date: bar.date,
            open,
            high: bar.high.max(open).max(close),
            low: bar.low.min(open).min(close),
            close,
            volume: bar.volume,
        })
        .collect();

    // Dates are carried over unchanged and every price is an average or
    // extremum of finite inputs, so the source series' guarantees hold.
    BarSeries::from_validated(candles)
}
