//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9. Undefined points in the
//! constituent EMAs propagate; with the unadjusted EMA that only happens for
//! a zero period.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, ema_scan,
};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let closes = || bars.iter().map(|b| Some(b.close));
    let ema_fast = ema_scan(closes(), fast);
    let ema_slow = ema_scan(closes(), slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_scan(line.iter().copied(), signal_period);

    let values = bars
        .iter()
        .zip(line.iter().zip(&signal))
        .map(|(bar, (l, s))| IndicatorPoint {
            date: bar.date,
            value: l.zip(*s).map(|(line, signal)| IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            }),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Macd {
            fast,
            slow,
            signal: signal_period,
        },
        values,
    }
}

pub fn calculate_macd_default(bars: &[Bar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
