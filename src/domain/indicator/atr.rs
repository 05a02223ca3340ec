//! Average range indicator, reported as ATR.
//!
//! ATR(n)[i] = mean(H - L) over the trailing n bars. This is the daily
//! high-low range only; the prior close is ignored, so gaps between
//! sessions do not widen the value the way classical true range would.
//!
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, trailing_mean};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    let ranges: Vec<f64> = bars.iter().map(Bar::daily_range).collect();
    IndicatorSeries::from_simple(
        IndicatorType::Atr(period),
        bars,
        trailing_mean(&ranges, period),
    )
}
