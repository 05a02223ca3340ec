//! Dispatch from an `IndicatorType` to its calculation.

use crate::domain::indicator::{
    IndicatorSeries, IndicatorType, calculate_atr, calculate_bollinger, calculate_ema,
    calculate_macd, calculate_rsi, calculate_sma,
};
use crate::domain::ohlcv::Bar;
use std::collections::HashMap;

pub type IndicatorMap = HashMap<IndicatorType, IndicatorSeries>;

pub fn compute_indicator(bars: &[Bar], indicator_type: &IndicatorType) -> IndicatorSeries {
    match *indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Ema(span) => calculate_ema(bars, span),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::Atr(period) => calculate_atr(bars, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

/// Compute each requested indicator once; duplicates in `types` collapse.
pub fn compute_indicators(bars: &[Bar], types: &[IndicatorType]) -> IndicatorMap {
    let mut map = IndicatorMap::with_capacity(types.len());
    for indicator_type in types {
        map.entry(*indicator_type)
            .or_insert_with(|| compute_indicator(bars, indicator_type));
    }
    tracing::debug!(bars = bars.len(), indicators = map.len(), "computed indicators");
    map
}
