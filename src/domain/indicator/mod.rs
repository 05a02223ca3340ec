//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values, aligned 1:1 with its bars
//!
//! Every calculation returns a series of the same length as its input. Points
//! without enough history carry `None`; a series shorter than the lookback
//! window is therefore entirely undefined rather than an error.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod heikin_ashi;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use ema::{calculate_ema, ema_scan};
pub use heikin_ashi::{heikin_ashi, heikin_ashi_open_scan};
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, trailing_mean};

use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

impl IndicatorPoint {
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn field(&self, field: IndicatorField) -> Option<f64> {
        self.value.as_ref().and_then(|v| v.field(field))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

/// Which component of a (possibly multi-valued) indicator point to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
}

impl IndicatorField {
    /// Column suffix used in tabular export; `None` for single-valued indicators.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            IndicatorField::Value => None,
            IndicatorField::MacdLine => Some("line"),
            IndicatorField::MacdSignal => Some("signal"),
            IndicatorField::MacdHistogram => Some("histogram"),
            IndicatorField::BollingerUpper => Some("upper"),
            IndicatorField::BollingerMiddle => Some("middle"),
            IndicatorField::BollingerLower => Some("lower"),
        }
    }
}

impl IndicatorValue {
    pub fn field(&self, field: IndicatorField) -> Option<f64> {
        match (self, field) {
            (IndicatorValue::Simple(v), IndicatorField::Value) => Some(*v),
            (IndicatorValue::Macd { line, .. }, IndicatorField::MacdLine) => Some(*line),
            (IndicatorValue::Macd { signal, .. }, IndicatorField::MacdSignal) => Some(*signal),
            (IndicatorValue::Macd { histogram, .. }, IndicatorField::MacdHistogram) => {
                Some(*histogram)
            }
            (IndicatorValue::Bollinger { upper, .. }, IndicatorField::BollingerUpper) => {
                Some(*upper)
            }
            (IndicatorValue::Bollinger { middle, .. }, IndicatorField::BollingerMiddle) => {
                Some(*middle)
            }
            (IndicatorValue::Bollinger { lower, .. }, IndicatorField::BollingerLower) => {
                Some(*lower)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// The fields this indicator produces, in export column order.
    pub fn fields(&self) -> &'static [IndicatorField] {
        match self {
            IndicatorType::Macd { .. } => &[
                IndicatorField::MacdLine,
                IndicatorField::MacdSignal,
                IndicatorField::MacdHistogram,
            ],
            IndicatorType::Bollinger { .. } => &[
                IndicatorField::BollingerUpper,
                IndicatorField::BollingerMiddle,
                IndicatorField::BollingerLower,
            ],
            _ => &[IndicatorField::Value],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Build a single-valued series from per-bar optional values.
    pub(crate) fn from_simple(
        indicator_type: IndicatorType,
        bars: &[Bar],
        values: Vec<Option<f64>>,
    ) -> Self {
        let values = bars
            .iter()
            .zip(values)
            .map(|(bar, v)| IndicatorPoint {
                date: bar.date,
                value: v.map(IndicatorValue::Simple),
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub(crate) fn undefined(indicator_type: IndicatorType, bars: &[Bar]) -> Self {
        Self::from_simple(indicator_type, bars, vec![None; bars.len()])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One component of the series as plain optional numbers.
    pub fn field_values(&self, field: IndicatorField) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.field(field)).collect()
    }

    /// The primary line: the value of simple indicators, the MACD line, or
    /// the Bollinger middle band.
    pub fn primary(&self) -> Vec<Option<f64>> {
        let field = match self.indicator_type {
            IndicatorType::Macd { .. } => IndicatorField::MacdLine,
            IndicatorType::Bollinger { .. } => IndicatorField::BollingerMiddle,
            _ => IndicatorField::Value,
        };
        self.field_values(field)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
