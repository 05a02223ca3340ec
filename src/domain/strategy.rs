//! Strategy kinds and the position rules they evaluate to.
//!
//! A `PositionRule` decides the position held at the close of bar `index`,
//! given the position held at the previous close. Rules only read
//! indicator values up to and including `index`.

use crate::domain::indicator::{
    IndicatorField, calculate_atr, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
};
use crate::domain::ohlcv::Bar;
use crate::domain::position::Position;
use std::fmt;

pub trait PositionRule {
    fn position(&self, index: usize, previous: Position) -> Position;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    AlwaysLong,
    AlwaysFlat,
    /// Long while EMA(fast) > EMA(slow).
    EmaCross { fast: usize, slow: usize },
    /// Enter below `oversold`, exit above `overbought`, otherwise hold.
    RsiDipBuy {
        window: usize,
        oversold: f64,
        overbought: f64,
    },
    /// Long while the MACD line is above its signal line.
    MacdCross {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// Long while close > SMA(ma_window) and ATR(atr_window) rose since the prior bar.
    AtrTrend { ma_window: usize, atr_window: usize },
}

impl StrategyKind {
    /// Precompute the indicators this strategy reads and bind them into a rule.
    pub fn rule(&self, bars: &[Bar]) -> Box<dyn PositionRule> {
        match *self {
            StrategyKind::AlwaysLong => Box::new(Constant(Position::Long)),
            StrategyKind::AlwaysFlat => Box::new(Constant(Position::Flat)),
            StrategyKind::EmaCross { fast, slow } => Box::new(LongWhileAbove {
                upper: calculate_ema(bars, fast).primary(),
                lower: calculate_ema(bars, slow).primary(),
            }),
            StrategyKind::RsiDipBuy {
                window,
                oversold,
                overbought,
            } => Box::new(RsiDipBuy {
                rsi: calculate_rsi(bars, window).primary(),
                oversold,
                overbought,
            }),
            StrategyKind::MacdCross { fast, slow, signal } => {
                let macd = calculate_macd(bars, fast, slow, signal);
                Box::new(LongWhileAbove {
                    upper: macd.field_values(IndicatorField::MacdLine),
                    lower: macd.field_values(IndicatorField::MacdSignal),
                })
            }
            StrategyKind::AtrTrend {
                ma_window,
                atr_window,
            } => Box::new(AtrTrend {
                closes: bars.iter().map(|b| b.close).collect(),
                ma: calculate_sma(bars, ma_window).primary(),
                atr: calculate_atr(bars, atr_window).primary(),
            }),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::AlwaysLong => write!(f, "BUY_AND_HOLD"),
            StrategyKind::AlwaysFlat => write!(f, "FLAT"),
            StrategyKind::EmaCross { fast, slow } => write!(f, "EMA_CROSS({},{})", fast, slow),
            StrategyKind::RsiDipBuy {
                window,
                oversold,
                overbought,
            } => write!(f, "RSI_DIP({},{},{})", window, oversold, overbought),
            StrategyKind::MacdCross { fast, slow, signal } => {
                write!(f, "MACD_CROSS({},{},{})", fast, slow, signal)
            }
            StrategyKind::AtrTrend {
                ma_window,
                atr_window,
            } => write!(f, "ATR_TREND({},{})", ma_window, atr_window),
        }
    }
}

struct Constant(Position);

impl PositionRule for Constant {
    fn position(&self, _index: usize, _previous: Position) -> Position {
        self.0
    }
}

/// Long while `upper > lower`; flat when either is undefined.
struct LongWhileAbove {
    upper: Vec<Option<f64>>,
    lower: Vec<Option<f64>>,
}

impl PositionRule for LongWhileAbove {
    fn position(&self, index: usize, _previous: Position) -> Position {
        match (self.upper[index], self.lower[index]) {
            (Some(u), Some(l)) => Position::from(u > l),
            _ => Position::Flat,
        }
    }
}

struct RsiDipBuy {
    rsi: Vec<Option<f64>>,
    oversold: f64,
    overbought: f64,
}

impl PositionRule for RsiDipBuy {
    fn position(&self, index: usize, previous: Position) -> Position {
        match self.rsi[index] {
            Some(v) if v < self.oversold => Position::Long,
            Some(v) if v > self.overbought => Position::Flat,
            _ => previous,
        }
    }
}

struct AtrTrend {
    closes: Vec<f64>,
    ma: Vec<Option<f64>>,
    atr: Vec<Option<f64>>,
}

impl PositionRule for AtrTrend {
    fn position(&self, index: usize, _previous: Position) -> Position {
        let Some(prev) = index.checked_sub(1) else {
            return Position::Flat;
        };
        match (self.ma[index], self.atr[index], self.atr[prev]) {
            (Some(ma), Some(atr), Some(prev_atr)) => {
                Position::from(self.closes[index] > ma && atr > prev_atr)
            }
            _ => Position::Flat,
        }
    }
}

/// Evaluate `rule` over every bar, threading the previous position through.
pub fn positions(rule: &dyn PositionRule, len: usize) -> Vec<Position> {
    (0..len)
        .scan(Position::Flat, |held, index| {
            *held = rule.position(index, *held);
            Some(*held)
        })
        .collect()
}
