//! Text forms of indicator, signal and strategy kinds.
//!
//! Grammar: `NAME` or `NAME(arg, arg, ...)` where each argument is a
//! number. Names are case-insensitive. Lists separate kinds with top-level
//! commas: `EMA(20), MACD(12,26,9), RSI(14)`. Errors carry the byte offset
//! of the offending token for caret rendering.

use crate::domain::error::ParseError;
use crate::domain::indicator::{IndicatorType, atr, bollinger, macd};
use crate::domain::signal::SignalSpec;
use crate::domain::strategy::StrategyKind;
use std::str::FromStr;

/// A parsed `NAME(args)` form before it is matched against a kind.
#[derive(Debug)]
struct Call {
    name: String,
    position: usize,
    /// Each argument with its source offset.
    args: Vec<(f64, usize)>,
    /// Offset just past the call, for arity errors.
    end: usize,
}

impl Call {
    fn arity(&self, allowed: &[usize]) -> Result<(), ParseError> {
        if allowed.contains(&self.args.len()) {
            return Ok(());
        }
        let wanted = allowed
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        Err(ParseError {
            message: format!(
                "{} takes {} argument(s), found {}",
                self.name,
                wanted,
                self.args.len()
            ),
            position: self.end,
        })
    }

    fn number(&self, index: usize) -> f64 {
        self.args[index].0
    }

    /// `(oversold, overbought)` from arguments 1 and 2, defaulting to 30/70.
    fn rsi_levels(&self) -> Result<(f64, f64), ParseError> {
        if self.args.len() < 3 {
            return Ok((30.0, 70.0));
        }
        let (oversold, overbought) = (self.number(1), self.number(2));
        if oversold > overbought {
            return Err(ParseError {
                message: format!(
                    "oversold level {} is above overbought level {}",
                    oversold, overbought
                ),
                position: self.args[1].1,
            });
        }
        Ok((oversold, overbought))
    }

    /// A strictly positive whole-number argument.
    fn window(&self, index: usize) -> Result<usize, ParseError> {
        let (value, position) = self.args[index];
        if value.fract() != 0.0 || value < 1.0 {
            return Err(ParseError {
                message: format!("expected positive integer, found {}", value),
                position,
            });
        }
        Ok(value as usize)
    }

    fn non_negative(&self, index: usize) -> Result<f64, ParseError> {
        let (value, position) = self.args[index];
        if value < 0.0 {
            return Err(ParseError {
                message: format!("expected non-negative number, found {}", value),
                position,
            });
        }
        Ok(value)
    }

    fn window_or(&self, index: usize, default: usize) -> Result<usize, ParseError> {
        if index < self.args.len() {
            self.window(index)
        } else {
            Ok(default)
        }
    }

    fn unknown(&self, what: &str) -> ParseError {
        ParseError {
            message: format!("unknown {} '{}'", what, self.name),
            position: self.position,
        }
    }
}

fn mult_x100(mult: f64) -> u32 {
    (mult * 100.0).round() as u32
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.peek().is_none()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    fn parse_name(&mut self) -> Result<(String, usize), ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            let found = self
                .peek()
                .map(|c| format!("'{}'", c))
                .unwrap_or_else(|| "end of input".to_string());
            return Err(ParseError {
                message: format!("expected name, found {}", found),
                position: start,
            });
        }
        Ok((self.input[start..self.pos].to_ascii_uppercase(), start))
    }

    fn parse_number(&mut self) -> Result<(f64, usize), ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .map(|n| (n, start))
            .map_err(|_| ParseError {
                message: format!("invalid number: {}", num_str),
                position: start,
            })
    }

    fn parse_call(&mut self) -> Result<Call, ParseError> {
        let (name, position) = self.parse_name()?;
        let mut args = Vec::new();
        if self.consume_char('(') {
            if !self.consume_char(')') {
                loop {
                    args.push(self.parse_number()?);
                    if self.consume_char(')') {
                        break;
                    }
                    self.expect_char(',')?;
                }
            }
        }
        Ok(Call {
            name,
            position,
            args,
            end: self.pos,
        })
    }
}

fn parse_one<T>(input: &str, convert: fn(&Call) -> Result<T, ParseError>) -> Result<T, ParseError> {
    let mut parser = Parser::new(input);
    let call = parser.parse_call()?;
    if !parser.at_end() {
        return Err(ParseError {
            message: format!("unexpected trailing input '{}'", parser.remaining().trim()),
            position: parser.pos,
        });
    }
    convert(&call)
}

/// Parse a comma-separated list of kinds. Blank input is an empty list.
fn parse_list<T>(
    input: &str,
    convert: fn(&Call) -> Result<T, ParseError>,
) -> Result<Vec<T>, ParseError> {
    let mut parser = Parser::new(input);
    let mut items = Vec::new();
    if parser.at_end() {
        return Ok(items);
    }
    loop {
        let call = parser.parse_call()?;
        items.push(convert(&call)?);
        if parser.at_end() {
            return Ok(items);
        }
        parser.expect_char(',')?;
    }
}

fn indicator_from_call(call: &Call) -> Result<IndicatorType, ParseError> {
    match call.name.as_str() {
        "SMA" | "MA" => {
            call.arity(&[1])?;
            Ok(IndicatorType::Sma(call.window(0)?))
        }
        "EMA" => {
            call.arity(&[1])?;
            Ok(IndicatorType::Ema(call.window(0)?))
        }
        "RSI" => {
            call.arity(&[0, 1])?;
            Ok(IndicatorType::Rsi(call.window_or(0, 14)?))
        }
        "ATR" => {
            call.arity(&[0, 1])?;
            Ok(IndicatorType::Atr(call.window_or(0, atr::DEFAULT_PERIOD)?))
        }
        "MACD" => {
            call.arity(&[0, 3])?;
            Ok(IndicatorType::Macd {
                fast: call.window_or(0, macd::DEFAULT_FAST)?,
                slow: call.window_or(1, macd::DEFAULT_SLOW)?,
                signal: call.window_or(2, macd::DEFAULT_SIGNAL)?,
            })
        }
        "BOLLINGER" | "BB" => {
            call.arity(&[0, 1, 2])?;
            let stddev_mult_x100 = if call.args.len() == 2 {
                mult_x100(call.non_negative(1)?)
            } else {
                bollinger::DEFAULT_MULT_X100
            };
            Ok(IndicatorType::Bollinger {
                period: call.window_or(0, bollinger::DEFAULT_PERIOD)?,
                stddev_mult_x100,
            })
        }
        _ => Err(call.unknown("indicator")),
    }
}

fn signal_from_call(call: &Call) -> Result<SignalSpec, ParseError> {
    match call.name.as_str() {
        "EMA_CROSS" => {
            call.arity(&[2])?;
            Ok(SignalSpec::EmaCross {
                fast: call.window(0)?,
                slow: call.window(1)?,
            })
        }
        "MA_CROSS" => {
            call.arity(&[2])?;
            Ok(SignalSpec::MaCross {
                fast: call.window(0)?,
                slow: call.window(1)?,
            })
        }
        "MACD_CROSS" => {
            call.arity(&[0, 3])?;
            Ok(SignalSpec::MacdCross {
                fast: call.window_or(0, macd::DEFAULT_FAST)?,
                slow: call.window_or(1, macd::DEFAULT_SLOW)?,
                signal: call.window_or(2, macd::DEFAULT_SIGNAL)?,
            })
        }
        "RSI_THRESHOLD" => {
            call.arity(&[1, 3])?;
            let (oversold, overbought) = call.rsi_levels()?;
            Ok(SignalSpec::RsiThreshold {
                window: call.window(0)?,
                oversold,
                overbought,
            })
        }
        "BOLLINGER_BREAKOUT" => {
            call.arity(&[0, 2])?;
            let stddev_mult_x100 = if call.args.len() == 2 {
                mult_x100(call.non_negative(1)?)
            } else {
                bollinger::DEFAULT_MULT_X100
            };
            Ok(SignalSpec::BollingerBreakout {
                period: call.window_or(0, bollinger::DEFAULT_PERIOD)?,
                stddev_mult_x100,
            })
        }
        "ATR_SPIKE" => {
            call.arity(&[3])?;
            Ok(SignalSpec::AtrSpike {
                window: call.window(0)?,
                lookback: call.window(1)?,
                multiplier: call.non_negative(2)?,
            })
        }
        _ => Err(call.unknown("signal")),
    }
}

fn strategy_from_call(call: &Call) -> Result<StrategyKind, ParseError> {
    match call.name.as_str() {
        "BUY_AND_HOLD" | "ALWAYS_LONG" => {
            call.arity(&[0])?;
            Ok(StrategyKind::AlwaysLong)
        }
        "FLAT" | "ALWAYS_FLAT" => {
            call.arity(&[0])?;
            Ok(StrategyKind::AlwaysFlat)
        }
        "EMA_CROSS" => {
            call.arity(&[2])?;
            Ok(StrategyKind::EmaCross {
                fast: call.window(0)?,
                slow: call.window(1)?,
            })
        }
        "RSI_DIP" => {
            call.arity(&[0, 1, 3])?;
            let (oversold, overbought) = call.rsi_levels()?;
            Ok(StrategyKind::RsiDipBuy {
                window: call.window_or(0, 14)?,
                oversold,
                overbought,
            })
        }
        "MACD_CROSS" => {
            call.arity(&[0, 3])?;
            Ok(StrategyKind::MacdCross {
                fast: call.window_or(0, macd::DEFAULT_FAST)?,
                slow: call.window_or(1, macd::DEFAULT_SLOW)?,
                signal: call.window_or(2, macd::DEFAULT_SIGNAL)?,
            })
        }
        "ATR_TREND" => {
            call.arity(&[0, 2])?;
            Ok(StrategyKind::AtrTrend {
                ma_window: call.window_or(0, 50)?,
                atr_window: call.window_or(1, atr::DEFAULT_PERIOD)?,
            })
        }
        _ => Err(call.unknown("strategy")),
    }
}

impl FromStr for IndicatorType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_one(s, indicator_from_call)
    }
}

impl FromStr for SignalSpec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_one(s, signal_from_call)
    }
}

impl FromStr for StrategyKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_one(s, strategy_from_call)
    }
}

pub fn parse_indicator_list(input: &str) -> Result<Vec<IndicatorType>, ParseError> {
    parse_list(input, indicator_from_call)
}

pub fn parse_signal_list(input: &str) -> Result<Vec<SignalSpec>, ParseError> {
    parse_list(input, signal_from_call)
}
