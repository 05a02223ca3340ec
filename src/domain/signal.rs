//! Signal detection: crossovers, threshold entries, band breakouts and
//! range spikes.
//!
//! Every detector walks the whole series once and returns signals in bar
//! order. Indices where a required value is undefined never emit a signal,
//! and an undefined index does not reset the remembered prior state.

use crate::domain::indicator::{IndicatorField, IndicatorSeries, IndicatorType};
use crate::domain::indicator::stddev::mean;
use crate::domain::indicator_helpers::{IndicatorMap, compute_indicator};
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SignalKind {
    EmaCross,
    RsiThreshold,
    BollingerBreakout,
    MaCross,
    MacdCross,
    AtrSpike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Direction {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Signal {
    pub date: NaiveDate,
    pub index: usize,
    pub kind: SignalKind,
    pub direction: Option<Direction>,
}

/// A signal detector together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalSpec {
    EmaCross {
        fast: usize,
        slow: usize,
    },
    MaCross {
        fast: usize,
        slow: usize,
    },
    MacdCross {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    RsiThreshold {
        window: usize,
        oversold: f64,
        overbought: f64,
    },
    BollingerBreakout {
        period: usize,
        stddev_mult_x100: u32,
    },
    /// ATR above `multiplier` times the mean of the preceding `lookback` ATR values.
    AtrSpike {
        window: usize,
        lookback: usize,
        multiplier: f64,
    },
}

impl SignalSpec {
    pub fn kind(&self) -> SignalKind {
        match self {
            SignalSpec::EmaCross { .. } => SignalKind::EmaCross,
            SignalSpec::MaCross { .. } => SignalKind::MaCross,
            SignalSpec::MacdCross { .. } => SignalKind::MacdCross,
            SignalSpec::RsiThreshold { .. } => SignalKind::RsiThreshold,
            SignalSpec::BollingerBreakout { .. } => SignalKind::BollingerBreakout,
            SignalSpec::AtrSpike { .. } => SignalKind::AtrSpike,
        }
    }

    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        match *self {
            SignalSpec::EmaCross { fast, slow } => {
                vec![IndicatorType::Ema(fast), IndicatorType::Ema(slow)]
            }
            SignalSpec::MaCross { fast, slow } => {
                vec![IndicatorType::Sma(fast), IndicatorType::Sma(slow)]
            }
            SignalSpec::MacdCross { fast, slow, signal } => {
                vec![IndicatorType::Macd { fast, slow, signal }]
            }
            SignalSpec::RsiThreshold { window, .. } => vec![IndicatorType::Rsi(window)],
            SignalSpec::BollingerBreakout {
                period,
                stddev_mult_x100,
            } => vec![IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            }],
            SignalSpec::AtrSpike { window, .. } => vec![IndicatorType::Atr(window)],
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::EmaCross => "EMA_CROSS",
            SignalKind::RsiThreshold => "RSI_THRESHOLD",
            SignalKind::BollingerBreakout => "BOLLINGER_BREAKOUT",
            SignalKind::MaCross => "MA_CROSS",
            SignalKind::MacdCross => "MACD_CROSS",
            SignalKind::AtrSpike => "ATR_SPIKE",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => f.write_str("bullish"),
            Direction::Bearish => f.write_str("bearish"),
        }
    }
}

impl fmt::Display for SignalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            SignalSpec::EmaCross { fast, slow } | SignalSpec::MaCross { fast, slow } => {
                write!(f, "{}({},{})", kind, fast, slow)
            }
            SignalSpec::MacdCross { fast, slow, signal } => {
                write!(f, "{}({},{},{})", kind, fast, slow, signal)
            }
            SignalSpec::RsiThreshold {
                window,
                oversold,
                overbought,
            } => write!(f, "{}({},{},{})", kind, window, oversold, overbought),
            SignalSpec::BollingerBreakout {
                period,
                stddev_mult_x100,
            } => write!(
                f,
                "{}({},{})",
                kind,
                period,
                *stddev_mult_x100 as f64 / 100.0
            ),
            SignalSpec::AtrSpike {
                window,
                lookback,
                multiplier,
            } => write!(f, "{}({},{},{})", kind, window, lookback, multiplier),
        }
    }
}

/// Sign of `a - b` per index; `None` where either side is undefined.
pub fn crossover_states(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<i8>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = (*x)? - (*y)?;
            Some(if diff > 0.0 {
                1
            } else if diff < 0.0 {
                -1
            } else {
                0
            })
        })
        .collect()
}

/// Emit a signal each time the sign of `a - b` flips.
///
/// Ties do not count as a side: a run of equal values followed by the same
/// side as before the run is not a cross, and the first side ever taken
/// (with nothing before it) is not a cross either. Stops at the shortest input.
pub fn detect_crossovers(
    dates: &[NaiveDate],
    a: &[Option<f64>],
    b: &[Option<f64>],
    kind: SignalKind,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    let mut last_side: Option<i8> = None;

    for (index, (state, date)) in crossover_states(a, b).into_iter().zip(dates).enumerate() {
        let Some(state) = state.filter(|s| *s != 0) else {
            continue;
        };
        if last_side.is_some_and(|prev| prev != state) {
            signals.push(Signal {
                date: *date,
                index,
                kind,
                direction: Some(if state > 0 {
                    Direction::Bullish
                } else {
                    Direction::Bearish
                }),
            });
        }
        last_side = Some(state);
    }

    signals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Above,
    Inside,
    Below,
}

/// Emit a signal when the zone changes into `Above` or `Below`. Remaining in
/// a zone does not fire; neither does the first defined zone. `zone_at` is
/// asked about every index of `dates` and should answer `None` past the end
/// of its own data.
pub fn detect_zone_entries<Z, D>(
    dates: &[NaiveDate],
    kind: SignalKind,
    zone_at: Z,
    direction_of: D,
) -> Vec<Signal>
where
    Z: Fn(usize) -> Option<Zone>,
    D: Fn(Zone) -> Option<Direction>,
{
    let mut signals = Vec::new();
    let mut previous: Option<Zone> = None;

    for (index, date) in dates.iter().enumerate() {
        let Some(zone) = zone_at(index) else {
            continue;
        };
        if zone != Zone::Inside && previous.is_some_and(|p| p != zone) {
            signals.push(Signal {
                date: *date,
                index,
                kind,
                direction: direction_of(zone),
            });
        }
        previous = Some(zone);
    }

    signals
}

/// Oversold (< `oversold`) entries are bullish, overbought (> `overbought`)
/// entries bearish.
pub fn detect_threshold(
    dates: &[NaiveDate],
    values: &[Option<f64>],
    overbought: f64,
    oversold: f64,
    kind: SignalKind,
) -> Vec<Signal> {
    detect_zone_entries(
        dates,
        kind,
        |i| {
            values.get(i).copied().flatten().map(|v| {
                if v > overbought {
                    Zone::Above
                } else if v < oversold {
                    Zone::Below
                } else {
                    Zone::Inside
                }
            })
        },
        |zone| match zone {
            Zone::Above => Some(Direction::Bearish),
            Zone::Below => Some(Direction::Bullish),
            Zone::Inside => None,
        },
    )
}

/// Close leaving the band last known before the bar: above the previous
/// bar's upper band is bullish, below its lower band bearish.
pub fn detect_band_breakouts(
    bars: &[Bar],
    upper: &[Option<f64>],
    lower: &[Option<f64>],
    kind: SignalKind,
) -> Vec<Signal> {
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    detect_zone_entries(
        &dates,
        kind,
        |i| {
            let prev = i.checked_sub(1)?;
            let up = upper.get(prev).copied().flatten()?;
            let low = lower.get(prev).copied().flatten()?;
            let close = bars[i].close;
            Some(if close > up {
                Zone::Above
            } else if close < low {
                Zone::Below
            } else {
                Zone::Inside
            })
        },
        |zone| match zone {
            Zone::Above => Some(Direction::Bullish),
            Zone::Below => Some(Direction::Bearish),
            Zone::Inside => None,
        },
    )
}

/// Range expansion: ATR above `multiplier` times the mean of the preceding
/// `lookback` values. Carries no direction.
pub fn detect_atr_spikes(
    dates: &[NaiveDate],
    atr: &[Option<f64>],
    lookback: usize,
    multiplier: f64,
) -> Vec<Signal> {
    detect_zone_entries(
        dates,
        SignalKind::AtrSpike,
        |i| {
            let current = atr.get(i).copied().flatten()?;
            if lookback == 0 || i < lookback {
                return None;
            }
            let prior: Vec<f64> = atr[i - lookback..i].iter().copied().collect::<Option<_>>()?;
            let baseline = mean(&prior)?;
            Some(if current > multiplier * baseline {
                Zone::Above
            } else {
                Zone::Inside
            })
        },
        |_| None,
    )
}

fn lookup<'a>(
    bars: &[Bar],
    indicators: &'a IndicatorMap,
    indicator_type: IndicatorType,
) -> Cow<'a, IndicatorSeries> {
    match indicators.get(&indicator_type) {
        Some(series) if series.len() == bars.len() => Cow::Borrowed(series),
        _ => {
            tracing::debug!(indicator = %indicator_type, "indicator not supplied, computing");
            Cow::Owned(compute_indicator(bars, &indicator_type))
        }
    }
}

/// Run one detector over `bars`. Series the detector needs are taken from
/// `indicators` when present and aligned with `bars`, otherwise computed.
pub fn detect_signals(bars: &[Bar], indicators: &IndicatorMap, spec: &SignalSpec) -> Vec<Signal> {
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let kind = spec.kind();

    let signals = match *spec {
        SignalSpec::EmaCross { fast, slow } => {
            let a = lookup(bars, indicators, IndicatorType::Ema(fast)).primary();
            let b = lookup(bars, indicators, IndicatorType::Ema(slow)).primary();
            detect_crossovers(&dates, &a, &b, kind)
        }
        SignalSpec::MaCross { fast, slow } => {
            let a = lookup(bars, indicators, IndicatorType::Sma(fast)).primary();
            let b = lookup(bars, indicators, IndicatorType::Sma(slow)).primary();
            detect_crossovers(&dates, &a, &b, kind)
        }
        SignalSpec::MacdCross { fast, slow, signal } => {
            let macd = lookup(bars, indicators, IndicatorType::Macd { fast, slow, signal });
            detect_crossovers(
                &dates,
                &macd.field_values(IndicatorField::MacdLine),
                &macd.field_values(IndicatorField::MacdSignal),
                kind,
            )
        }
        SignalSpec::RsiThreshold {
            window,
            overbought,
            oversold,
        } => {
            let rsi = lookup(bars, indicators, IndicatorType::Rsi(window)).primary();
            detect_threshold(&dates, &rsi, overbought, oversold, kind)
        }
        SignalSpec::BollingerBreakout {
            period,
            stddev_mult_x100,
        } => {
            let bands = lookup(
                bars,
                indicators,
                IndicatorType::Bollinger {
                    period,
                    stddev_mult_x100,
                },
            );
            detect_band_breakouts(
                bars,
                &bands.field_values(IndicatorField::BollingerUpper),
                &bands.field_values(IndicatorField::BollingerLower),
                kind,
            )
        }
        SignalSpec::AtrSpike {
            window,
            lookback,
            multiplier,
        } => {
            let atr = lookup(bars, indicators, IndicatorType::Atr(window)).primary();
            detect_atr_spikes(&dates, &atr, lookback, multiplier)
        }
    };

    tracing::debug!(spec = %spec, count = signals.len(), "detected signals");
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::calculate_ema;
    use crate::domain::indicator_helpers::compute_indicators;
    use proptest::prelude::*;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: None,
            })
            .collect()
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        make_bars(&vec![1.0; n]).iter().map(|b| b.date).collect()
    }

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn ema_passthrough_cross_fires_once_each_way() {
        let bars = make_bars(&[5.0, 6.0, 4.0, 7.0]);
        let signals = detect_signals(
            &bars,
            &IndicatorMap::new(),
            &SignalSpec::EmaCross { fast: 1, slow: 3 },
        );

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].direction, Some(Direction::Bearish));
        assert_eq!(signals[0].index, 2);
        assert_eq!(signals[1].direction, Some(Direction::Bullish));
        assert_eq!(signals[1].index, 3);
        assert!(signals[0].date < signals[1].date);
        assert!(signals.iter().all(|s| s.kind == SignalKind::EmaCross));
    }

    #[test]
    fn identical_series_never_cross() {
        let a = some(&[1.0, 2.0, 3.0, 2.0, 1.0]);
        assert!(detect_crossovers(&dates(5), &a, &a, SignalKind::MaCross).is_empty());
    }

    #[test]
    fn tie_run_exiting_to_same_side_does_not_fire() {
        let a = some(&[2.0, 1.0, 1.0, 2.0]);
        let b = some(&[1.0, 1.0, 1.0, 1.0]);
        assert!(detect_crossovers(&dates(4), &a, &b, SignalKind::MaCross).is_empty());
    }

    #[test]
    fn tie_run_exiting_to_other_side_fires_once() {
        let a = some(&[2.0, 1.0, 1.0, 0.0, -1.0]);
        let b = some(&[1.0, 1.0, 1.0, 1.0, 1.0]);
        let signals = detect_crossovers(&dates(5), &a, &b, SignalKind::MaCross);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].index, 3);
        assert_eq!(signals[0].direction, Some(Direction::Bearish));
    }

    #[test]
    fn crossover_skips_undefined() {
        let a = vec![Some(2.0), None, None, Some(0.0)];
        let b = some(&[1.0, 1.0, 1.0, 1.0]);
        let signals = detect_crossovers(&dates(4), &a, &b, SignalKind::EmaCross);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].index, 3);
    }

    #[test]
    fn crossover_first_side_does_not_fire() {
        let a = vec![None, Some(2.0), Some(3.0)];
        let b = some(&[1.0, 1.0, 1.0]);
        assert!(detect_crossovers(&dates(3), &a, &b, SignalKind::EmaCross).is_empty());
    }

    #[test]
    fn threshold_fires_on_entry_only() {
        let rsi = some(&[50.0, 25.0, 20.0, 28.0, 50.0, 75.0, 80.0, 60.0, 20.0]);
        let signals = detect_threshold(&dates(9), &rsi, 70.0, 30.0, SignalKind::RsiThreshold);

        let got: Vec<(usize, Option<Direction>)> =
            signals.iter().map(|s| (s.index, s.direction)).collect();
        assert_eq!(
            got,
            vec![
                (1, Some(Direction::Bullish)),
                (5, Some(Direction::Bearish)),
                (8, Some(Direction::Bullish)),
            ]
        );
    }

    #[test]
    fn threshold_direct_flip_between_extremes_fires() {
        let rsi = some(&[50.0, 80.0, 10.0]);
        let signals = detect_threshold(&dates(3), &rsi, 70.0, 30.0, SignalKind::RsiThreshold);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].direction, Some(Direction::Bullish));
    }

    #[test]
    fn threshold_boundaries_are_exclusive() {
        let rsi = some(&[50.0, 70.0, 30.0]);
        assert!(detect_threshold(&dates(3), &rsi, 70.0, 30.0, SignalKind::RsiThreshold).is_empty());
    }

    #[test]
    fn rsi_threshold_through_detect_signals_skips_warmup() {
        let bars = make_bars(&[10.0, 11.0, 9.0, 9.0, 12.0]);
        let spec = SignalSpec::RsiThreshold {
            window: 2,
            oversold: 30.0,
            overbought: 70.0,
        };
        // RSI(2): [-, -, 33.3, 0, 100]
        let signals = detect_signals(&bars, &IndicatorMap::new(), &spec);
        let got: Vec<(usize, Option<Direction>)> =
            signals.iter().map(|s| (s.index, s.direction)).collect();
        assert_eq!(
            got,
            vec![(3, Some(Direction::Bullish)), (4, Some(Direction::Bearish))]
        );
    }

    #[test]
    fn band_breakout_uses_previous_band() {
        let bars = make_bars(&[10.0, 10.0, 15.0, 15.0, 4.0]);
        let upper = some(&[12.0, 12.0, 12.0, 16.0, 16.0]);
        let lower = some(&[8.0; 5]);
        let signals = detect_band_breakouts(&bars, &upper, &lower, SignalKind::BollingerBreakout);

        // Index 2 breaks above band 1's 12; index 3 stays above band 2's 12
        // even though its own band widened; index 4 breaks below 8.
        let got: Vec<(usize, Option<Direction>)> =
            signals.iter().map(|s| (s.index, s.direction)).collect();
        assert_eq!(
            got,
            vec![(2, Some(Direction::Bullish)), (4, Some(Direction::Bearish))]
        );
    }

    #[test]
    fn bollinger_breakout_on_price_jump() {
        let mut prices = vec![100.0; 25];
        prices.extend([100.5, 99.5, 100.0, 130.0]);
        let bars = make_bars(&prices);
        let spec = SignalSpec::BollingerBreakout {
            period: 20,
            stddev_mult_x100: 200,
        };
        let signals = detect_signals(&bars, &IndicatorMap::new(), &spec);
        let last = signals.last().unwrap();
        assert_eq!(last.index, prices.len() - 1);
        assert_eq!(last.direction, Some(Direction::Bullish));
    }

    #[test]
    fn atr_spike_fires_on_entry() {
        let atr = some(&[1.0, 1.0, 1.0, 1.0, 3.0, 3.5, 1.0]);
        let signals = detect_atr_spikes(&dates(7), &atr, 3, 1.5);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].index, 4);
        assert_eq!(signals[0].direction, None);
        assert_eq!(signals[0].kind, SignalKind::AtrSpike);
    }

    /// 41 bars rising by 1 from 100, 40 falling by 2, 40 rising by 2.
    fn peak_and_recovery() -> Vec<Bar> {
        let mut closes = vec![100.0];
        for step in std::iter::repeat_n(1.0, 40)
            .chain(std::iter::repeat_n(-2.0, 40))
            .chain(std::iter::repeat_n(2.0, 40))
        {
            closes.push(closes.last().unwrap() + step);
        }
        make_bars(&closes)
    }

    fn index_and_direction(signals: &[Signal]) -> Vec<(usize, Option<Direction>)> {
        signals.iter().map(|s| (s.index, s.direction)).collect()
    }

    #[test]
    fn macd_cross_compares_line_with_signal() {
        let bars = peak_and_recovery();
        let spec = SignalSpec::MacdCross {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        let signals = detect_signals(&bars, &IndicatorMap::new(), &spec);
        assert_eq!(
            index_and_direction(&signals),
            vec![(42, Some(Direction::Bearish)), (82, Some(Direction::Bullish))]
        );
        assert!(signals.iter().all(|s| s.kind == SignalKind::MacdCross));
    }

    #[test]
    fn ma_cross_uses_simple_averages() {
        let bars = peak_and_recovery();
        let spec = SignalSpec::MaCross { fast: 5, slow: 20 };
        let signals = detect_signals(&bars, &IndicatorMap::new(), &spec);
        assert_eq!(
            index_and_direction(&signals),
            vec![(46, Some(Direction::Bearish)), (88, Some(Direction::Bullish))]
        );
        assert!(signals.iter().all(|s| s.kind == SignalKind::MaCross));
    }

    #[test]
    fn atr_spike_through_detect_signals() {
        // Daily range 2 throughout, widened to 8 on bars 6 and 7.
        let mut bars = make_bars(&[10.0; 12]);
        for bar in &mut bars[6..8] {
            bar.high = bar.close + 4.0;
            bar.low = bar.close - 4.0;
        }
        let spec = SignalSpec::AtrSpike {
            window: 1,
            lookback: 3,
            multiplier: 1.5,
        };
        let signals = detect_signals(&bars, &IndicatorMap::new(), &spec);
        assert_eq!(index_and_direction(&signals), vec![(6, None)]);
        assert_eq!(signals[0].kind, SignalKind::AtrSpike);
    }

    #[test]
    fn detectors_stop_at_shortest_input() {
        let crosses = detect_crossovers(
            &dates(2),
            &some(&[1.0, 3.0, 1.0, 3.0]),
            &some(&[2.0, 2.0, 2.0, 2.0]),
            SignalKind::EmaCross,
        );
        assert_eq!(crosses.len(), 1);
        assert_eq!(crosses[0].index, 1);

        let rsi = some(&[50.0, 80.0]);
        assert_eq!(
            detect_threshold(&dates(4), &rsi, 70.0, 30.0, SignalKind::RsiThreshold).len(),
            1
        );

        let bars = make_bars(&[10.0, 10.0, 20.0]);
        let upper = some(&[11.0]);
        let lower = some(&[9.0]);
        assert!(
            detect_band_breakouts(&bars, &upper, &lower, SignalKind::BollingerBreakout).is_empty()
        );

        assert!(detect_atr_spikes(&dates(6), &some(&[1.0, 1.0]), 1, 1.5).is_empty());
    }

    #[test]
    fn detect_signals_uses_supplied_series() {
        let bars = make_bars(&[5.0, 6.0, 4.0, 7.0]);
        let mut map = compute_indicators(&bars, &[IndicatorType::Ema(1), IndicatorType::Ema(3)]);
        // Replace the slow EMA with a flat line above every close.
        let mut flat = calculate_ema(&bars, 3);
        for p in flat.values.iter_mut() {
            p.value = Some(crate::domain::indicator::IndicatorValue::Simple(100.0));
        }
        map.insert(IndicatorType::Ema(3), flat);

        let signals = detect_signals(&bars, &map, &SignalSpec::EmaCross { fast: 1, slow: 3 });
        assert!(signals.is_empty());
    }

    #[test]
    fn detect_signals_on_empty_bars() {
        for spec in [
            SignalSpec::EmaCross { fast: 12, slow: 26 },
            SignalSpec::MacdCross {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            SignalSpec::AtrSpike {
                window: 14,
                lookback: 14,
                multiplier: 1.5,
            },
        ] {
            assert!(detect_signals(&[], &IndicatorMap::new(), &spec).is_empty());
        }
    }

    #[test]
    fn spec_display() {
        assert_eq!(
            SignalSpec::RsiThreshold {
                window: 14,
                oversold: 30.0,
                overbought: 70.0
            }
            .to_string(),
            "RSI_THRESHOLD(14,30,70)"
        );
        assert_eq!(
            SignalSpec::BollingerBreakout {
                period: 20,
                stddev_mult_x100: 200
            }
            .to_string(),
            "BOLLINGER_BREAKOUT(20,2)"
        );
    }

    #[test]
    fn spec_required_indicators() {
        let spec = SignalSpec::MaCross { fast: 50, slow: 200 };
        assert_eq!(
            spec.required_indicators(),
            vec![IndicatorType::Sma(50), IndicatorType::Sma(200)]
        );
    }

    proptest! {
        #[test]
        fn crossover_directions_alternate(
            a in prop::collection::vec(-5i32..5, 0..60),
            b in prop::collection::vec(-5i32..5, 0..60),
        ) {
            let n = a.len().min(b.len());
            let a: Vec<Option<f64>> = a[..n].iter().map(|&v| Some(v as f64)).collect();
            let b: Vec<Option<f64>> = b[..n].iter().map(|&v| Some(v as f64)).collect();
            let signals = detect_crossovers(&dates(n), &a, &b, SignalKind::MaCross);
            for pair in signals.windows(2) {
                prop_assert!(pair[0].index < pair[1].index);
                prop_assert_ne!(pair[0].direction, pair[1].direction);
            }
            prop_assert!(detect_crossovers(&dates(n), &a, &a, SignalKind::MaCross).is_empty());
        }
    }
}
