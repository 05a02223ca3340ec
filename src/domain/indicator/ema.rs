//! Exponential Moving Average indicator.
//!
//! alpha = 2/(n+1), EMA[0] = C[0], EMA[i] = alpha*C[i] + (1-alpha)*EMA[i-1].
//!
//! This is the unadjusted recursive form: there is no SMA seed and no
//! startup bias correction, so the series is defined from the first bar.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// EMA as a left scan over optional inputs. The recurrence seeds on the
/// first defined input; undefined inputs yield undefined outputs and leave
/// the running state untouched. A zero span yields an all-undefined series.
pub fn ema_scan<I>(values: I, span: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = Option<f64>>,
{
    if span == 0 {
        return values.into_iter().map(|_| None).collect();
    }
    let alpha = smoothing_factor(span);
    values
        .into_iter()
        .scan(None, |state: &mut Option<f64>, input| {
            let out = input.map(|x| {
                let next = match *state {
                    Some(prev) => alpha * x + (1.0 - alpha) * prev,
                    None => x,
                };
                *state = Some(next);
                next
            });
            Some(out)
        })
        .collect()
}

pub fn calculate_ema(bars: &[Bar], span: usize) -> IndicatorSeries {
    let values = ema_scan(bars.iter().map(|b| Some(b.close)), span);
    IndicatorSeries::from_simple(IndicatorType::Ema(span), bars, values)
}
