//! Summary statistics over a backtest's returns and equity curve.

use super::backtest::EquityPoint;
use super::indicator::stddev::sample_stddev;
use super::position::Position;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Volatility at or below this is treated as zero when forming the Sharpe
/// ratio. Identical float returns can still leave a residual std around 1e-17.
pub const VOLATILITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metrics {
    /// equity[last] - 1
    pub total_return: f64,
    /// Sample std of per-bar returns, annualized by sqrt(252).
    pub volatility: f64,
    /// total_return / volatility, 0 when volatility is zero.
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline as a fraction of the peak.
    pub max_drawdown: f64,
    /// Longest run of bars spent below a prior peak.
    pub max_drawdown_duration: usize,
    /// Number of flat to long transitions.
    pub trades: usize,
    /// Fraction of bars held long.
    pub exposure: f64,
}

impl Metrics {
    /// `returns[0]` is the placeholder zero of the first bar and is left out
    /// of the volatility estimate.
    pub fn compute(equity_curve: &[EquityPoint], returns: &[f64], positions: &[Position]) -> Self {
        let total_return = equity_curve.last().map(|p| p.equity - 1.0).unwrap_or(0.0);

        let volatility = match returns.get(1..) {
            Some(realized) => sample_stddev(realized) * TRADING_DAYS_PER_YEAR.sqrt(),
            None => 0.0,
        };

        let sharpe_ratio = if volatility > VOLATILITY_EPSILON {
            total_return / volatility
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        let exposure = if positions.is_empty() {
            0.0
        } else {
            positions.iter().filter(|p| p.is_long()).count() as f64 / positions.len() as f64
        };

        Metrics {
            total_return,
            volatility,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            trades: count_entries(positions),
            exposure,
        }
    }
}

/// Flat to long transitions, counting a long first bar as an entry.
pub fn count_entries(positions: &[Position]) -> usize {
    let mut previous = Position::Flat;
    let mut entries = 0;
    for &p in positions {
        if p.is_long() && !previous.is_long() {
            entries += 1;
        }
        previous = p;
    }
    entries
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}
