//! Long/flat backtest over a bar series.
//!
//! Per-bar return accrual uses the position held at the previous close:
//! `returns[i] = exposure(positions[i-1]) * (close[i] / close[i-1] - 1)`.
//! Accruing with `positions[i]` would let a bar's own close decide
//! whether its move was captured. `returns[0]` is always 0 and the equity
//! curve starts at 1.0.

use super::metrics::Metrics;
use super::ohlcv::Bar;
use super::position::Position;
use super::strategy::{PositionRule, StrategyKind, positions};
use chrono::NaiveDate;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrategyResult {
    /// Text form of the strategy, or "custom" for ad-hoc rules.
    pub strategy: String,
    pub equity_curve: Vec<EquityPoint>,
    pub positions: Vec<Position>,
    pub returns: Vec<f64>,
    pub metrics: Metrics,
}

impl StrategyResult {
    pub fn total_return(&self) -> f64 {
        self.metrics.total_return
    }

    pub fn volatility(&self) -> f64 {
        self.metrics.volatility
    }

    pub fn sharpe_ratio(&self) -> f64 {
        self.metrics.sharpe_ratio
    }
}

pub fn run_backtest(bars: &[Bar], strategy: &StrategyKind) -> StrategyResult {
    let rule = strategy.rule(bars);
    let mut result = simulate(bars, rule.as_ref());
    result.strategy = strategy.to_string();
    debug!(
        strategy = %result.strategy,
        bars = bars.len(),
        total_return = result.metrics.total_return,
        "backtest complete"
    );
    result
}

/// Run an arbitrary position rule over `bars`.
pub fn simulate(bars: &[Bar], rule: &dyn PositionRule) -> StrategyResult {
    let positions = positions(rule, bars.len());

    let returns: Vec<f64> = (0..bars.len())
        .map(|i| {
            if i == 0 {
                return 0.0;
            }
            let prev_close = bars[i - 1].close;
            if prev_close == 0.0 {
                return 0.0;
            }
            positions[i - 1].exposure() * (bars[i].close / prev_close - 1.0)
        })
        .collect();

    let equity_curve: Vec<EquityPoint> = bars
        .iter()
        .zip(&returns)
        .scan(1.0_f64, |equity, (bar, r)| {
            *equity *= 1.0 + r;
            Some(EquityPoint {
                date: bar.date,
                equity: *equity,
            })
        })
        .collect();

    let metrics = Metrics::compute(&equity_curve, &returns, &positions);

    StrategyResult {
        strategy: "custom".to_string(),
        equity_curve,
        positions,
        returns,
        metrics,
    }
}
