//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod kind_parser;
pub mod table;
pub mod error;
