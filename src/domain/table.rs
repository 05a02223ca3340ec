//! Tabular view of bars joined with indicator columns, as exported to CSV.

use crate::domain::indicator::{IndicatorField, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const BAR_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// One indicator output column.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumn {
    pub indicator_type: IndicatorType,
    pub field: IndicatorField,
    pub values: Vec<Option<f64>>,
}

impl IndicatorColumn {
    /// `EMA(20)` for single-valued indicators, `MACD(12,26,9).line` otherwise.
    pub fn name(&self) -> String {
        match self.field.suffix() {
            Some(suffix) => format!("{}.{}", self.indicator_type, suffix),
            None => self.indicator_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable<'a> {
    pub bars: &'a [Bar],
    pub columns: Vec<IndicatorColumn>,
}

impl IndicatorTable<'_> {
    pub fn header(&self) -> Vec<String> {
        BAR_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.columns.iter().map(IndicatorColumn::name))
            .collect()
    }

    /// Row `i` as text cells; undefined values and missing volume are empty.
    pub fn row(&self, i: usize) -> Vec<String> {
        let bar = &self.bars[i];
        let mut cells = vec![
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.map(|v| v.to_string()).unwrap_or_default(),
        ];
        cells.extend(self.columns.iter().map(|c| {
            c.values
                .get(i)
                .copied()
                .flatten()
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));
        cells
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        (0..self.bars.len()).map(|i| self.row(i))
    }
}

/// Join `bars` with every field of every series, in the order given.
pub fn build_table<'a>(bars: &'a [Bar], series: &[IndicatorSeries]) -> IndicatorTable<'a> {
    let columns = series
        .iter()
        .flat_map(|s| {
            s.indicator_type
                .fields()
                .iter()
                .map(move |&field| IndicatorColumn {
                    indicator_type: s.indicator_type,
                    field,
                    values: s.field_values(field),
                })
        })
        .collect();
    IndicatorTable { bars, columns }
}
