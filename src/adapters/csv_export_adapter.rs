//! CSV export of an indicator table.

use crate::domain::error::BarsignalError;
use crate::domain::table::IndicatorTable;
use std::io::Write;

/// Writes `IndicatorTable`s to any `io::Write` sink.
pub struct CsvTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvTableWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Header row then one row per bar. Returns the number of data rows.
    pub fn write_table(&mut self, table: &IndicatorTable<'_>) -> Result<usize, BarsignalError> {
        self.writer.write_record(table.header())?;
        let mut rows = 0;
        for row in table.rows() {
            self.writer.write_record(&row)?;
            rows += 1;
        }
        self.writer.flush()?;
        Ok(rows)
    }

    pub fn into_inner(self) -> Result<W, BarsignalError> {
        self.writer
            .into_inner()
            .map_err(|e| BarsignalError::Io(e.into_error()))
    }
}
