//! CSV output of [`Summary`] rows.

use std::io::Write;

use crate::{
    summary::{Summary, COLUMNS},
    Error, ErrorKind,
};

/// Writes summaries as rows of a CSV table with a fixed set of [`COLUMNS`].
///
/// The header row is written as soon as the writer is created, so an export with no records still
/// produces a valid table. Rows use minimal quoting and `\r\n` terminators.
///
/// Dropping the writer flushes buffered rows and ignores any error; use [`SummaryWriter::finish`]
/// to observe flush failures.
#[derive(Debug)]
pub struct SummaryWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> SummaryWriter<W> {
    /// Creates a writer on top of `writer` and writes the header row.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the header cannot be written.
    pub fn new(writer: W) -> Result<Self, Error> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);

        inner.write_record(COLUMNS).map_err(write_error)?;

        Ok(Self { inner, rows: 0 })
    }

    /// Writes `summary` as one row, absent fields being written as empty cells.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the row cannot be written.
    pub fn write_summary(&mut self, summary: &Summary) -> Result<(), Error> {
        self.inner.serialize(summary).map_err(write_error)?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far, the header excluded.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes buffered rows to the underlying writer.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the underlying writer fails.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.inner
            .flush()
            .map_err(|e| Error::wrap(ErrorKind::Write, e))
    }

    /// Flushes all rows and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the final flush fails.
    pub fn finish(self) -> Result<W, Error> {
        self.inner
            .into_inner()
            .map_err(|e| Error::wrap(ErrorKind::Write, e.into_error()))
    }
}

fn write_error(err: csv::Error) -> Error {
    Error::wrap(ErrorKind::Write, err)
}
