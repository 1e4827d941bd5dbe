//! Batch export of openBD summaries.

use std::{io::Write, slice::Chunks};

use log::debug;

use crate::{api::Client, writer::SummaryWriter, Error, OpenBd};

/// Maximum number of ISBNs sent in one request to the `get` endpoint.
pub const BATCH_SIZE: usize = 1000;

/// Observer of export progress.
///
/// `advance` is called once per batch, after its rows are written, with the number of ISBNs in the
/// batch.
pub trait Progress {
    /// Records that `delta` more ISBNs have been processed.
    fn advance(&mut self, delta: usize);
}

/// A [`Progress`] that ignores every update.
impl Progress for () {
    fn advance(&mut self, _: usize) {}
}

/// Outcome of a completed export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Number of requests made to the `get` endpoint.
    pub batches: usize,
    /// Number of rows written.
    pub rows: usize,
}

/// Splits `isbns` into consecutive batches of at most `size` ISBNs.
///
/// A `size` of 0 is treated as 1.
#[must_use]
pub fn batches(isbns: &[String], size: usize) -> Chunks<'_, String> {
    isbns.chunks(size.max(1))
}

/// Fetches the records of `isbns` batch by batch and writes each summary to `writer` as soon as
/// its batch arrives.
///
/// Batches are processed sequentially in input order. Rows of a batch are flushed before
/// `progress` is advanced, so a failed run leaves the output with every row of the batches that
/// completed.
///
/// # Errors
///
/// The first failing request or write aborts the export and is returned.
pub fn dump_summaries<C, W, P>(
    api: &OpenBd<C>,
    isbns: &[String],
    writer: &mut SummaryWriter<W>,
    progress: &mut P,
) -> Result<Report, Error>
where
    C: Client,
    W: Write,
    P: Progress + ?Sized,
{
    let mut report = Report::default();

    for (index, batch) in batches(isbns, BATCH_SIZE).enumerate() {
        debug!("Batch {}: requesting {} ISBNs", index + 1, batch.len());
        let books = api.books(batch)?;

        for book in &books {
            writer.write_summary(&book.summary)?;
            report.rows += 1;
        }

        writer.flush()?;
        progress.advance(batch.len());
        report.batches += 1;
    }

    Ok(report)
}
