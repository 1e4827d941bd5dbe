#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]

//! # openbd
//!
//! openbd is a library which exports the book catalog of the [openBD](https://openbd.jp) API to a
//! CSV table. The catalog is listed with [`OpenBd::coverage`], fetched in batches of
//! [`BATCH_SIZE`] ISBNs with retries on transient server errors, and the [`Summary`] of every
//! record is written as one row by a [`SummaryWriter`].
//!
//! ```no_run
//! use openbd::{dump_summaries, OpenBd, SummaryWriter};
//!
//! fn main() -> Result<(), openbd::Error> {
//!     let api = OpenBd::new();
//!     let isbns = api.coverage()?;
//!     let mut writer = SummaryWriter::new(std::io::stdout())?;
//!     dump_summaries(&api, &isbns, &mut writer, &mut ())?;
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```

mod api;
mod dump;
mod error;
mod summary;
mod writer;

pub use api::{openbd::OpenBd, openbd::OPENBD_URL, retry::RetryPolicy, Client, Response};
pub use dump::{batches, dump_summaries, Progress, Report, BATCH_SIZE};
pub use error::{Error, ErrorKind};
pub use summary::{Book, Summary, COLUMNS};
pub use writer::SummaryWriter;
