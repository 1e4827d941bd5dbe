#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::as_conversions, clippy::mod_module_files)]

use std::{path::PathBuf, process};

mod file;
mod progress;

use file::create_output_file;
use progress::ProgressReporter;

use openbd as lib;

use lib::{OpenBd, SummaryWriter};

use clap::Parser;
use eyre::{Context, Result};
use log::{error, info, trace};

fn main() {
    if let Err(err) = try_main() {
        error!("{:#}", err);
        process::exit(2);
    }
}

fn try_main() -> Result<()> {
    let Cli {
        output,
        api_url,
        verbosity,
        quiet,
    } = Cli::parse();

    let mut progress = ProgressReporter::new();
    setup_errlog(verbosity as usize, quiet, &progress)?;

    let api = OpenBd::with_url(api_url);

    let isbns = api
        .coverage()
        .wrap_err_with(|| format!("Cannot fetch the ISBN list from {}", api.base_url()))?;
    info!("openBD lists {} ISBNs", isbns.len());

    let file = create_output_file(&output)?;
    let mut writer = SummaryWriter::new(file)
        .wrap_err_with(|| format!("Cannot write the header to '{}'", output.display()))?;
    progress.start(isbns.len(), !quiet);

    let report = lib::dump_summaries(&api, &isbns, &mut writer, &mut progress)
        .wrap_err("Downloading book summaries failed")?;

    writer
        .finish()
        .wrap_err_with(|| format!("Cannot flush '{}'", output.display()))?;
    progress.finish();

    info!(
        "Wrote {} rows to '{}' in {} requests",
        report.rows,
        output.display(),
        report.batches
    );
    trace!("Done!");

    Ok(())
}

fn setup_errlog(verbosity: usize, quiet: bool, progress: &ProgressReporter) -> Result<()> {
    // if quiet then ignore verbosity but still show errors
    let verbosity = if quiet { 0 } else { verbosity + 1 };

    let errlog = stderrlog::new().verbosity(verbosity).clone();
    progress.logger(errlog).init(verbosity)?;
    Ok(())
}

#[derive(Parser)]
#[clap(name = "openbd-dump")]
#[clap(about = "Download the summary of every book listed by openBD into a CSV file")]
#[clap(version, author)]
struct Cli {
    /// The CSV file to write, overwritten if it already exists
    #[clap(short, long, parse(from_os_str), default_value = "dump.csv")]
    output: PathBuf,

    /// Base url of the openBD API
    #[clap(long, default_value = lib::OPENBD_URL)]
    api_url: String,

    /// How chatty the program is while downloading
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,

    /// Hides the progress bar, errors will still be printed to stderr.
    #[clap(short, long)]
    quiet: bool,
}
