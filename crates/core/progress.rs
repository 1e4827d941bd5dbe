use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, LevelFilter, Log, Metadata, Record, SetLoggerError};
use openbd::Progress;
use stderrlog::StdErrLog;

const MESSAGE: &str = "Downloading book summary";
const TEMPLATE: &str =
    "{msg}: {percent:>3}%|{wide_bar}| {pos}/{len} [{elapsed_precise}<{eta_precise}]";

/// Progress bar on stderr counting processed ISBNs.
///
/// The bar stays hidden until [`ProgressReporter::start`]. A reporter dropped before
/// [`ProgressReporter::finish`] abandons the bar, leaving it drawn at its last position.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();

        match ProgressStyle::with_template(TEMPLATE) {
            Ok(style) => bar.set_style(style),
            Err(err) => debug!("Falling back to the default progress style: {err}"),
        }
        bar.set_message(MESSAGE);

        Self { bar }
    }

    /// Sets the number of ISBNs to process and draws the bar unless `visible` is false.
    pub fn start(&self, total: usize, visible: bool) {
        self.bar.set_length(total as u64);
        if visible {
            self.bar.set_draw_target(ProgressDrawTarget::stderr());
        }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Wraps `inner` so that log lines are written while the bar is cleared.
    pub fn logger(&self, inner: StdErrLog) -> BarLogger {
        BarLogger {
            inner,
            bar: self.bar.clone(),
        }
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ProgressReporter {
    fn advance(&mut self, delta: usize) {
        self.bar.inc(delta as u64);
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

/// A stderr logger that suspends the progress bar around every record.
pub struct BarLogger {
    inner: StdErrLog,
    bar: ProgressBar,
}

impl BarLogger {
    /// Installs the logger, `verbosity` having the same meaning as for [`StdErrLog`].
    pub fn init(self, verbosity: usize) -> Result<(), SetLoggerError> {
        log::set_max_level(level_filter(verbosity));
        log::set_boxed_logger(Box::new(self))
    }
}

impl Log for BarLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if self.inner.enabled(record.metadata()) {
            self.bar.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

const fn level_filter(verbosity: usize) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
