use std::{fs::File, path::Path};

use eyre::{Context, Result};
use log::trace;

/// Creates `path` for writing, truncating any previous export.
pub fn create_output_file(path: &Path) -> Result<File> {
    trace!("creating output file {}", path.display());
    File::create(path).wrap_err_with(|| {
        format!(
            "Failed to create the '{}' file for writing.",
            path.display()
        )
    })
}
