use colored::Colorize;
use std::path::PathBuf;

use crate::cli::{debug, error, Cli};

/// Reads `file` fully into memory, printing a colored diagnostic and
/// returning `Err(())` on any problem instead of propagating one of the
/// codec's own error kinds (this is a usage-level failure, not a decode one).
pub fn read_file(cli: &Cli, file: &PathBuf) -> Result<Vec<u8>, ()> {
    debug!(cli, "Reading file: {:#?}", file.display());

    if !file.exists() {
        error!("Target file does not exist: {:#?}", file.display());
        return Err(());
    }
    if file.is_dir() {
        error!("{:#?} is a directory, not a file", file.display());
        return Err(());
    }
    std::fs::read(file).map_err(|e| {
        error!("Could not read file {:#?}: {}", file.display(), e);
    })
}
