use colored::Colorize;
use std::path::PathBuf;

use crate::blob::Blob;
use crate::cli::{exit_code_for, util, Cli};

/// Decodes `file` and reports only the CRC-tree verdict. Returns the
/// process exit code (0 verified, 1 tamper/structural failure, 2 usage/I-O).
pub fn main(cli: &Cli, file: &Option<PathBuf>) -> i32 {
    let Some(file) = file else {
        return 2;
    };
    let bytes = match util::read_file(cli, file) {
        Ok(bytes) => bytes,
        Err(()) => return 2,
    };

    match Blob::decode(&bytes) {
        Ok(_) => {
            println!("{} {}", "OK".green().bold(), file.display());
            0
        }
        Err(err) => {
            println!("{} {}: {}", "FAIL".red().bold(), file.display(), err);
            exit_code_for(&err)
        }
    }
}
