use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod dump;
pub mod util;
pub mod verify;

/// Offline inspection tool for the display accessory's firmware containers.
#[derive(Parser)]
#[command(version = "0.1.0")]
#[command(about, long_about)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Verbosity level for logging/debugging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a container and print a section/resource summary.
    #[command(arg_required_else_help = true)]
    Dump {
        /// The `.bin` blob (or bare firmware image with --firmware) to inspect.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Treat FILE as a bare firmware payload instead of an outer blob.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        firmware: bool,

        /// Emit machine-readable JSON instead of the human-readable summary.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        json: bool,

        /// Optional JSON file controlling presentation details.
        #[arg(short, long, value_name = "CFG")]
        config: Option<PathBuf>,
    },

    /// Decode a container and report only the CRC-tree verdict.
    #[command(arg_required_else_help = true)]
    Verify {
        /// The `.bin` blob to verify.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

/// Maps a codec error onto the CLI's exit-code convention (§10.3):
/// 1 for a decode/verify failure, 2 for a usage/I-O problem.
pub fn exit_code_for(err: &crate::error::Error) -> i32 {
    use crate::error::Error;
    match err {
        Error::OpenFailed(_) | Error::IOError(_) | Error::SerdeJSONError(_) => 2,
        Error::ReadShort { .. }
        | Error::HeaderCrcMismatch
        | Error::SuperCrcMismatch { .. }
        | Error::SubCrcMismatch { .. }
        | Error::BadIndex(_)
        | Error::TrailingBytes { .. }
        | Error::DecodeFailed(_) => 1,
    }
}

/// Macro for printing debug messages, gated by `-v -v -v` (verbose > 2),
/// in the same spirit as the reference CLI's `debug!`/`error!` pair.
macro_rules! debug {
    ($cli: expr, $msg:literal) => {
        if $cli.verbose > 2 {
            println!("{}{}", "D : ".bold().color(colored::Color::BrightBlack), $msg.color(colored::Color::BrightBlack));
        }
    };
    ($cli:expr, $argmsg:literal, $($arg:tt)*) => {
        if $cli.verbose > 2 {
            println!("{}{}", "D : ".bold().color(colored::Color::BrightBlack), format!($argmsg, $($arg)*).color(colored::Color::BrightBlack));
        }
    }
}

macro_rules! error {
    ($msg:literal) => {
        println!("{}{}", "E : ".bold().red(), $msg.red());
    };
    ($msg:literal, $($arg:tt)*) => {
        println!("{}{}", "E : ".bold().red(), format!($msg, $($arg)*).red());
    };
}

pub(crate) use debug;
pub(crate) use error;
