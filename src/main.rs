use clap::Parser;

use drcfw::cli::{self, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let code = match &cli.command {
        None => 0,
        Some(Commands::Dump {
            file,
            firmware,
            json,
            config,
        }) => cli::dump::main(&cli, file, *firmware, *json, config),
        Some(Commands::Verify { file }) => cli::verify::main(&cli, file),
    };

    std::process::exit(code);
}
