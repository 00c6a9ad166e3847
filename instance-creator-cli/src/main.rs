// These Clippy lints are disabled because this is a CLI binary, not a library:
// - print_stderr: CLI tools are expected to print errors to stderr.
// - exit: Calling `std::process::exit()` is standard for CLI apps to signal failure to the shell.
#![allow(clippy::print_stderr, clippy::exit)]

use clap::Parser;
use instance_creator_cli::cli::{Cli, run};

fn main() {
    let cli = Cli::parse();
    instance_creator_cli::logging::init(cli.verbose);
    if let Err(e) = run(&cli, &mut std::io::stdout().lock()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
