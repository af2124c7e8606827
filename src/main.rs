use clap::Parser;
use std::process::ExitCode;
use yamllint::cli::{self, Cli};

fn main() -> ExitCode {
    cli::run(Cli::parse())
}
