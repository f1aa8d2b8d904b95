//! VLF Report - field test report generator
//!
//! Fills Word templates with VLF cable test data, a site location map and
//! the test photos of every segment and phase.

mod cli;
mod commands;
mod logging;
mod output;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
