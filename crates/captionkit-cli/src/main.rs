//! captionkit CLI
//!
//! Headless caption editing: keeps a session file, drives the caption store
//! and writes WebVTT files.

mod cli;
mod commands;
mod fsutil;
mod logging;
mod seed;
mod session;
mod settings;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, &cli.config_dir().join("logs"));

    let mut stdout = std::io::stdout().lock();
    match commands::run(cli, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
