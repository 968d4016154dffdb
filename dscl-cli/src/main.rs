// ============================================================================
// dscl-cli/src/main.rs
// ============================================================================
//
// OSX-USERADD: Main Entry Point
//
// Parses the command line, sets up logging, and hands off to the useradd
// command. Errors are printed to stderr and turn into exit status 1.
// Running without a user name and without --stdin prints usage and exits 0.
//
// AI-ASSISTANT-INFO: Entry point for the osx-useradd binary

use clap::{CommandFactory, Parser};
use dscl_cli::{Cli, logging, run_useradd};
use owo_colors::OwoColorize;
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run_useradd(&cli) {
        Ok(true) => {}
        Ok(false) => {
            if let Err(e) = Cli::command().print_help() {
                eprintln!("{}: {e}", dscl_cli::BIN_NAME);
                process::exit(1);
            }
        }
        Err(e) => {
            log::debug!("Command failed: {e:?}");
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}
