// ============================================================================
// dscl-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger Setup for the CLI
//
// The library logs through the `log` facade; this binary decides where the
// records go. RUST_LOG still wins over the -v flag when it is set:
// - RUST_LOG=info (default): Normal operation logs
// - RUST_LOG=debug: Every dscl invocation and its exit status
// - RUST_LOG=trace: Also decode fallbacks and skipped record lines
//
// AI-ASSISTANT-INFO: Logging initialisation for the osx-useradd binary

use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use std::io::{IsTerminal, Write};

/// Initializes env_logger, using Debug when `verbose` is set and Info otherwise.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_with_level(level);
}

/// Initializes env_logger with a default level, overridable through RUST_LOG.
pub fn init_with_level(level: LevelFilter) {
    let colored = std::io::stderr().is_terminal();
    let env = env_logger::Env::default().default_filter_or(level.as_str());

    let result = env_logger::Builder::from_env(env)
        .format(move |buf, record| {
            let label = level_label(record.level());
            if colored {
                let label = match record.level() {
                    Level::Error => label.bright_red().to_string(),
                    Level::Warn => label.yellow().to_string(),
                    Level::Info => label.green().to_string(),
                    Level::Debug => label.blue().to_string(),
                    Level::Trace => label.magenta().to_string(),
                };
                writeln!(buf, "{} {}", label, record.args())
            } else {
                writeln!(buf, "{} {}", label, record.args())
            }
        })
        .try_init();

    if result.is_ok() {
        log::debug!("Logger initialized with level: {}", level);
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
