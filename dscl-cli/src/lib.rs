// dscl-cli/src/lib.rs
//
// Library portion of the osx-useradd CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod logging;

/// Prefix used on user-facing messages.
pub const BIN_NAME: &str = "osx-useradd";

// Re-export items needed by the binary or integration tests
pub use cli::Cli;
pub use commands::useradd::{ProvisionOutcome, provision_user, read_entries, run_useradd};
