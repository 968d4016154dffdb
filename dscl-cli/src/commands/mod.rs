//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of `osx-useradd`.
/// Reads user entries and creates the matching directory records.
pub mod useradd;
