// ============================================================================
// dscl-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the dscl Command-Line Utility
//
// This module encapsulates everything that touches the external dscl binary:
// locating it, building its argument vector, and running it as a subprocess.
//
// KEY COMPONENTS:
// - DsclCommandBuilder / DsclCommand: Argument vector construction
// - DsclRunner: Trait for executing a built command
// - SubprocessRunner: Real implementation using std::process
// - MockDsclRunner: Scripted implementation for tests
//
// DESIGN PHILOSOPHY:
// The client depends on the DsclRunner trait rather than on std::process
// directly, so operation logic can be tested without a directory service.
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for dscl

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::path::PathBuf;

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains dscl argument building logic
pub mod command;

/// Contains traits and implementations for executing dscl commands
pub mod executor;

/// Scripted runner used by tests in this and downstream crates
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use command::{DsclCommand, DsclCommandBuilder};
pub use executor::{DsclRunner, SubprocessRunner};

// ============================================================================
// EXECUTABLE RESOLUTION
// ============================================================================

/// Resolves the dscl executable using the standard `PATH` lookup.
///
/// A name containing a path separator is checked directly instead of being
/// searched for.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The absolute path of the executable
/// * `Err(CoreError::ExecutableNotFound)` - If nothing executable was found
pub fn resolve_executable(name: &str) -> CoreResult<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            log::debug!("Found dependency '{}' at {}", name, path.display());
            Ok(path)
        }
        Err(source) => {
            log::warn!("Dependency '{}' not found.", name);
            Err(CoreError::ExecutableNotFound {
                name: name.to_string(),
                source,
            })
        }
    }
}
