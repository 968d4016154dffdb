//! Core library for driving the `dscl` directory-service utility.
//!
//! This crate builds dscl invocations, runs them as subprocesses while
//! draining both output streams, and parses dscl's line-oriented record
//! format into typed [`Properties`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use dscl_core::{DsclClient, Properties, Value};
//!
//! let client = DsclClient::new()?;
//!
//! let mut props = Properties::new();
//! props.insert("RealName".to_string(), Value::from("Alice Example"));
//! props.insert("UserShell".to_string(), Value::from("/bin/zsh"));
//! let report = client.create_with_properties("/Users/alice", &props)?;
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.key, failure.error);
//! }
//!
//! let record = client.read("/Users/alice", &[])?;
//! assert!(record.contains_key("RealName"));
//! # Ok::<(), dscl_core::CoreError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod external;
pub mod parser;
pub mod user;
pub mod value;

// Re-exports for public API
pub use client::{DsclClient, PropertyFailure, PropertyWriteReport};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{CoreError, CoreResult, ExitError};
pub use external::{DsclCommand, DsclCommandBuilder, DsclRunner, SubprocessRunner};
pub use parser::{decode_value, parse_list, parse_record};
pub use user::UserRecord;
pub use value::{Properties, Value};
