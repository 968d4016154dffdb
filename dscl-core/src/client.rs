// ============================================================================
// dscl-core/src/client.rs
// ============================================================================
//
// DIRECTORY CLIENT: Operation Surface over the dscl Utility
//
// This module exposes create, read, delete, change, append, and list on
// directory records. Each operation builds one or more dscl invocations,
// runs them through a DsclRunner, and parses what comes back.
//
// KEY COMPONENTS:
// - DsclClient: The client, generic over the runner that executes commands
// - PropertyWriteReport: Per-key outcome of create_with_properties
//
// CONSISTENCY:
// Nothing here is transactional. A multi-property create keeps going after a
// failed key and reports what happened; a multi-key delete stops at the first
// failed key and reports which keys were already removed.
//
// AI-ASSISTANT-INFO: Directory client operations for dscl-core

// ---- Internal crate imports ----
use crate::config::ClientConfig;
use crate::error::{CoreError, CoreResult, invalid_argument};
use crate::external::{DsclCommandBuilder, DsclRunner, SubprocessRunner, resolve_executable};
use crate::parser::{parse_list, parse_record_bytes};
use crate::value::{Properties, Value};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// dscl verbs used by the client.
pub mod verbs {
    pub const CREATE: &str = "-create";
    pub const READ: &str = "-read";
    pub const DELETE: &str = "-delete";
    pub const CHANGE_AT_INDEX: &str = "-changei";
    pub const APPEND: &str = "-append";
    pub const LIST: &str = "-list";
}

/// `-changei` counts value positions from 1.
pub const FIRST_VALUE_INDEX: usize = 1;

// ============================================================================
// PARTIAL RESULTS
// ============================================================================

/// A property that could not be written.
#[derive(Debug)]
pub struct PropertyFailure {
    pub key: String,
    pub error: CoreError,
}

/// Outcome of [`DsclClient::create_with_properties`].
///
/// Keys are processed in sorted order. A key is listed in `applied` only
/// when its create and any follow-up append both succeeded.
#[derive(Debug, Default)]
pub struct PropertyWriteReport {
    pub applied: Vec<String>,
    pub failures: Vec<PropertyFailure>,
}

impl PropertyWriteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_keys(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.key.as_str()).collect()
    }

    /// Converts into a plain result, surfacing the first failure.
    pub fn into_result(self) -> CoreResult<Vec<String>> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.applied),
        }
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Client for one directory datasource.
///
/// Holds only immutable configuration; every call spawns its own dscl
/// process, so a client can be shared across threads when its runner can.
///
/// # Examples
///
/// ```rust,no_run
/// use dscl_core::{DsclClient, Value};
///
/// let client = DsclClient::new()?;
/// let props = client.read("/Users/alice", &[])?;
/// if let Some(shell) = props.get("UserShell") {
///     println!("shell: {shell}");
/// }
/// client.change("/Users/alice", "UserShell", &Value::from("/bin/zsh"))?;
/// # Ok::<(), dscl_core::CoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DsclClient<R = SubprocessRunner> {
    executable: PathBuf,
    config: ClientConfig,
    runner: R,
}

impl DsclClient<SubprocessRunner> {
    /// Client for the local node using ambient authorization.
    pub fn new() -> CoreResult<Self> {
        Self::from_config(ClientConfig::default())
    }

    /// Client for the given datasource. An empty datasource means the local node.
    pub fn with_datasource(datasource: &str) -> CoreResult<Self> {
        Self::from_config(ClientConfig::for_datasource(datasource))
    }

    /// Resolves the configured executable and builds a client around it.
    pub fn from_config(config: ClientConfig) -> CoreResult<Self> {
        let executable = resolve_executable(&config.executable)?;
        Ok(Self::with_runner(executable, config, SubprocessRunner))
    }
}

impl<R: DsclRunner> DsclClient<R> {
    /// Builds a client around an already-known executable and a runner.
    /// No path lookup happens here.
    pub fn with_runner(executable: impl Into<PathBuf>, config: ClientConfig, runner: R) -> Self {
        Self {
            executable: executable.into(),
            config,
            runner,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn execute<I, S>(&self, verb: &str, args: I) -> CoreResult<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cmd = DsclCommandBuilder::new(&self.executable, &self.config)
            .verb(verb)
            .args(args)
            .build()?;
        self.runner.run(&cmd)
    }

    // ---- Create ----

    /// Creates an empty record at `path`.
    pub fn create(&self, path: &str) -> CoreResult<()> {
        self.create_with_properties(path, &Properties::new())
            .map(|_| ())
    }

    /// Creates the record at `path`, then writes each property.
    ///
    /// The first element of each value is set with `-create`; remaining
    /// elements are added with [`append`](Self::append). A failing property
    /// is recorded in the report and the loop moves on to the next key.
    /// Only a failure to create the record itself is returned as `Err`.
    pub fn create_with_properties(
        &self,
        path: &str,
        props: &Properties,
    ) -> CoreResult<PropertyWriteReport> {
        require_path(path)?;
        self.execute(verbs::CREATE, [path])?;

        let mut keys: Vec<&String> = props.keys().collect();
        keys.sort();

        let mut report = PropertyWriteReport::default();
        for key in keys {
            let mut values = props[key].strings();
            if values.is_empty() {
                continue;
            }
            let rest = values.split_off(1);

            match self.write_property(path, key, &values[0], rest) {
                Ok(()) => report.applied.push(key.clone()),
                Err(error) => {
                    log::warn!("Failed to set {key} on {path}: {error}");
                    report.failures.push(PropertyFailure {
                        key: key.clone(),
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    fn write_property(&self, path: &str, key: &str, first: &str, rest: Vec<String>) -> CoreResult<()> {
        require_key(key)?;
        self.execute(verbs::CREATE, [path, key, first])?;
        if !rest.is_empty() {
            self.append(path, key, &Value::Strings(rest))?;
        }
        Ok(())
    }

    // ---- Read ----

    /// Reads the record at `path`.
    ///
    /// Keys in `exclude` are dropped from the result; this is a subtractive
    /// filter, not a selection.
    pub fn read(&self, path: &str, exclude: &[&str]) -> CoreResult<Properties> {
        require_path(path)?;
        let output = self.execute(verbs::READ, [path])?;
        parse_record_bytes(&output, exclude)
    }

    /// Whether a record exists at `path`. Only a read that dscl rejects with
    /// a record-not-found diagnostic counts as absence; every other failure,
    /// permission errors included, is returned.
    pub fn exists(&self, path: &str) -> CoreResult<bool> {
        match self.read(path, &[]) {
            Ok(_) => Ok(true),
            Err(CoreError::Exit(e)) if e.is_record_not_found() => {
                log::debug!("{path} not found (status {})", e.status());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ---- Delete ----

    /// Deletes the whole record (no keys) or individual keys.
    ///
    /// The record is read first. Without keys, the record is deleted and
    /// everything read is returned. With keys, each key present in the record
    /// is deleted in turn and only those keys are returned; absent and empty
    /// keys are skipped.
    ///
    /// A failed key delete stops the loop. If earlier keys were already
    /// removed the error is [`CoreError::PartialDelete`] naming them.
    pub fn delete(&self, path: &str, keys: &[&str]) -> CoreResult<Properties> {
        require_path(path)?;
        let existing = self.read(path, &[])?;

        if keys.is_empty() {
            self.execute(verbs::DELETE, [path])?;
            return Ok(existing);
        }

        let mut removed = Properties::new();
        let mut deleted: Vec<String> = Vec::new();
        for &key in keys {
            if key.is_empty() {
                continue;
            }
            let Some(value) = existing.get(key) else {
                log::debug!("{key} not present on {path}, nothing to delete");
                continue;
            };

            if let Err(source) = self.execute(verbs::DELETE, [path, key]) {
                if deleted.is_empty() {
                    return Err(source);
                }
                return Err(CoreError::PartialDelete {
                    deleted,
                    failed_key: key.to_string(),
                    source: Box::new(source),
                });
            }
            deleted.push(key.to_string());
            removed.insert(key.to_string(), value.clone());
        }

        Ok(removed)
    }

    // ---- Change ----

    /// Replaces the first value of an existing key.
    pub fn change(&self, path: &str, key: &str, value: &Value) -> CoreResult<()> {
        self.change_at_index(path, key, value, FIRST_VALUE_INDEX)
    }

    /// Replaces the value at `index` of an existing, possibly multi-valued,
    /// key with the string form of `value`.
    pub fn change_at_index(&self, path: &str, key: &str, value: &Value, index: usize) -> CoreResult<()> {
        require_path(path)?;
        require_key(key)?;
        require_value(key, value)?;
        self.require_existing_key(path, key)?;

        let index = index.to_string();
        let new_value = value.to_string();
        self.execute(verbs::CHANGE_AT_INDEX, [path, key, index.as_str(), new_value.as_str()])?;
        Ok(())
    }

    // ---- Append ----

    /// Adds every element of `value` to an existing key.
    pub fn append(&self, path: &str, key: &str, value: &Value) -> CoreResult<()> {
        require_path(path)?;
        require_key(key)?;
        require_value(key, value)?;
        self.require_existing_key(path, key)?;

        let mut args = vec![path.to_string(), key.to_string()];
        args.extend(value.strings());
        self.execute(verbs::APPEND, args)?;
        Ok(())
    }

    // ---- List ----

    /// Lists the children of `path`, one entry per output line.
    pub fn list(&self, path: &str) -> CoreResult<Vec<String>> {
        require_path(path)?;
        let output = self.execute(verbs::LIST, [path])?;
        parse_list(output.as_slice())
    }

    /// Lists the children of `path` alongside the value of `key` for each,
    /// as dscl prints them (`name   value`).
    pub fn list_with_key(&self, path: &str, key: &str) -> CoreResult<Vec<String>> {
        require_path(path)?;
        require_key(key)?;
        let output = self.execute(verbs::LIST, [path, key])?;
        parse_list(output.as_slice())
    }

    fn require_existing_key(&self, path: &str, key: &str) -> CoreResult<()> {
        let props = self.read(path, &[])?;
        if props.contains_key(key) {
            Ok(())
        } else {
            Err(invalid_argument(format!("{key} does not exist on {path}")))
        }
    }
}

fn require_path(path: &str) -> CoreResult<()> {
    if path.is_empty() {
        return Err(invalid_argument("record path is empty"));
    }
    Ok(())
}

fn require_key(key: &str) -> CoreResult<()> {
    if key.is_empty() {
        return Err(invalid_argument("property key is empty"));
    }
    Ok(())
}

fn require_value(key: &str, value: &Value) -> CoreResult<()> {
    if value.is_empty() {
        return Err(invalid_argument(format!("no value given for {key}")));
    }
    Ok(())
}
