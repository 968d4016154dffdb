//! dscl command builder
//!
//! Produces the argument vector for one dscl invocation. The layout is fixed:
//!
//! ```text
//! dscl -q -url [-u USER] [-P PASSWORD] DATASOURCE -VERB ARGS...
//! ```

use crate::config::ClientConfig;
use crate::error::{CoreResult, invalid_argument};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Quiet, non-interactive mode.
const QUIET_FLAG: &str = "-q";
/// Treat the datasource as a URL-style node identifier.
const URL_FLAG: &str = "-url";
const USER_FLAG: &str = "-u";
const PASSWORD_FLAG: &str = "-P";
/// Verbs are passed to dscl as flags.
const VERB_PREFIX: char = '-';

const REDACTED: &str = "********";

/// A fully built invocation: the program and its argument vector.
#[derive(Clone, PartialEq, Eq)]
pub struct DsclCommand {
    program: PathBuf,
    args: Vec<String>,
    verb_index: Option<usize>,
}

impl DsclCommand {
    /// Wraps an arbitrary program and argument vector.
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            verb_index: None,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The dscl verb, e.g. `-read`, if this command carries one.
    pub fn verb(&self) -> Option<&str> {
        self.verb_index.map(|i| self.args[i].as_str())
    }

    /// Arguments following the verb: the record path and its operands.
    pub fn operands(&self) -> &[String] {
        match self.verb_index {
            Some(i) => &self.args[i + 1..],
            None => &self.args,
        }
    }

    /// Converts into a `std::process::Command` ready for spawning.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(OsStr::new));
        cmd
    }
}

// Debug and Display never print the password that follows `-P`.
impl fmt::Display for DsclCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        let mut hide_next = false;
        for arg in &self.args {
            if hide_next {
                write!(f, " {REDACTED}")?;
            } else {
                write!(f, " {arg}")?;
            }
            hide_next = arg == PASSWORD_FLAG;
        }
        Ok(())
    }
}

impl fmt::Debug for DsclCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DsclCommand({self})")
    }
}

/// Builder for dscl invocations against one datasource.
///
/// # Examples
///
/// ```rust
/// use dscl_core::config::ClientConfig;
/// use dscl_core::external::DsclCommandBuilder;
///
/// let config = ClientConfig::default();
/// let cmd = DsclCommandBuilder::new("/usr/bin/dscl", &config)
///     .verb("read")
///     .arg("/Users/alice")
///     .build()
///     .unwrap();
/// assert_eq!(cmd.args(), ["-q", "-url", ".", "-read", "/Users/alice"]);
/// ```
pub struct DsclCommandBuilder<'a> {
    program: &'a Path,
    config: &'a ClientConfig,
    verb: String,
    args: Vec<String>,
}

impl<'a> DsclCommandBuilder<'a> {
    #[must_use]
    pub fn new<P: AsRef<Path> + ?Sized>(program: &'a P, config: &'a ClientConfig) -> Self {
        Self {
            program: program.as_ref(),
            config,
            verb: String::new(),
            args: Vec::new(),
        }
    }

    /// Sets the operation verb. A missing leading `-` is added.
    #[must_use]
    pub fn verb(mut self, verb: &str) -> Self {
        self.verb = verb.to_string();
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Builds the invocation.
    ///
    /// Fails with `InvalidArgument` when the program path is empty, the verb
    /// is empty, or no operation arguments were given.
    pub fn build(self) -> CoreResult<DsclCommand> {
        if self.program.as_os_str().is_empty() {
            return Err(invalid_argument("dscl executable path is not resolved"));
        }
        if self.verb.is_empty() {
            return Err(invalid_argument("dscl verb is empty"));
        }
        if self.args.is_empty() {
            return Err(invalid_argument(format!(
                "no arguments supplied for {}",
                self.verb
            )));
        }

        let verb = if self.verb.starts_with(VERB_PREFIX) {
            self.verb
        } else {
            format!("{VERB_PREFIX}{}", self.verb)
        };

        let mut argv = vec![QUIET_FLAG.to_string(), URL_FLAG.to_string()];
        if let Some(user) = self.config.user.as_deref().filter(|u| !u.is_empty()) {
            argv.push(USER_FLAG.to_string());
            argv.push(user.to_string());
        }
        if let Some(password) = self.config.password.as_deref().filter(|p| !p.is_empty()) {
            argv.push(PASSWORD_FLAG.to_string());
            argv.push(password.to_string());
        }
        argv.push(self.config.datasource().to_string());
        let verb_index = argv.len();
        argv.push(verb);
        argv.extend(self.args);

        Ok(DsclCommand {
            program: self.program.to_path_buf(),
            args: argv,
            verb_index: Some(verb_index),
        })
    }
}
