// dscl-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::Parser;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    name = "osx-useradd",
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "osx-useradd: Create user accounts through dscl",
    long_about = "Creates directory-service user accounts from command-line options or from \
                  colon-separated entries (name:password:uid:groups:fullname:home:shell:hidden) \
                  read on standard input."
)]
pub struct Cli {
    /// Login name of the new account
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Read user entries from stdin instead of the command line
    #[arg(long)]
    pub stdin: bool,

    // --- Account Fields ---
    /// User ID of the new account
    #[arg(short = 'u', value_name = "UID")]
    pub uid: Option<String>,

    /// Comma-separated list of supplementary groups of the new account
    #[arg(short = 'G', value_name = "GROUPS")]
    pub groups: Option<String>,

    /// Encrypted password of the new account
    #[arg(short = 'p', value_name = "PASSWORD")]
    pub password: Option<String>,

    /// GECOS field (full name) of the new account
    #[arg(short = 'c', value_name = "COMMENT")]
    pub comment: Option<String>,

    /// Home directory of the new account
    #[arg(short = 'd', value_name = "HOME_DIR")]
    pub home_dir: Option<String>,

    /// Login shell of the new account
    #[arg(short = 's', value_name = "SHELL")]
    pub shell: Option<String>,

    /// Set the hidden flag
    #[arg(short = 'H')]
    pub hidden: bool,

    // --- Directory Service ---
    /// Datasource to operate on (defaults to the local node, or DSCL_DATASOURCE)
    #[arg(long, value_name = "NODE")]
    pub datasource: Option<String>,

    /// User to authenticate to the directory as
    #[arg(long, value_name = "USER")]
    pub auth_user: Option<String>,

    /// Password for --auth-user.
    /// Can also be set via the DSCL_AUTH_PASSWORD environment variable.
    #[arg(long, value_name = "PASSWORD", env = "DSCL_AUTH_PASSWORD", hide_env_values = true)]
    pub auth_password: Option<String>,

    // --- Output ---
    /// Print the parsed user entries without touching the directory
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print entries as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The colon-separated entry described by the positional name and the
    /// account options, or `None` when no name was given.
    pub fn entry(&self) -> Option<String> {
        let name = self.name.as_deref()?.trim();
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        Some(format!(
            "{}:{}:{}:{}:{}:{}:{}:{}",
            name,
            field(&self.password),
            field(&self.uid),
            field(&self.groups),
            field(&self.comment),
            field(&self.home_dir),
            field(&self.shell),
            if self.hidden { "yes" } else { "" }
        ))
    }
}
