// ============================================================================
// dscl-cli/src/commands/useradd.rs
// ============================================================================
//
// USERADD COMMAND: Provision User Records through dscl
//
// Turns colon-separated user entries into directory records. For each user
// that does not already exist, a UniqueID is allocated if none was given,
// the primary group's PrimaryGroupID is looked up, the record is created
// with its properties, and the user is added to every listed group.
//
// AI-ASSISTANT-INFO: User provisioning logic for the osx-useradd binary

// ---- Internal crate imports ----
use crate::cli::Cli;

// ---- External crate imports ----
use anyhow::Context;
use dscl_core::user::HOME_ROOT;
use dscl_core::{
    ClientConfig, ClientConfigBuilder, CoreError, CoreResult, DsclClient, DsclRunner, Properties,
    UserRecord, Value,
};

// ---- Standard library imports ----
use std::io::{self, BufRead, Write};

/// Lowest UniqueID handed out to a regular account.
pub const FIRST_USER_UID: i64 = 501;

const GROUPS_ROOT: &str = "/Groups";
const UNIQUE_ID: &str = "UniqueID";
const PRIMARY_GROUP_ID: &str = "PrimaryGroupID";
const GROUP_MEMBERSHIP: &str = "GroupMembership";

// ============================================================================
// INPUT
// ============================================================================

/// Reads user entries, one per line. Blank lines and `#` comments are
/// skipped, as are entries without a name.
pub fn read_entries<R: BufRead>(reader: R) -> io::Result<Vec<UserRecord>> {
    let mut users = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let record = line.trim();
        if record.is_empty() || record.starts_with('#') {
            continue;
        }
        match UserRecord::from_entry(record) {
            Some(user) => users.push(user),
            None => log::warn!("Skipping entry without a user name: {record}"),
        }
    }
    Ok(users)
}

// ============================================================================
// PROVISIONING
// ============================================================================

/// What happened to one user.
#[derive(Debug, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A record with this name, or an account with the requested
    /// UniqueID, already exists; nothing was changed.
    Exists,
    Created {
        uid: i64,
        /// Properties that could not be set on the new record
        failed_properties: Vec<String>,
        /// Groups the user could not be added to
        failed_groups: Vec<String>,
    },
}

/// Picks the next free UniqueID from `-list /Users UniqueID` output lines
/// (`name   uid`). Never returns less than [`FIRST_USER_UID`].
pub fn next_free_uid(lines: &[String]) -> i64 {
    listed_uids(lines)
        .map(|uid| uid.saturating_add(1))
        .fold(FIRST_USER_UID, i64::max)
}

/// Whether any `-list /Users UniqueID` line carries `uid`.
pub fn uid_in_use(lines: &[String], uid: i64) -> bool {
    listed_uids(lines).any(|listed| listed == uid)
}

fn listed_uids(lines: &[String]) -> impl Iterator<Item = i64> + '_ {
    lines
        .iter()
        .filter_map(|line| line.split_whitespace().last()?.parse::<i64>().ok())
}

/// Creates `user` unless a record with its name, or an account holding
/// its explicit UniqueID, already exists.
pub fn provision_user<R: DsclRunner>(
    client: &DsclClient<R>,
    user: &UserRecord,
) -> CoreResult<ProvisionOutcome> {
    let path = user.record_path();
    if client.exists(&path)? {
        return Ok(ProvisionOutcome::Exists);
    }

    let listed = client.list_with_key(HOME_ROOT, UNIQUE_ID)?;
    let uid = if user.uid >= 0 {
        if uid_in_use(&listed, user.uid) {
            log::info!("UniqueID {} is already taken, not creating {}", user.uid, user.name);
            return Ok(ProvisionOutcome::Exists);
        }
        user.uid
    } else {
        let uid = next_free_uid(&listed);
        log::debug!("Allocated UniqueID {uid} for {}", user.name);
        uid
    };

    let mut props = user.to_properties();
    props.insert(UNIQUE_ID.to_string(), Value::Int(uid));
    if let Some(primary) = user.groups.first() {
        if let Some(gid) = primary_group_id(client, primary)? {
            props.insert(PRIMARY_GROUP_ID.to_string(), Value::Int(gid));
        }
    }

    let report = client.create_with_properties(&path, &props)?;
    let failed_properties: Vec<String> = report.failed_keys().into_iter().map(str::to_string).collect();

    let mut failed_groups = Vec::new();
    for group in &user.groups {
        if let Err(e) = add_group_member(client, group, &user.name) {
            log::warn!("Could not add {} to group {group}: {e}", user.name);
            failed_groups.push(group.clone());
        }
    }

    log::info!("Created user {} (UniqueID {uid})", user.name);
    Ok(ProvisionOutcome::Created {
        uid,
        failed_properties,
        failed_groups,
    })
}

/// Looks up a group's numeric id. A group that cannot be read yields `None`.
fn primary_group_id<R: DsclRunner>(client: &DsclClient<R>, group: &str) -> CoreResult<Option<i64>> {
    let path = format!("{GROUPS_ROOT}/{group}");
    match client.read(&path, &[]) {
        Ok(props) => Ok(props.get(PRIMARY_GROUP_ID).and_then(Value::as_int)),
        Err(CoreError::Exit(e)) => {
            log::warn!("Primary group {group} not readable: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Adds `member` to a group's GroupMembership, creating the key when the
/// group has no members yet.
fn add_group_member<R: DsclRunner>(client: &DsclClient<R>, group: &str, member: &str) -> CoreResult<()> {
    let path = format!("{GROUPS_ROOT}/{group}");
    match client.append(&path, GROUP_MEMBERSHIP, &Value::from(member)) {
        Err(CoreError::InvalidArgument(_)) => {
            let mut props = Properties::new();
            props.insert(GROUP_MEMBERSHIP.to_string(), Value::from(member));
            client.create_with_properties(&path, &props)?.into_result()?;
            Ok(())
        }
        other => other,
    }
}

// ============================================================================
// COMMAND ENTRY POINT
// ============================================================================

fn client_config(cli: &Cli) -> ClientConfig {
    let mut builder = ClientConfigBuilder::from_config(ClientConfig::from_env());
    if let Some(datasource) = &cli.datasource {
        builder = builder.datasource(datasource.as_str());
    }
    if let Some(user) = &cli.auth_user {
        builder = builder.user(user.as_str());
    }
    if let Some(password) = &cli.auth_password {
        builder = builder.password(password.as_str());
    }
    builder.build()
}

fn collect_users(cli: &Cli) -> anyhow::Result<Vec<UserRecord>> {
    if cli.stdin {
        return read_entries(io::stdin().lock()).context("Failed to read user entries from stdin");
    }
    Ok(cli.entry().and_then(|entry| UserRecord::from_entry(&entry)).into_iter().collect())
}

/// Runs `osx-useradd`. Returns `Ok(false)` when there was nothing to do,
/// so the caller can print usage.
pub fn run_useradd(cli: &Cli) -> anyhow::Result<bool> {
    if !cli.stdin && cli.name.is_none() {
        return Ok(false);
    }
    let users = collect_users(cli)?;

    if cli.dry_run {
        let mut stdout = io::stdout().lock();
        for user in &users {
            if cli.json {
                writeln!(stdout, "{}", serde_json::to_string(user)?)?;
            } else {
                writeln!(stdout, "{}", user.to_entry())?;
            }
        }
        return Ok(true);
    }

    let client = DsclClient::from_config(client_config(cli))?;
    for user in &users {
        let outcome = provision_user(&client, user)
            .with_context(|| format!("Failed to create user '{}'", user.name))?;
        match outcome {
            ProvisionOutcome::Exists => {
                eprintln!("{}: User '{}' exists.", crate::BIN_NAME, user.name);
            }
            ProvisionOutcome::Created {
                uid,
                failed_properties,
                failed_groups,
            } => {
                println!("{}:{}", user.name, uid);
                if !failed_properties.is_empty() {
                    log::warn!("{}: unset properties {:?}", user.name, failed_properties);
                }
                if !failed_groups.is_empty() {
                    log::warn!("{}: not added to {:?}", user.name, failed_groups);
                }
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dscl_core::external::mocks::MockDsclRunner;

    fn client(mock: &MockDsclRunner) -> DsclClient<MockDsclRunner> {
        DsclClient::with_runner("/usr/bin/dscl", ClientConfig::default(), mock.clone())
    }

    #[test]
    fn test_read_entries_skips_comments_and_blanks() {
        let input = "# users\n\nalice::501\n   \n:nameless\nbob:::admin\n";
        let users = read_entries(input.as_bytes()).unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(users[1].groups, vec!["admin"]);
    }

    #[test]
    fn test_next_free_uid() {
        let lines: Vec<String> = ["root   0", "daemon 1", "alice  501", "bob    730", "weird  x"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(next_free_uid(&lines), 731);
        assert_eq!(next_free_uid(&["root 0".to_string()]), FIRST_USER_UID);
        assert_eq!(next_free_uid(&[]), FIRST_USER_UID);
        assert_eq!(next_free_uid(&[format!("max {}", i64::MAX)]), i64::MAX);
    }

    #[test]
    fn test_uid_in_use() {
        let lines = vec!["root 0".to_string(), "alice   501".to_string(), "odd".to_string()];
        assert!(uid_in_use(&lines, 501));
        assert!(uid_in_use(&lines, 0));
        assert!(!uid_in_use(&lines, 502));
    }

    #[test]
    fn test_taken_uid_counts_as_existing_user() {
        let mock = MockDsclRunner::new();
        mock.expect_exit("-read", "/Users/zed", 56, "eDSRecordNotFound");
        mock.expect_output("-list", "/Users", "root 0\nalice 501\n");

        let user = UserRecord::from_entry("zed::501").unwrap();
        let outcome = provision_user(&client(&mock), &user).unwrap();
        assert_eq!(outcome, ProvisionOutcome::Exists);
        assert_eq!(mock.received_verbs(), vec!["-read", "-list"]);
        assert!(mock.operands_for("-create").is_empty());
    }

    #[test]
    fn test_unreadable_user_record_stops_provisioning() {
        let mock = MockDsclRunner::new();
        mock.expect_exit("-read", "/Users/zed", 40, "DS Error: -14120 (eDSPermissionError)");

        let user = UserRecord::from_entry("zed::900").unwrap();
        let err = provision_user(&client(&mock), &user).unwrap_err();
        assert_eq!(err.exit_error().map(|e| e.status()), Some(40));
        assert_eq!(mock.received_verbs(), vec!["-read"]);
    }

    #[test]
    fn test_existing_user_is_left_alone() {
        let mock = MockDsclRunner::new();
        mock.expect_output("-read", "/Users/alice", "RecordName: alice\n");

        let user = UserRecord::from_entry("alice").unwrap();
        let outcome = provision_user(&client(&mock), &user).unwrap();
        assert_eq!(outcome, ProvisionOutcome::Exists);
        assert_eq!(mock.received_verbs(), vec!["-read"]);
    }

    #[test]
    fn test_new_user_is_created_with_allocated_uid() {
        let mock = MockDsclRunner::new();
        mock.expect_exit("-read", "/Users/carol", 56, "eDSRecordNotFound");
        mock.expect_output("-list", "/Users", "root 0\nalice 501\n");
        mock.expect_output("-read", "/Groups/staff", "PrimaryGroupID: 20\nGroupMembership: root\n");
        // Record plus one -create per property
        for _ in 0..7 {
            mock.expect_success("-create", "/Users/carol");
        }
        mock.expect_output("-read", "/Groups/staff", "PrimaryGroupID: 20\nGroupMembership: root\n");
        mock.expect_success("-append", "/Groups/staff");

        let user = UserRecord::from_entry("carol").unwrap();
        let outcome = provision_user(&client(&mock), &user).unwrap();
        assert_eq!(
            outcome,
            ProvisionOutcome::Created {
                uid: 502,
                failed_properties: vec![],
                failed_groups: vec![],
            }
        );

        let creates = mock.operands_for("-create");
        assert!(creates.contains(&vec!["/Users/carol".into(), "UniqueID".into(), "502".into()]));
        assert!(creates.contains(&vec!["/Users/carol".into(), "PrimaryGroupID".into(), "20".into()]));
        assert!(creates.contains(&vec!["/Users/carol".into(), "Password".into(), "*".into()]));
        assert_eq!(
            mock.operands_for("-append"),
            vec![vec!["/Groups/staff", "GroupMembership", "carol"]]
        );
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[test]
    fn test_empty_group_gets_membership_key_created() {
        let mock = MockDsclRunner::new();
        mock.expect_exit("-read", "/Users/dave", 56, "eDSRecordNotFound");
        mock.expect_output("-list", "/Users", "root 0\nalice 501\n");
        mock.expect_exit("-read", "/Groups/devs", 56, "eDSRecordNotFound");
        for _ in 0..6 {
            mock.expect_success("-create", "/Users/dave");
        }
        // devs exists but has no GroupMembership yet
        mock.expect_output("-read", "/Groups/devs", "RecordName: devs\n");
        mock.expect_success("-create", "/Groups/devs");
        mock.expect_success("-create", "/Groups/devs");

        let user = UserRecord::from_entry("dave::900:devs").unwrap();
        let outcome = provision_user(&client(&mock), &user).unwrap();
        assert_eq!(
            outcome,
            ProvisionOutcome::Created {
                uid: 900,
                failed_properties: vec![],
                failed_groups: vec![],
            }
        );
        assert_eq!(mock.operands_for("-list"), vec![vec!["/Users", "UniqueID"]]);
        assert!(mock.operands_for("-append").is_empty());
        assert_eq!(
            mock.operands_for("-create").last().unwrap(),
            &vec!["/Groups/devs", "GroupMembership", "dave"]
        );
    }

    #[test]
    fn test_failed_property_and_group_are_reported() {
        let mock = MockDsclRunner::new();
        mock.expect_exit("-read", "/Users/erin", 56, "eDSRecordNotFound");
        mock.expect_output("-list", "/Users", "alice 501\n");
        mock.expect_output("-read", "/Groups/staff", "PrimaryGroupID: 20\n");
        mock.expect_success("-create", "/Users/erin");
        // Keys in order: NFSHomeDirectory, Password, PrimaryGroupID, RealName, UniqueID, UserShell
        mock.expect_success("-create", "/Users/erin");
        mock.expect_exit("-create", "/Users/erin", 1, "eDSPermissionError");
        for _ in 0..4 {
            mock.expect_success("-create", "/Users/erin");
        }
        mock.expect_exit("-read", "/Groups/staff", 1, "eDSPermissionError");

        let user = UserRecord::from_entry("erin::700").unwrap();
        let outcome = provision_user(&client(&mock), &user).unwrap();
        assert_eq!(
            outcome,
            ProvisionOutcome::Created {
                uid: 700,
                failed_properties: vec!["Password".to_string()],
                failed_groups: vec!["staff".to_string()],
            }
        );
    }

    #[test]
    fn test_record_create_failure_is_an_error() {
        let mock = MockDsclRunner::new();
        mock.expect_exit("-read", "/Users/frank", 56, "eDSRecordNotFound");
        mock.expect_output("-list", "/Users", "alice 501\n");
        mock.expect_exit("-read", "/Groups/staff", 56, "eDSRecordNotFound");
        mock.expect_exit("-create", "/Users/frank", 13, "eDSPermissionError");

        let user = UserRecord::from_entry("frank::800").unwrap();
        let err = provision_user(&client(&mock), &user).unwrap_err();
        assert_eq!(err.exit_error().map(|e| e.status()), Some(13));
    }
}
