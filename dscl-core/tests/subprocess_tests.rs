// dscl-core/tests/subprocess_tests.rs
//
// End-to-end tests that run real child processes: either /bin/sh directly
// or a fake `dscl` shell script written into a temporary directory.

#![cfg(unix)]

use dscl_core::config::ClientConfigBuilder;
use dscl_core::{CoreError, DsclClient, DsclCommand, DsclRunner, SubprocessRunner, Value};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Writes an executable fake dscl that appends its arguments (one per line,
/// followed by `--`) to `args.log` next to it, then runs `body`.
fn write_fake_dscl(dir: &Path, body: &str) -> PathBuf {
    let log = dir.join("args.log");
    let script = format!(
        "#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\" >> '{}'; done\necho -- >> '{}'\n{}\n",
        log.display(),
        log.display(),
        body
    );
    let path = dir.join("dscl");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn logged_args(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("args.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

const FAKE_DSCL_BODY: &str = r#"
case "$*" in
  *"-read /Users/alice"*)
    printf 'RecordName: alice\nNFSHomeDirectory:\n /Users/alice\nComment: 100%%25 sure\n'
    ;;
  *"-read "*)
    printf '<dscl_cmd> DS Error: -14136 (eDSRecordNotFound)\n' >&2
    exit 56
    ;;
  *"-list /Users"*)
    printf 'alice\nbob\n\n_hidden\n'
    ;;
esac
"#;

#[test]
fn test_read_through_fake_dscl() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let dscl = write_fake_dscl(tmp.path(), FAKE_DSCL_BODY);

    let config = ClientConfigBuilder::new()
        .executable(dscl.to_string_lossy())
        .build();
    let client = DsclClient::from_config(config)?;
    assert_eq!(client.executable(), dscl.as_path());

    let props = client.read("/Users/alice", &[])?;
    assert_eq!(props["RecordName"].to_string(), "alice");
    assert_eq!(props["NFSHomeDirectory"].to_string(), "/Users/alice");
    assert_eq!(props["Comment"].to_string(), "100% sure");

    assert_eq!(
        logged_args(tmp.path()),
        ["-q", "-url", ".", "-read", "/Users/alice", "--"]
    );
    Ok(())
}

#[test]
fn test_missing_record_is_classified_failure() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let dscl = write_fake_dscl(tmp.path(), FAKE_DSCL_BODY);
    let client = DsclClient::with_runner(&dscl, Default::default(), SubprocessRunner);

    let err = client.read("/Users/nobody", &[]).unwrap_err();
    let exit = err.exit_error().expect("classified failure");
    assert_eq!(exit.status(), 56);
    assert!(err.to_string().contains("eDSRecordNotFound"));

    assert!(!client.exists("/Users/nobody")?);
    assert!(client.exists("/Users/alice")?);
    Ok(())
}

#[test]
fn test_list_through_fake_dscl() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let dscl = write_fake_dscl(tmp.path(), FAKE_DSCL_BODY);
    let client = DsclClient::with_runner(&dscl, Default::default(), SubprocessRunner);

    assert_eq!(client.list("/Users")?, vec!["alice", "bob"]);
    Ok(())
}

#[test]
fn test_credentials_are_passed_to_the_tool() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let dscl = write_fake_dscl(tmp.path(), FAKE_DSCL_BODY);
    let config = ClientConfigBuilder::new()
        .datasource("/LDAPv3/127.0.0.1")
        .user("diradmin")
        .password("pw")
        .build();
    let client = DsclClient::with_runner(&dscl, config, SubprocessRunner);

    client.change_at_index("/Users/alice", "RecordName", &Value::from("al"), 1)?;

    let args = logged_args(tmp.path());
    // One -read precondition check, then the -changei itself
    let calls: Vec<&[String]> = args.split(|a| a == "--").filter(|c| !c.is_empty()).collect();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        [
            "-q",
            "-url",
            "-u",
            "diradmin",
            "-P",
            "pw",
            "/LDAPv3/127.0.0.1",
            "-changei",
            "/Users/alice",
            "RecordName",
            "1",
            "al",
        ]
    );
    Ok(())
}

#[test]
fn test_unresolvable_executable() {
    let config = ClientConfigBuilder::new()
        .executable("/nonexistent/path/to/dscl")
        .build();
    let err = DsclClient::from_config(config).unwrap_err();
    assert!(matches!(err, CoreError::ExecutableNotFound { .. }));
}

#[test]
fn test_exit_status_and_stderr_are_preserved() {
    let cmd = DsclCommand::new("/bin/sh", ["-c", "echo partial; printf boom >&2; exit 5"]);
    let err = SubprocessRunner.run(&cmd).unwrap_err();
    let exit = err.exit_error().expect("classified failure");
    assert_eq!(exit.status(), 5);
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn test_large_output_on_both_streams_does_not_stall() {
    // Each stream far exceeds a pipe buffer; stderr is written first so a
    // stdout-only reader would deadlock.
    let script = "head -c 1048576 /dev/zero | tr '\\0' e >&2; \
                  head -c 2097152 /dev/zero | tr '\\0' o; \
                  exit 0";
    let cmd = DsclCommand::new("/bin/sh", ["-c", script]);
    let out = SubprocessRunner.run(&cmd).unwrap();
    assert_eq!(out.len(), 2_097_152);
    assert!(out.iter().all(|&b| b == b'o'));
}

#[test]
fn test_large_stderr_on_failure_is_fully_captured() {
    let script = "head -c 300000 /dev/zero | tr '\\0' x >&2; exit 3";
    let cmd = DsclCommand::new("/bin/sh", ["-c", script]);
    let err = SubprocessRunner.run(&cmd).unwrap_err();
    let exit = err.exit_error().expect("classified failure");
    assert_eq!(exit.status(), 3);
    assert_eq!(exit.stderr().len(), 300_000);
}
