//! User entries in colon-separated form.
//!
//! An entry has up to eight fields:
//!
//! ```text
//! name:password:uid:groups:fullname:home:shell:hidden
//! ```
//!
//! Empty fields and `*` mean "unset". Groups are comma separated. Missing
//! trailing fields are allowed; fields past the eighth are ignored.

use crate::value::{Properties, Value};
use serde::Serialize;

/// Group assigned when an entry names none.
pub const DEFAULT_GROUP: &str = "staff";
pub const DEFAULT_SHELL: &str = "/bin/bash";
pub const HOME_ROOT: &str = "/Users";
/// Value stored in `Password` when no password hash is given.
pub const NO_PASSWORD: &str = "*";

const UNSET: &str = "*";

/// One user account as described by a colon-separated entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub name: String,
    pub password: String,
    /// -1 when not given or not numeric
    pub uid: i64,
    pub groups: Vec<String>,
    pub full_name: String,
    pub home_directory: String,
    pub shell: String,
    pub hidden: bool,
}

fn field_is_set(field: &str) -> bool {
    !field.is_empty() && field != UNSET
}

fn parse_uid(field: &str) -> i64 {
    field.parse().unwrap_or(-1)
}

fn parse_groups(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|g| field_is_set(g))
        .map(str::to_string)
        .collect()
}

fn parse_flag(field: &str) -> bool {
    field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("yes")
}

impl UserRecord {
    /// Parses one entry. Returns `None` when the entry has no name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dscl_core::user::UserRecord;
    ///
    /// let user = UserRecord::from_entry("alice::501:admin,staff").unwrap();
    /// assert_eq!(user.uid, 501);
    /// assert_eq!(user.groups, vec!["admin", "staff"]);
    /// assert_eq!(user.home_directory, "/Users/alice");
    /// ```
    pub fn from_entry(entry: &str) -> Option<Self> {
        let mut user = UserRecord {
            name: String::new(),
            password: String::new(),
            uid: -1,
            groups: Vec::new(),
            full_name: String::new(),
            home_directory: String::new(),
            shell: String::new(),
            hidden: false,
        };

        for (index, field) in entry.trim().split(':').take(8).enumerate() {
            let field = field.trim();
            if !field_is_set(field) {
                continue;
            }
            match index {
                0 => user.name = field.to_string(),
                1 => user.password = field.to_string(),
                2 => user.uid = parse_uid(field),
                3 => user.groups = parse_groups(field),
                4 => user.full_name = field.to_string(),
                5 => user.home_directory = field.to_string(),
                6 => user.shell = field.to_string(),
                7 => user.hidden = parse_flag(field),
                _ => unreachable!("take(8) bounds the field index"),
            }
        }

        if user.name.is_empty() {
            return None;
        }

        if user.groups.is_empty() {
            user.groups = vec![DEFAULT_GROUP.to_string()];
        }
        if user.full_name.is_empty() {
            user.full_name = user.name.clone();
        }
        if user.home_directory.is_empty() {
            user.home_directory = format!("{HOME_ROOT}/{}", user.name);
        }
        if user.shell.is_empty() {
            user.shell = DEFAULT_SHELL.to_string();
        }
        Some(user)
    }

    /// Renders the record back into entry form.
    pub fn to_entry(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}:{}:{}",
            self.name,
            self.password,
            self.uid,
            self.groups.join(","),
            self.full_name,
            self.home_directory,
            self.shell,
            self.hidden
        )
    }

    /// Directory path of this user's record.
    pub fn record_path(&self) -> String {
        format!("{HOME_ROOT}/{}", self.name)
    }

    /// Directory properties for creating the record. `UniqueID` is left out
    /// while the uid is unset; group membership lives on the group records.
    pub fn to_properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("RealName".into(), Value::from(self.full_name.as_str()));
        props.insert("UserShell".into(), Value::from(self.shell.as_str()));
        props.insert(
            "NFSHomeDirectory".into(),
            Value::from(self.home_directory.as_str()),
        );
        let password = if self.password.is_empty() {
            NO_PASSWORD
        } else {
            self.password.as_str()
        };
        props.insert("Password".into(), Value::from(password));
        if self.uid >= 0 {
            props.insert("UniqueID".into(), Value::Int(self.uid));
        }
        if self.hidden {
            props.insert("IsHidden".into(), Value::Int(1));
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_entry() {
        let user = UserRecord::from_entry(
            "bob:$hash:502:admin, wheel:Bob Builder:/Users/bobby:/bin/zsh:yes",
        )
        .unwrap();
        assert_eq!(user.name, "bob");
        assert_eq!(user.password, "$hash");
        assert_eq!(user.uid, 502);
        assert_eq!(user.groups, vec!["admin", "wheel"]);
        assert_eq!(user.full_name, "Bob Builder");
        assert_eq!(user.home_directory, "/Users/bobby");
        assert_eq!(user.shell, "/bin/zsh");
        assert!(user.hidden);
    }

    #[test]
    fn test_defaults_for_name_only() {
        let user = UserRecord::from_entry("  carol  ").unwrap();
        assert_eq!(user.uid, -1);
        assert_eq!(user.groups, vec!["staff"]);
        assert_eq!(user.full_name, "carol");
        assert_eq!(user.home_directory, "/Users/carol");
        assert_eq!(user.shell, "/bin/bash");
        assert!(!user.hidden);
        assert_eq!(user.password, "");
    }

    #[test]
    fn test_star_and_empty_fields_are_unset() {
        let user = UserRecord::from_entry("dave:*:*:*,,*:*::*:*").unwrap();
        assert_eq!(user.uid, -1);
        assert_eq!(user.groups, vec!["staff"]);
        assert_eq!(user.full_name, "dave");
        assert_eq!(user.shell, "/bin/bash");
    }

    #[test]
    fn test_bad_uid_and_flag_values() {
        let user = UserRecord::from_entry("erin::abc::::: TRUE").unwrap();
        assert_eq!(user.uid, -1);
        assert!(user.hidden);
        let user = UserRecord::from_entry("erin:::::::no").unwrap();
        assert!(!user.hidden);
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(UserRecord::from_entry(""), None);
        assert_eq!(UserRecord::from_entry(":pw:501"), None);
        assert_eq!(UserRecord::from_entry("*:pw:501"), None);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let user = UserRecord::from_entry("frank::1:g:F:/h:/s:yes:extra:more").unwrap();
        assert_eq!(user.shell, "/s");
        assert!(user.hidden);
    }

    #[test]
    fn test_to_entry() {
        let user = UserRecord::from_entry("alice::501:admin,staff").unwrap();
        assert_eq!(
            user.to_entry(),
            "alice::501:admin,staff:alice:/Users/alice:/bin/bash:false"
        );
    }

    #[test]
    fn test_to_properties() {
        let user = UserRecord::from_entry("alice::501::Alice:::yes").unwrap();
        let props = user.to_properties();
        assert_eq!(props["RealName"].to_string(), "Alice");
        assert_eq!(props["UniqueID"], Value::Int(501));
        assert_eq!(props["Password"].to_string(), "*");
        assert_eq!(props["IsHidden"].to_string(), "1");
        assert_eq!(user.record_path(), "/Users/alice");

        let anonymous_uid = UserRecord::from_entry("bob").unwrap().to_properties();
        assert!(!anonymous_uid.contains_key("UniqueID"));
        assert!(!anonymous_uid.contains_key("IsHidden"));
    }
}
