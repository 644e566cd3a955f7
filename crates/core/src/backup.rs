//! Backup snapshot naming.
//!
//! Snapshots are plain JSON files in the configured backup directory. Names
//! are generated server-side and every name coming back from a client is
//! checked against the same pattern, so a request can never address a file
//! outside that directory.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// File extension of backup snapshots.
pub const BACKUP_EXTENSION: &str = "json";

/// Snapshot format version written into every backup.
pub const SNAPSHOT_FORMAT_VERSION: i32 = 1;

static BACKUP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^backup-\d{8}T\d{9}Z\.json$").expect("backup name pattern is valid")
});

/// Build the file name for a snapshot taken at `at`, to the millisecond.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sborrowhub_core::backup::backup_file_name;
/// let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
/// assert_eq!(backup_file_name(at), "backup-20260304T050607000Z.json");
/// ```
pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!("backup-{}Z.{BACKUP_EXTENSION}", at.format("%Y%m%dT%H%M%S%3f"))
}

/// Whether `name` is a well-formed snapshot file name.
pub fn is_valid_backup_name(name: &str) -> bool {
    BACKUP_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_names_are_valid() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert!(is_valid_backup_name(&backup_file_name(at)));
    }

    #[test]
    fn path_traversal_is_rejected() {
        assert!(!is_valid_backup_name("../backup-20260101T000000000Z.json"));
        assert!(!is_valid_backup_name("backup-20260101T000000000Z.json/.."));
        assert!(!is_valid_backup_name("/etc/passwd"));
    }

    #[test]
    fn names_without_millis_are_rejected() {
        assert!(!is_valid_backup_name("backup-20260101T000000Z.json"));
    }

    #[test]
    fn wrong_extension_is_rejected() {
        assert!(!is_valid_backup_name("backup-20260101T000000000Z.sql"));
    }
}
