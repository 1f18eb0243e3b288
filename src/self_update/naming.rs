//! Backup Naming Scheme
//!
//! The grammar `{base}_{YYYYMMDD}_{HHMMSS}_v{version}.bak` is the sole
//! source of truth for what counts as a backup. Listing and version
//! numbering both go through [`parse`] so the two can never drift apart.

use std::path::Path;

use chrono::{DateTime, Local};
use regex::Regex;

/// Timestamp layout embedded in backup names.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Fields recovered from a well-formed backup name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedBackupName {
    /// The raw `YYYYMMDD_HHMMSS` portion. Kept as text: the grammar
    /// constrains digit counts, not calendar validity.
    pub stamp: String,
    pub version: u64,
}

/// Logical name of a tracked file: its file name without the extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Compose a backup file name for `base` at `at` with `version`.
pub fn backup_file_name(base: &str, at: DateTime<Local>, version: u64) -> String {
    format!("{}_{}_v{}.bak", base, at.format(STAMP_FORMAT), version)
}

/// Parse `candidate` against the exact backup grammar for `base`.
///
/// Returns `None` for anything that does not conform: wrong digit counts,
/// missing `v`, wrong extension, extra path segments, a different base.
pub fn parse(candidate: &str, base: &str) -> Option<ParsedBackupName> {
    let pattern = format!(
        r"^{}_(\d{{8}}_\d{{6}})_v(\d+)\.bak$",
        regex::escape(base)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(candidate)?;
    Some(ParsedBackupName {
        stamp: caps[1].to_string(),
        version: caps[2].parse().ok()?,
    })
}

/// Exact-match filter over the backup grammar.
pub fn matches(candidate: &str, base: &str) -> bool {
    parse(candidate, base).is_some()
}

/// The version field of a backup name for `base`. `None` whenever
/// [`matches`] would reject the name.
pub fn version_of(candidate: &str, base: &str) -> Option<u64> {
    parse(candidate, base).map(|p| p.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn backup_file_name_shape() {
        let at = Local.with_ymd_and_hms(2025, 3, 6, 15, 30, 12).unwrap();
        assert_eq!(
            backup_file_name("calc", at, 3),
            "calc_20250306_153012_v3.bak"
        );
    }

    #[test]
    fn round_trip_through_grammar() {
        let at = Local.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let name = backup_file_name("calc", at, 12);
        assert!(matches(&name, "calc"));
        assert_eq!(version_of(&name, "calc"), Some(12));
        let parsed = parse(&name, "calc").unwrap();
        assert_eq!(parsed.stamp, "20250101_000000");
        assert_eq!(parsed.version, 12);
    }

    #[test]
    fn rejects_near_misses() {
        // Wrong date digit count.
        assert!(!matches("calc_2025010_100000_v1.bak", "calc"));
        // Wrong time digit count.
        assert!(!matches("calc_20250101_10000_v1.bak", "calc"));
        // Missing v prefix.
        assert!(!matches("calc_20250101_100000_1.bak", "calc"));
        // Wrong extension.
        assert!(!matches("calc_20250101_100000_v1.backup", "calc"));
        // Extra path segment.
        assert!(!matches("old/calc_20250101_100000_v1.bak", "calc"));
        // Different base.
        assert!(!matches("calc_20250101_100000_v1.bak", "calculator"));
        // Trailing garbage.
        assert!(!matches("calc_20250101_100000_v1.bak.old", "calc"));
        // Empty version digits.
        assert!(!matches("calc_20250101_100000_v.bak", "calc"));
    }

    #[test]
    fn version_of_requires_the_full_grammar() {
        assert_eq!(version_of("calc_20250101_100000_v7.bak", "calc"), Some(7));
        assert_eq!(version_of("calc_20250101_100000_v7.bak", "other"), None);
        assert_eq!(version_of("calc_v7.bak", "calc"), None);
    }

    #[test]
    fn base_with_regex_metacharacters_is_escaped() {
        assert!(matches("my.calc_20250101_100000_v1.bak", "my.calc"));
        assert!(!matches("myxcalc_20250101_100000_v1.bak", "my.calc"));
    }

    #[test]
    fn base_name_of_paths() {
        assert_eq!(base_name(Path::new("/a/b/calc.rs")), "calc");
        assert_eq!(base_name(Path::new("calc")), "calc");
        assert_eq!(base_name(Path::new("archive.tar.gz")), "archive.tar");
    }
}
