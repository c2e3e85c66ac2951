//! File name rules for triaged documents.
//!
//! New names get the source's extension when the operator omitted it, and
//! are usually prefixed with a timestamp so two documents filed under the
//! same name never overwrite each other.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::DirectoryEntry;

static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{8}-\d{6}\.\d{3}_(.*)$").expect("timestamp prefix pattern is valid")
});

/// Returns the extension of `name` including the leading dot, or `""`.
///
/// Everything from the last `.` counts, so `.pdf` files and `archive.tar.gz`
/// yield `.pdf` and `.gz`.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}

/// Appends the extension of `source_name` to `requested` unless `requested`
/// already ends with it, compared case-insensitively.
///
/// The appended extension keeps the source's spelling.
pub fn reconcile_extension(source_name: &str, requested: &str) -> String {
    let ext = extension_of(source_name);
    if requested.to_lowercase().ends_with(&ext.to_lowercase()) {
        requested.to_string()
    } else {
        format!("{requested}{ext}")
    }
}

/// Rejects names that would escape the target directory or cannot be files.
///
/// # Errors
///
/// [`CoreError::InvalidName`] for empty names, `.`, `..`, and names holding a
/// path separator or NUL byte.
pub fn validate_name(name: &str) -> CoreResult<()> {
    let trimmed = name.trim();
    let bad = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Renders the `YYYYMMDD-HHMMSS.mmm_` prefix for `at`.
pub fn timestamp_prefix(at: NaiveDateTime) -> String {
    at.format("%Y%m%d-%H%M%S%.3f_").to_string()
}

/// Renders the timestamp prefix for the current local time.
pub fn timestamp_prefix_now() -> String {
    timestamp_prefix(Local::now().naive_local())
}

pub fn has_timestamp_prefix(name: &str) -> bool {
    TIMESTAMP_PREFIX.is_match(name)
}

/// Removes a leading timestamp prefix, returning other names unchanged.
pub fn strip_timestamp_prefix(name: &str) -> &str {
    match TIMESTAMP_PREFIX.captures(name).and_then(|c| c.get(1)) {
        Some(rest) => rest.as_str(),
        None => name,
    }
}

/// Derives name suggestions from a destination directory listing.
///
/// Hidden entries and subdirectories are skipped. When `extensions` is
/// non-empty only files whose lower-cased extension (with dot) is listed are
/// kept. Names are compared without their timestamp prefix, trimmed and
/// lower-cased, against the lower-cased `prefix`. The result is de-duplicated
/// and keeps listing order.
pub fn suggest_names(
    entries: &[DirectoryEntry],
    prefix: &str,
    extensions: &[&str],
) -> Vec<String> {
    let prefix = prefix.to_lowercase();
    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();

    for entry in entries {
        if entry.is_hidden() || entry.is_dir() {
            continue;
        }
        if !extensions.is_empty() {
            let ext = extension_of(entry.name()).to_lowercase();
            if !extensions.iter().any(|allowed| *allowed == ext) {
                continue;
            }
        }

        let bare = strip_timestamp_prefix(entry.name());
        if !bare.trim().to_lowercase().starts_with(&prefix) {
            continue;
        }
        if seen.insert(bare.to_string()) {
            suggestions.push(bare.to_string());
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn file(name: &str) -> DirectoryEntry {
        DirectoryEntry::from_parts(name, 1, None, false)
    }

    #[test]
    fn appends_missing_extension() {
        assert_eq!(reconcile_extension("scan.pdf", "invoice"), "invoice.pdf");
    }

    #[test]
    fn keeps_extension_in_other_case() {
        assert_eq!(reconcile_extension("scan.pdf", "invoice.PDF"), "invoice.PDF");
    }

    #[test]
    fn appended_extension_keeps_source_case() {
        assert_eq!(reconcile_extension("SCAN.PDF", "invoice"), "invoice.PDF");
    }

    #[test]
    fn source_without_extension_leaves_name() {
        assert_eq!(reconcile_extension("README", "notes"), "notes");
    }

    #[test]
    fn extension_of_uses_last_dot() {
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("noext"), "");
    }

    #[test]
    fn validate_name_rejects_paths_and_dots() {
        for bad in ["", "   ", ".", "..", "a/b", "a\\b", "nul\0byte"] {
            assert!(
                matches!(validate_name(bad), Err(CoreError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_name("invoice 2024.pdf").is_ok());
    }

    #[test]
    fn timestamp_prefix_format() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_milli_opt(14, 5, 9, 42)
            .unwrap();
        assert_eq!(timestamp_prefix(at), "20240131-140509.042_");
    }

    #[test]
    fn current_prefix_is_recognised() {
        let name = format!("{}invoice.pdf", timestamp_prefix_now());
        assert!(has_timestamp_prefix(&name));
        assert_eq!(strip_timestamp_prefix(&name), "invoice.pdf");
    }

    #[test]
    fn strip_leaves_plain_names_alone() {
        assert_eq!(strip_timestamp_prefix("invoice.pdf"), "invoice.pdf");
        assert_eq!(strip_timestamp_prefix("2024-01-31_invoice.pdf"), "2024-01-31_invoice.pdf");
        assert!(!has_timestamp_prefix("invoice.pdf"));
    }

    #[test]
    fn suggestions_filter_and_dedupe() {
        let entries = vec![
            file("20240101-101010.000_Insurance.pdf"),
            file("20240202-101010.000_Insurance.pdf"),
            file("insurance-notes.txt"),
            file(".Insurance-hidden.pdf"),
            DirectoryEntry::from_parts("Insurance-old", 0, None, true),
            file("Invoice.pdf"),
            file("tax.pdf"),
        ];

        let got = suggest_names(&entries, "IN", &[".pdf"]);

        assert_eq!(got, vec!["Insurance.pdf", "Invoice.pdf"]);
    }

    #[test]
    fn suggestions_without_extension_filter() {
        let entries = vec![file("notes.txt"), file("notes.pdf")];

        let got = suggest_names(&entries, "no", &[]);

        assert_eq!(got, vec!["notes.txt", "notes.pdf"]);
    }
}
