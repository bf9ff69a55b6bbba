use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::relocator::error::{Result, ToolError};

/// Separates the id from the label in directory names.
pub const NAME_DELIMITER: char = '-';

/// A source directory whose name follows the `<id>-<label>` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Directory name, unchanged.
    pub name: String,
    /// Full path of the directory under the source.
    pub path: PathBuf,
    /// Trimmed text before the first delimiter.
    pub id: String,
    /// Trimmed text after the first delimiter. May contain further delimiters.
    pub label: String,
}

/// Why a directory name was excluded from matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatIssue {
    MissingDelimiter,
    EmptyPart,
    NotUnicode,
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatIssue::MissingDelimiter => write!(f, "does not contain '{NAME_DELIMITER}'"),
            FormatIssue::EmptyPart => write!(f, "expected 'ID-Name' with both parts non-empty"),
            FormatIssue::NotUnicode => write!(f, "name is not valid UTF-8"),
        }
    }
}

/// Classification of one top-level directory of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedEntry {
    Valid(DirectoryEntry),
    Malformed { name: String, issue: FormatIssue },
}

impl ScannedEntry {
    pub fn name(&self) -> &str {
        match self {
            ScannedEntry::Valid(entry) => &entry.name,
            ScannedEntry::Malformed { name, .. } => name,
        }
    }
}

/// Splits a directory name on the first delimiter into a trimmed `(id, label)` pair.
pub fn parse_entry_name(name: &str) -> std::result::Result<(String, String), FormatIssue> {
    let (id, label) = name
        .split_once(NAME_DELIMITER)
        .ok_or(FormatIssue::MissingDelimiter)?;
    let (id, label) = (id.trim(), label.trim());
    if id.is_empty() || label.is_empty() {
        return Err(FormatIssue::EmptyPart);
    }
    Ok((id.to_string(), label.to_string()))
}

/// Lists the directories directly under `source`, sorted by name. Files are
/// ignored.
#[instrument(level = "info", skip_all, fields(source = %source.display()))]
pub fn scan_source(source: &Path) -> Result<Vec<ScannedEntry>> {
    if !source.is_dir() {
        return Err(ToolError::SourceNotFound(source.to_path_buf()));
    }

    let mut directories = Vec::new();
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        directories.push((entry.file_name(), path));
    }
    directories.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
    debug!(directory_count = directories.len(), "listed source directory");

    Ok(directories
        .into_iter()
        .map(|(file_name, path)| match file_name.into_string() {
            Ok(name) => match parse_entry_name(&name) {
                Ok((id, label)) => ScannedEntry::Valid(DirectoryEntry {
                    name,
                    path,
                    id,
                    label,
                }),
                Err(issue) => ScannedEntry::Malformed { name, issue },
            },
            Err(raw) => ScannedEntry::Malformed {
                name: raw.to_string_lossy().into_owned(),
                issue: FormatIssue::NotUnicode,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_delimiter_only() {
        assert_eq!(
            parse_entry_name("A-B-C"),
            Ok(("A".to_string(), "B-C".to_string()))
        );
    }

    #[test]
    fn parts_are_trimmed() {
        assert_eq!(
            parse_entry_name(" 42 - john "),
            Ok(("42".to_string(), "john".to_string()))
        );
    }

    #[test]
    fn names_without_delimiter_are_malformed() {
        assert_eq!(parse_entry_name("UA01Zhang"), Err(FormatIssue::MissingDelimiter));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_names_are_malformed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = tempfile::tempdir().expect("temporary directory");
        let raw = OsStr::from_bytes(b"UA01-Zh\xff");
        fs::create_dir(temp_dir.path().join(raw)).expect("non-UTF-8 directory");
        fs::create_dir(temp_dir.path().join("UA02-Wang")).expect("directory");

        let scanned = scan_source(temp_dir.path()).expect("source scanned");

        assert_eq!(scanned.len(), 2);
        assert!(matches!(
            &scanned[0],
            ScannedEntry::Malformed {
                issue: FormatIssue::NotUnicode,
                ..
            }
        ));
        assert!(matches!(&scanned[1], ScannedEntry::Valid(entry) if entry.id == "UA02"));
    }

    #[test]
    fn missing_source_is_reported() {
        let temp_dir = tempfile::tempdir().expect("temporary directory");
        let missing = temp_dir.path().join("absent");
        assert!(matches!(scan_source(&missing), Err(ToolError::SourceNotFound(path)) if path == missing));
    }

    #[test]
    fn empty_parts_are_malformed() {
        assert_eq!(parse_entry_name("-john"), Err(FormatIssue::EmptyPart));
        assert_eq!(parse_entry_name("42- "), Err(FormatIssue::EmptyPart));
    }
}
