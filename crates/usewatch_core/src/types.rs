use std::{fmt, path::Path};

use crate::{constants::PATH_SEPARATOR, error::ParseError};

/// One import statement as it appeared in a source file, possibly spanning
/// several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement<'a> {
    pub file: &'a Path,
    /// 1-based line the statement starts on
    pub line: usize,
    /// Accumulated text, physical lines joined with '\n'
    pub text: String,
    /// Set when the file ended before a terminator and one was synthesized
    pub truncated: bool,
}

/// Result of expanding one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The statement flattened onto one line with comments removed
    pub statement: String,
    /// Fully expanded paths, in order of appearance
    pub paths: Vec<ImportPath>,
}

/// A fully-qualified, brace-free import path such as `std::fs::File`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportPath {
    segments: Vec<String>,
}

impl ImportPath {
    /// Build a path from brace-free text.
    ///
    /// A leading `::` is dropped, a trailing `as` rename is removed and a
    /// trailing `self` collapses onto its parent module.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_prefix(PATH_SEPARATOR).unwrap_or(trimmed);

        let mut segments: Vec<String> =
            trimmed.split(PATH_SEPARATOR).map(|s| s.trim().to_string()).collect();

        if let Some(last) = segments.last_mut()
            && let Some((name, _alias)) = last.split_once(" as ")
        {
            *last = name.trim_end().to_string();
        }

        if segments.iter().any(|s| s.is_empty()) {
            return Err(ParseError::EmptySegment(text.trim().to_string()));
        }

        if segments.len() > 1 && segments.last().is_some_and(|s| s == "self") {
            segments.pop();
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when `prefix` matches this path's leading segments.
    pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        prefix.len() <= self.segments.len()
            && prefix.iter().zip(&self.segments).all(|(p, s)| p.as_ref() == s)
    }
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(PATH_SEPARATOR))
    }
}

/// A watched module prefix, e.g. `std::fs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    pattern: String,
    segments: Vec<String>,
}

impl WatchEntry {
    pub fn new(pattern: &str) -> Self {
        let pattern = pattern.trim().to_string();
        let segments = pattern.split(PATH_SEPARATOR).map(|s| s.trim().to_string()).collect();
        Self { pattern, segments }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, path: &ImportPath) -> bool {
        path.starts_with(&self.segments)
    }
}

impl fmt::Display for WatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> ImportPath {
        ImportPath::parse(text).unwrap()
    }

    #[test]
    fn test_parse_splits_on_separator() {
        assert_eq!(path("std::fs::File").segments(), ["std", "fs", "File"]);
    }

    #[test]
    fn test_parse_single_segment() {
        assert_eq!(path("serde").segments(), ["serde"]);
    }

    #[test]
    fn test_parse_drops_leading_separator() {
        assert_eq!(path("::std::env").segments(), ["std", "env"]);
    }

    #[test]
    fn test_parse_removes_alias() {
        assert_eq!(path("std::fs::File as F").segments(), ["std", "fs", "File"]);
    }

    #[test]
    fn test_parse_collapses_trailing_self() {
        assert_eq!(path("std::fs::self").segments(), ["std", "fs"]);
        assert_eq!(path("std::fs::self as filesystem").segments(), ["std", "fs"]);
        // A bare `self` has no parent to collapse onto
        assert_eq!(path("self").segments(), ["self"]);
    }

    #[test]
    fn test_parse_keeps_glob() {
        assert_eq!(path("std::os::unix::*").segments(), ["std", "os", "unix", "*"]);
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert_eq!(
            ImportPath::parse("std::::fs"),
            Err(ParseError::EmptySegment("std::::fs".to_string()))
        );
        assert!(ImportPath::parse("std::").is_err());
        assert!(ImportPath::parse("").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        assert_eq!(path("std :: net :: TcpStream").to_string(), "std::net::TcpStream");
    }

    #[test]
    fn test_equality_is_structural() {
        assert_eq!(path("std::fs"), path("::std::fs::self"));
        assert_ne!(path("std::fs"), path("std::fsx"));
    }

    #[test]
    fn test_starts_with_whole_segments_only() {
        let p = path("std::fsx::Thing");
        assert!(p.starts_with(&["std"]));
        assert!(!p.starts_with(&["std", "fs"]));
        assert!(!p.starts_with(&["std", "fsx", "Thing", "More"]));
    }

    #[test]
    fn test_watch_entry_matches_prefix() {
        let entry = WatchEntry::new(" std::fs ");
        assert_eq!(entry.pattern(), "std::fs");
        assert!(entry.matches(&path("std::fs")));
        assert!(entry.matches(&path("std::fs::read_to_string")));
        assert!(!entry.matches(&path("std::ffi::OsStr")));
        assert!(!entry.matches(&path("my_std::fs")));
    }
}
