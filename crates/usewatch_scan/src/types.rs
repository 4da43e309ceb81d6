use anyhow::{Result, ensure};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use usewatch_core::{ImportPath, ParseError};

/// One watched import found in a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub package: String,
    /// The watchlist pattern the import matched
    pub pattern: String,
    pub file: PathBuf,
    pub line: usize,
    /// The statement the import came from, flattened onto one line
    pub statement: String,
    pub path: ImportPath,
}

impl ScanRecord {
    /// Directory containing the source file
    pub fn source_root(&self) -> String {
        self.file.parent().unwrap_or(Path::new("")).to_string_lossy().to_string()
    }

    pub fn file_name(&self) -> String {
        self.file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedStatement,
    TruncatedInput,
    AmbiguousMatch,
    SanitizationLoss,
}

/// A recoverable problem met while scanning or reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    MalformedStatement { file: PathBuf, line: usize, statement: String, reason: ParseError },
    TruncatedInput { file: PathBuf, line: usize, statement: String },
    AmbiguousMatch {
        file: PathBuf,
        line: usize,
        statement: String,
        path: ImportPath,
        chosen: String,
        others: Vec<String>,
    },
    SanitizationLoss { package: String, field: &'static str, value: String },
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::MalformedStatement { .. } => DiagnosticKind::MalformedStatement,
            Diagnostic::TruncatedInput { .. } => DiagnosticKind::TruncatedInput,
            Diagnostic::AmbiguousMatch { .. } => DiagnosticKind::AmbiguousMatch,
            Diagnostic::SanitizationLoss { .. } => DiagnosticKind::SanitizationLoss,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedStatement { file, line, statement, reason } => write!(
                f,
                "{}:{}: skipping malformed statement ({}): {}",
                file.display(),
                line,
                reason,
                statement
            ),
            Diagnostic::TruncatedInput { file, line, statement } => write!(
                f,
                "{}:{}: file ended during statement, adding implicit ';': {}",
                file.display(),
                line,
                statement
            ),
            Diagnostic::AmbiguousMatch { file, line, statement, path, chosen, others } => write!(
                f,
                "{}:{}: '{}' matched multiple patterns, keeping '{}' over [{}]: {}",
                file.display(),
                line,
                path,
                chosen,
                others.join(", "),
                statement
            ),
            Diagnostic::SanitizationLoss { package, field, value } => {
                write!(f, "{}: stripped ',' from {} field: {}", package, field, value)
            }
        }
    }
}

/// Everything found in one package.
#[derive(Debug, Clone, Default)]
pub struct PackageScan {
    pub package: String,
    pub records: Vec<ScanRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
}

impl PackageScan {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPackage {
    pub package: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Records in package-list order, then file order, then statement order
    pub records: Vec<ScanRecord>,
    /// Matches per package; every requested package is present
    pub package_counts: BTreeMap<String, usize>,
    /// Matches per watchlist pattern; every pattern is present
    pub pattern_counts: BTreeMap<String, usize>,
    pub diagnostics: Vec<Diagnostic>,
    pub failed_packages: Vec<FailedPackage>,
    pub files_scanned: usize,
}

impl ScanResult {
    /// Both count mappings must add up to the number of records.
    pub fn check_totals(&self) -> Result<()> {
        let by_package: usize = self.package_counts.values().sum();
        let by_pattern: usize = self.pattern_counts.values().sum();
        ensure!(
            by_package == by_pattern && by_pattern == self.records.len(),
            "Count mismatch: {} by package, {} by pattern, {} records",
            by_package,
            by_pattern,
            self.records.len()
        );
        Ok(())
    }

    pub fn diagnostic_counts(&self) -> BTreeMap<DiagnosticKind, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.diagnostics {
            *counts.entry(d.kind()).or_insert(0) += 1;
        }
        counts
    }
}
