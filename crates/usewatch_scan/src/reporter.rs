use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::types::{Diagnostic, DiagnosticKind, FailedPackage, ScanRecord, ScanResult};

pub const CSV_HEADER: &str = "crate, pattern of interest, directory, file, use line";

const FIELD_DELIMITER: char = ',';

/// Strip the field delimiter from `value`, reporting whether anything was lost.
fn sanitize(package: &str, field: &'static str, value: &str) -> (String, Option<Diagnostic>) {
    if !value.contains(FIELD_DELIMITER) {
        return (value.to_string(), None);
    }
    let loss = Diagnostic::SanitizationLoss {
        package: package.to_string(),
        field,
        value: value.to_string(),
    };
    (value.replace(FIELD_DELIMITER, ""), Some(loss))
}

/// Render a record as one results row. Commas inside fields are dropped.
pub fn csv_row(record: &ScanRecord) -> (String, Vec<Diagnostic>) {
    let fields = [
        ("crate", record.package.clone()),
        ("pattern", record.pattern.clone()),
        ("directory", record.source_root()),
        ("file", record.file_name()),
        ("statement", record.statement.clone()),
    ];

    let mut losses = Vec::new();
    let mut cells = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        let (cell, loss) = sanitize(&record.package, name, &value);
        losses.extend(loss);
        cells.push(cell);
    }
    (cells.join(", "), losses)
}

/// Write the header and one row per record. Returns the sanitization losses.
pub fn write_records<W: Write>(
    writer: &mut W,
    records: &[ScanRecord],
) -> io::Result<Vec<Diagnostic>> {
    debug!("Writing {} result rows", records.len());
    writeln!(writer, "{}", CSV_HEADER)?;

    let mut losses = Vec::new();
    for record in records {
        let (row, row_losses) = csv_row(record);
        for loss in &row_losses {
            warn!("{}", loss);
        }
        losses.extend(row_losses);
        writeln!(writer, "{}", row)?;
    }
    writer.flush()?;
    Ok(losses)
}

/// Counts sorted by value, largest first; ties in name order.
fn sorted_counts(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut sorted: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
}

pub fn write_summary<W: Write>(writer: &mut W, result: &ScanResult) -> io::Result<()> {
    writeln!(writer, "===== Patterns =====")?;
    writeln!(writer, "Total instances of each import pattern:")?;
    for (pattern, n) in sorted_counts(&result.pattern_counts) {
        writeln!(writer, "{}: {}", pattern, n)?;
    }

    writeln!(writer, "===== Crate Summary =====")?;
    writeln!(writer, "Number of dangerous imports by crate:")?;
    let mut nonzero = 0;
    let mut zero = 0;
    for (package, n) in sorted_counts(&result.package_counts) {
        if n > 0 {
            nonzero += 1;
            writeln!(writer, "{}: {}", package, n)?;
        } else {
            zero += 1;
        }
    }

    writeln!(writer, "===== Crate Totals =====")?;
    writeln!(writer, "{} crates with 1 or more dangerous imports", nonzero)?;
    writeln!(writer, "{} crates with 0 dangerous imports", zero)?;
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub total_matches: usize,
    pub files_scanned: usize,
    pub packages: &'a BTreeMap<String, usize>,
    pub patterns: &'a BTreeMap<String, usize>,
    pub failed_packages: &'a [FailedPackage],
    pub diagnostics: BTreeMap<DiagnosticKind, usize>,
}

impl<'a> Summary<'a> {
    pub fn new(result: &'a ScanResult) -> Self {
        Self {
            total_matches: result.records.len(),
            files_scanned: result.files_scanned,
            packages: &result.package_counts,
            patterns: &result.pattern_counts,
            failed_packages: &result.failed_packages,
            diagnostics: result.diagnostic_counts(),
        }
    }
}

pub fn write_json_summary<W: Write>(writer: &mut W, result: &ScanResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &Summary::new(result))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `<prefix>_all.csv`, `<prefix>_summary.txt` and optionally
/// `<prefix>_summary.json` into `output_dir`. Returns the written paths.
///
/// Fields stripped while writing the rows are added to `result.diagnostics`
/// before the summaries are written.
pub fn save_reports(
    result: &mut ScanResult,
    output_dir: &Path,
    prefix: &str,
    json: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let mut written = Vec::new();

    let all_path = output_dir.join(format!("{}_all.csv", prefix));
    info!("Saving raw results to {}", all_path.display());
    let mut out = BufWriter::new(create(&all_path)?);
    let losses = write_records(&mut out, &result.records)
        .with_context(|| format!("Failed to write {}", all_path.display()))?;
    if !losses.is_empty() {
        warn!("Stripped commas from {} fields", losses.len());
    }
    result.diagnostics.extend(losses);
    written.push(all_path);

    let summary_path = output_dir.join(format!("{}_summary.txt", prefix));
    info!("Saving summary to {}", summary_path.display());
    let mut out = BufWriter::new(create(&summary_path)?);
    write_summary(&mut out, result)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    written.push(summary_path);

    if json {
        let json_path = output_dir.join(format!("{}_summary.json", prefix));
        info!("Saving JSON summary to {}", json_path.display());
        let mut out = BufWriter::new(create(&json_path)?);
        write_json_summary(&mut out, result)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        written.push(json_path);
    }

    Ok(written)
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

/// Print a short colored overview of a scan.
pub fn print_summary<W: Write>(writer: &mut W, result: &ScanResult) -> io::Result<()> {
    let total = result.records.len();
    if total == 0 {
        writeln!(writer, "{} No watched imports found", "✓".green().bold())?;
    } else {
        writeln!(
            writer,
            "{} Found {} watched imports\n",
            "⚠".yellow().bold(),
            total.to_string().yellow().bold()
        )?;
    }

    writeln!(writer, "{}", "Patterns".bold())?;
    for (pattern, n) in sorted_counts(&result.pattern_counts) {
        let count = if n > 0 { n.to_string().red() } else { n.to_string().dimmed() };
        writeln!(writer, "  {} {}", pattern.blue(), count)?;
    }

    let affected: Vec<_> =
        sorted_counts(&result.package_counts).into_iter().filter(|(_, n)| *n > 0).collect();
    let clean = result.package_counts.len() - affected.len();

    writeln!(writer, "\n{}", "Packages".bold())?;
    for (package, n) in affected.iter().take(10) {
        writeln!(writer, "  {} {}", package.bright_white(), n.to_string().red())?;
    }
    if affected.len() > 10 {
        writeln!(writer, "  {}", format!("... and {} more", affected.len() - 10).dimmed())?;
    }
    writeln!(
        writer,
        "  {} with watched imports, {} without",
        affected.len().to_string().yellow(),
        clean.to_string().green()
    )?;

    for failed in &result.failed_packages {
        writeln!(writer, "  {} {}: {}", "✗".red(), failed.package, failed.error.dimmed())?;
    }

    if !result.diagnostics.is_empty() {
        writeln!(writer, "{}", "─".repeat(60).dimmed())?;
        writeln!(writer, "{}", "Diagnostics".bold())?;
        for (kind, n) in result.diagnostic_counts() {
            writeln!(writer, "  {:?}: {}", kind, n.to_string().yellow())?;
        }
    }

    writer.flush()?;
    Ok(())
}
