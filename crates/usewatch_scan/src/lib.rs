//! Watched-import scanning over a corpus of package source trees.
//!
//! Each package lives at `<packages_dir>/<name>/<src_dir>`. Packages are
//! scanned in parallel; every `use` statement in a package's sources is
//! expanded and classified against the watchlist, and the matches are
//! aggregated into per-package and per-pattern counts.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use std::io::{BufWriter, Write};
//! use usewatch_scan::{Config, print_summary, run_scan, save_reports};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::parse_from(["scan", "--package", "serde,syn", "--json"]);
//! let mut result = run_scan(&cfg)?;
//! result.check_totals()?;
//!
//! save_reports(&mut result, &cfg.output_dir, &cfg.results_prefix(), cfg.json)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_summary(&mut stdout, &result)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod collector;
mod config;
mod packages;
mod reporter;
mod scanner;
mod types;

// Re-export public API
pub use config::Config;
pub use packages::read_package_list;
pub use reporter::{
    CSV_HEADER, Summary, csv_row, print_summary, save_reports, write_json_summary, write_records,
    write_summary,
};
pub use scanner::{Scanner, run_scan};
pub use types::{
    Diagnostic, DiagnosticKind, FailedPackage, PackageScan, ScanRecord, ScanResult,
};
