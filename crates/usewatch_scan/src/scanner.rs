use anyhow::{Context, Result};
use dashmap::DashMap;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use usewatch_core::{Watchlist, expand_statement, statements};

use crate::{
    collector::{collect_sources, source_root},
    config::Config,
    types::{Diagnostic, FailedPackage, PackageScan, ScanRecord, ScanResult},
};

/// Drives statement reassembly, expansion and classification over packages.
pub struct Scanner {
    watchlist: Watchlist,
    extensions: Vec<String>,
}

impl Scanner {
    pub fn new(watchlist: Watchlist, extensions: Vec<String>) -> Self {
        Self { watchlist, extensions }
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Scan the text of one file, appending findings to `scan`.
    pub fn scan_source(&self, file: &Path, source: &str, scan: &mut PackageScan) {
        trace!("Scanning file: {}", file.display());

        for stmt in statements(file, source) {
            if stmt.truncated {
                report(
                    scan,
                    Diagnostic::TruncatedInput {
                        file: file.to_path_buf(),
                        line: stmt.line,
                        statement: stmt.text.clone(),
                    },
                );
            }

            let expansion = match expand_statement(&stmt.text) {
                Ok(expansion) => expansion,
                Err(reason) => {
                    report(
                        scan,
                        Diagnostic::MalformedStatement {
                            file: file.to_path_buf(),
                            line: stmt.line,
                            statement: stmt.text,
                            reason,
                        },
                    );
                    continue;
                }
            };

            for path in expansion.paths {
                let Some(hit) = self.watchlist.classify(&path) else {
                    trace!("Skipping: {}", path);
                    continue;
                };
                debug!("Of interest: {} ({}:{})", path, file.display(), stmt.line);

                let pattern = hit.entry.pattern().to_string();
                if hit.is_ambiguous() {
                    let others = hit.also_matched.iter().map(|e| e.pattern().to_string()).collect();
                    report(
                        scan,
                        Diagnostic::AmbiguousMatch {
                            file: file.to_path_buf(),
                            line: stmt.line,
                            statement: expansion.statement.clone(),
                            path: path.clone(),
                            chosen: pattern.clone(),
                            others,
                        },
                    );
                }

                scan.records.push(ScanRecord {
                    package: scan.package.clone(),
                    pattern,
                    file: file.to_path_buf(),
                    line: stmt.line,
                    statement: expansion.statement.clone(),
                    path,
                });
            }
        }

        scan.files_scanned += 1;
    }

    /// Scan already-loaded `(path, text)` pairs of one package, in the given order.
    pub fn scan_files<I>(&self, package: &str, files: I) -> PackageScan
    where
        I: IntoIterator<Item = (PathBuf, String)>,
    {
        let mut scan = PackageScan::new(package);
        for (file, source) in files {
            self.scan_source(&file, &source, &mut scan);
        }
        scan
    }

    /// Walk and scan the source tree at `root`.
    ///
    /// Fails only when the tree itself is missing or unreadable.
    pub fn scan_tree(&self, package: &str, root: &Path) -> Result<PackageScan> {
        debug!("Scanning package {} at {}", package, root.display());
        let files = collect_sources(root, &self.extensions)
            .with_context(|| format!("Failed to collect sources of {}", package))?;

        let mut scan = PackageScan::new(package);
        for file in files {
            let bytes =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            self.scan_source(&file, &String::from_utf8_lossy(&bytes), &mut scan);
        }

        debug!(
            "Package {}: {} matches in {} files",
            package,
            scan.records.len(),
            scan.files_scanned
        );
        Ok(scan)
    }

    /// Scan every package under `packages_dir` in parallel.
    ///
    /// Results keep the order of `packages`; a package that cannot be read is
    /// listed in `failed_packages` and keeps a count of zero.
    pub fn scan_all(&self, packages: &[String], packages_dir: &Path, src_dir: &Path) -> ScanResult {
        info!("Scanning {} packages", packages.len());

        let tally = Tally::new(packages, &self.watchlist);
        let done = AtomicUsize::new(0);
        let step = (packages.len() / 10).max(1);

        let outcomes: Vec<(String, Result<PackageScan>)> = packages
            .par_iter()
            .map(|package| {
                trace!("Thread {:?} scanning: {}", thread::current().id(), package);
                let root = source_root(packages_dir, package, src_dir);
                let outcome = self.scan_tree(package, &root);
                if let Ok(scan) = &outcome {
                    tally.add(scan);
                }

                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if finished % step == 0 || finished == packages.len() {
                    info!("{}% complete", 100 * finished / packages.len());
                }
                (package.clone(), outcome)
            })
            .collect();

        let (package_counts, pattern_counts) = tally.snapshot();
        let mut result = ScanResult { package_counts, pattern_counts, ..Default::default() };

        for (package, outcome) in outcomes {
            match outcome {
                Ok(scan) => {
                    result.files_scanned += scan.files_scanned;
                    result.records.extend(scan.records);
                    result.diagnostics.extend(scan.diagnostics);
                }
                Err(e) => {
                    warn!("Skipping package {}: {:#}", package, e);
                    result
                        .failed_packages
                        .push(FailedPackage { package, error: format!("{:#}", e) });
                }
            }
        }

        info!(
            "Scan complete. Found {} matches in {} files ({} diagnostics, {} failed packages)",
            result.records.len(),
            result.files_scanned,
            result.diagnostics.len(),
            result.failed_packages.len()
        );
        result
    }
}

/// Log a diagnostic and keep it with the package's findings.
fn report(scan: &mut PackageScan, diagnostic: Diagnostic) {
    warn!("{}", diagnostic);
    scan.diagnostics.push(diagnostic);
}

/// Match counters shared by the scanning workers.
struct Tally {
    packages: DashMap<String, usize>,
    patterns: DashMap<String, usize>,
}

impl Tally {
    fn new(packages: &[String], watchlist: &Watchlist) -> Self {
        let tally = Self { packages: DashMap::new(), patterns: DashMap::new() };
        for package in packages {
            tally.packages.insert(package.clone(), 0);
        }
        for entry in watchlist.entries() {
            tally.patterns.insert(entry.pattern().to_string(), 0);
        }
        tally
    }

    fn add(&self, scan: &PackageScan) {
        *self.packages.entry(scan.package.clone()).or_insert(0) += scan.records.len();
        for record in &scan.records {
            *self.patterns.entry(record.pattern.clone()).or_insert(0) += 1;
        }
    }

    fn snapshot(self) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
        (self.packages.into_iter().collect(), self.patterns.into_iter().collect())
    }
}

/// Run a full scan as described by `cfg`.
pub fn run_scan(cfg: &Config) -> Result<ScanResult> {
    info!("Starting import scan");

    let packages = cfg.packages()?;
    let scanner = Scanner::new(cfg.watchlist(), cfg.extensions());
    info!(
        "Watching {} patterns in {} packages under {}",
        scanner.watchlist().len(),
        packages.len(),
        cfg.packages_dir.display()
    );

    let result = if cfg.jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.jobs)
            .build()
            .context("Failed to build thread pool")?;
        pool.install(|| scanner.scan_all(&packages, &cfg.packages_dir, &cfg.src_dir))
    } else {
        scanner.scan_all(&packages, &cfg.packages_dir, &cfg.src_dir)
    };

    Ok(result)
}
