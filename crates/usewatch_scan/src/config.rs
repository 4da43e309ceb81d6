use anyhow::{Result, bail};
use clap::Parser;
use log::debug;
use std::path::PathBuf;

use usewatch_core::{SOURCE_EXTENSIONS, Watchlist};

use crate::packages::read_package_list;

#[derive(Debug, Clone, Parser)]
#[command(name = "scan")]
#[command(about = "Scan package sources for imports of watched modules")]
pub struct Config {
    /// Directory holding one extracted source tree per package
    #[arg(long, default_value = "experiments/packages")]
    pub packages_dir: PathBuf,

    /// Package to scan (repeatable or comma separated)
    #[arg(long = "package", value_delimiter = ',')]
    pub packages: Vec<String>,

    /// Ranked package list (CSV with a header row, name in the first column)
    #[arg(long, conflicts_with = "packages")]
    pub package_list: Option<PathBuf>,

    /// Number of packages to take from the package list
    #[arg(long, default_value = "200")]
    pub top: usize,

    /// Subdirectory of each package to walk
    #[arg(long, default_value = "src")]
    pub src_dir: PathBuf,

    /// Watched module prefix, in match order (defaults to the std I/O modules)
    #[arg(long = "watch", value_delimiter = ',')]
    pub watch: Vec<String>,

    /// Source file extension to scan (defaults to rs)
    #[arg(long = "extension", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Directory the reports are written to
    #[arg(long, default_value = "experiments/results")]
    pub output_dir: PathBuf,

    /// File name prefix for the reports
    #[arg(long)]
    pub prefix: Option<String>,

    /// Also write a JSON summary
    #[arg(long)]
    pub json: bool,

    /// Worker threads (0 uses all cores)
    #[arg(long, default_value = "0")]
    pub jobs: usize,
}

impl Config {
    /// Resolve the packages to scan, from the command line or the package list
    pub fn packages(&self) -> Result<Vec<String>> {
        let packages = match &self.package_list {
            Some(list) => read_package_list(list, self.top)?,
            None => self.packages.clone(),
        };
        if packages.is_empty() {
            bail!("No packages to scan; pass --package or --package-list");
        }
        debug!("Resolved {} packages", packages.len());
        Ok(packages)
    }

    pub fn watchlist(&self) -> Watchlist {
        if self.watch.is_empty() { Watchlist::default() } else { Watchlist::new(&self.watch) }
    }

    pub fn extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            SOURCE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.extensions.iter().map(|e| e.trim_start_matches('.').to_string()).collect()
        }
    }

    pub fn results_prefix(&self) -> String {
        match (&self.prefix, &self.package_list) {
            (Some(prefix), _) => prefix.clone(),
            (None, Some(_)) => format!("top{}", self.top),
            (None, None) => "scan".to_string(),
        }
    }
}
