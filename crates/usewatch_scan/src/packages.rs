use anyhow::{Context, Result, bail};
use log::{debug, trace};
use std::{fs, path::Path};

/// Read the first `top` package names from a ranked package list.
///
/// The file is comma separated with a header row; the package name is the
/// first column of every following row.
pub fn read_package_list(path: &Path, top: usize) -> Result<Vec<String>> {
    debug!("Reading package list from {}", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read package list {}", path.display()))?;
    parse_package_list(&text, top)
        .with_context(|| format!("Invalid package list {}", path.display()))
}

pub(crate) fn parse_package_list(text: &str, top: usize) -> Result<Vec<String>> {
    let mut packages = Vec::with_capacity(top);

    for row in text.lines().skip(1) {
        if packages.len() == top {
            break;
        }
        let name = row.split(',').next().unwrap_or_default().trim().trim_matches('"');
        if name.is_empty() {
            continue;
        }
        trace!("Top package: {}", row);
        packages.push(name.to_string());
    }

    if packages.len() < top {
        bail!("Not enough packages. Asked for {}, found {}", top, packages.len());
    }
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LIST: &str = "name,downloads\nsyn,1000\n\"rand\",900\n\nlibc,800\n";

    #[test]
    fn test_parse_takes_top_rows() {
        assert_eq!(parse_package_list(LIST, 2).unwrap(), vec!["syn", "rand"]);
    }

    #[test]
    fn test_parse_skips_blank_rows() {
        assert_eq!(parse_package_list(LIST, 3).unwrap(), vec!["syn", "rand", "libc"]);
    }

    #[test]
    fn test_parse_not_enough_rows() {
        let err = parse_package_list(LIST, 4).unwrap_err();
        assert!(err.to_string().contains("Asked for 4, found 3"));
    }

    #[test]
    fn test_parse_header_only() {
        assert!(parse_package_list("name,downloads\n", 0).unwrap().is_empty());
        assert!(parse_package_list("name,downloads\n", 1).is_err());
    }

    #[test]
    fn test_read_package_list_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("crates.csv");
        std::fs::write(&path, LIST).unwrap();
        assert_eq!(read_package_list(&path, 1).unwrap(), vec!["syn"]);
    }

    #[test]
    fn test_read_package_list_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_package_list(&temp_dir.path().join("missing.csv"), 1).unwrap_err();
        assert!(err.to_string().contains("Failed to read package list"));
    }
}
