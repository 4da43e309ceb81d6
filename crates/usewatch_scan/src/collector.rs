use anyhow::{Result, anyhow};
use ignore::WalkBuilder;
use log::{debug, trace};
use path_clean::clean;
use std::path::{Path, PathBuf};

/// Directory of `package` that gets walked for source files.
pub(crate) fn source_root(packages_dir: &Path, package: &str, src_dir: &Path) -> PathBuf {
    clean(packages_dir.join(package).join(src_dir))
}

/// Collect the source files under `root` in a stable, name-sorted order.
pub(crate) fn collect_sources(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    debug!("Collecting source files under {}", root.display());
    if !root.is_dir() {
        return Err(anyhow!("Source directory not found: {}", root.display()));
    }

    // Package sources are third-party; scan everything regardless of ignore files
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }

        if let Some(ext) = p.extension().and_then(|e| e.to_str())
            && extensions.iter().any(|x| x == ext)
        {
            trace!("Found source file: {}", p.display());
            files.push(p.to_path_buf());
        } else {
            trace!("Skipping non-source file: {}", p.display());
        }
    }

    debug!("Collected {} source files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn rs() -> Vec<String> {
        vec!["rs".to_string()]
    }

    #[test]
    fn test_collect_sources_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "main.rs", "");
        create_test_file(root, "b/mod.rs", "");
        create_test_file(root, "a.rs", "");
        create_test_file(root, "b/a.rs", "");

        let files = collect_sources(root, &rs()).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a.rs", "b/a.rs", "b/mod.rs", "main.rs"]);
    }

    #[test]
    fn test_collect_sources_filters_extension() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "lib.rs", "");
        create_test_file(root, "build.sh", "");
        create_test_file(root, "README", "");
        create_test_file(root, "templates/x.rs.in", "");

        let files = collect_sources(root, &rs()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("lib.rs"));
    }

    #[test]
    fn test_collect_sources_ignores_gitignore() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, ".gitignore", "generated/\n");
        create_test_file(root, "generated/out.rs", "");
        create_test_file(root, ".hidden/inner.rs", "");

        let files = collect_sources(root, &rs()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_sources_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let result = collect_sources(&temp_dir.path().join("nope"), &rs());
        assert!(result.is_err());
    }

    #[test]
    fn test_source_root_is_cleaned() {
        let root = source_root(Path::new("packages/./"), "serde", Path::new("src"));
        assert_eq!(root, PathBuf::from("packages/serde/src"));
    }
}
