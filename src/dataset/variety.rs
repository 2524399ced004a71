use std::fs;
use std::path::Path;

use crate::error::{Result, RiceError};

/// Lists the sub-directories of `root`, sorted by name, as variety labels.
///
/// Sorting fixes the label order independently of the filesystem's
/// directory iteration order.
pub fn discover_varieties(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    if names.is_empty() {
        return Err(RiceError::Config(format!(
            "no variety directories found under '{}'",
            root.display()
        )));
    }
    Ok(names)
}

/// Uses `configured` when given, otherwise discovers varieties under `root`.
pub fn resolve_varieties(root: &Path, configured: Option<&[String]>) -> Result<Vec<String>> {
    match configured {
        Some([]) => Err(RiceError::Config("variety list is empty".into())),
        Some(list) => Ok(list.to_vec()),
        None => discover_varieties(root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discovery_sorts_directories_and_ignores_files() {
        let dir = TempDir::new().unwrap();
        for name in ["Jasmine", "Arborio", "Ipsala"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("README.txt"), b"not a variety").unwrap();

        let names = discover_varieties(dir.path()).unwrap();
        assert_eq!(names, vec!["Arborio", "Ipsala", "Jasmine"]);
    }

    #[test]
    fn configured_list_wins_over_discovery() {
        let list = vec!["B".to_string(), "A".to_string()];
        let names = resolve_varieties(Path::new("/does/not/exist"), Some(list.as_slice())).unwrap();
        assert_eq!(names, list);
        let empty: Vec<String> = Vec::new();
        assert!(resolve_varieties(Path::new("/does/not/exist"), Some(empty.as_slice())).is_err());
    }

    #[test]
    fn empty_or_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover_varieties(dir.path()).is_err());
        assert!(discover_varieties(&dir.path().join("missing")).is_err());
    }
}
