//! Configuration discovery and loading.

use crate::source::SourceConfig;
use crate::{ConfigError, ParseError};
use std::path::{Path, PathBuf};

/// File extensions recognised as source configuration files.
pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Find the configuration files under `path`.
///
/// A path naming a file yields just that file. A directory yields its
/// immediate `*.yaml` / `*.yml` children, sorted by name. Subdirectories
/// are not searched.
pub fn discover_sources(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut results = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let entry_path = entry.map_err(io_err)?.path();
        if entry_path.is_file() && has_config_extension(&entry_path) {
            results.push(entry_path);
        }
    }

    // Sort for consistent ordering
    results.sort();
    Ok(results)
}

fn has_config_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext))
}

/// Read, parse and validate one source configuration file.
pub fn load_source(path: &Path) -> Result<SourceConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    SourceConfig::from_yaml(&content).map_err(|source: ParseError| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SOURCE: &str = r#"
name: app
file: /tmp/app.log
frequency: 1s
amount: 1
format: "{n}"
fields:
  n:
    type: integer
    min: 1
    max: 1
"#;

    #[test]
    fn test_discover_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let result = discover_sources(&missing);
        assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == missing));
    }

    #[test]
    fn test_discover_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("anything.conf");
        fs::write(&file, SOURCE).unwrap();

        assert_eq!(discover_sources(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_discover_directory_filters_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.yaml"), SOURCE).unwrap();
        fs::write(dir.path().join("a.yml"), SOURCE).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let found = discover_sources(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a.yml"), dir.path().join("b.yaml")]
        );
    }

    #[test]
    fn test_load_source() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.yaml");
        fs::write(&file, SOURCE).unwrap();

        let source = load_source(&file).unwrap();
        assert_eq!(source.name, "app");
        assert_eq!(source.amount, 1);
    }

    #[test]
    fn test_load_invalid_source_names_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.yaml");
        fs::write(&file, "name: [unclosed").unwrap();

        let err = load_source(&file).unwrap_err();
        assert!(matches!(&err, ConfigError::Parse { path, .. } if *path == file));
        assert!(err.to_string().contains("broken.yaml"));
    }
}
