use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::args::ExtractArgs;
use crate::errors::{ExtractorError, Result};
use crate::scope::DEFAULT_SCOPED_NAME;
use crate::selector::Scope;

/// Extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Extra directories searched by `@import`, after the importing file's own directory
    pub load_paths: Vec<PathBuf>,

    /// Pattern for the tokens local names are rewritten to
    pub scoped_name: String,

    /// Scope of names without an explicit `:global` / `:local`
    pub mode: Scope,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            load_paths: Vec::new(),
            scoped_name: DEFAULT_SCOPED_NAME.to_string(),
            mode: Scope::Local,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = read_config(path)?;
        serde_yaml::from_str(&content).map_err(|e| ExtractorError::ConfigError {
            message: format!("Failed to parse YAML config {}: {}", path.display(), e),
        })
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = read_config(path)?;
        serde_json::from_str(&content).map_err(|e| ExtractorError::ConfigError {
            message: format!("Failed to parse JSON config {}: {}", path.display(), e),
        })
    }

    /// Load configuration from a file (auto-detect format)
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path)?,
            Some("json") => Self::from_json_file(path)?,
            _ => {
                return Err(ExtractorError::ConfigError {
                    message: format!(
                        "Unsupported config file format: {}. Use .yaml, .yml, or .json",
                        path.display()
                    ),
                })
            }
        };

        // Load paths in a config file are relative to the file itself
        if let Some(base) = path.parent() {
            for load_path in &mut config.load_paths {
                if load_path.is_relative() {
                    *load_path = base.join(&*load_path);
                }
            }
        }
        Ok(config)
    }

    /// Configuration for one invocation: the config file if one was given,
    /// overridden by command-line flags
    pub fn from_args(args: &ExtractArgs) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let overrides = Self {
            load_paths: args.load_paths.clone(),
            scoped_name: args.scoped_name.clone().unwrap_or_default(),
            mode: base.mode,
        };
        Ok(base.merge(overrides))
    }

    /// Merge with another configuration; `other` wins where it sets a value
    pub fn merge(mut self, other: Self) -> Self {
        for path in other.load_paths {
            if !self.load_paths.contains(&path) {
                self.load_paths.push(path);
            }
        }

        if !other.scoped_name.is_empty() {
            self.scoped_name = other.scoped_name;
        }
        self.mode = other.mode;

        self
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ExtractorError::ConfigError {
        message: format!("Failed to read config file {}: {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert!(config.load_paths.is_empty());
        assert_eq!(config.scoped_name, "_[local]_[hash]");
        assert_eq!(config.mode, Scope::Local);
    }

    #[test]
    fn test_yaml_config_loading() {
        let yaml_content = r##"
load_paths:
  - "styles/shared"
  - "/opt/design-tokens"
scoped_name: "[name]__[local]___[hash:5]"
mode: global
"##;

        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(yaml_content.as_bytes()).unwrap();

        let config = ExtractorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.load_paths.len(), 2);
        assert_eq!(config.load_paths[0], file.path().parent().unwrap().join("styles/shared"));
        assert_eq!(config.load_paths[1], PathBuf::from("/opt/design-tokens"));
        assert_eq!(config.scoped_name, "[name]__[local]___[hash:5]");
        assert_eq!(config.mode, Scope::Global);
    }

    #[test]
    fn test_json_config_loading() {
        let json_content = r##"{ "scoped_name": "m_[hash:8]" }"##;

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(json_content.as_bytes()).unwrap();

        let config = ExtractorConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.scoped_name, "m_[hash:8]");
        assert!(config.load_paths.is_empty());
        assert_eq!(config.mode, Scope::Local);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".toml").unwrap();
        let err = ExtractorConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported config file format"));
    }

    #[test]
    fn test_invalid_yaml() {
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(b"mode: [not, a, scope]").unwrap();
        let err = ExtractorConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ExtractorError::ConfigError { .. }));
    }

    #[test]
    fn test_config_merge() {
        let mut base = ExtractorConfig::default();
        base.load_paths.push(PathBuf::from("a"));

        let other = ExtractorConfig {
            load_paths: vec![PathBuf::from("a"), PathBuf::from("b")],
            scoped_name: String::new(),
            mode: Scope::Global,
        };

        let merged = base.merge(other);
        assert_eq!(merged.load_paths, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(merged.scoped_name, "_[local]_[hash]");
        assert_eq!(merged.mode, Scope::Global);
    }
}
