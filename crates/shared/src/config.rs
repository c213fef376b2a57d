use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dedup::DedupConfig;
use crate::models::UNCATEGORIZED;

/// Environment variable that may point at the YAML configuration
pub const CONFIG_ENV_VAR: &str = "NEWS_DIGEST_CONFIG";

const APP_DIR: &str = "news-digest";
const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

fn default_true() -> bool {
    true
}

fn default_source_type() -> String {
    "rss".to_string()
}

/// One configured feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
    pub url: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub max_items: Option<usize>,
}

impl SourceConfig {
    /// Whether the source passes the enabled-category filter.
    ///
    /// An empty filter or a source without categories always passes.
    pub fn matches_categories(&self, enabled: &HashSet<String>) -> bool {
        enabled.is_empty()
            || self.categories.is_empty()
            || self.categories.iter().any(|c| enabled.contains(c))
    }

    /// Category the source's items are filed under
    pub fn primary_category(&self, enabled: &HashSet<String>) -> String {
        self.categories
            .iter()
            .find(|c| enabled.is_empty() || enabled.contains(*c))
            .or_else(|| self.categories.first())
            .cloned()
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub archive_dir: PathBuf,
    pub max_items_per_source: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
            archive_dir: PathBuf::from("docs/archive"),
            max_items_per_source: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub enabled: bool,
    /// strftime pattern for the archive subdirectory
    pub format: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            format: "%Y/%m".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

impl Config {
    /// Read and validate the YAML configuration at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml_ng::from_str(content).context("Failed to parse YAML configuration")?;

        config.dedup.validate()?;

        Ok(config)
    }

    /// Pick the configuration file to load.
    ///
    /// Order: explicit path, `NEWS_DIGEST_CONFIG`, `config/config.yaml`,
    /// then `~/.config/news-digest/config.yaml`.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }

        Self::try_load_dotenv();

        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        let local = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local.exists() {
            return Ok(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join(APP_DIR).join("config.yaml");
            if user_path.exists() {
                return Ok(user_path);
            }
        }

        anyhow::bail!(
            "No configuration file found.\n\n\
            Pass a path as the first argument, set {} or create {}",
            CONFIG_ENV_VAR,
            DEFAULT_CONFIG_PATH
        )
    }

    /// Enabled categories, with an optional override replacing the configured list
    pub fn enabled_categories(&self, overrides: Option<&[String]>) -> HashSet<String> {
        overrides
            .unwrap_or(&self.categories)
            .iter()
            .cloned()
            .collect()
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/news-digest/.env
        if let Some(config_dir) = dirs::config_dir() {
            let env_path = config_dir.join(APP_DIR).join(".env");
            if env_path.exists() && dotenvy::from_path(&env_path).is_ok() {
                return;
            }
        }

        // Variables may still be set system-wide
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    const SAMPLE: &str = r#"
categories:
  - technology
sources:
  - name: FakeTech
    type: rss
    url: https://fake.example.com/feed
    categories: [technology]
    enabled: true
  - name: DisabledSource
    url: https://disabled.example.com/feed
    categories: [technology]
    enabled: false
    max_items: 3
output:
  dir: out
  archive_dir: out/archive
  max_items_per_source: 5
archive:
  enabled: true
"#;

    fn source(categories: &[&str]) -> SourceConfig {
        SourceConfig {
            name: "Src".to_string(),
            source_type: "rss".to_string(),
            url: "https://example.com/feed".to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            enabled: true,
            max_items: None,
        }
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_loads_yaml() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.categories, vec!["technology"]);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].source_type, "rss");
        assert_eq!(config.sources[1].source_type, "rss");
        assert!(!config.sources[1].enabled);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(config.archive.enabled);
        assert_eq!(config.archive.format, "%Y/%m");
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = Config::from_yaml("sources: []\n").unwrap();
        assert!(config.categories.is_empty());
        assert_eq!(config.output.dir, PathBuf::from("docs"));
        assert_eq!(config.output.archive_dir, PathBuf::from("docs/archive"));
        assert_eq!(config.output.max_items_per_source, 10);
        assert!(!config.archive.enabled);
        assert_eq!(config.dedup, DedupConfig::default());
    }

    #[test]
    fn test_partial_dedup_section_keeps_defaults() {
        let config = Config::from_yaml("dedup:\n  similarity_threshold: 0.8\n").unwrap();
        assert_eq!(config.dedup.similarity_threshold, 0.8);
        assert_eq!(config.dedup.shingle_size, 3);
        assert!(config.dedup.enabled);
    }

    #[test]
    fn test_invalid_dedup_threshold_rejected() {
        let err = Config::from_yaml("dedup:\n  similarity_threshold: 1.5\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::SimilarityThreshold(1.5))
        );
    }

    #[test]
    fn test_invalid_shingle_size_rejected() {
        let err = Config::from_yaml("dedup:\n  shingle_size: 0\n").unwrap_err();
        assert!(err.to_string().contains("shingle_size"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.sources[0].name, "FakeTech");
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Config::resolve_path(Some(PathBuf::from("custom.yaml"))).unwrap();
        assert_eq!(path, PathBuf::from("custom.yaml"));
    }

    #[test]
    fn test_category_override_replaces_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.enabled_categories(None), set(&["technology"]));

        let overrides = vec!["world".to_string()];
        assert_eq!(config.enabled_categories(Some(overrides.as_slice())), set(&["world"]));
        assert!(config.enabled_categories(Some(&[][..])).is_empty());
    }

    #[test]
    fn test_matches_categories() {
        assert!(source(&["technology"]).matches_categories(&set(&["technology"])));
        assert!(!source(&["technology"]).matches_categories(&set(&["world"])));
        assert!(source(&["technology"]).matches_categories(&set(&[])));
        assert!(source(&[]).matches_categories(&set(&["world"])));
    }

    #[test]
    fn test_primary_category() {
        let src = source(&["science", "technology"]);
        assert_eq!(src.primary_category(&set(&["technology"])), "technology");
        assert_eq!(src.primary_category(&set(&[])), "science");
        assert_eq!(src.primary_category(&set(&["world"])), "science");
        assert_eq!(source(&[]).primary_category(&set(&[])), UNCATEGORIZED);
    }
}
