use anyhow::{Context, Result};
use inject_codegen::GenerateConfig;
use inject_collector::DEFAULT_FILTERS;
use inject_graph::Strictness;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "inject.toml";

/// Contents of `inject.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InjectConfig {
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CollectConfig {
    #[serde(default = "default_filters")]
    pub filters: Vec<String>,
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            filters: default_filters(),
            marker: default_marker(),
        }
    }
}

fn default_filters() -> Vec<String> {
    DEFAULT_FILTERS.iter().map(|s| s.to_string()).collect()
}

fn default_marker() -> String {
    "@A".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BuildConfig {
    #[serde(default)]
    pub strictness: Strictness,
}

impl InjectConfig {
    /// Load `explicit` if given, else `<root>/inject.toml` when present,
    /// else defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    return Ok((Self::default(), None));
                }
                candidate
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        log::info!("Using config {}", path.display());
        Ok((config, Some(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, path) = InjectConfig::load(dir.path(), None).unwrap();
        assert_eq!(config, InjectConfig::default());
        assert!(path.is_none());
        assert_eq!(config.collect.marker, "@A");
        assert_eq!(config.generate.gen_dir, "gen/inject");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[build]\nstrictness = \"strict\"\n\n[generate]\ngen_dir = \"internal/wire\"\n",
        )
        .unwrap();

        let (config, path) = InjectConfig::load(dir.path(), None).unwrap();
        assert!(path.is_some());
        assert_eq!(config.build.strictness, Strictness::Strict);
        assert_eq!(config.generate.gen_dir, "internal/wire");
        assert_eq!(config.generate.remote_prefix, "github.com/");
        assert_eq!(config.collect.filters.len(), 4);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        fs::write(&file, "[cache]\nenabled = true\n").unwrap();
        assert!(InjectConfig::load(dir.path(), Some(&file)).is_err());
    }
}
