use crate::error::Result;
use crate::{apply_filters, Collector};
use inject_graph::{Entry, Logger};
use std::fs;
use std::path::Path;

/// Loads a pre-collected entry list from a YAML or JSON file.
///
/// Files ending in `.json` are read as JSON, everything else as YAML.
#[derive(Debug, Clone, Copy)]
pub struct ManifestCollector {
    logger: Logger,
}

impl Default for ManifestCollector {
    fn default() -> Self {
        Self {
            logger: Logger::facade("inject::collector"),
        }
    }
}

impl ManifestCollector {
    #[must_use]
    pub fn with_logger(self, logger: Logger) -> Self {
        Self { logger }
    }

    pub fn parse(text: &str, json: bool) -> Result<Vec<Entry>> {
        if json {
            Ok(serde_json::from_str(text)?)
        } else {
            Ok(serde_yaml::from_str(text)?)
        }
    }
}

impl Collector for ManifestCollector {
    fn collect(&self, path: &Path, filters: &[String]) -> Result<Vec<Entry>> {
        let text = fs::read_to_string(path)?;
        let json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let entries = Self::parse(&text, json)?;
        self.logger.debug(format_args!(
            "{} entries loaded from {}",
            entries.len(),
            path.display()
        ));
        Ok(apply_filters(entries, filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
- path: example.com/app/store
  package: store
  func:
    name: New
    results:
      - type: "*DB"
  annotations:
    - name: Provide
      attributes:
        index: "0"
    - name: deprecated
"#;

    #[test]
    fn yaml_and_json_agree() {
        let from_yaml = ManifestCollector::parse(YAML, false).unwrap();
        let json = serde_json::to_string(&from_yaml).unwrap();
        let from_json = ManifestCollector::parse(&json, true).unwrap();
        assert_eq!(from_yaml, from_json);
        assert_eq!(from_yaml[0].func_name(), "New");
    }

    #[test]
    fn collect_applies_filters() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("entries.yaml");
        fs::write(&file, YAML).unwrap();

        let entries = ManifestCollector::default()
            .collect(&file, &["provide".to_string()])
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].annotations.len(), 1);
        assert_eq!(entries[0].annotations[0].name, "Provide");
    }
}
