//! # Inject Collector
//!
//! Produces the flat entry list the graph builder consumes.
//!
//! - [`SourceCollector`] scans Go sources for `// @A <name> key=value` comments
//! - [`ManifestCollector`] loads a YAML/JSON entry list collected elsewhere
//! - [`GoModResolver`] discovers the module identity from `go.mod`

mod error;
mod manifest;
mod module;
mod source;

pub use error::{CollectorError, Result};
pub use manifest::ManifestCollector;
pub use module::{GoModResolver, ModuleResolver, ModuleRoot, StaticModule};
pub use source::SourceCollector;

use inject_graph::Entry;
use std::path::Path;

/// Annotation names collected by default.
pub const DEFAULT_FILTERS: [&str; 4] = ["Inject", "Provide", "Invoke", "Module"];

pub trait Collector {
    /// Collect entries under `path`, keeping only annotations whose name is in
    /// `filters` (case-insensitive). An empty filter list keeps everything.
    fn collect(&self, path: &Path, filters: &[String]) -> Result<Vec<Entry>>;
}

/// Drop annotations outside `filters`, then entries left without annotations.
#[must_use]
pub fn apply_filters(entries: Vec<Entry>, filters: &[String]) -> Vec<Entry> {
    if filters.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter_map(|mut entry| {
            entry
                .annotations
                .retain(|a| filters.iter().any(|f| f.eq_ignore_ascii_case(&a.name)));
            (!entry.annotations.is_empty()).then_some(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inject_graph::RawAnnotation;

    fn entry(anns: &[&str]) -> Entry {
        Entry {
            module: String::new(),
            path: "m/p".into(),
            file: None,
            package: "p".into(),
            func: None,
            annotations: anns.iter().map(|n| RawAnnotation::new(*n)).collect(),
        }
    }

    #[test]
    fn filters_are_case_insensitive_and_drop_empty_entries() {
        let filters: Vec<String> = DEFAULT_FILTERS.iter().map(|s| s.to_string()).collect();
        let out = apply_filters(vec![entry(&["provide", "todo"]), entry(&["todo"])], &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].annotations, vec![RawAnnotation::new("provide")]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let out = apply_filters(vec![entry(&["todo"])], &[]);
        assert_eq!(out.len(), 1);
    }
}
