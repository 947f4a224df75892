use crate::annotation::{Annotation, AnnotationKind};
use crate::entry::{Entry, RawAnnotation};
use crate::error::{GraphError, Result};
use crate::graph::{Graph, GraphDiagnostic};
use crate::identity::{gid, xid};
use crate::logger::Logger;
use indexmap::map::Entry as MapEntry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vertex payload: the declaration and the annotation that put it in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub entry: Entry,
    pub annotation: Annotation,
}

/// How the builder treats tolerated irregularities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Log and skip.
    #[default]
    Permissive,
    /// Fail the build if the report carries any warning.
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub strictness: Strictness,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    CombinedAnnotations {
        path: String,
        function: String,
    },
    UnknownAnnotation {
        name: String,
        path: String,
        function: String,
    },
    DuplicateProvider {
        symbol: String,
        path: String,
        function: String,
    },
    UnmatchedIndex {
        kind: AnnotationKind,
        index: usize,
        path: String,
        function: String,
    },
    Graph(GraphDiagnostic),
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CombinedAnnotations { path, function } => write!(
                f,
                "the combined annotations of {path}.{function} are invalid (provide and inject)"
            ),
            Self::UnknownAnnotation {
                name,
                path,
                function,
            } => write!(f, "the annotation {name} on {path}.{function} is invalid"),
            Self::DuplicateProvider {
                symbol,
                path,
                function,
            } => write!(
                f,
                "{path}.{function} provides {symbol}, which already has a provider"
            ),
            Self::UnmatchedIndex {
                kind,
                index,
                path,
                function,
            } => write!(
                f,
                "the {kind} index {index} on {path}.{function} matches no position"
            ),
            Self::Graph(diagnostic) => fmt::Display::fmt(diagnostic, f),
        }
    }
}

/// Everything the builder tolerated while producing the graph.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub warnings: Vec<BuildWarning>,
    /// Function sites carrying an `invoke` annotation.
    pub invokers: Vec<String>,
}

pub struct BuildOutput {
    pub graph: Graph<Component>,
    pub report: BuildReport,
}

/// Build the dependency graph from collected entries.
pub struct GraphBuilder {
    options: BuildOptions,
    logger: Logger,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

impl GraphBuilder {
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            logger: Logger::facade("inject::builder"),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(&self, entries: &[Entry]) -> Result<BuildOutput> {
        let mut report = BuildReport::default();
        let mut providers: IndexMap<String, Component> = IndexMap::new();
        let mut consumers: IndexMap<String, Vec<Component>> = IndexMap::new();

        // Phase 1: collect providers and consumers by symbol identity
        for entry in entries {
            let Some(func) = entry.func.as_ref() else {
                continue;
            };

            if !has_valid_combined_annotations(&entry.annotations) {
                self.warn(
                    &mut report,
                    BuildWarning::CombinedAnnotations {
                        path: entry.path.clone(),
                        function: func.name.clone(),
                    },
                );
                continue;
            }

            for raw in &entry.annotations {
                let Some(kind) = AnnotationKind::parse(&raw.name) else {
                    self.warn(
                        &mut report,
                        BuildWarning::UnknownAnnotation {
                            name: raw.name.clone(),
                            path: entry.path.clone(),
                            function: func.name.clone(),
                        },
                    );
                    continue;
                };

                let annotation = Annotation::decode(raw, entry)?;

                match kind {
                    AnnotationKind::Provide => {
                        let index = required_index(&annotation, entry)?;
                        let Some(result) = func.results.get(index) else {
                            self.unmatched(&mut report, kind, index, entry);
                            continue;
                        };

                        let id = xid(&entry.package, &result.ty, &annotation);
                        match providers.entry(id) {
                            MapEntry::Vacant(slot) => {
                                self.logger.debug(format_args!(
                                    "provider {} registered by {}.{}",
                                    slot.key(),
                                    entry.path,
                                    func.name
                                ));
                                slot.insert(Component {
                                    entry: entry.clone(),
                                    annotation,
                                });
                            }
                            MapEntry::Occupied(slot) => {
                                let symbol = slot.key().clone();
                                self.warn(
                                    &mut report,
                                    BuildWarning::DuplicateProvider {
                                        symbol,
                                        path: entry.path.clone(),
                                        function: func.name.clone(),
                                    },
                                );
                            }
                        }
                    }
                    AnnotationKind::Inject => {
                        let index = required_index(&annotation, entry)?;
                        let Some(param) = func.parameters.get(index) else {
                            self.unmatched(&mut report, kind, index, entry);
                            continue;
                        };

                        let id = xid(&entry.package, &param.ty, &annotation);
                        consumers.entry(id).or_default().push(Component {
                            entry: entry.clone(),
                            annotation,
                        });
                    }
                    AnnotationKind::Invoke => {
                        report.invokers.push(gid(entry));
                    }
                    AnnotationKind::Module => {}
                }
            }
        }

        // Phase 2: providers become vertices keyed by symbol identity
        let mut graph = Graph::with_logger(self.logger);
        for (id, component) in &providers {
            graph.add_vertex(id.clone(), component.clone());
        }

        // Phase 3: link every consumer to its provider
        for (id, waiting) in consumers {
            if !providers.contains_key(&id) {
                return Err(GraphError::NotFound { symbol: id });
            }

            for component in waiting {
                let consumer = gid(&component.entry);
                // a consumer injecting several symbols is visited once per symbol
                if !graph.contains(&consumer) {
                    graph.add_vertex(consumer.clone(), component);
                }
                graph.add_edge(&id, &consumer);
            }
        }

        report.warnings.extend(
            graph
                .diagnostics()
                .iter()
                .cloned()
                .map(BuildWarning::Graph),
        );

        self.logger.info(format_args!(
            "Built dependency graph: {} vertices, {} edges, {} warnings",
            graph.vertex_count(),
            graph.edge_count(),
            report.warnings.len()
        ));

        if self.options.strictness == Strictness::Strict && !report.warnings.is_empty() {
            return Err(GraphError::Strict {
                warnings: report.warnings.iter().map(ToString::to_string).collect(),
            });
        }

        Ok(BuildOutput { graph, report })
    }

    fn warn(&self, report: &mut BuildReport, warning: BuildWarning) {
        self.logger.warn(format_args!("{warning}"));
        report.warnings.push(warning);
    }

    fn unmatched(
        &self,
        report: &mut BuildReport,
        kind: AnnotationKind,
        index: usize,
        entry: &Entry,
    ) {
        self.warn(
            report,
            BuildWarning::UnmatchedIndex {
                kind,
                index,
                path: entry.path.clone(),
                function: entry.func_name().to_string(),
            },
        );
    }
}

fn required_index(annotation: &Annotation, entry: &Entry) -> Result<usize> {
    annotation.index.ok_or_else(|| GraphError::NotValid {
        kind: annotation.kind.to_string(),
        path: entry.path.clone(),
        function: entry.func_name().to_string(),
    })
}

/// A declaration may not both provide and inject.
fn has_valid_combined_annotations(annotations: &[RawAnnotation]) -> bool {
    let has = |kind: AnnotationKind| {
        annotations
            .iter()
            .any(|a| AnnotationKind::parse(&a.name) == Some(kind))
    };
    !(has(AnnotationKind::Provide) && has(AnnotationKind::Inject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Func, Param};

    fn func_entry(path: &str, name: &str, anns: Vec<RawAnnotation>) -> Entry {
        Entry {
            module: "example.com/app".into(),
            path: path.into(),
            file: None,
            package: path.rsplit('/').next().unwrap().into(),
            func: Some(Func {
                name: name.into(),
                parameters: vec![Param::new("db", "*DB")],
                results: vec![Param::new("", "*DB")],
            }),
            annotations: anns,
        }
    }

    #[test]
    fn combined_check_sees_both_kinds_in_any_case() {
        assert!(!has_valid_combined_annotations(&[
            RawAnnotation::new("Provide"),
            RawAnnotation::new("INJECT"),
        ]));
        assert!(has_valid_combined_annotations(&[
            RawAnnotation::new("inject"),
            RawAnnotation::new("invoke"),
        ]));
    }

    #[test]
    fn invokers_are_reported() {
        let entries = vec![func_entry(
            "example.com/app/cmd",
            "Main",
            vec![RawAnnotation::new("invoke")],
        )];

        let out = GraphBuilder::default().build(&entries).unwrap();
        assert_eq!(out.report.invokers, ["example.com/app/cmd_Main"]);
        assert_eq!(out.graph.vertex_count(), 0);
    }

    #[test]
    fn out_of_range_index_is_tolerated_and_reported() {
        let entries = vec![func_entry(
            "example.com/app/store",
            "New",
            vec![RawAnnotation::new("provide").attr("index", "3")],
        )];

        let out = GraphBuilder::default().build(&entries).unwrap();
        assert_eq!(out.graph.vertex_count(), 0);
        assert!(matches!(
            out.report.warnings.as_slice(),
            [BuildWarning::UnmatchedIndex { index: 3, .. }]
        ));
    }

    #[test]
    fn strict_mode_fails_on_warnings() {
        let entries = vec![func_entry(
            "example.com/app/store",
            "New",
            vec![RawAnnotation::new("bean")],
        )];

        let options = BuildOptions {
            strictness: Strictness::Strict,
        };
        let err = GraphBuilder::new(options).build(&entries).err().unwrap();
        match err {
            GraphError::Strict { warnings } => {
                assert_eq!(warnings.len(), 1);
                assert!(warnings[0].contains("bean"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
