use crate::alias::alias_for;
use crate::config::GenerateConfig;
use crate::error::{CodegenError, Result};
use crate::format::{PlainFormatter, SourceFormatter};
use crate::template::{ImportData, ModuleData, ModuleRef, ModuleTemplate};
use inject_graph::{AnnotationKind, Component, Entry, Graph, Logger, Vertex};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

const MAX_DEPTH: usize = 64;

/// A rendered wiring module, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModule {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFailure {
    pub root: String,
    pub error: String,
}

/// Outcome of one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    /// Every write in traversal order; a vertex reachable by several paths
    /// appears once per path.
    pub written: Vec<PathBuf>,
    pub failures: Vec<RootFailure>,
}

impl GenerationSummary {
    /// Distinct files written, in first-write order.
    #[must_use]
    pub fn unique_files(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.written
            .iter()
            .filter(|p| seen.insert(p.as_path()))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders one wiring module per visited vertex.
pub struct Generator {
    config: GenerateConfig,
    module: String,
    template: ModuleTemplate,
    formatter: Box<dyn SourceFormatter>,
    logger: Logger,
}

impl Generator {
    /// `module` is the identity generated import paths are rooted at.
    pub fn new(config: GenerateConfig, module: impl Into<String>) -> Result<Self> {
        Ok(Self {
            config,
            module: module.into(),
            template: ModuleTemplate::new()?,
            formatter: Box::new(PlainFormatter),
            logger: Logger::facade("inject::codegen"),
        })
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: ModuleTemplate) -> Self {
        self.template = template;
        self
    }

    /// Generate from every root. A failing root is logged and recorded; the
    /// remaining roots are still generated.
    pub fn generate(&self, graph: &Graph<Component>) -> GenerationSummary {
        let mut summary = GenerationSummary::default();

        for root in graph.vertices_with_no_incoming_edges() {
            if let Err(err) = self.generate_vertex(root, &mut summary.written) {
                self.logger
                    .error(format_args!("Error generating module file for {}: {err}", root.key()));
                summary.failures.push(RootFailure {
                    root: root.key().to_string(),
                    error: err.to_string(),
                });
            }
        }

        self.logger.info(format_args!(
            "Generated {} module files ({} writes), {} failed roots",
            summary.unique_files().len(),
            summary.written.len(),
            summary.failures.len()
        ));
        summary
    }

    /// Write the module for `vertex`, then recurse into its adjacent vertices.
    pub fn generate_vertex(
        &self,
        vertex: Vertex<'_, Component>,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        self.visit(vertex, written, 0)
    }

    fn visit(
        &self,
        vertex: Vertex<'_, Component>,
        written: &mut Vec<PathBuf>,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(CodegenError::DepthExceeded {
                key: vertex.key().to_string(),
                limit: MAX_DEPTH,
            });
        }

        let module = self.render(vertex)?;
        write_module(&module)?;
        self.logger
            .debug(format_args!("module written: {}", module.path.display()));
        written.push(module.path);

        for next in vertex.adjacent() {
            self.visit(next, written, depth + 1)?;
        }
        Ok(())
    }

    /// Render the module for `vertex` without touching the filesystem.
    pub fn render(&self, vertex: Vertex<'_, Component>) -> Result<RenderedModule> {
        let data = self.module_data(vertex);
        let rendered = self.template.render(&data)?;
        let contents = self.formatter.format(&rendered)?;
        let entry = &vertex.value().entry;

        Ok(RenderedModule {
            path: self.config.file_path(&entry.path, entry.func_name()),
            contents,
        })
    }

    fn module_data(&self, vertex: Vertex<'_, Component>) -> ModuleData {
        let entry = &vertex.value().entry;
        let mut data = ModuleData {
            package_name: package_name(entry),
            function_name: entry.func_name().to_string(),
            import_path: entry.path.clone(),
            alias: alias_for(&entry.path),
            kind: kind_of(entry).to_string(),
            modules: Vec::new(),
            imports: Vec::new(),
        };

        let mut unique_imports = HashSet::new();
        for dependency in vertex.incoming() {
            let dep = &dependency.value().entry;
            let same_package = dep.path == entry.path;
            let alias = if same_package {
                String::new()
            } else {
                alias_for(&dep.path)
            };

            data.modules.push(ModuleRef {
                alias: alias.clone(),
                function_name: dep.func_name().to_string(),
            });

            if same_package {
                continue;
            }

            if unique_imports.insert(alias.clone()) {
                data.imports.push(ImportData {
                    alias,
                    path: self.config.import_path(&self.module, &dep.path),
                });
            }
        }

        data
    }
}

fn write_module(module: &RenderedModule) -> Result<()> {
    let io_err = |source| CodegenError::IoError {
        path: module.path.clone(),
        source,
    };
    if let Some(parent) = module.path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(&module.path, &module.contents).map_err(io_err)
}

/// Generated package name: last segment of the declaring package path.
fn package_name(entry: &Entry) -> String {
    entry
        .path
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(entry.package.as_str())
        .to_string()
}

fn kind_of(entry: &Entry) -> AnnotationKind {
    let invoked = entry
        .annotations
        .iter()
        .any(|a| AnnotationKind::parse(&a.name) == Some(AnnotationKind::Invoke));
    if invoked {
        AnnotationKind::Invoke
    } else {
        AnnotationKind::Provide
    }
}
