use crate::error::{CollectorError, Result};
use inject_graph::Logger;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves the module identity that generated import paths are rooted at.
pub trait ModuleResolver {
    fn resolve(&self, path: &Path) -> Result<String>;
}

/// Reads the `module` directive of the nearest `go.mod` at or above a path.
#[derive(Debug, Clone, Copy)]
pub struct GoModResolver {
    logger: Logger,
}

impl Default for GoModResolver {
    fn default() -> Self {
        Self {
            logger: Logger::facade("inject::collector"),
        }
    }
}

/// Location and identity of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRoot {
    pub dir: PathBuf,
    pub module: String,
}

impl GoModResolver {
    #[must_use]
    pub fn with_logger(self, logger: Logger) -> Self {
        Self { logger }
    }

    pub fn locate(&self, path: &Path) -> Result<ModuleRoot> {
        let start = if path.is_file() {
            path.parent()
                .ok_or_else(|| CollectorError::InvalidPath(path.to_path_buf()))?
        } else {
            path
        };

        for dir in start.ancestors() {
            let manifest = dir.join("go.mod");
            if !manifest.is_file() {
                continue;
            }
            let text = fs::read_to_string(&manifest)?;
            let module = parse_module_directive(&text)
                .ok_or_else(|| CollectorError::MissingModuleDirective(manifest.clone()))?;
            self.logger
                .debug(format_args!("module {module} found in {}", manifest.display()));
            return Ok(ModuleRoot {
                dir: dir.to_path_buf(),
                module,
            });
        }

        Err(CollectorError::ModuleNotFound(path.to_path_buf()))
    }
}

impl ModuleResolver for GoModResolver {
    fn resolve(&self, path: &Path) -> Result<String> {
        self.locate(path).map(|root| root.module)
    }
}

/// Fixed module identity, for manifests that do not live inside a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticModule(pub String);

impl ModuleResolver for StaticModule {
    fn resolve(&self, _path: &Path) -> Result<String> {
        Ok(self.0.clone())
    }
}

fn parse_module_directive(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}
