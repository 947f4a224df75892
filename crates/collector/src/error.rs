use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectorError>;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("no go.mod found above {0}")]
    ModuleNotFound(PathBuf),

    #[error("no module directive in {0}")]
    MissingModuleDirective(PathBuf),
}
