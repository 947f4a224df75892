use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodegenError>;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("IO error on {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("format error: {0}")]
    FormatError(String),

    #[error("generation deeper than {limit} levels at {key}")]
    DepthExceeded { key: String, limit: usize },
}
