use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("not valid: the index parameter is required on the annotation {kind} in the entry {path}.{function}")]
    NotValid {
        kind: String,
        path: String,
        function: String,
    },

    #[error("not found: provider not found for {symbol}")]
    NotFound { symbol: String },

    #[error("malformed annotation {name} in the entry {path}.{function}: {detail}")]
    MalformedAnnotation {
        name: String,
        path: String,
        function: String,
        detail: String,
    },

    #[error("strict build rejected {} warning(s): {}", .warnings.len(), .warnings.join("; "))]
    Strict { warnings: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    #[must_use]
    pub fn is_not_valid(&self) -> bool {
        matches!(self, Self::NotValid { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
