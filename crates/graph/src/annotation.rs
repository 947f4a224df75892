use crate::entry::{Entry, RawAnnotation};
use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed vocabulary of annotation names understood by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Module,
    Provide,
    Inject,
    Invoke,
}

impl AnnotationKind {
    pub const ALL: [Self; 4] = [Self::Module, Self::Provide, Self::Inject, Self::Invoke];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Provide => "provide",
            Self::Inject => "inject",
            Self::Invoke => "invoke",
        }
    }

    /// Case-insensitive lookup; `None` for names outside the vocabulary.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed form of a [`RawAnnotation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// Fully-qualified type override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Parameter or result position the annotation points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Annotation {
    #[must_use]
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            instance: None,
            name: None,
            group: None,
            index: None,
        }
    }

    /// Decode the attributes of `raw`, which must carry a known name.
    ///
    /// Unknown attribute keys are ignored. An `index` that is not a
    /// non-negative integer is rejected.
    pub fn decode(raw: &RawAnnotation, entry: &Entry) -> Result<Self> {
        let malformed = |detail: String| GraphError::MalformedAnnotation {
            name: raw.name.clone(),
            path: entry.path.clone(),
            function: entry.func_name().to_string(),
            detail,
        };

        let kind = AnnotationKind::parse(&raw.name)
            .ok_or_else(|| malformed(format!("unknown annotation name {:?}", raw.name)))?;

        let text = |key: &str| {
            raw.attributes
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let index = match text("index") {
            Some(value) => Some(
                value
                    .parse::<usize>()
                    .map_err(|e| malformed(format!("index {value:?}: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            kind,
            instance: text("instance"),
            name: text("name"),
            group: text("group"),
            index,
        })
    }

    /// Disambiguating identity: instance and group, joined by `:`.
    #[must_use]
    pub fn id(&self) -> String {
        [self.instance.as_deref(), self.group.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(":")
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}
