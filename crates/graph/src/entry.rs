use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scanned declaration together with the annotations attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Enclosing module path.
    #[serde(default)]
    pub module: String,
    /// Import path of the declaring package.
    pub path: String,
    /// Source file the declaration was read from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Package name as declared in source.
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<Func>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

impl Entry {
    #[must_use]
    pub fn is_func(&self) -> bool {
        self.func.is_some()
    }

    /// Function name, or an empty string for non-function entries.
    #[must_use]
    pub fn func_name(&self) -> &str {
        self.func.as_ref().map_or("", |f| f.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Func {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Param>,
    #[serde(default)]
    pub results: Vec<Param>,
}

/// Parameter or result descriptor; `type` is the type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Annotation exactly as the collector found it: a name and free-form
/// `key=value` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl RawAnnotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
