//! Errors raised while executing template expressions in a release

use std::fmt;

use thiserror::Error;

/// Location of a field inside a release, e.g. `labels[team]` or `set[0].values[1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn field(name: &str) -> Self {
        FieldPath(name.to_string())
    }

    pub fn index(mut self, i: usize) -> Self {
        self.0.push_str(&format!("[{}]", i));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.0.push_str(&format!("[{}]", key));
        self
    }

    pub fn child(mut self, name: &str) -> Self {
        self.0.push('.');
        self.0.push_str(name);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum TemplateError {
    /// The snapshot copy of the release could not be taken.
    #[error(
        "failed executing template expressions in release {release:?}: failed cloning release {release:?}: {source}"
    )]
    Clone {
        release: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The renderer rejected the content of a field.
    #[error("failed executing template expressions in release {release:?}.{path} = {raw:?}: {source}")]
    Render {
        release: String,
        path: FieldPath,
        raw: String,
        #[source]
        source: BoxError,
    },

    /// A mapping overlay could not be turned into text or read back after rendering.
    #[error("failed executing template expressions in release {release:?}.{path} = {raw:?}: {source}")]
    Normalization {
        release: String,
        path: FieldPath,
        raw: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl TemplateError {
    pub fn release(&self) -> &str {
        match self {
            TemplateError::Clone { release, .. }
            | TemplateError::Render { release, .. }
            | TemplateError::Normalization { release, .. } => release,
        }
    }

    /// Field that failed, `None` for clone failures.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            TemplateError::Clone { .. } => None,
            TemplateError::Render { path, .. } | TemplateError::Normalization { path, .. } => {
                Some(path)
            }
        }
    }

    /// Pre-render text of the failing field.
    pub fn raw(&self) -> Option<&str> {
        match self {
            TemplateError::Clone { .. } => None,
            TemplateError::Render { raw, .. } | TemplateError::Normalization { raw, .. } => {
                Some(raw)
            }
        }
    }
}
