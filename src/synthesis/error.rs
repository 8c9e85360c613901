//! Regeneration errors.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template '{name}' failed: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read endpoints: {0}")]
    Store(#[from] StoreError),

    #[error("regeneration of {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    #[error("regeneration of {target} panicked")]
    Panicked { target: String },
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }

    /// Metric label of the failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            RenderError::Template { .. } => "template_error",
            RenderError::Io { .. } => "io_error",
            RenderError::Store(_) => "store_error",
            RenderError::Timeout { .. } => "timeout",
            RenderError::Panicked { .. } => "panicked",
        }
    }
}
