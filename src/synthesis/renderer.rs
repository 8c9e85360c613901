//! Template rendering.
//!
//! Uses minijinja with strict undefined handling: a template referencing a
//! variable the context does not carry fails the run instead of silently
//! rendering an empty string into the proxy configuration.

use std::fs;
use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::synthesis::error::RenderError;

/// Set of named templates compiled once and rendered every cycle.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        // Block tags on their own line leave no blank lines in YAML output.
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Compile `source` under `name`. Syntax errors surface here.
    pub fn add_template(&mut self, name: &str, source: impl Into<String>) -> Result<(), RenderError> {
        self.env
            .add_template_owned(name.to_string(), source.into())
            .map_err(|source| RenderError::Template {
                name: name.to_string(),
                source,
            })
    }

    /// Read a template file and compile it under `name`.
    pub fn load_template(&mut self, name: &str, path: &Path) -> Result<(), RenderError> {
        let source = fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
        self.add_template(name, source)?;
        tracing::debug!(template = name, path = %path.display(), "Template compiled");
        Ok(())
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, RenderError> {
        let to_error = |source| RenderError::Template {
            name: name.to_string(),
            source,
        };
        self.env.get_template(name).map_err(to_error)?.render(ctx).map_err(to_error)
    }
}
