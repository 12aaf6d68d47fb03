//! Prompt template loading and `{{placeholder}}` rendering.
//!
//! Templates live as plain Markdown files in a configurable directory. A
//! missing or unreadable file degrades to a built-in minimal prompt, so
//! template trouble can never abort a documentation run.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use regex::{Captures, Regex};
use tracing::warn;

/// Read-only handle on the template directory.
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the named template, or its built-in fallback when the file
    /// cannot be read. This never fails.
    pub fn load(&self, name: &str) -> String {
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    template = name,
                    path = %path.display(),
                    error = ?e,
                    "Failed to load prompt template, using fallback"
                );
                fallback_template(name).to_string()
            }
        }
    }
}

/// Minimal built-in prompts, one per known document plus a generic default.
pub fn fallback_template(name: &str) -> &'static str {
    match name {
        "project-overview.md" => {
            "Generate a README.md for {{repositoryName}} with {{totalClasses}} classes."
        }
        "class-documentation.md" => {
            "Document the class {{className}} from package {{packageName}}."
        }
        "getting-started.md" => "Create a getting started guide for {{repositoryName}}.",
        "faq-troubleshooting.md" => "Create FAQ for {{repositoryName}}.",
        _ => "Generate documentation for {{repositoryName}}.",
    }
}

/// Substitute every `{{name}}` placeholder that has a binding. Placeholders
/// without a binding stay in the output verbatim, which keeps rendering
/// total over hand-edited templates.
pub fn render(template: &str, bindings: &HashMap<String, String>) -> String {
    let placeholder = Regex::new(r"\{\{([A-Za-z][A-Za-z0-9_]*)\}\}").unwrap();
    placeholder
        .replace_all(template, |caps: &Captures<'_>| match bindings.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
