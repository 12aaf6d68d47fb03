//! # Collaborator contracts for the documentation pipeline
//!
//! This module defines the two seams the core pipeline depends on but does
//! not implement itself:
//!
//! - [`SourceParser`]: turns a checked-out working tree into
//!   [`ClassRecord`](crate::model::ClassRecord)s. Parsing accuracy is the
//!   implementor's concern; the pipeline only consumes the record contract.
//! - [`TextGenerator`]: one opaque prompt-in/text-out call against a
//!   text-generation backend. Retries, rate limiting and model selection all
//!   live behind this trait.
//!
//! ## Interface & Extensibility
//! - Implement [`SourceParser`] to plug in a different language front end.
//! - Implement [`TextGenerator`] for another backend (local model, HTTP API,
//!   canned fixture).
//! - Errors are uniform boxed trait objects so implementations stay free to
//!   choose their own failure types.
//!
//! ## Mocking & Testing
//! Both traits are annotated for `mockall`; the generated `MockSourceParser`
//! and `MockTextGenerator` are exported behind the `test-export-mocks`
//! feature (on by default) for deterministic pipeline tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::model::ClassRecord;

/// Error type for parser discovery failures (boxed, implementor-defined).
pub type ParserError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for generation backend failures (boxed, implementor-defined).
pub type GenerateError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for locating and structurally parsing source files under a working
/// tree. Implemented by the built-in heuristic scanner and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
pub trait SourceParser: Send + Sync {
    /// Enumerate every candidate source file below `root`.
    fn find_source_files(&self, root: &Path) -> Result<Vec<PathBuf>, ParserError>;

    /// Parse a single file into a structural record. `None` signals an
    /// unparseable file; callers skip it and continue the run.
    fn parse_file(&self, path: &Path) -> Option<ClassRecord>;
}

/// Trait for the text-generation backend: one synchronous-per-call,
/// stateless prompt → response exchange.
///
/// A failed call is fatal for the document currently being generated; the
/// orchestrator decides whether the run continues.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce the model's response text for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}
