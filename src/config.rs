use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What to do when moving one entry fails while flattening a nested
/// checkout directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenPolicy {
    /// Log the entry and keep going (best-effort, the default).
    ContinueOnError,
    /// Stop at the first failed entry and fail acquisition.
    Abort,
}

impl From<&str> for FlattenPolicy {
    fn from(s: &str) -> Self {
        match s {
            "continue" | "Continue" | "continue_on_error" => FlattenPolicy::ContinueOnError,
            "abort" | "Abort" => FlattenPolicy::Abort,
            other => {
                warn!(
                    policy = other,
                    "Unknown flatten policy, defaulting to continue"
                );
                FlattenPolicy::ContinueOnError
            }
        }
    }
}

/// Environment-derived settings for one documentation run.
///
/// Secrets and paths come from the environment (optionally via `.env`);
/// nothing is read from config files.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Base directory under which repository working trees are created.
    pub destination: PathBuf,
    /// Directory holding the prompt template files.
    pub template_dir: PathBuf,
    pub flatten_policy: FlattenPolicy,
    /// Token injected into https clone URLs when present.
    pub github_token: Option<String>,
}

impl RunConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let destination = match std::env::var("DOCUMENT_DESTINATION") {
            Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
            Ok(_) | Err(_) => {
                error!("DOCUMENT_DESTINATION environment variable not set");
                return Err(anyhow::anyhow!(
                    "Please set DOCUMENT_DESTINATION (e.g. DOCUMENT_DESTINATION=/srv/repodoc)"
                ));
            }
        };

        let template_dir = std::env::var("PROMPT_TEMPLATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("prompts"));

        let flatten_policy = std::env::var("FLATTEN_ON_ERROR")
            .map(|v| FlattenPolicy::from(v.as_str()))
            .unwrap_or(FlattenPolicy::ContinueOnError);

        let github_token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        info!(
            destination = %destination.display(),
            template_dir = %template_dir.display(),
            ?flatten_policy,
            token_set = github_token.is_some(),
            "Run configuration loaded from environment"
        );

        Ok(RunConfig {
            destination,
            template_dir,
            flatten_policy,
            github_token,
        })
    }
}

/// Identifiers carried through acquisition, aggregation and generation,
/// used only for diagnostics (tracing fields), never for control flow.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub repo_url: String,
    pub repo_name: String,
}

impl RunContext {
    pub fn new(repo_url: impl Into<String>, repo_name: impl Into<String>) -> Self {
        let ctx = RunContext {
            run_id: Uuid::new_v4(),
            repo_url: repo_url.into(),
            repo_name: repo_name.into(),
        };
        info!(run_id = %ctx.run_id, repo = %ctx.repo_name, "Run context created");
        ctx
    }
}
