use anyhow::Result;
use clap::Parser;

use crate::acquire;
use crate::config::{RunConfig, RunContext};
use crate::contract::SourceParser;
use crate::generate;
use crate::llm::AzureOpenAiClient;
use crate::parse::JavaStructureScanner;
use crate::prompt::TemplateStore;

/// CLI for repodoc: LLM-written Markdown documentation for a repository.
#[derive(Parser)]
#[clap(
    name = "repodoc",
    version,
    about = "Clone a repository and generate Markdown documentation for it with an LLM"
)]
pub struct Cli {
    /// Remote repository to document (e.g. https://github.com/owner/repo.git)
    pub repo_url: String,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");
    tracing::info!(repo_url = %cli.repo_url, "Processing repository");

    let config = RunConfig::from_env()?;
    let ctx = RunContext::new(cli.repo_url.clone(), acquire::repo_short_name(&cli.repo_url));

    tracing::info!(repo_url = %ctx.repo_url, "Cloning repository");
    let repo_path = acquire::acquire_repository(
        &ctx,
        &config.destination,
        config.github_token.as_deref(),
        config.flatten_policy,
    )
    .map_err(|e| anyhow::Error::msg(format!("Repository acquisition failed: {e}")))?;
    let repo_path = repo_path.canonicalize().unwrap_or(repo_path);

    let scanner = JavaStructureScanner;
    let files = scanner
        .find_source_files(&repo_path)
        .map_err(|e| anyhow::Error::msg(format!("Source discovery failed: {e}")))?;
    tracing::info!(count = files.len(), "Discovered source files");

    let mut records = Vec::new();
    for file in &files {
        if let Some(record) = scanner.parse_file(file) {
            records.push(record);
        }
    }
    tracing::info!(classes = records.len(), "Parsed class records");

    let generator = AzureOpenAiClient::new_from_env()
        .map_err(|e| anyhow::Error::msg(format!("Azure OpenAI configuration failed: {e}")))?;
    let templates = TemplateStore::new(config.template_dir.clone());

    tracing::info!(classes = records.len(), "Generating documentation");
    let report = generate::generate_all(&ctx, &generator, &templates, &records, &repo_path)
        .await
        .map_err(|e| anyhow::Error::msg(format!("Documentation generation failed: {e}")))?;

    if !report.failures.is_empty() {
        eprintln!(
            "Warning: {} class document(s) failed, see logs",
            report.failures.len()
        );
    }

    let doc_root = generate::doc_root(&repo_path);
    tracing::info!(doc_root = %doc_root.display(), "Documentation written");
    println!("View docs at: {}", doc_root.display());
    Ok(())
}
