//! Document generation pipeline.
//!
//! Builds the binding map for each document kind, renders its prompt
//! template, sends the prompt through a [`TextGenerator`] and writes the
//! returned Markdown under the documentation root. Repository-level
//! documents abort the run on failure; per-class documents are logged and
//! skipped so one odd class cannot sink the rest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::aggregate;
use crate::aggregate::NO_DESCRIPTION;
use crate::config::RunContext;
use crate::contract::{GenerateError, TextGenerator};
use crate::model::ClassRecord;
use crate::prompt::{self, TemplateStore};

/// Name of the documentation directory created inside the working tree.
pub const DOC_ROOT_DIR: &str = "RepoDocAIAgent";
/// Subdirectory of the documentation root holding per-class documents.
pub const API_SUBDIR: &str = "api";

#[derive(Debug)]
pub enum GenerateDocError {
    Llm(GenerateError),
    Io(std::io::Error),
}

impl std::fmt::Display for GenerateDocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateDocError::Llm(e) => write!(f, "text generation failed: {e}"),
            GenerateDocError::Io(e) => write!(f, "failed to write document: {e}"),
        }
    }
}

impl std::error::Error for GenerateDocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateDocError::Llm(e) => Some(&**e),
            GenerateDocError::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for GenerateDocError {
    fn from(e: std::io::Error) -> Self {
        GenerateDocError::Io(e)
    }
}

/// Outcome of a full generation run.
#[derive(Debug)]
pub struct GenerationReport {
    pub overview: PathBuf,
    pub getting_started: PathBuf,
    pub faq: PathBuf,
    pub class_docs: Vec<PathBuf>,
    pub failures: Vec<ClassDocFailure>,
}

#[derive(Debug)]
pub struct ClassDocFailure {
    pub class_name: String,
    pub error: String,
}

/// Documentation root for a working tree.
pub fn doc_root(working_tree: &Path) -> PathBuf {
    working_tree.join(DOC_ROOT_DIR)
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

async fn generate_to_file<G>(
    generator: &G,
    prompt_text: &str,
    out_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, GenerateDocError>
where
    G: TextGenerator + Sync,
{
    let content = generator
        .generate(prompt_text)
        .await
        .map_err(GenerateDocError::Llm)?;
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Generate `README.md` from the whole record set.
pub async fn generate_project_overview<G>(
    generator: &G,
    templates: &TemplateStore,
    records: &[ClassRecord],
    repo_name: &str,
    out_dir: &Path,
) -> Result<PathBuf, GenerateDocError>
where
    G: TextGenerator + Sync,
{
    info!(repository = repo_name, "Generating project overview documentation");

    let counts = aggregate::category_counts(records);
    let mut bindings = HashMap::new();
    bindings.insert("repositoryName".to_string(), repo_name.to_string());
    bindings.insert("totalClasses".to_string(), counts.total.to_string());
    bindings.insert("classCount".to_string(), counts.classes.to_string());
    bindings.insert("interfaceCount".to_string(), counts.interfaces.to_string());
    bindings.insert("enumCount".to_string(), counts.enums.to_string());
    bindings.insert("classSummary".to_string(), aggregate::class_summary(records));
    bindings.insert(
        "packageStructure".to_string(),
        aggregate::package_histogram(records),
    );
    bindings.insert(
        "mainClasses".to_string(),
        non_empty_or(
            aggregate::entry_points_or_top_public(records),
            "No main classes identified",
        ),
    );

    let template = templates.load("project-overview.md");
    let prompt_text = prompt::render(&template, &bindings);
    let path = generate_to_file(generator, &prompt_text, out_dir, "README.md").await?;
    info!(path = %path.display(), "Generated project overview");
    Ok(path)
}

/// Generate `getting-started.md` from the whole record set.
pub async fn generate_getting_started<G>(
    generator: &G,
    templates: &TemplateStore,
    records: &[ClassRecord],
    repo_name: &str,
    out_dir: &Path,
) -> Result<PathBuf, GenerateDocError>
where
    G: TextGenerator + Sync,
{
    info!(repository = repo_name, "Generating getting started guide");

    let counts = aggregate::category_counts(records);
    let api_sample = aggregate::public_api_sample(records, 10);

    let mut bindings = HashMap::new();
    bindings.insert("repositoryName".to_string(), repo_name.to_string());
    bindings.insert("totalClasses".to_string(), counts.total.to_string());
    bindings.insert("classCount".to_string(), counts.classes.to_string());
    bindings.insert("interfaceCount".to_string(), counts.interfaces.to_string());
    bindings.insert("enumCount".to_string(), counts.enums.to_string());
    bindings.insert(
        "mainClasses".to_string(),
        non_empty_or(aggregate::entry_points(records), "No main methods found"),
    );
    bindings.insert(
        "publicClasses".to_string(),
        non_empty_or(api_sample.clone(), "No public classes identified"),
    );
    bindings.insert(
        "dependencies".to_string(),
        non_empty_or(
            aggregate::external_dependencies(records, 15),
            "No external dependencies identified",
        ),
    );
    bindings.insert(
        "packageStructure".to_string(),
        aggregate::package_histogram(records),
    );
    bindings.insert(
        "classAnalysis".to_string(),
        non_empty_or(api_sample, "No detailed class analysis available"),
    );
    bindings.insert(
        "entryPointAnalysis".to_string(),
        aggregate::entry_point_analysis(records),
    );

    let template = templates.load("getting-started.md");
    let prompt_text = prompt::render(&template, &bindings);
    let path = generate_to_file(generator, &prompt_text, out_dir, "getting-started.md").await?;
    info!(path = %path.display(), "Generated getting started guide");
    Ok(path)
}

/// Generate `faq.md` from the whole record set.
pub async fn generate_faq<G>(
    generator: &G,
    templates: &TemplateStore,
    records: &[ClassRecord],
    repo_name: &str,
    out_dir: &Path,
) -> Result<PathBuf, GenerateDocError>
where
    G: TextGenerator + Sync,
{
    info!(repository = repo_name, "Generating FAQ and troubleshooting guide");

    let counts = aggregate::category_counts(records);
    let patterns = aggregate::pattern_counts(records);

    let mut bindings = HashMap::new();
    bindings.insert("repositoryName".to_string(), repo_name.to_string());
    bindings.insert("totalClasses".to_string(), counts.total.to_string());
    bindings.insert(
        "technologyStack".to_string(),
        aggregate::technology_stack(records),
    );
    bindings.insert(
        "commonPatterns".to_string(),
        aggregate::common_patterns(&patterns),
    );
    bindings.insert(
        "complexClasses".to_string(),
        non_empty_or(
            aggregate::complexity_ranking(records),
            "No particularly complex classes identified",
        ),
    );
    bindings.insert(
        "dependencies".to_string(),
        non_empty_or(
            aggregate::external_dependencies(records, 10),
            "No external dependencies identified",
        ),
    );
    bindings.insert(
        "potentialIssues".to_string(),
        aggregate::potential_issues(&patterns),
    );
    bindings.insert(
        "usagePatterns".to_string(),
        non_empty_or(
            aggregate::api_usage_sample(records),
            "Standard library usage patterns",
        ),
    );
    bindings.insert(
        "exceptionTypes".to_string(),
        non_empty_or(aggregate::exception_inventory(records), "No exceptions declared"),
    );
    bindings.insert(
        "exceptionMethods".to_string(),
        non_empty_or(
            aggregate::exception_methods(records),
            "No methods with declared exceptions",
        ),
    );

    let template = templates.load("faq-troubleshooting.md");
    let prompt_text = prompt::render(&template, &bindings);
    let path = generate_to_file(generator, &prompt_text, out_dir, "faq.md").await?;
    info!(path = %path.display(), "Generated FAQ and troubleshooting guide");
    Ok(path)
}

/// Generate `{ClassName}.md` for one record.
pub async fn generate_class_doc<G>(
    generator: &G,
    templates: &TemplateStore,
    record: &ClassRecord,
    out_dir: &Path,
) -> Result<PathBuf, GenerateDocError>
where
    G: TextGenerator + Sync,
{
    info!(class = %record.fully_qualified_name(), "Generating class documentation");

    let mut bindings = HashMap::new();
    bindings.insert("className".to_string(), record.name.clone());
    bindings.insert(
        "fullyQualifiedName".to_string(),
        record.fully_qualified_name(),
    );
    bindings.insert("packageName".to_string(), record.package_name.clone());
    bindings.insert("classType".to_string(), record.category.as_str().to_string());
    bindings.insert("isPublic".to_string(), record.is_public.to_string());
    bindings.insert("isAbstract".to_string(), record.is_abstract.to_string());
    bindings.insert(
        "implementedInterfaces".to_string(),
        non_empty_or(record.interfaces.join(", "), "None"),
    );
    bindings.insert(
        "extendedClasses".to_string(),
        record.superclass.clone().unwrap_or_else(|| "None".to_string()),
    );
    bindings.insert(
        "sourceCode".to_string(),
        record
            .source_code
            .clone()
            .unwrap_or_else(|| "Source code not available".to_string()),
    );
    bindings.insert(
        "classDescription".to_string(),
        record
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
    );
    bindings.insert("methodsCount".to_string(), record.methods.len().to_string());
    bindings.insert(
        "methodsDetails".to_string(),
        non_empty_or(aggregate::method_details(record), "No methods defined"),
    );
    bindings.insert("fieldsCount".to_string(), record.fields.len().to_string());
    bindings.insert(
        "fieldsDetails".to_string(),
        non_empty_or(aggregate::field_details(record), "No fields defined"),
    );
    bindings.insert(
        "constructorsDetails".to_string(),
        non_empty_or(aggregate::constructor_details(record), "Default constructor"),
    );
    bindings.insert(
        "classAnnotations".to_string(),
        aggregate::class_annotations(record),
    );
    bindings.insert(
        "inheritance".to_string(),
        aggregate::inheritance_summary(record),
    );
    bindings.insert("usagePatterns".to_string(), aggregate::usage_patterns(record));

    let template = templates.load("class-documentation.md");
    let prompt_text = prompt::render(&template, &bindings);
    let file_name = format!("{}.md", record.name);
    let path = generate_to_file(generator, &prompt_text, out_dir, &file_name).await?;
    info!(path = %path.display(), "Generated class documentation");
    Ok(path)
}

/// Run the full generation sequence for a working tree: the three
/// repository-level documents in order, then one document per class under
/// `api/`. A repository-level failure aborts; class failures are collected
/// in the report.
pub async fn generate_all<G>(
    ctx: &RunContext,
    generator: &G,
    templates: &TemplateStore,
    records: &[ClassRecord],
    working_tree: &Path,
) -> Result<GenerationReport, GenerateDocError>
where
    G: TextGenerator + Sync,
{
    let base = doc_root(working_tree);
    let api_dir = base.join(API_SUBDIR);

    let overview =
        generate_project_overview(generator, templates, records, &ctx.repo_name, &base).await?;
    let getting_started =
        generate_getting_started(generator, templates, records, &ctx.repo_name, &base).await?;
    let faq = generate_faq(generator, templates, records, &ctx.repo_name, &base).await?;

    let mut class_docs = Vec::new();
    let mut failures = Vec::new();
    for record in records {
        match generate_class_doc(generator, templates, record, &api_dir).await {
            Ok(path) => class_docs.push(path),
            Err(e) => {
                error!(
                    class = %record.fully_qualified_name(),
                    error = %e,
                    "Failed to generate class documentation, continuing"
                );
                failures.push(ClassDocFailure {
                    class_name: record.fully_qualified_name(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        run_id = %ctx.run_id,
        documents = 3 + class_docs.len(),
        failed_classes = failures.len(),
        "Documentation generation complete"
    );
    Ok(GenerationReport {
        overview,
        getting_started,
        faq,
        class_docs,
        failures,
    })
}
