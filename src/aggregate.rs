//! Pure aggregations over parsed class records.
//!
//! Everything in this module is deterministic for a given input slice: no
//! IO, no clock, no environment. The returned strings feed prompt-template
//! bindings, so line formats and fallback wordings are part of the contract
//! and covered by tests.

use std::collections::{BTreeMap, HashSet};

use crate::model::{ClassRecord, MethodRecord, TypeCategory};

/// Shared placeholder for records and members without a description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Type-name fragments that mark a method as doing file IO.
const FILE_IO_TYPE_TOKENS: &[&str] = &["Path", "File"];
/// Type-name fragments that mark a method as doing network IO.
const NETWORK_TYPE_TOKENS: &[&str] = &["Http", "URL"];
/// Type-name fragments that mark a method as configuration-related.
const CONFIG_TYPE_TOKENS: &[&str] = &["Properties"];
/// Method-name fragment (case-insensitive) hinting at network IO.
const NETWORK_NAME_TOKEN: &str = "connect";
/// Method-name fragment (case-insensitive) hinting at configuration.
const CONFIG_NAME_TOKEN: &str = "config";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryCounts {
    pub total: usize,
    pub classes: usize,
    pub interfaces: usize,
    pub enums: usize,
}

/// Method counts per behavioral pattern, used by the FAQ document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternCounts {
    pub file_io: usize,
    pub network: usize,
    pub config: usize,
}

pub fn category_counts(records: &[ClassRecord]) -> CategoryCounts {
    let mut counts = CategoryCounts {
        total: records.len(),
        ..CategoryCounts::default()
    };
    for record in records {
        match record.category {
            TypeCategory::Class => counts.classes += 1,
            TypeCategory::Interface => counts.interfaces += 1,
            TypeCategory::Enum => counts.enums += 1,
        }
    }
    counts
}

/// One line per package, `- {package} ({n} classes)`, sorted by package
/// name. The empty package renders as `default package`.
pub fn package_histogram(records: &[ClassRecord]) -> String {
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *groups.entry(record.package_name.as_str()).or_insert(0) += 1;
    }
    groups
        .iter()
        .map(|(package, count)| {
            let label = if package.is_empty() {
                "default package"
            } else {
                package
            };
            format!("- {label} ({count} classes)")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per record, `- {fqn} ({CATEGORY}): {description}`.
pub fn class_summary(records: &[ClassRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "- {} ({}): {}",
                record.fully_qualified_name(),
                record.category.as_str(),
                record.description.as_deref().unwrap_or(NO_DESCRIPTION)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fully qualified names of records with a static `main` method, one per
/// line. Empty when there are none.
pub fn entry_points(records: &[ClassRecord]) -> String {
    records
        .iter()
        .filter(|record| record.has_main_method())
        .map(|record| record.fully_qualified_name())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Entry points, or when there are none the fully qualified names of up to
/// five public records as a stand-in. Empty only when both sets are empty.
pub fn entry_points_or_top_public(records: &[ClassRecord]) -> String {
    let mains = entry_points(records);
    if !mains.is_empty() {
        return mains;
    }
    records
        .iter()
        .filter(|record| record.is_public)
        .take(5)
        .map(|record| record.fully_qualified_name())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Narrative wrapper around [`entry_points`]: lists entry points when any
/// exist, otherwise states that the tree looks like a library.
pub fn entry_point_analysis(records: &[ClassRecord]) -> String {
    let mains = entry_points(records);
    if mains.is_empty() {
        "No main methods found. This appears to be a library project.".to_string()
    } else {
        format!("Entry points identified:\n{mains}")
    }
}

/// Up to `limit` public, non-enum records as
/// `- {name} ({category}): {description}` with the category lowercased.
pub fn public_api_sample(records: &[ClassRecord], limit: usize) -> String {
    records
        .iter()
        .filter(|record| record.is_public && record.category != TypeCategory::Enum)
        .take(limit)
        .map(|record| {
            format!(
                "- {} ({}): {}",
                record.name,
                record.category.as_str().to_ascii_lowercase(),
                record.description.as_deref().unwrap_or(NO_DESCRIPTION)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Distinct imported dependencies across all records, first-seen order,
/// with the `java.` standard library filtered out, capped at `limit`.
pub fn external_dependencies(records: &[ClassRecord], limit: usize) -> String {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|record| record.dependencies.iter())
        .filter(|dep| seen.insert(dep.as_str()))
        .filter(|dep| !dep.starts_with("java."))
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Distinct declared exception types across all methods, first-seen order,
/// one per line.
pub fn exception_inventory(records: &[ClassRecord]) -> String {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|record| record.methods.iter())
        .flat_map(|method| method.throws.iter())
        .filter(|exc| seen.insert(exc.as_str()))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per throwing method,
/// `- {Class}.{method}() throws: {a, b}`, attributed to the owning record.
pub fn exception_methods(records: &[ClassRecord]) -> String {
    records
        .iter()
        .flat_map(|record| {
            record
                .methods
                .iter()
                .filter(|method| !method.throws.is_empty())
                .map(move |method| {
                    format!(
                        "- {}.{}() throws: {}",
                        record.name,
                        method.name,
                        method.throws.join(", ")
                    )
                })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn type_mentions(method: &MethodRecord, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| method.return_type.contains(token))
        || method
            .parameters
            .iter()
            .any(|param| tokens.iter().any(|token| param.type_name.contains(token)))
}

pub fn is_file_io_method(method: &MethodRecord) -> bool {
    type_mentions(method, FILE_IO_TYPE_TOKENS)
}

pub fn is_network_method(method: &MethodRecord) -> bool {
    type_mentions(method, NETWORK_TYPE_TOKENS)
        || method.name.to_ascii_lowercase().contains(NETWORK_NAME_TOKEN)
}

pub fn is_config_method(method: &MethodRecord) -> bool {
    CONFIG_TYPE_TOKENS
        .iter()
        .any(|token| method.return_type.contains(token))
        || method.name.to_ascii_lowercase().contains(CONFIG_NAME_TOKEN)
}

/// Count methods across all records that match each behavioral pattern.
/// A method can contribute to more than one bucket.
pub fn pattern_counts(records: &[ClassRecord]) -> PatternCounts {
    let mut counts = PatternCounts::default();
    for method in records.iter().flat_map(|record| record.methods.iter()) {
        if is_file_io_method(method) {
            counts.file_io += 1;
        }
        if is_network_method(method) {
            counts.network += 1;
        }
        if is_config_method(method) {
            counts.config += 1;
        }
    }
    counts
}

/// Render non-zero pattern counts as bullet lines. Falls back to
/// `Standard Java operations` when nothing matched.
pub fn common_patterns(counts: &PatternCounts) -> String {
    let mut out = String::new();
    if counts.file_io > 0 {
        out.push_str(&format!(
            "- File I/O operations ({} methods)\n",
            counts.file_io
        ));
    }
    if counts.network > 0 {
        out.push_str(&format!("- Network operations ({} methods)\n", counts.network));
    }
    if counts.config > 0 {
        out.push_str(&format!(
            "- Configuration operations ({} methods)\n",
            counts.config
        ));
    }
    if out.is_empty() {
        out = "Standard Java operations".to_string();
    }
    out
}

/// Render the risk angle of the same pattern counts. Falls back to
/// `Standard Java runtime issues`.
pub fn potential_issues(counts: &PatternCounts) -> String {
    let mut out = String::new();
    if counts.file_io > 0 {
        out.push_str("- File I/O operations may cause permission or path issues\n");
    }
    if counts.network > 0 {
        out.push_str("- Network connectivity and timeout issues\n");
    }
    if counts.config > 0 {
        out.push_str("- Configuration and properties setup issues\n");
    }
    if out.is_empty() {
        out = "Standard Java runtime issues".to_string();
    }
    out
}

/// Up to five records that look complex, either by method count (more than
/// ten) or by implementing at least one interface, as
/// `- {name} ({n} methods)`.
pub fn complexity_ranking(records: &[ClassRecord]) -> String {
    records
        .iter()
        .filter(|record| record.methods.len() > 10 || !record.interfaces.is_empty())
        .take(5)
        .map(|record| format!("- {} ({} methods)", record.name, record.methods.len()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coarse technology labels derived from annotations and naming, joined
/// with `, `. Defaults to `Core Java`.
pub fn technology_stack(records: &[ClassRecord]) -> String {
    let mut stack = Vec::new();
    if records.iter().any(|record| {
        record.annotations.contains_key("@RestController")
            || record.annotations.contains_key("@Controller")
    }) {
        stack.push("Spring Boot Web");
    }
    if records
        .iter()
        .any(|record| record.annotations.contains_key("@Entity"))
    {
        stack.push("JPA/Hibernate");
    }
    if records.iter().any(|record| record.name.contains("Test")) {
        stack.push("JUnit Testing");
    }
    if stack.is_empty() {
        "Core Java".to_string()
    } else {
        stack.join(", ")
    }
}

/// Up to three public records that expose at least one public method, as
/// `- {name}: Primary public API class`.
pub fn api_usage_sample(records: &[ClassRecord]) -> String {
    records
        .iter()
        .filter(|record| record.is_public && record.methods.iter().any(|m| m.is_public))
        .take(3)
        .map(|record| format!("- {}: Primary public API class", record.name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn visibility(is_public: bool) -> &'static str {
    if is_public {
        "public"
    } else {
        "private/protected"
    }
}

fn annotation_suffix(annotations: &BTreeMap<String, String>) -> String {
    if annotations.is_empty() {
        String::new()
    } else {
        format!(
            " [Annotations: {}]",
            annotations.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        )
    }
}

fn description_suffix(description: Option<&str>) -> String {
    description.map(|d| format!(": {d}")).unwrap_or_default()
}

fn parameter_list(method: &MethodRecord) -> String {
    method
        .parameters
        .iter()
        .map(|param| format!("{} {}", param.type_name, param.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per method of a record:
/// `- {visibility} {static }{abstract }{return} {name}({params})[ annotations][: description]`.
pub fn method_details(record: &ClassRecord) -> String {
    record
        .methods
        .iter()
        .map(|method| {
            let mut modifiers = String::new();
            if method.is_static {
                modifiers.push_str("static ");
            }
            if method.is_abstract {
                modifiers.push_str("abstract ");
            }
            format!(
                "- {} {}{} {}({}){}{}",
                visibility(method.is_public),
                modifiers,
                method.return_type,
                method.name,
                parameter_list(method),
                annotation_suffix(&method.annotations),
                description_suffix(method.description.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per field of a record:
/// `- {visibility} {static }{final }{type} {name}[ annotations][: description]`.
pub fn field_details(record: &ClassRecord) -> String {
    record
        .fields
        .iter()
        .map(|field| {
            let mut modifiers = String::new();
            if field.is_static {
                modifiers.push_str("static ");
            }
            if field.is_final {
                modifiers.push_str("final ");
            }
            format!(
                "- {} {}{} {}{}{}",
                visibility(field.is_public),
                modifiers,
                field.type_name,
                field.name,
                annotation_suffix(&field.annotations),
                description_suffix(field.description.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per constructor, detected as a method sharing the record name.
pub fn constructor_details(record: &ClassRecord) -> String {
    record
        .constructor_candidates()
        .map(|method| {
            format!(
                "- {} {}({}){}",
                visibility(method.is_public),
                method.name,
                parameter_list(method),
                description_suffix(method.description.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Class-level annotation keys joined with `, `, or `None`.
pub fn class_annotations(record: &ClassRecord) -> String {
    if record.annotations.is_empty() {
        "None".to_string()
    } else {
        record
            .annotations
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `Extends:` and `Implements:` lines for a record. An `Object` superclass
/// does not count as explicit inheritance.
pub fn inheritance_summary(record: &ClassRecord) -> String {
    let mut out = String::new();
    if let Some(superclass) = record.superclass.as_deref() {
        if superclass != "Object" {
            out.push_str("Extends: ");
            out.push_str(superclass);
        }
    }
    if !record.interfaces.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Implements: ");
        out.push_str(&record.interfaces.join(", "));
    }
    if out.is_empty() {
        out = "No explicit inheritance".to_string();
    }
    out
}

/// Bullet list of the roles a single record appears to play, derived from
/// its main method, category and annotations. Defaults to
/// `Standard Java class`.
pub fn usage_patterns(record: &ClassRecord) -> String {
    let mut out = String::new();
    if record.has_main_method() {
        out.push_str("- Entry point class (contains main method)\n");
    }
    if record.category == TypeCategory::Interface {
        out.push_str("- Interface definition\n");
    }
    if record.annotations.contains_key("@Service") || record.annotations.contains_key("@Component")
    {
        out.push_str("- Spring service/component\n");
    }
    if record.annotations.contains_key("@RestController")
        || record.annotations.contains_key("@Controller")
    {
        out.push_str("- Web controller\n");
    }
    if record.annotations.contains_key("@Entity") || record.annotations.contains_key("@Table") {
        out.push_str("- JPA entity/data model\n");
    }
    if out.is_empty() {
        out = "Standard Java class".to_string();
    }
    out
}
