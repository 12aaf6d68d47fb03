//! Default source scanner: a regex-based structural reader for Java files.
//!
//! This is deliberately an approximation, not a compiler front end. It
//! recognizes the first type declaration per file and single-line member
//! signatures; class members must carry an explicit modifier keyword, while
//! interface bodies also admit the implicitly public modifier-free form.
//! That is enough structure for the documentation aggregations. Anything it
//! cannot read it skips with a log line instead of failing the run.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::contract::{ParserError, SourceParser};
use crate::model::{ClassRecord, FieldRecord, MethodRecord, ParamRecord, TypeCategory};

pub struct JavaStructureScanner;

impl SourceParser for JavaStructureScanner {
    /// Collect every `.java` file under `root`, skipping `.git` and build
    /// output directories. Sorted so downstream order-sensitive
    /// aggregations are reproducible.
    fn find_source_files(&self, root: &Path) -> Result<Vec<PathBuf>, ParserError> {
        let mut files = Vec::new();
        visit_dir(root, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn parse_file(&self, path: &Path) -> Option<ClassRecord> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = ?e, "Skipping unreadable source file");
                return None;
            }
        };
        let record = scan_source(&text);
        if record.is_none() {
            debug!(path = %path.display(), "No type declaration found, skipping file");
        }
        record
    }
}

fn visit_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ParserError> {
    for entry_res in fs::read_dir(dir)? {
        let entry = entry_res?;
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            if name == ".git" || name == "target" {
                continue;
            }
            visit_dir(&path, out)?;
        } else if path.extension().map(|ext| ext == "java").unwrap_or(false) {
            out.push(path);
        }
    }
    Ok(())
}

/// Scan one source text into a [`ClassRecord`]. Returns `None` when no type
/// declaration is found.
pub fn scan_source(text: &str) -> Option<ClassRecord> {
    let package_re = Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").unwrap();
    let decl_re = Regex::new(
        r"(?m)^\s*((?:(?:public|protected|private|abstract|final|static|strictfp)\s+)*)(class|interface|enum)\s+(\w+)([^{]*)\{",
    )
    .unwrap();

    let decl = decl_re.captures(text)?;
    let whole = decl.get(0).unwrap();
    let modifiers = decl.get(1).map(|m| m.as_str()).unwrap_or("");
    let category = match &decl[2] {
        "interface" => TypeCategory::Interface,
        "enum" => TypeCategory::Enum,
        _ => TypeCategory::Class,
    };
    let name = decl[3].to_string();
    let tail = strip_generics(&decl[4]);

    let extends_list = Regex::new(r"\bextends\s+([\w.,\s]+?)(?:\s+implements\b|$)")
        .unwrap()
        .captures(&tail)
        .map(|c| split_type_list(&c[1]))
        .unwrap_or_default();
    let implements_list = Regex::new(r"\bimplements\s+([\w.,\s]+)$")
        .unwrap()
        .captures(&tail)
        .map(|c| split_type_list(&c[1]))
        .unwrap_or_default();
    // Interfaces list their supertypes after `extends`.
    let (superclass, interfaces) = match category {
        TypeCategory::Interface => (None, extends_list),
        _ => (extends_list.into_iter().next(), implements_list),
    };

    let package_name = package_re
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    let (annotations, description) = leading_trivia(&text[..whole.start()]);
    let (methods, fields) = scan_members(
        &text[whole.end()..],
        &name,
        matches!(category, TypeCategory::Interface),
    );
    let dependencies = scan_imports(text);

    Some(ClassRecord {
        name,
        package_name,
        category,
        is_public: modifiers.contains("public"),
        is_abstract: modifiers.contains("abstract"),
        superclass,
        interfaces,
        methods,
        fields,
        annotations,
        description,
        source_code: Some(text.to_string()),
        dependencies,
    })
}

/// Drop everything inside angle brackets so `extends`/`implements` lists
/// and parameter lists can be split on top-level commas.
fn strip_generics(s: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::new();
    for ch in s.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

fn split_type_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a parameter list on commas outside angle brackets.
fn split_top_level(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in raw.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.clone());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn parse_parameters(raw: &str) -> Vec<ParamRecord> {
    split_top_level(raw)
        .iter()
        .filter_map(|part| {
            let tokens: Vec<&str> = part
                .split_whitespace()
                .filter(|t| !t.starts_with('@') && *t != "final")
                .collect();
            let (name, type_tokens) = tokens.split_last()?;
            if type_tokens.is_empty() {
                return None;
            }
            Some(ParamRecord {
                type_name: type_tokens.join(" "),
                name: (*name).to_string(),
            })
        })
        .collect()
}

/// Walk backwards over the lines directly above a declaration, collecting
/// contiguous annotation lines and, above those, a closing Javadoc block.
fn leading_trivia(before: &str) -> (BTreeMap<String, String>, Option<String>) {
    let annotation_re = Regex::new(r"^@(\w+)").unwrap();
    let lines: Vec<&str> = before.lines().collect();
    let mut annotations = BTreeMap::new();
    let mut idx = lines.len();
    while idx > 0 {
        let trimmed = lines[idx - 1].trim();
        if trimmed.is_empty() {
            idx -= 1;
            continue;
        }
        if let Some(caps) = annotation_re.captures(trimmed) {
            annotations.insert(format!("@{}", &caps[1]), trimmed.to_string());
            idx -= 1;
            continue;
        }
        break;
    }

    let mut description = None;
    if idx > 0 && lines[idx - 1].trim().ends_with("*/") {
        let mut block = Vec::new();
        let mut j = idx - 1;
        loop {
            let trimmed = lines[j].trim();
            block.push(trimmed);
            if trimmed.starts_with("/**") || j == 0 {
                break;
            }
            j -= 1;
        }
        block.reverse();
        description = first_sentence(&block);
    }
    (annotations, description)
}

/// Clean a Javadoc block down to its first sentence.
fn first_sentence(block: &[&str]) -> Option<String> {
    let mut joined = String::new();
    for line in block {
        let cleaned = line
            .trim_start_matches("/**")
            .trim_end_matches("*/")
            .trim_start_matches('*')
            .trim();
        if cleaned.is_empty() || cleaned.starts_with('@') {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(cleaned);
    }
    let sentence = match joined.find('.') {
        Some(pos) => joined[..=pos].trim().to_string(),
        None => joined.trim().to_string(),
    };
    if sentence.is_empty() {
        None
    } else {
        Some(sentence)
    }
}

fn scan_members(
    body: &str,
    type_name: &str,
    is_interface: bool,
) -> (Vec<MethodRecord>, Vec<FieldRecord>) {
    let annotation_re = Regex::new(r"^\s*@(\w+)").unwrap();
    let method_re = Regex::new(
        r"^\s*((?:(?:public|protected|private|static|final|abstract|synchronized|native|default)\s+)+)([\w.<>\[\],\s]+?)\s+(\w+)\s*\(([^)]*)\)\s*(?:throws\s+([\w.,\s]+?))?\s*[{;]",
    )
    .unwrap();
    // Interface signatures may omit modifiers entirely; restrict the bare
    // form to `;`-terminated declarations so default-method bodies stay out.
    let bare_method_re = Regex::new(
        r"^\s*([\w.<>\[\],\s]+?)\s+(\w+)\s*\(([^)]*)\)\s*(?:throws\s+([\w.,\s]+?))?\s*;",
    )
    .unwrap();
    let constructor_re = Regex::new(&format!(
        r"^\s*(public|protected|private)\s+{type_name}\s*\(([^)]*)\)\s*(?:throws\s+([\w.,\s]+?))?\s*\{{",
    ))
    .unwrap();
    let field_re = Regex::new(
        r"^\s*((?:(?:public|protected|private|static|final|transient|volatile)\s+)+)([\w.<>\[\],\s]+?)\s+(\w+)\s*[=;]",
    )
    .unwrap();

    let mut methods = Vec::new();
    let mut fields = Vec::new();
    let mut pending_annotations: BTreeMap<String, String> = BTreeMap::new();
    let mut doc_lines: Vec<String> = Vec::new();
    let mut last_doc: Option<String> = None;
    let mut in_doc = false;

    for line in body.lines() {
        let trimmed = line.trim();
        if in_doc {
            if trimmed.ends_with("*/") {
                in_doc = false;
                doc_lines.push(trimmed.to_string());
                let borrowed: Vec<&str> = doc_lines.iter().map(String::as_str).collect();
                last_doc = first_sentence(&borrowed);
                doc_lines.clear();
            } else {
                doc_lines.push(trimmed.to_string());
            }
            continue;
        }
        if trimmed.starts_with("/**") {
            if trimmed.ends_with("*/") && trimmed.len() > 4 {
                last_doc = first_sentence(&[trimmed]);
            } else {
                in_doc = true;
                doc_lines.clear();
                doc_lines.push(trimmed.to_string());
            }
            continue;
        }
        if let Some(caps) = annotation_re.captures(line) {
            pending_annotations.insert(format!("@{}", &caps[1]), trimmed.to_string());
            continue;
        }

        if let Some(caps) = method_re.captures(line) {
            let modifiers = &caps[1];
            methods.push(MethodRecord {
                name: caps[3].to_string(),
                return_type: caps[2].trim().to_string(),
                parameters: parse_parameters(&caps[4]),
                throws: caps
                    .get(5)
                    .map(|m| split_type_list(m.as_str()))
                    .unwrap_or_default(),
                annotations: std::mem::take(&mut pending_annotations),
                is_public: modifiers.contains("public"),
                is_static: modifiers.contains("static"),
                is_abstract: modifiers.contains("abstract"),
                description: last_doc.take(),
            });
        } else if let Some(caps) = bare_interface_sig(&bare_method_re, is_interface, line) {
            methods.push(MethodRecord {
                name: caps[2].to_string(),
                return_type: caps[1].trim().to_string(),
                parameters: parse_parameters(&caps[3]),
                throws: caps
                    .get(4)
                    .map(|m| split_type_list(m.as_str()))
                    .unwrap_or_default(),
                annotations: std::mem::take(&mut pending_annotations),
                is_public: true,
                is_static: false,
                is_abstract: true,
                description: last_doc.take(),
            });
        } else if let Some(caps) = constructor_re.captures(line) {
            methods.push(MethodRecord {
                name: type_name.to_string(),
                return_type: "void".to_string(),
                parameters: parse_parameters(&caps[2]),
                throws: caps
                    .get(3)
                    .map(|m| split_type_list(m.as_str()))
                    .unwrap_or_default(),
                annotations: std::mem::take(&mut pending_annotations),
                is_public: caps[1].contains("public"),
                is_static: false,
                is_abstract: false,
                description: last_doc.take(),
            });
        } else if let Some(caps) = field_re.captures(line) {
            let modifiers = &caps[1];
            fields.push(FieldRecord {
                name: caps[3].to_string(),
                type_name: caps[2].trim().to_string(),
                annotations: std::mem::take(&mut pending_annotations),
                is_public: modifiers.contains("public"),
                is_static: modifiers.contains("static"),
                is_final: modifiers.contains("final"),
                description: last_doc.take(),
            });
        } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
            pending_annotations.clear();
            last_doc = None;
        }
    }
    (methods, fields)
}

/// Match a modifier-free signature, applicable only inside interface bodies.
/// Statement lines inside default-method bodies can look like bare
/// signatures (`return load(id);`); their leading keyword gives them away.
fn bare_interface_sig<'t>(
    re: &Regex,
    in_interface: bool,
    line: &'t str,
) -> Option<regex::Captures<'t>> {
    if !in_interface {
        return None;
    }
    let caps = re.captures(line)?;
    let leading = caps[1].split_whitespace().next().unwrap_or("");
    if matches!(
        leading,
        "return" | "throw" | "new" | "assert" | "yield" | "case" | "else"
    ) {
        return None;
    }
    Some(caps)
}

/// Explicit single-type imports, first-seen order. Wildcard and static
/// imports never match the pattern and are dropped.
fn scan_imports(text: &str) -> Vec<String> {
    let import_re = Regex::new(r"(?m)^\s*import\s+([\w.]+)\s*;").unwrap();
    let mut seen = HashSet::new();
    import_re
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .filter(|dep| seen.insert(dep.clone()))
        .collect()
}
