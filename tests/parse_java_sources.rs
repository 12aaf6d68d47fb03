use std::fs::{self, create_dir_all};

use tempfile::tempdir;

use repodoc::contract::SourceParser;
use repodoc::model::TypeCategory;
use repodoc::parse::{scan_source, JavaStructureScanner};

const WIDGET_LOADER: &str = r#"
package com.acme.widgets;

import java.util.List;
import java.nio.file.Path;
import com.fasterxml.jackson.databind.ObjectMapper;
import java.util.*;
import static java.util.Objects.requireNonNull;

/**
 * Loads widgets from disk. Heavy lifting happens lazily.
 */
@Service
public class WidgetLoader extends BaseLoader implements Loader, AutoCloseable {

    private static final int MAX_DEPTH = 8;
    private final Path root;

    public WidgetLoader(Path root) {
        this.root = root;
    }

    /**
     * Returns every widget under the root.
     */
    public List<Widget> loadAll() throws IOException, WidgetFormatException {
        return scan(root);
    }

    @Override
    public void close() {
    }

    public static void main(String[] args) {
        new WidgetLoader(Path.of(args[0])).loadAll();
    }
}
"#;

#[test]
fn test_scan_source_reads_class_structure() {
    let record = scan_source(WIDGET_LOADER).expect("source should yield a record");

    assert_eq!(record.name, "WidgetLoader");
    assert_eq!(record.package_name, "com.acme.widgets");
    assert_eq!(record.fully_qualified_name(), "com.acme.widgets.WidgetLoader");
    assert_eq!(record.category, TypeCategory::Class);
    assert!(record.is_public);
    assert!(!record.is_abstract);
    assert_eq!(record.superclass.as_deref(), Some("BaseLoader"));
    assert_eq!(record.interfaces, vec!["Loader", "AutoCloseable"]);
    assert!(record.annotations.contains_key("@Service"));
    assert_eq!(
        record.description.as_deref(),
        Some("Loads widgets from disk.")
    );
    assert!(record
        .source_code
        .as_deref()
        .is_some_and(|s| s.contains("class WidgetLoader")));
}

#[test]
fn test_scan_source_collects_members() {
    let record = scan_source(WIDGET_LOADER).unwrap();

    assert!(record.has_main_method());
    assert_eq!(record.constructor_candidates().count(), 1);

    let load_all = record
        .methods
        .iter()
        .find(|m| m.name == "loadAll")
        .expect("loadAll should be recognized");
    assert_eq!(load_all.return_type, "List<Widget>");
    assert!(load_all.is_public);
    assert_eq!(
        load_all.throws,
        vec!["IOException", "WidgetFormatException"]
    );
    assert_eq!(
        load_all.description.as_deref(),
        Some("Returns every widget under the root.")
    );

    let close = record.methods.iter().find(|m| m.name == "close").unwrap();
    assert!(close.annotations.contains_key("@Override"));

    let field = record.fields.iter().find(|f| f.name == "MAX_DEPTH").unwrap();
    assert!(field.is_static);
    assert!(field.is_final);
    assert!(!field.is_public);
    assert_eq!(field.type_name, "int");

    let root = record.fields.iter().find(|f| f.name == "root").unwrap();
    assert_eq!(root.type_name, "Path");
}

#[test]
fn test_scan_source_keeps_explicit_imports_only() {
    let record = scan_source(WIDGET_LOADER).unwrap();
    assert_eq!(
        record.dependencies,
        vec![
            "java.util.List",
            "java.nio.file.Path",
            "com.fasterxml.jackson.databind.ObjectMapper",
        ]
    );
}

#[test]
fn test_scan_source_interface_supertypes() {
    let source = r"
package com.acme;

public interface Loader extends Readable, AutoCloseable {
    Widget load(String id);
}
";
    let record = scan_source(source).unwrap();
    assert_eq!(record.category, TypeCategory::Interface);
    assert_eq!(record.superclass, None);
    assert_eq!(record.interfaces, vec!["Readable", "AutoCloseable"]);
}

#[test]
fn test_scan_source_interface_methods_without_modifiers() {
    let source = r"
package com.acme;

public interface Loader {

    /**
     * Loads one widget by id.
     */
    Widget load(String id) throws WidgetFormatException;

    List<Widget> loadAll();

    default Widget reload(String id) {
        evict(id);
        return load(id);
    }
}
";
    let record = scan_source(source).unwrap();

    let load = record
        .methods
        .iter()
        .find(|m| m.name == "load")
        .expect("bare signature should be recognized");
    assert_eq!(load.return_type, "Widget");
    assert!(load.is_public);
    assert!(load.is_abstract);
    assert_eq!(load.throws, vec!["WidgetFormatException"]);
    assert_eq!(load.description.as_deref(), Some("Loads one widget by id."));

    let load_all = record.methods.iter().find(|m| m.name == "loadAll").unwrap();
    assert_eq!(load_all.return_type, "List<Widget>");
    assert!(load_all.parameters.is_empty());

    // Statements inside the default method body are not members.
    let names: Vec<_> = record.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["load", "loadAll", "reload"]);
}

#[test]
fn test_scan_source_enum_declaration() {
    let source = r"
package com.acme;

public enum Color implements Printable {
    RED, GREEN;
}
";
    let record = scan_source(source).unwrap();
    assert_eq!(record.category, TypeCategory::Enum);
    assert_eq!(record.interfaces, vec!["Printable"]);
}

#[test]
fn test_scan_source_without_type_declaration() {
    assert!(scan_source("package com.acme;\n// just a comment\n").is_none());
}

#[test]
fn test_find_source_files_skips_git_and_target() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_dir_all(root.join("src/app")).unwrap();
    create_dir_all(root.join(".git/objects")).unwrap();
    create_dir_all(root.join("target/classes")).unwrap();
    fs::write(root.join("src/app/Main.java"), "public class Main {}").unwrap();
    fs::write(root.join("App.java"), "public class App {}").unwrap();
    fs::write(root.join("notes.txt"), "not java").unwrap();
    fs::write(root.join(".git/objects/Sneaky.java"), "class Sneaky {}").unwrap();
    fs::write(root.join("target/classes/Gen.java"), "class Gen {}").unwrap();

    let scanner = JavaStructureScanner;
    let files = scanner
        .find_source_files(root)
        .expect("discovery should succeed");

    let names: Vec<_> = files
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["App.java", "src/app/Main.java"]);
}

#[test]
fn test_parse_file_returns_none_for_unreadable_path() {
    let tmp = tempdir().unwrap();
    let scanner = JavaStructureScanner;
    assert!(scanner.parse_file(&tmp.path().join("missing.java")).is_none());
}
