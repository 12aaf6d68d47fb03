use std::collections::BTreeMap;

use repodoc::aggregate::{
    api_usage_sample, category_counts, class_summary, common_patterns, complexity_ranking,
    entry_point_analysis, entry_points, entry_points_or_top_public, exception_inventory,
    exception_methods, external_dependencies, field_details, inheritance_summary, method_details,
    package_histogram, pattern_counts, potential_issues, public_api_sample, technology_stack,
    usage_patterns, PatternCounts,
};
use repodoc::model::{ClassRecord, FieldRecord, MethodRecord, ParamRecord, TypeCategory};

fn class(name: &str, package: &str) -> ClassRecord {
    ClassRecord {
        name: name.to_string(),
        package_name: package.to_string(),
        category: TypeCategory::Class,
        is_public: true,
        is_abstract: false,
        superclass: None,
        interfaces: Vec::new(),
        methods: Vec::new(),
        fields: Vec::new(),
        annotations: BTreeMap::new(),
        description: None,
        source_code: None,
        dependencies: Vec::new(),
    }
}

fn method(name: &str, return_type: &str) -> MethodRecord {
    MethodRecord {
        name: name.to_string(),
        return_type: return_type.to_string(),
        parameters: Vec::new(),
        throws: Vec::new(),
        annotations: BTreeMap::new(),
        is_public: true,
        is_static: false,
        is_abstract: false,
        description: None,
    }
}

fn main_method() -> MethodRecord {
    MethodRecord {
        is_static: true,
        parameters: vec![ParamRecord {
            type_name: "String[]".to_string(),
            name: "args".to_string(),
        }],
        ..method("main", "void")
    }
}

#[test]
fn test_category_counts_by_kind() {
    let mut records = vec![
        class("A", "p"),
        class("B", "p"),
        class("C", "p"),
        class("I", "p"),
        class("E", "p"),
    ];
    records[3].category = TypeCategory::Interface;
    records[4].category = TypeCategory::Enum;

    let counts = category_counts(&records);
    assert_eq!(counts.total, 5);
    assert_eq!(counts.classes, 3);
    assert_eq!(counts.interfaces, 1);
    assert_eq!(counts.enums, 1);
}

#[test]
fn test_package_histogram_is_sorted_and_names_default_package() {
    let records = vec![
        class("B1", "b.pkg"),
        class("A1", "a.pkg"),
        class("Loose", ""),
        class("B2", "b.pkg"),
    ];
    let histogram = package_histogram(&records);
    assert_eq!(
        histogram,
        "- default package (1 classes)\n- a.pkg (1 classes)\n- b.pkg (2 classes)"
    );
}

#[test]
fn test_class_summary_uses_description_fallback() {
    let mut described = class("Svc", "com.x");
    described.description = Some("Does things.".to_string());
    let bare = class("Raw", "com.x");

    let summary = class_summary(&[described, bare]);
    assert_eq!(
        summary,
        "- com.x.Svc (CLASS): Does things.\n- com.x.Raw (CLASS): No description available"
    );
}

#[test]
fn test_entry_points_lists_main_classes_without_bullets() {
    let mut app = class("App", "com.x");
    app.methods.push(main_method());
    let records = vec![app, class("Other", "com.x")];

    assert_eq!(entry_points(&records), "com.x.App");
    assert_eq!(entry_points_or_top_public(&records), "com.x.App");
}

#[test]
fn test_entry_points_ignore_main_visibility() {
    let mut app = class("Tool", "com.x");
    let mut main = main_method();
    main.is_public = false;
    app.methods.push(main);

    assert_eq!(entry_points(&[app]), "com.x.Tool");
}

#[test]
fn test_entry_points_fall_back_to_five_public_classes() {
    let mut records: Vec<ClassRecord> = (0..7).map(|i| class(&format!("C{i}"), "p")).collect();
    records[0].is_public = false;

    assert_eq!(entry_points(&records), "");
    let fallback = entry_points_or_top_public(&records);
    assert_eq!(fallback.lines().count(), 5);
    assert_eq!(fallback.lines().next(), Some("p.C1"));
    assert!(!fallback.contains("p.C0"));
}

#[test]
fn test_entry_point_analysis_wording() {
    let mut app = class("App", "com.x");
    app.methods.push(main_method());
    assert_eq!(
        entry_point_analysis(&[app]),
        "Entry points identified:\ncom.x.App"
    );
    assert_eq!(
        entry_point_analysis(&[class("Lib", "com.x")]),
        "No main methods found. This appears to be a library project."
    );
}

#[test]
fn test_public_api_sample_skips_enums_and_respects_limit() {
    let mut records: Vec<ClassRecord> = (0..4).map(|i| class(&format!("C{i}"), "p")).collect();
    records[1].category = TypeCategory::Enum;
    records[2].is_public = false;

    let sample = public_api_sample(&records, 1);
    assert_eq!(sample, "- C0 (class): No description available");

    let sample = public_api_sample(&records, 10);
    assert_eq!(sample.lines().count(), 2);
    assert!(sample.contains("- C3 (class):"));
}

#[test]
fn test_external_dependencies_filter_dedup_and_order() {
    let mut a = class("A", "p");
    a.dependencies = vec![
        "java.util.List".to_string(),
        "com.example.Foo".to_string(),
        "java.io.File".to_string(),
    ];
    let mut b = class("B", "p");
    b.dependencies = vec!["com.example.Foo".to_string(), "org.acme.Bar".to_string()];

    assert_eq!(
        external_dependencies(&[a.clone(), b.clone()], 15),
        "com.example.Foo\norg.acme.Bar"
    );
    assert_eq!(external_dependencies(&[a, b], 1), "com.example.Foo");
}

#[test]
fn test_exception_inventory_and_methods_name_owner() {
    let mut svc = class("Svc", "p");
    let mut load = method("load", "String");
    load.throws = vec!["IOException".to_string(), "SQLException".to_string()];
    svc.methods.push(load);
    let mut other = class("Other", "p");
    let mut ping = method("ping", "void");
    ping.throws = vec!["IOException".to_string()];
    other.methods.push(ping);

    let records = vec![svc, other];
    assert_eq!(exception_inventory(&records), "IOException\nSQLException");
    assert_eq!(
        exception_methods(&records),
        "- Svc.load() throws: IOException, SQLException\n- Other.ping() throws: IOException"
    );
}

#[test]
fn test_pattern_counts_classify_methods() {
    let mut svc = class("Svc", "p");
    svc.methods.push(method("readManifest", "Path"));
    svc.methods.push(method("connectRemote", "void"));
    svc.methods.push(method("loadConfig", "void"));
    svc.methods.push(method("plain", "void"));
    let mut writer = class("Writer", "p");
    let mut save = method("save", "void");
    save.parameters.push(ParamRecord {
        type_name: "File".to_string(),
        name: "dest".to_string(),
    });
    writer.methods.push(save);

    let counts = pattern_counts(&[svc, writer]);
    assert_eq!(counts.file_io, 2);
    assert_eq!(counts.network, 1);
    assert_eq!(counts.config, 1);
}

#[test]
fn test_common_patterns_and_potential_issues_rendering() {
    let counts = PatternCounts {
        file_io: 2,
        network: 1,
        config: 0,
    };
    assert_eq!(
        common_patterns(&counts),
        "- File I/O operations (2 methods)\n- Network operations (1 methods)\n"
    );
    assert_eq!(
        potential_issues(&counts),
        "- File I/O operations may cause permission or path issues\n- Network connectivity and timeout issues\n"
    );

    let none = PatternCounts::default();
    assert_eq!(common_patterns(&none), "Standard Java operations");
    assert_eq!(potential_issues(&none), "Standard Java runtime issues");
}

#[test]
fn test_complexity_ranking_by_methods_or_interfaces() {
    let mut big = class("Big", "p");
    for i in 0..11 {
        big.methods.push(method(&format!("m{i}"), "void"));
    }
    let mut impls = class("Impls", "p");
    impls.interfaces.push("Runnable".to_string());
    let simple = class("Simple", "p");

    let ranking = complexity_ranking(&[big, impls, simple]);
    assert_eq!(ranking, "- Big (11 methods)\n- Impls (0 methods)");
}

#[test]
fn test_technology_stack_labels() {
    let mut web = class("Api", "p");
    web.annotations
        .insert("@RestController".to_string(), "@RestController".to_string());
    let mut entity = class("Order", "p");
    entity
        .annotations
        .insert("@Entity".to_string(), "@Entity".to_string());
    let tested = class("OrderTest", "p");

    assert_eq!(
        technology_stack(&[web, entity, tested]),
        "Spring Boot Web, JPA/Hibernate, JUnit Testing"
    );
    assert_eq!(technology_stack(&[class("Plain", "p")]), "Core Java");
}

#[test]
fn test_api_usage_sample_takes_three_public_classes() {
    let mut records: Vec<ClassRecord> = (0..5).map(|i| class(&format!("C{i}"), "p")).collect();
    for record in records.iter_mut() {
        record.methods.push(method("go", "void"));
    }
    records[0].is_public = false;
    records[2].methods[0].is_public = false;

    let sample = api_usage_sample(&records);
    assert_eq!(
        sample,
        "- C1: Primary public API class\n- C3: Primary public API class\n- C4: Primary public API class"
    );
}

#[test]
fn test_method_details_line_format() {
    let mut record = class("App", "p");
    let mut run = main_method();
    run.annotations
        .insert("@Override".to_string(), "@Override".to_string());
    run.description = Some("Starts the app.".to_string());
    record.methods.push(run);
    let mut helper = method("helper", "int");
    helper.is_public = false;
    record.methods.push(helper);

    assert_eq!(
        method_details(&record),
        "- public static void main(String[] args) [Annotations: @Override]: Starts the app.\n- private/protected int helper()"
    );
}

#[test]
fn test_field_details_line_format() {
    let mut record = class("App", "p");
    record.fields.push(FieldRecord {
        name: "VERSION".to_string(),
        type_name: "String".to_string(),
        annotations: BTreeMap::new(),
        is_public: true,
        is_static: true,
        is_final: true,
        description: Some("Build version.".to_string()),
    });

    assert_eq!(
        field_details(&record),
        "- public static final String VERSION: Build version."
    );
}

#[test]
fn test_inheritance_summary_ignores_object_superclass() {
    let mut record = class("App", "p");
    record.superclass = Some("Object".to_string());
    record.interfaces.push("Runnable".to_string());
    assert_eq!(inheritance_summary(&record), "Implements: Runnable");

    let mut derived = class("Derived", "p");
    derived.superclass = Some("Base".to_string());
    derived.interfaces.push("Closeable".to_string());
    assert_eq!(
        inheritance_summary(&derived),
        "Extends: Base\nImplements: Closeable"
    );

    assert_eq!(
        inheritance_summary(&class("Plain", "p")),
        "No explicit inheritance"
    );
}

#[test]
fn test_usage_patterns_flags() {
    let mut record = class("App", "p");
    record.methods.push(main_method());
    record
        .annotations
        .insert("@Service".to_string(), "@Service".to_string());

    let patterns = usage_patterns(&record);
    assert!(patterns.contains("- Entry point class (contains main method)\n"));
    assert!(patterns.contains("- Spring service/component\n"));

    assert_eq!(usage_patterns(&class("Plain", "p")), "Standard Java class");
}

#[test]
fn test_aggregations_are_deterministic() {
    let mut a = class("A", "z.pkg");
    a.dependencies = vec!["org.x.Y".to_string()];
    let records = vec![a, class("B", "a.pkg")];

    assert_eq!(class_summary(&records), class_summary(&records));
    assert_eq!(package_histogram(&records), package_histogram(&records));
    assert_eq!(
        external_dependencies(&records, 10),
        external_dependencies(&records, 10)
    );
}
