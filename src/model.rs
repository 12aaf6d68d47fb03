//! Structural code model: the parsed, language-agnostic representation of one
//! source type and its members.
//!
//! Records are produced by a [`SourceParser`](crate::contract::SourceParser)
//! implementation, held immutably for the duration of one run and discarded
//! afterwards. Nothing in this crate mutates a record after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of a parsed type. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeCategory {
    Class,
    Interface,
    Enum,
}

impl TypeCategory {
    /// Canonical uppercase spelling, as bound into prompt variables.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCategory::Class => "CLASS",
            TypeCategory::Interface => "INTERFACE",
            TypeCategory::Enum => "ENUM",
        }
    }
}

/// One parsed type (class, interface or enum) with its members.
///
/// Annotation keys carry their leading `@` and are unique; `dependencies`
/// holds externally referenced type names, deduplicated by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Simple name, e.g. `OrderService`.
    pub name: String,
    /// Declaring package; empty string means the default package.
    pub package_name: String,
    pub category: TypeCategory,
    pub is_public: bool,
    pub is_abstract: bool,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodRecord>,
    pub fields: Vec<FieldRecord>,
    pub annotations: BTreeMap<String, String>,
    pub description: Option<String>,
    pub source_code: Option<String>,
    pub dependencies: Vec<String>,
}

impl ClassRecord {
    /// `package.Name` when the package is non-empty, else the simple name.
    pub fn fully_qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package_name, self.name)
        }
    }

    /// Whether any method is a static `main`, the heuristic proxy for
    /// "this is a runnable program".
    pub fn has_main_method(&self) -> bool {
        self.methods.iter().any(|m| m.name == "main" && m.is_static)
    }

    /// Methods whose name equals the owning type's simple name. Heuristic
    /// constructor detection; not reliable for nested/inner classes.
    pub fn constructor_candidates(&self) -> impl Iterator<Item = &MethodRecord> {
        self.methods.iter().filter(|m| m.name == self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<ParamRecord>,
    /// Declared thrown exception names, in declaration order.
    pub throws: Vec<String>,
    pub annotations: BTreeMap<String, String>,
    pub is_public: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRecord {
    pub type_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    pub type_name: String,
    pub annotations: BTreeMap<String, String>,
    pub is_public: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub description: Option<String>,
}
