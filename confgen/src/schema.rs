//! Type naming and schema collection.
//!
//! Every table (and array-of-tables element) in the tree gets a record
//! type in the generated source. The type's name is derived purely from
//! the structural path to the node — never from its contents — so the
//! catalog is deterministic and idempotent across runs on the same
//! tree: `[database.credentials]` becomes `DatabaseCredentialsConfig`,
//! `[[servers]]` becomes `ServersItem`.

use std::collections::BTreeMap;

use crate::value::{ConfigTable, ConfigValue};

/// The kind of record type a node maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A table; type names end in `Config`.
    Config,
    /// An array-of-tables element; type names end in `Item`.
    Item,
}

impl TypeKind {
    fn suffix(self) -> &'static str {
        match self {
            TypeKind::Config => "Config",
            TypeKind::Item => "Item",
        }
    }
}

/// One collected record type: its name, the path segments that derived
/// it, and the fields of its defining occurrence.
#[derive(Debug)]
pub struct StructSchema<'a> {
    /// The derived type name.
    pub name: String,

    /// Path segments from the root to the node.
    pub env_path: Vec<String>,

    /// Field set, taken from the first occurrence. For an
    /// array-of-tables this is the first element's table.
    pub fields: &'a ConfigTable,
}

/// Deduplicated catalog of record types, ordered by type name.
#[derive(Debug, Default)]
pub struct SchemaCatalog<'a> {
    map: BTreeMap<String, StructSchema<'a>>,
}

impl<'a> SchemaCatalog<'a> {
    /// Iterate schemas in lexicographic type-name order.
    pub fn iter(&self) -> impl Iterator<Item = &StructSchema<'a>> {
        self.map.values()
    }

    /// The ordered list of type names.
    pub fn names(&self) -> Vec<&str> {
        self.map.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    fn visit(&mut self, name: String, path: Vec<String>, fields: &'a ConfigTable) {
        // Dedup key is the name; the first occurrence wins and later
        // ones are skipped entirely.
        if self.map.contains_key(&name) {
            return;
        }
        self.map.insert(
            name.clone(),
            StructSchema {
                name: name.clone(),
                env_path: path.clone(),
                fields,
            },
        );

        for (key, value) in fields {
            match value {
                ConfigValue::Table(table) => {
                    let child = type_name(Some(&name), key, TypeKind::Config);
                    let mut child_path = path.clone();
                    child_path.push(key.clone());
                    self.visit(child, child_path, table);
                }
                ConfigValue::ArrayOfTables(items) => {
                    if let Some(first) = items.first() {
                        let child = type_name(Some(&name), key, TypeKind::Item);
                        let mut child_path = path.clone();
                        child_path.push(key.clone());
                        self.visit(child, child_path, first);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Walk the tree once and collect every record type.
pub fn collect(tree: &ConfigTable) -> SchemaCatalog<'_> {
    let mut catalog = SchemaCatalog::default();
    for (key, value) in tree {
        match value {
            ConfigValue::Table(table) => {
                catalog.visit(
                    type_name(None, key, TypeKind::Config),
                    vec![key.clone()],
                    table,
                );
            }
            ConfigValue::ArrayOfTables(items) => {
                if let Some(first) = items.first() {
                    catalog.visit(
                        type_name(None, key, TypeKind::Item),
                        vec![key.clone()],
                        first,
                    );
                }
            }
            _ => {}
        }
    }
    catalog
}

/// Derive the type name for a node from its parent's name and its key.
///
/// The parent's kind suffix is stripped before concatenation, so a
/// `tls` table under `ServerConfig` becomes `ServerTlsConfig`.
pub fn type_name(parent: Option<&str>, key: &str, kind: TypeKind) -> String {
    match parent {
        Some(parent) => format!(
            "{}{}{}",
            strip_kind_suffix(parent),
            pascal_case(key),
            kind.suffix()
        ),
        None => format!("{}{}", pascal_case(key), kind.suffix()),
    }
}

fn strip_kind_suffix(name: &str) -> &str {
    name.strip_suffix("Config")
        .or_else(|| name.strip_suffix("Item"))
        .unwrap_or(name)
}

/// Convert a key to PascalCase. `_` and `-` separate words.
pub fn pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert a key to a snake_case identifier.
pub fn snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_lower = false;

    for c in s.chars() {
        if c == '-' || c == '_' {
            result.push('_');
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = true;
        }
    }

    result
}

/// Convert a key to an UPPER_SNAKE constant name.
pub fn const_case(s: &str) -> String {
    snake_case(s).to_uppercase()
}

/// Convert a key to a Rust field identifier, escaping keywords.
pub fn field_ident(key: &str) -> String {
    let ident = snake_case(key);
    if is_raw_escapable_keyword(&ident) {
        format!("r#{ident}")
    } else if matches!(ident.as_str(), "self" | "super" | "crate" | "_") {
        // Not valid as raw identifiers either.
        format!("{ident}_")
    } else {
        ident
    }
}

fn is_raw_escapable_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::parse_table;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("server"), "Server");
        assert_eq!(pascal_case("max_conns"), "MaxConns");
        assert_eq!(pascal_case("read-timeout"), "ReadTimeout");
        assert_eq!(pascal_case("db"), "Db");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("maxConns"), "max_conns");
        assert_eq!(snake_case("read-timeout"), "read_timeout");
        assert_eq!(snake_case("addr"), "addr");
    }

    #[test]
    fn test_field_ident_escapes_keywords() {
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("loop"), "r#loop");
        assert_eq!(field_ident("addr"), "addr");
        assert_eq!(field_ident("self"), "self_");
    }

    #[test]
    fn test_type_name_top_level() {
        assert_eq!(type_name(None, "server", TypeKind::Config), "ServerConfig");
        assert_eq!(type_name(None, "servers", TypeKind::Item), "ServersItem");
    }

    #[test]
    fn test_type_name_strips_parent_suffix() {
        assert_eq!(
            type_name(Some("ServerConfig"), "tls", TypeKind::Config),
            "ServerTlsConfig"
        );
        assert_eq!(
            type_name(Some("ServersItem"), "checks", TypeKind::Item),
            "ServersChecksItem"
        );
    }

    #[test]
    fn test_collect_nested() {
        let tree = parse_table(
            r#"
[server]
addr = ":8080"

[server.tls]
enabled = true

[[workers]]
name = "a"
"#,
        )
        .unwrap();

        let catalog = collect(&tree);
        assert_eq!(
            catalog.names(),
            vec!["ServerConfig", "ServerTlsConfig", "WorkersItem"]
        );
    }

    #[test]
    fn test_names_depend_on_path_not_values() {
        let a = parse_table(
            r#"
[server]
addr = ":8080"
timeout = "30s"
"#,
        )
        .unwrap();
        let b = parse_table(
            r#"
[server]
addr = "completely different"
timeout = 42
"#,
        )
        .unwrap();

        assert_eq!(collect(&a).names(), collect(&b).names());
    }

    #[test]
    fn test_first_occurrence_wins_on_name_collision() {
        // `[a.b]` derives ABConfig; so does the sibling table `[a_b]`.
        let tree = parse_table(
            r#"
[a.b]
from_nested = 1

[a_b]
from_flat = 2
"#,
        )
        .unwrap();

        let catalog = collect(&tree);
        let schema = catalog
            .iter()
            .find(|s| s.name == "ABConfig")
            .expect("ABConfig collected");
        // `a` sorts before `a_b`, so the nested occurrence defined it.
        assert!(schema.fields.contains_key("from_nested"));
    }

    #[test]
    fn test_array_of_tables_uses_first_element() {
        let tree = parse_table(
            r#"
[[servers]]
host = "a"
port = 1

[[servers]]
host = "b"
extra = true
"#,
        )
        .unwrap();

        let catalog = collect(&tree);
        let schema = catalog.iter().find(|s| s.name == "ServersItem").unwrap();
        assert!(schema.fields.contains_key("port"));
        assert!(!schema.fields.contains_key("extra"));
    }

    #[test]
    fn test_env_path_follows_structure() {
        let tree = parse_table(
            r#"
[server.tls]
enabled = true
"#,
        )
        .unwrap();

        let catalog = collect(&tree);
        let schema = catalog.iter().find(|s| s.name == "ServerTlsConfig").unwrap();
        assert_eq!(schema.env_path, vec!["server", "tls"]);
    }
}
