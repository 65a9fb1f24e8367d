//! Configuration value model.
//!
//! The generic tree handed over by the external TOML decoder, normalized
//! into the four shapes the generator distinguishes: scalars, tables,
//! arrays of scalars, and arrays of tables. Tables are stored in a
//! `BTreeMap` so every traversal is deterministic by construction.

use std::collections::BTreeMap;

use crate::error::{GenerateResult, ParseError};

/// A keyed group of configuration entries.
pub type ConfigTable = BTreeMap<String, ConfigValue>;

/// A single node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A string scalar. May semantically be a duration or a `file:`
    /// reference; see [`crate::classify`].
    String(String),

    /// An integer scalar.
    Integer(i64),

    /// A floating-point scalar.
    Float(f64),

    /// A boolean scalar.
    Bool(bool),

    /// An ordered sequence of values, homogeneous by convention.
    Array(Vec<ConfigValue>),

    /// A nested table.
    Table(ConfigTable),

    /// An ordered repetition of structurally similar tables.
    ArrayOfTables(Vec<ConfigTable>),
}

impl ConfigValue {
    /// Whether this value is a scalar (not a table or an array).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ConfigValue::String(_)
                | ConfigValue::Integer(_)
                | ConfigValue::Float(_)
                | ConfigValue::Bool(_)
        )
    }

    /// Borrow the table if this value is one.
    pub fn as_table(&self) -> Option<&ConfigTable> {
        match self {
            ConfigValue::Table(table) => Some(table),
            _ => None,
        }
    }

    fn from_toml(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::String(s),
            toml::Value::Integer(i) => Self::Integer(i),
            toml::Value::Float(f) => Self::Float(f),
            toml::Value::Boolean(b) => Self::Bool(b),
            // The scalar set has no date kind; keep the textual form.
            toml::Value::Datetime(d) => Self::String(d.to_string()),
            toml::Value::Array(items) => {
                let first_is_table = matches!(items.first(), Some(toml::Value::Table(_)));
                if first_is_table {
                    Self::ArrayOfTables(
                        items
                            .into_iter()
                            .filter_map(|item| match item {
                                toml::Value::Table(table) => Some(convert_table(table)),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    Self::Array(items.into_iter().map(Self::from_toml).collect())
                }
            }
            toml::Value::Table(table) => Self::Table(convert_table(table)),
        }
    }
}

/// Decode TOML text into a configuration table.
///
/// This is the only place the external decoder is touched; everything
/// downstream works on [`ConfigValue`] trees.
pub fn parse_table(text: &str) -> GenerateResult<ConfigTable> {
    let value: toml::Value =
        toml::from_str(text).map_err(|e| ParseError::syntax(e.to_string()))?;
    match value {
        toml::Value::Table(table) => Ok(convert_table(table)),
        _ => Err(ParseError::syntax("top-level value is not a table").into()),
    }
}

fn convert_table(table: toml::Table) -> ConfigTable {
    table
        .into_iter()
        .map(|(key, value)| (key, ConfigValue::from_toml(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        let tree = parse_table(
            r#"
name = "app"
max_conns = 10
ratio = 0.5
debug = true
"#,
        )
        .unwrap();

        assert_eq!(tree["name"], ConfigValue::String("app".to_string()));
        assert_eq!(tree["max_conns"], ConfigValue::Integer(10));
        assert_eq!(tree["ratio"], ConfigValue::Float(0.5));
        assert_eq!(tree["debug"], ConfigValue::Bool(true));
    }

    #[test]
    fn test_parse_nested_table() {
        let tree = parse_table(
            r#"
[server]
addr = ":8080"

[server.tls]
enabled = false
"#,
        )
        .unwrap();

        let server = tree["server"].as_table().unwrap();
        assert_eq!(server["addr"], ConfigValue::String(":8080".to_string()));
        let tls = server["tls"].as_table().unwrap();
        assert_eq!(tls["enabled"], ConfigValue::Bool(false));
    }

    #[test]
    fn test_parse_array_of_tables() {
        let tree = parse_table(
            r#"
[[servers]]
host = "a"

[[servers]]
host = "b"
"#,
        )
        .unwrap();

        match &tree["servers"] {
            ConfigValue::ArrayOfTables(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0]["host"], ConfigValue::String("a".to_string()));
            }
            other => panic!("expected array of tables, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_scalar_array() {
        let tree = parse_table("ports = [8080, 8081]").unwrap();
        assert_eq!(
            tree["ports"],
            ConfigValue::Array(vec![ConfigValue::Integer(8080), ConfigValue::Integer(8081)])
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_table("not = = toml").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_tables_iterate_in_key_order() {
        let tree = parse_table(
            r#"
zeta = 1
alpha = 2
mid = 3
"#,
        )
        .unwrap();

        let keys: Vec<_> = tree.keys().cloned().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}
