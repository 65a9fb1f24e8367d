//! Source text emission.
//!
//! The catalog and the value tree render into a single Rust module in
//! one of two strategies: *static* bakes every value into typed
//! bindings at generation time; *getter* emits zero-field types whose
//! accessor methods consult the environment at run time and fall back
//! to the baked defaults. Which strategy runs is decided up front and
//! never mixed.

mod getters;
mod literal;
mod statics;

pub use literal::{decompose_duration, duration_literal, DurationUnit};

use crate::classify::{self, classify, classify_string, SemanticType};
use crate::embed::FileContentLoader;
use crate::envoverride::join_key;
use crate::error::GenerateResult;
use crate::schema::{self, SchemaCatalog, StructSchema, TypeKind};
use crate::value::{ConfigTable, ConfigValue};

/// The emission strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionMode {
    /// Values baked as literals at generation time.
    #[default]
    Static,
    /// Runtime-checked accessor methods with baked defaults.
    Getter,
}

/// Renders a catalog and tree into source text.
pub struct Emitter<'a> {
    mode: EmissionMode,
    env_prefix: &'a str,
    loader: &'a FileContentLoader,
    tree: &'a ConfigTable,
    catalog: &'a SchemaCatalog<'a>,
}

impl<'a> Emitter<'a> {
    pub fn new(
        mode: EmissionMode,
        env_prefix: &'a str,
        loader: &'a FileContentLoader,
        tree: &'a ConfigTable,
        catalog: &'a SchemaCatalog<'a>,
    ) -> Self {
        Self {
            mode,
            env_prefix,
            loader,
            tree,
            catalog,
        }
    }

    /// Render the full output buffer.
    pub fn emit(&self) -> GenerateResult<String> {
        let mut out = String::new();
        self.write_header(&mut out);

        match self.mode {
            EmissionMode::Static => self.emit_static(&mut out)?,
            EmissionMode::Getter => self.emit_getter(&mut out)?,
        }

        // Sections are written with separating blank lines; collapse
        // whatever is left at the tail to a single newline.
        while out.ends_with("\n\n") {
            out.pop();
        }

        Ok(out)
    }

    fn write_header(&self, out: &mut String) {
        out.push_str("// Auto-generated by confgen\n");
        out.push_str("// Do not edit manually\n");

        let needs_duration = tree_needs_duration(self.tree);
        if self.mode == EmissionMode::Getter && needs_duration {
            out.push_str("// Duration overrides require the `humantime` crate.\n");
        }
        out.push('\n');

        let mut imports = Vec::new();
        if self.mode == EmissionMode::Static && self.needs_lazy_lock() {
            imports.push("use std::sync::LazyLock;");
        }
        if needs_duration {
            imports.push("use std::time::Duration;");
        }

        if !imports.is_empty() {
            for import in imports {
                out.push_str(import);
                out.push('\n');
            }
            out.push('\n');
        }
    }

    /// Whether the static value block contains a binding that cannot be
    /// const-initialized. Copy scalars are plain statics; everything
    /// else goes behind `LazyLock`.
    fn needs_lazy_lock(&self) -> bool {
        self.tree.values().any(|value| {
            !matches!(
                value,
                ConfigValue::Integer(_) | ConfigValue::Float(_) | ConfigValue::Bool(_)
            )
        })
    }

    /// The Rust type for a value in the context of its parent type.
    fn rust_type(&self, value: &ConfigValue, parent: Option<&str>, key: &str) -> String {
        match value {
            ConfigValue::Table(_) => schema::type_name(parent, key, TypeKind::Config),
            ConfigValue::ArrayOfTables(_) => format!(
                "Vec<{}>",
                schema::type_name(parent, key, TypeKind::Item)
            ),
            ConfigValue::Array(items) => format!("Vec<{}>", element_type(items)),
            scalar => classify(scalar).rust_type().to_string(),
        }
    }

    /// The environment key for a field of a collected schema.
    fn field_env_key(&self, schema: &StructSchema<'_>, field: &str) -> String {
        let mut key = self.env_prefix.to_string();
        for segment in &schema.env_path {
            key = join_key(&key, segment);
        }
        join_key(&key, field)
    }

    /// Write a value literal, recursing into nested structures.
    ///
    /// `parent` and `key` provide naming context for nested record
    /// types; `indent` is the current nesting level.
    fn write_value(
        &self,
        out: &mut String,
        value: &ConfigValue,
        parent: Option<&str>,
        key: &str,
        indent: usize,
    ) -> GenerateResult<()> {
        match value {
            ConfigValue::String(s) => {
                if classify::is_file_reference(s) {
                    // Validated before emission started; the cache hit
                    // returns the same bytes the validation pass saw.
                    let data = self.loader.resolve(s)?;
                    literal::write_byte_literal(out, &data, indent);
                } else if let Ok(d) = humantime::parse_duration(s) {
                    out.push_str(&literal::duration_literal(d));
                } else {
                    out.push_str(&literal::string_literal(s));
                }
            }
            ConfigValue::Integer(i) => out.push_str(&i.to_string()),
            ConfigValue::Float(f) => out.push_str(&literal::float_literal(*f)),
            ConfigValue::Bool(b) => out.push_str(&b.to_string()),
            ConfigValue::Array(items) => {
                out.push_str("vec![");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_value(out, item, parent, key, indent)?;
                }
                out.push(']');
            }
            ConfigValue::Table(table) => {
                let name = schema::type_name(parent, key, TypeKind::Config);
                self.write_struct_literal(out, &name, table, indent)?;
            }
            ConfigValue::ArrayOfTables(tables) => {
                let name = schema::type_name(parent, key, TypeKind::Item);
                let pad = "    ".repeat(indent + 1);
                out.push_str("vec![\n");
                for table in tables {
                    out.push_str(&pad);
                    self.write_struct_literal(out, &name, table, indent + 1)?;
                    out.push_str(",\n");
                }
                out.push_str(&"    ".repeat(indent));
                out.push(']');
            }
        }
        Ok(())
    }

    fn write_struct_literal(
        &self,
        out: &mut String,
        name: &str,
        table: &ConfigTable,
        indent: usize,
    ) -> GenerateResult<()> {
        let pad = "    ".repeat(indent + 1);
        out.push_str(name);
        out.push_str(" {\n");
        for (key, value) in table {
            out.push_str(&pad);
            out.push_str(&schema::field_ident(key));
            out.push_str(": ");
            self.write_value(out, value, Some(name), key, indent + 1)?;
            out.push_str(",\n");
        }
        out.push_str(&"    ".repeat(indent));
        out.push('}');
        Ok(())
    }
}

/// The element type of a scalar array, inferred from the first element.
/// An empty array has no element evidence and falls back to `String`.
fn element_type(items: &[ConfigValue]) -> String {
    match items.first() {
        None => "String".to_string(),
        Some(ConfigValue::Array(inner)) => format!("Vec<{}>", element_type(inner)),
        Some(first) => classify(first).rust_type().to_string(),
    }
}

/// Whether any value in the tree classifies as a duration. Mirrors the
/// collector traversal; both must reach the same answer for a tree.
pub fn tree_needs_duration(tree: &ConfigTable) -> bool {
    tree.values().any(value_needs_duration)
}

fn value_needs_duration(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::String(s) => classify_string(s) == SemanticType::Duration,
        ConfigValue::Table(table) => tree_needs_duration(table),
        ConfigValue::Array(items) => items.iter().any(value_needs_duration),
        ConfigValue::ArrayOfTables(tables) => tables.iter().any(tree_needs_duration),
        _ => false,
    }
}
