//! Getter-mode emission: zero-field placeholder types whose accessor
//! methods consult the environment at run time.
//!
//! Accessors degrade silently: a malformed override or an unreadable
//! override path falls back to the generation-time default. This is
//! the opposite of the generation-time resolver's fail-fast contract,
//! and intentionally so — these accessors run inside the consuming
//! process, which must not crash on bad runtime input.

use super::{element_type, Emitter};
use crate::classify::{is_duration, is_file_reference};
use crate::envoverride::join_key;
use crate::error::GenerateResult;
use crate::schema::{self, field_ident, StructSchema, TypeKind};
use crate::value::ConfigValue;

impl Emitter<'_> {
    pub(super) fn emit_getter(&self, out: &mut String) -> GenerateResult<()> {
        if !self.catalog.is_empty() {
            for schema in self.catalog.iter() {
                out.push_str(&format!("pub struct {};\n", schema.name));
            }
            out.push('\n');
        }

        for schema in self.catalog.iter() {
            self.write_accessor_impl(out, schema)?;
            out.push('\n');
        }

        for (key, value) in self.tree {
            self.write_getter_binding(out, key, value)?;
            out.push('\n');
        }

        Ok(())
    }

    fn write_accessor_impl(
        &self,
        out: &mut String,
        schema: &StructSchema<'_>,
    ) -> GenerateResult<()> {
        out.push_str(&format!("impl {} {{\n", schema.name));
        let mut first = true;
        for (key, value) in schema.fields {
            if !first {
                out.push('\n');
            }
            first = false;
            self.write_accessor_method(out, schema, key, value)?;
        }
        out.push_str("}\n");
        Ok(())
    }

    fn write_accessor_method(
        &self,
        out: &mut String,
        schema: &StructSchema<'_>,
        key: &str,
        value: &ConfigValue,
    ) -> GenerateResult<()> {
        let method = field_ident(key);
        match value {
            ConfigValue::Table(_) => {
                let nested = schema::type_name(Some(&schema.name), key, TypeKind::Config);
                out.push_str(&format!("    pub fn {method}(&self) -> {nested} {{\n"));
                out.push_str(&format!("        {nested}\n"));
                out.push_str("    }\n");
            }
            ConfigValue::ArrayOfTables(items) => {
                let nested = schema::type_name(Some(&schema.name), key, TypeKind::Item);
                out.push_str(&format!(
                    "    pub fn {method}(&self) -> Vec<{nested}> {{\n"
                ));
                out.push_str(
                    "        // Array fields cannot be overridden via environment variables.\n",
                );
                let elements = vec![nested.as_str(); items.len()].join(", ");
                out.push_str(&format!("        vec![{elements}]\n"));
                out.push_str("    }\n");
            }
            ConfigValue::Array(items) => {
                out.push_str(&format!(
                    "    pub fn {method}(&self) -> Vec<{}> {{\n",
                    element_type(items)
                ));
                out.push_str(
                    "        // Array fields cannot be overridden via environment variables.\n",
                );
                out.push_str("        ");
                self.write_value(out, value, Some(&schema.name), key, 2)?;
                out.push('\n');
                out.push_str("    }\n");
            }
            scalar => {
                let env_key = self.field_env_key(schema, key);
                let ty = self.rust_type(scalar, Some(&schema.name), key);
                out.push_str(&format!("    pub fn {method}(&self) -> {ty} {{\n"));
                self.write_accessor_body(out, scalar, &env_key, 2)?;
                out.push_str("    }\n");
            }
        }
        Ok(())
    }

    /// The env-check-then-default body shared by field accessors and
    /// top-level accessor functions.
    fn write_accessor_body(
        &self,
        out: &mut String,
        value: &ConfigValue,
        env_key: &str,
        indent: usize,
    ) -> GenerateResult<()> {
        let pad = "    ".repeat(indent);
        match value {
            ConfigValue::String(s) if is_file_reference(s) => {
                // The override is a filesystem path, not the bytes
                // themselves; the embedded default is always present.
                out.push_str(&format!(
                    "{pad}if let Ok(path) = std::env::var({env_key:?}) {{\n"
                ));
                out.push_str(&format!(
                    "{pad}    if let Ok(bytes) = std::fs::read(&path) {{\n"
                ));
                out.push_str(&format!("{pad}        return bytes;\n"));
                out.push_str(&format!("{pad}    }}\n"));
                out.push_str(&format!("{pad}}}\n"));
                out.push_str(&pad);
                self.write_value(out, value, None, "", indent)?;
                out.push('\n');
            }
            ConfigValue::String(s) if is_duration(s) => {
                out.push_str(&format!(
                    "{pad}if let Ok(v) = std::env::var({env_key:?}) {{\n"
                ));
                out.push_str(&format!(
                    "{pad}    if let Ok(parsed) = humantime::parse_duration(&v) {{\n"
                ));
                out.push_str(&format!("{pad}        return parsed;\n"));
                out.push_str(&format!("{pad}    }}\n"));
                out.push_str(&format!("{pad}}}\n"));
                out.push_str(&pad);
                self.write_value(out, value, None, "", indent)?;
                out.push('\n');
            }
            ConfigValue::String(_) => {
                out.push_str(&format!(
                    "{pad}if let Ok(v) = std::env::var({env_key:?}) {{\n"
                ));
                out.push_str(&format!("{pad}    if !v.is_empty() {{\n"));
                out.push_str(&format!("{pad}        return v;\n"));
                out.push_str(&format!("{pad}    }}\n"));
                out.push_str(&format!("{pad}}}\n"));
                out.push_str(&pad);
                self.write_value(out, value, None, "", indent)?;
                out.push('\n');
            }
            ConfigValue::Integer(_) | ConfigValue::Float(_) | ConfigValue::Bool(_) => {
                let parse_type = match value {
                    ConfigValue::Integer(_) => "i64",
                    ConfigValue::Float(_) => "f64",
                    _ => "bool",
                };
                out.push_str(&format!(
                    "{pad}if let Ok(v) = std::env::var({env_key:?}) {{\n"
                ));
                out.push_str(&format!(
                    "{pad}    if let Ok(parsed) = v.parse::<{parse_type}>() {{\n"
                ));
                out.push_str(&format!("{pad}        return parsed;\n"));
                out.push_str(&format!("{pad}    }}\n"));
                out.push_str(&format!("{pad}}}\n"));
                out.push_str(&pad);
                self.write_value(out, value, None, "", indent)?;
                out.push('\n');
            }
            other => {
                out.push_str(&pad);
                self.write_value(out, other, None, "", indent)?;
                out.push('\n');
            }
        }
        Ok(())
    }

    /// One item per top-level key: unit-value statics for tables,
    /// zero-initialized statics for arrays of tables, and accessor
    /// functions for scalars.
    fn write_getter_binding(
        &self,
        out: &mut String,
        key: &str,
        value: &ConfigValue,
    ) -> GenerateResult<()> {
        match value {
            ConfigValue::Table(_) => {
                let name = schema::type_name(None, key, TypeKind::Config);
                out.push_str(&format!(
                    "pub static {}: {name} = {name};\n",
                    schema::const_case(key)
                ));
            }
            ConfigValue::ArrayOfTables(_) => {
                let name = schema::type_name(None, key, TypeKind::Item);
                out.push_str(&format!(
                    "pub static {}: Vec<{name}> = Vec::new();\n",
                    schema::const_case(key)
                ));
            }
            ConfigValue::Array(items) => {
                out.push_str(&format!(
                    "pub fn {}() -> Vec<{}> {{\n",
                    field_ident(key),
                    element_type(items)
                ));
                out.push_str(
                    "    // Array fields cannot be overridden via environment variables.\n",
                );
                out.push_str("    ");
                self.write_value(out, value, None, key, 1)?;
                out.push('\n');
                out.push_str("}\n");
            }
            scalar => {
                let env_key = join_key(self.env_prefix, key);
                let ty = self.rust_type(scalar, None, key);
                out.push_str(&format!("pub fn {}() -> {ty} {{\n", field_ident(key)));
                self.write_accessor_body(out, scalar, &env_key, 1)?;
                out.push_str("}\n");
            }
        }
        Ok(())
    }
}
