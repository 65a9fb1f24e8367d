//! Static-mode emission: record definitions plus bindings
//! pre-populated with literal values.

use super::{literal, Emitter};
use crate::error::GenerateResult;
use crate::schema::{const_case, field_ident, StructSchema};
use crate::value::ConfigValue;

impl Emitter<'_> {
    pub(super) fn emit_static(&self, out: &mut String) -> GenerateResult<()> {
        for schema in self.catalog.iter() {
            self.write_struct_definition(out, schema);
            out.push('\n');
        }

        for (key, value) in self.tree {
            self.write_static_binding(out, key, value)?;
            out.push('\n');
        }

        Ok(())
    }

    fn write_struct_definition(&self, out: &mut String, schema: &StructSchema<'_>) {
        out.push_str(&format!("pub struct {} {{\n", schema.name));
        for (key, value) in schema.fields {
            let ty = self.rust_type(value, Some(&schema.name), key);
            out.push_str(&format!("    pub {}: {},\n", field_ident(key), ty));
        }
        out.push_str("}\n");
    }

    /// One binding per top-level key. Copy scalars become plain
    /// statics; everything else is initialized behind `LazyLock`.
    fn write_static_binding(
        &self,
        out: &mut String,
        key: &str,
        value: &ConfigValue,
    ) -> GenerateResult<()> {
        let name = const_case(key);
        match value {
            ConfigValue::Integer(i) => {
                out.push_str(&format!("pub static {name}: i64 = {i};\n"));
            }
            ConfigValue::Float(f) => {
                out.push_str(&format!(
                    "pub static {name}: f64 = {};\n",
                    literal::float_literal(*f)
                ));
            }
            ConfigValue::Bool(b) => {
                out.push_str(&format!("pub static {name}: bool = {b};\n"));
            }
            other => {
                let ty = self.rust_type(other, None, key);
                out.push_str(&format!(
                    "pub static {name}: LazyLock<{ty}> = LazyLock::new(|| "
                ));
                self.write_value(out, other, None, key, 0)?;
                out.push_str(");\n");
            }
        }
        Ok(())
    }
}
