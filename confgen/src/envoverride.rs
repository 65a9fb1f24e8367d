//! Environment variable overrides for the configuration tree.
//!
//! Variables are keyed by structural path: the segments from the root
//! to a leaf, upper-cased and joined with underscores, behind a
//! namespace prefix. `[server] addr` becomes `CONFIG_SERVER_ADDR` under
//! the default prefix.
//!
//! Conversion is strict: an override that does not parse as the
//! original value's type aborts the whole resolution and names the
//! offending key. This is the generation-time contract; generated
//! getter-mode accessors deliberately do the opposite and degrade
//! silently at run time.

use crate::error::OverrideError;
use crate::value::{ConfigTable, ConfigValue};

/// Default namespace prefix for override variables.
pub const DEFAULT_ENV_PREFIX: &str = "CONFIG";

/// Rewrite the tree in place from environment lookups.
///
/// Absent (or empty) variables leave the original values untouched.
/// Tables recurse; arrays of scalars accept comma-separated lists
/// converted against the first element's type; arrays of tables are
/// never override targets.
pub fn apply(tree: &mut ConfigTable, prefix: &str) -> Result<(), OverrideError> {
    for (key, value) in tree.iter_mut() {
        let env_key = join_key(prefix, key);
        apply_value(value, &env_key)?;
    }
    Ok(())
}

fn apply_value(value: &mut ConfigValue, env_key: &str) -> Result<(), OverrideError> {
    match value {
        ConfigValue::Table(table) => {
            for (key, nested) in table.iter_mut() {
                let nested_key = join_key(env_key, key);
                apply_value(nested, &nested_key)?;
            }
            Ok(())
        }
        ConfigValue::ArrayOfTables(_) => Ok(()),
        ConfigValue::Array(items) => {
            let Some(env_val) = lookup(env_key) else {
                return Ok(());
            };
            // An empty array gives no element type to convert against.
            let Some(first) = items.first().cloned() else {
                return Ok(());
            };
            let converted = env_val
                .split(',')
                .map(|part| convert(part.trim(), &first, env_key))
                .collect::<Result<Vec<_>, _>>()?;
            *items = converted;
            Ok(())
        }
        scalar => {
            if let Some(env_val) = lookup(env_key) {
                *scalar = convert(&env_val, scalar, env_key)?;
            }
            Ok(())
        }
    }
}

/// Build an environment key segment: upper-cased, dashes folded to
/// underscores, joined onto the running prefix.
pub fn join_key(prefix: &str, segment: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + segment.len() + 1);
    key.push_str(prefix);
    key.push('_');
    for c in segment.chars() {
        match c {
            '-' => key.push('_'),
            c => key.extend(c.to_uppercase()),
        }
    }
    key
}

fn lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Convert an override string to the runtime type of the original
/// value. Strings pass through unchanged; everything else parses with
/// strict validation.
fn convert(
    env_val: &str,
    original: &ConfigValue,
    env_key: &str,
) -> Result<ConfigValue, OverrideError> {
    match original {
        ConfigValue::String(_) => Ok(ConfigValue::String(env_val.to_string())),
        ConfigValue::Integer(_) => env_val
            .parse::<i64>()
            .map(ConfigValue::Integer)
            .map_err(|_| OverrideError::conversion(env_key, "integer", env_val)),
        ConfigValue::Float(_) => env_val
            .parse::<f64>()
            .map(ConfigValue::Float)
            .map_err(|_| OverrideError::conversion(env_key, "float", env_val)),
        ConfigValue::Bool(_) => match env_val.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(ConfigValue::Bool(true)),
            "false" | "0" => Ok(ConfigValue::Bool(false)),
            _ => Err(OverrideError::conversion(env_key, "boolean", env_val)),
        },
        // Structural originals are not override targets.
        other => Ok(other.clone()),
    }
}
