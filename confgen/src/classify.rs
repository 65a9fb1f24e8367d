//! Semantic type classification for scalar values.
//!
//! Strings carry three possible meanings: a `file:` reference to be
//! embedded as bytes, a duration literal, or a plain string. The check
//! order is a fixed contract: file reference wins over duration wins
//! over string, so a file named `30s.bin` is never misread as a
//! duration.

use crate::value::ConfigValue;

/// Prefix marking a string scalar as a file reference.
pub const FILE_REFERENCE_PREFIX: &str = "file:";

/// The semantic type of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    String,
    Integer,
    Float,
    Bool,
    /// A string accepted by the duration grammar.
    Duration,
    /// A `file:`-prefixed string, embedded as raw bytes.
    Bytes,
    /// Anything without a scalar mapping (structural values, opaque
    /// scalars). Falls back to a string representation.
    Opaque,
}

impl SemanticType {
    /// The Rust type the generated source uses for this semantic type.
    pub fn rust_type(self) -> &'static str {
        match self {
            SemanticType::String | SemanticType::Opaque => "String",
            SemanticType::Integer => "i64",
            SemanticType::Float => "f64",
            SemanticType::Bool => "bool",
            SemanticType::Duration => "Duration",
            SemanticType::Bytes => "Vec<u8>",
        }
    }
}

/// Classify a value. Pure and total: values with no scalar mapping
/// return [`SemanticType::Opaque`].
pub fn classify(value: &ConfigValue) -> SemanticType {
    match value {
        ConfigValue::String(s) => classify_string(s),
        ConfigValue::Integer(_) => SemanticType::Integer,
        ConfigValue::Float(_) => SemanticType::Float,
        ConfigValue::Bool(_) => SemanticType::Bool,
        _ => SemanticType::Opaque,
    }
}

/// Classify a string scalar, applying the fixed priority order.
pub fn classify_string(s: &str) -> SemanticType {
    if is_file_reference(s) {
        SemanticType::Bytes
    } else if is_duration(s) {
        SemanticType::Duration
    } else {
        SemanticType::String
    }
}

/// Whether a string scalar is a file reference.
pub fn is_file_reference(s: &str) -> bool {
    s.starts_with(FILE_REFERENCE_PREFIX)
}

/// Whether a string scalar parses under the duration grammar.
pub fn is_duration(s: &str) -> bool {
    humantime::parse_duration(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_plain_scalars() {
        assert_eq!(
            classify(&ConfigValue::String("hello".to_string())),
            SemanticType::String
        );
        assert_eq!(classify(&ConfigValue::Integer(1)), SemanticType::Integer);
        assert_eq!(classify(&ConfigValue::Float(0.5)), SemanticType::Float);
        assert_eq!(classify(&ConfigValue::Bool(true)), SemanticType::Bool);
    }

    #[test]
    fn test_classify_duration() {
        assert_eq!(classify_string("30s"), SemanticType::Duration);
        assert_eq!(classify_string("2h 30m"), SemanticType::Duration);
        assert_eq!(classify_string("5430ms"), SemanticType::Duration);
    }

    #[test]
    fn test_classify_non_duration_strings() {
        assert_eq!(classify_string(":8080"), SemanticType::String);
        assert_eq!(classify_string("30"), SemanticType::String);
        assert_eq!(classify_string(""), SemanticType::String);
    }

    #[test]
    fn test_file_reference_wins_over_duration() {
        // The path after the prefix looks like a duration; the file
        // reference check runs first.
        assert_eq!(classify_string("file:30s"), SemanticType::Bytes);
        assert_eq!(classify_string("file:certs/server.crt"), SemanticType::Bytes);
    }

    #[test]
    fn test_structural_values_are_opaque() {
        assert_eq!(
            classify(&ConfigValue::Array(vec![])),
            SemanticType::Opaque
        );
        assert_eq!(
            classify(&ConfigValue::Table(Default::default())),
            SemanticType::Opaque
        );
    }
}
