//! Literal encoders for scalar values.
//!
//! The byte-array row width and the duration decomposition are stable
//! contracts: generated files are committed and diffed, so the same
//! input must always render to the same text.

use std::time::Duration;

/// Bytes per row in embedded byte-array literals.
const BYTES_PER_ROW: usize = 12;

/// A single unit component of a decomposed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Hours,
    Minutes,
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl DurationUnit {
    /// All units, largest first. Decomposition is greedy in this order.
    const ALL: [DurationUnit; 6] = [
        DurationUnit::Hours,
        DurationUnit::Minutes,
        DurationUnit::Seconds,
        DurationUnit::Millis,
        DurationUnit::Micros,
        DurationUnit::Nanos,
    ];

    /// The unit's length in nanoseconds.
    pub fn nanos(self) -> u128 {
        match self {
            DurationUnit::Hours => 3_600_000_000_000,
            DurationUnit::Minutes => 60_000_000_000,
            DurationUnit::Seconds => 1_000_000_000,
            DurationUnit::Millis => 1_000_000,
            DurationUnit::Micros => 1_000,
            DurationUnit::Nanos => 1,
        }
    }

    /// The constructor expression for `count` of this unit.
    fn expr(self, count: u128) -> String {
        match self {
            DurationUnit::Hours => format!("Duration::from_secs({count} * 3600)"),
            DurationUnit::Minutes => format!("Duration::from_secs({count} * 60)"),
            DurationUnit::Seconds => format!("Duration::from_secs({count})"),
            DurationUnit::Millis => format!("Duration::from_millis({count})"),
            DurationUnit::Micros => format!("Duration::from_micros({count})"),
            DurationUnit::Nanos => format!("Duration::from_nanos({count})"),
        }
    }
}

/// Decompose a duration greedily into unit components, largest to
/// smallest. The components always reconstruct the input exactly.
pub fn decompose_duration(d: Duration) -> Vec<(u128, DurationUnit)> {
    let mut remaining = d.as_nanos();
    let mut parts = Vec::new();

    for unit in DurationUnit::ALL {
        let count = remaining / unit.nanos();
        if count > 0 {
            parts.push((count, unit));
            remaining %= unit.nanos();
        }
    }

    parts
}

/// Render a duration as an additive constructor expression.
/// Zero renders as the bare zero literal.
pub fn duration_literal(d: Duration) -> String {
    if d.is_zero() {
        return "Duration::ZERO".to_string();
    }

    decompose_duration(d)
        .into_iter()
        .map(|(count, unit)| unit.expr(count))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Render a string as a Rust `String` expression.
pub fn string_literal(s: &str) -> String {
    format!("{s:?}.to_string()")
}

/// Render a float literal, keeping non-finite values compilable.
pub fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "f64::NAN".to_string()
    } else if f == f64::INFINITY {
        "f64::INFINITY".to_string()
    } else if f == f64::NEG_INFINITY {
        "f64::NEG_INFINITY".to_string()
    } else {
        format!("{f:?}")
    }
}

/// Write a byte buffer as a `vec![...]` literal: a length line followed
/// by hex-formatted rows of [`BYTES_PER_ROW`] bytes.
pub fn write_byte_literal(out: &mut String, data: &[u8], indent: usize) {
    if data.is_empty() {
        out.push_str("vec![]");
        return;
    }

    let pad = "    ".repeat(indent + 1);
    out.push_str("vec![\n");
    out.push_str(&pad);
    if data.len() == 1 {
        out.push_str("// 1 byte\n");
    } else {
        out.push_str(&format!("// {} bytes\n", data.len()));
    }

    for row in data.chunks(BYTES_PER_ROW) {
        out.push_str(&pad);
        let rendered: Vec<String> = row.iter().map(|b| format!("0x{b:02x}")).collect();
        out.push_str(&rendered.join(", "));
        out.push_str(",\n");
    }

    out.push_str(&"    ".repeat(indent));
    out.push(']');
}
