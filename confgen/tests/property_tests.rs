//! Property-based tests for the generation pipeline.
//!
//! Properties tested:
//! - Duration decomposition reconstructs the parsed duration exactly.
//! - Byte-array literals decode back to the original byte sequence.
//! - Type names are a function of structure alone, not leaf values.
//! - Generation is deterministic for a given input.

use std::time::Duration;

use proptest::prelude::*;
use tempfile::TempDir;

use confgen::emit::decompose_duration;
use confgen::{schema, value, Generator};

/// Parse the hex bytes back out of a rendered byte literal.
fn decode_byte_literal(text: &str) -> Vec<u8> {
    text.split(|c: char| !c.is_ascii_hexdigit() && c != 'x')
        .filter_map(|token| token.strip_prefix("0x"))
        .map(|hex| u8::from_str_radix(hex, 16).unwrap())
        .collect()
}

proptest! {
    #[test]
    fn prop_duration_decomposition_round_trips(nanos in 0u64..u64::MAX / 2) {
        let d = Duration::from_nanos(nanos);
        let parts = decompose_duration(d);
        let reconstructed: u128 = parts
            .iter()
            .map(|(count, unit)| count * unit.nanos())
            .sum();
        prop_assert_eq!(reconstructed, d.as_nanos());
    }

    #[test]
    fn prop_byte_literals_round_trip(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blob.bin"), &data).unwrap();

        let source = Generator::new()
            .with_env_override(false)
            .with_base_dir(dir.path())
            .generate("[assets]\nblob = \"file:blob.bin\"")
            .unwrap();

        // Everything hex-formatted in the output is the one embedded
        // literal.
        prop_assert_eq!(decode_byte_literal(&source), data);
    }

    #[test]
    fn prop_type_names_ignore_leaf_values(
        s in "[a-z]{1,12}",
        i in any::<i64>(),
        b in any::<bool>(),
    ) {
        let a = value::parse_table(&format!(
            "[server]\naddr = {s:?}\ncount = {i}\nflag = {b}\n[server.tls]\nx = 1"
        ))
        .unwrap();
        let baseline = value::parse_table(
            "[server]\naddr = \"\"\ncount = 0\nflag = false\n[server.tls]\nx = 99",
        )
        .unwrap();

        let a_schema = schema::collect(&a);
        let baseline_schema = schema::collect(&baseline);
        prop_assert_eq!(a_schema.names(), baseline_schema.names());
    }

    #[test]
    fn prop_generation_is_deterministic(
        key in "[a-z]{1,8}",
        val in any::<i64>(),
    ) {
        let text = format!("[section]\n{key} = {val}\n");
        let generator = Generator::new().with_env_override(false);
        prop_assert_eq!(
            generator.generate(&text).unwrap(),
            generator.generate(&text).unwrap()
        );
    }
}
