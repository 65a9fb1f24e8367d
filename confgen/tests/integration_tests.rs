//! Integration tests for the generation pipeline.
//!
//! These drive the public API end to end: TOML text in, generated
//! Rust source out, including file embedding and failure ordering.

use std::path::PathBuf;

use tempfile::TempDir;

use confgen::{generate_file, EmissionMode, GenerateError, GenerateOptions, Generator};

fn generator() -> Generator {
    // Overrides are opted into per test with a unique prefix so
    // parallel tests cannot see each other's environment.
    Generator::new().with_env_override(false)
}

// =============================================================================
// Static mode
// =============================================================================

#[test]
fn test_static_mode_server_scenario() {
    let source = generator()
        .generate(
            r#"
[server]
addr = ":8080"
timeout = "30s"
"#,
        )
        .unwrap();

    // One record type with a string-kind and a duration-kind field.
    assert!(source.contains("pub struct ServerConfig {"));
    assert!(source.contains("    pub addr: String,"));
    assert!(source.contains("    pub timeout: Duration,"));

    // Value block bakes the literal and the decomposed duration.
    assert!(source.contains("addr: \":8080\".to_string(),"));
    assert!(source.contains("timeout: Duration::from_secs(30),"));
    assert!(source.contains("use std::time::Duration;"));
}

#[test]
fn test_static_mode_env_override_scenario() {
    std::env::set_var("CONFGEN_SCEN_B_SERVER_ADDR", ":9090");
    let source = Generator::new()
        .with_env_prefix("CONFGEN_SCEN_B")
        .generate(
            r#"
[server]
addr = ":8080"
timeout = "30s"
"#,
        )
        .unwrap();
    std::env::remove_var("CONFGEN_SCEN_B_SERVER_ADDR");

    assert!(source.contains(":9090"));
    assert!(!source.contains(":8080"));
}

#[test]
fn test_static_mode_override_failure_produces_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("config.toml");
    let output = dir.path().join("config_gen.rs");
    std::fs::write(&input, "[database]\nmax_conns = 10\n").unwrap();

    std::env::set_var("CONFGEN_SCEN_F_DATABASE_MAX_CONNS", "lots");
    let mut opts = GenerateOptions::new(&input, &output);
    opts.env_prefix = "CONFGEN_SCEN_F".to_string();
    let err = generate_file(&opts).unwrap_err();
    std::env::remove_var("CONFGEN_SCEN_F_DATABASE_MAX_CONNS");

    assert!(matches!(err, GenerateError::Override(_)));
    assert!(err.to_string().contains("CONFGEN_SCEN_F_DATABASE_MAX_CONNS"));
    assert!(!output.exists());
}

#[test]
fn test_static_mode_file_embedding() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/test.txt"), "hello\nworld\n").unwrap();

    let source = generator()
        .with_base_dir(dir.path())
        .generate(
            r#"
[assets]
content = "file:data/test.txt"
"#,
        )
        .unwrap();

    // Byte-blob field type and the hex encoding of the first byte.
    assert!(source.contains("    pub content: Vec<u8>,"));
    assert!(source.contains("0x68"));
    assert!(source.contains("// 12 bytes"));
}

#[test]
fn test_missing_file_reference_fails_before_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("config.toml");
    let output = dir.path().join("out/config_gen.rs");
    std::fs::write(&input, "[assets]\ncontent = \"file:nope.bin\"\n").unwrap();

    let mut opts = GenerateOptions::new(&input, &output);
    opts.env_override = false;
    let err = generate_file(&opts).unwrap_err();

    assert!(matches!(err, GenerateError::Embed(_)));
    assert!(err.to_string().contains("not found"));
    assert!(!output.exists());
    // The parent directory was never created either.
    assert!(!output.parent().unwrap().exists());
}

#[test]
fn test_oversized_file_reference_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("big.bin"), vec![0u8; 64]).unwrap();

    let err = generator()
        .with_base_dir(dir.path())
        .with_max_file_size(32)
        .generate("blob = \"file:big.bin\"")
        .unwrap_err();

    assert!(err.to_string().contains("exceeds maximum size"));
}

#[test]
fn test_static_mode_nested_and_arrays() {
    let source = generator()
        .generate(
            r#"
debug = true
max_conns = 25

[server]
addr = ":8080"
origins = ["a", "b"]

[server.tls]
enabled = false

[[workers]]
name = "w1"
count = 2

[[workers]]
name = "w2"
count = 4
"#,
        )
        .unwrap();

    assert!(source.contains("pub struct ServerConfig {"));
    assert!(source.contains("    pub tls: ServerTlsConfig,"));
    assert!(source.contains("pub struct ServerTlsConfig {"));
    assert!(source.contains("pub struct WorkersItem {"));

    assert!(source.contains("pub static DEBUG: bool = true;"));
    assert!(source.contains("pub static MAX_CONNS: i64 = 25;"));
    assert!(source.contains("pub static SERVER: LazyLock<ServerConfig>"));
    assert!(source.contains("pub static WORKERS: LazyLock<Vec<WorkersItem>>"));
    assert!(source.contains("origins: vec![\"a\".to_string(), \"b\".to_string()],"));
    assert!(source.contains("use std::sync::LazyLock;"));
}

#[test]
fn test_struct_definitions_in_lexicographic_order() {
    let source = generator()
        .generate(
            r#"
[zeta]
x = 1

[alpha]
y = 2
"#,
        )
        .unwrap();

    let alpha = source.find("pub struct AlphaConfig").unwrap();
    let zeta = source.find("pub struct ZetaConfig").unwrap();
    assert!(alpha < zeta);
}

#[test]
fn test_generation_is_deterministic() {
    let text = r#"
[server]
addr = ":8080"
timeout = "1h 30m"

[database]
dsn = "postgres://localhost/app"
"#;

    let first = generator().generate(text).unwrap();
    let second = generator().generate(text).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Getter mode
// =============================================================================

fn getter_source(text: &str) -> String {
    generator()
        .with_mode(EmissionMode::Getter)
        .generate(text)
        .unwrap()
}

#[test]
fn test_getter_mode_emits_accessors() {
    let source = getter_source(
        r#"
[server]
addr = ":8080"
timeout = "30s"
"#,
    );

    assert!(source.contains("pub struct ServerConfig;"));
    assert!(source.contains("impl ServerConfig {"));
    assert!(source.contains("    pub fn addr(&self) -> String {"));
    assert!(source.contains("    pub fn timeout(&self) -> Duration {"));
    assert!(source.contains("std::env::var(\"CONFIG_SERVER_ADDR\")"));
    assert!(source.contains("humantime::parse_duration"));

    // Defaults are baked as the fallback.
    assert!(source.contains("\":8080\".to_string()"));
    assert!(source.contains("Duration::from_secs(30)"));

    // Zero-initialized value block.
    assert!(source.contains("pub static SERVER: ServerConfig = ServerConfig;"));
}

#[test]
fn test_getter_mode_nested_table_accessor() {
    let source = getter_source(
        r#"
[server.tls]
enabled = true
"#,
    );

    assert!(source.contains("    pub fn tls(&self) -> ServerTlsConfig {"));
    assert!(source.contains("        ServerTlsConfig\n"));
    // Nested accessor keys include the full path.
    assert!(source.contains("std::env::var(\"CONFIG_SERVER_TLS_ENABLED\")"));
}

#[test]
fn test_getter_mode_arrays_have_no_override_path() {
    let source = getter_source(
        r#"
[service]
ports = [8080, 8081]

[[service.checks]]
path = "/healthz"
"#,
    );

    assert!(source.contains("    pub fn ports(&self) -> Vec<i64> {"));
    assert!(source.contains("Array fields cannot be overridden"));
    assert!(source.contains("vec![8080, 8081]"));
    assert!(source.contains("    pub fn checks(&self) -> Vec<ServiceChecksItem> {"));
    assert!(source.contains("vec![ServiceChecksItem]"));
    // No env lookup anywhere near the array accessors.
    assert!(!source.contains("CONFIG_SERVICE_PORTS"));
}

#[test]
fn test_getter_mode_byte_blob_checks_path() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cert.pem"), b"x").unwrap();

    let source = generator()
        .with_mode(EmissionMode::Getter)
        .with_base_dir(dir.path())
        .generate("[server]\ncert = \"file:cert.pem\"")
        .unwrap();

    assert!(source.contains("    pub fn cert(&self) -> Vec<u8> {"));
    assert!(source.contains("std::fs::read(&path)"));
    // The embedded default is always present as the fallback.
    assert!(source.contains("0x78"));
}

#[test]
fn test_getter_mode_top_level_scalar_function() {
    let source = getter_source("debug = false\n");

    assert!(source.contains("pub fn debug() -> bool {"));
    assert!(source.contains("std::env::var(\"CONFIG_DEBUG\")"));
}

// =============================================================================
// File-based generation
// =============================================================================

#[test]
fn test_generate_file_writes_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("config.toml");
    let output = dir.path().join("gen/config_gen.rs");
    std::fs::write(&input, "[server]\naddr = \":8080\"\n").unwrap();

    let mut opts = GenerateOptions::new(&input, &output);
    opts.env_override = false;
    generate_file(&opts).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("// Auto-generated by confgen\n"));
    assert!(written.contains("pub struct ServerConfig"));
}

#[test]
fn test_generate_file_resolves_references_against_input_dir() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("cfg");
    std::fs::create_dir(&nested).unwrap();
    std::fs::write(nested.join("config.toml"), "blob = \"file:data.bin\"\n").unwrap();
    std::fs::write(nested.join("data.bin"), b"ab").unwrap();

    let output = dir.path().join("config_gen.rs");
    let mut opts = GenerateOptions::new(nested.join("config.toml"), &output);
    opts.env_override = false;
    generate_file(&opts).unwrap();

    assert!(std::fs::read_to_string(&output).unwrap().contains("0x61"));
}

#[test]
fn test_parse_failure_aborts() {
    let err = generator().generate("this is not toml = =").unwrap_err();
    assert!(matches!(err, GenerateError::Parse(_)));
}

#[test]
fn test_missing_input_file() {
    let opts = GenerateOptions::new(
        PathBuf::from("/nonexistent/config.toml"),
        PathBuf::from("/nonexistent/out.rs"),
    );
    assert!(matches!(
        generate_file(&opts).unwrap_err(),
        GenerateError::Io(_)
    ));
}
