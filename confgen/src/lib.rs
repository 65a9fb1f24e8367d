//! # confgen
//!
//! Generate type-safe Rust code from TOML configuration files.
//!
//! The pipeline turns a decoded configuration tree into a single Rust
//! module: environment overrides are applied to the tree, every `file:`
//! reference is validated, record types are collected from the tree's
//! structure, and source text is emitted in one of two strategies
//! (values baked at generation time, or runtime-checked accessors).
//!
//! ## Architecture
//!
//! - [`value`] - the configuration tree model and the decoder seam
//! - [`classify`] - semantic type tags for scalar values
//! - [`envoverride`] - environment-variable overrides of the tree
//! - [`embed`] - `file:` reference loading and validation
//! - [`schema`] - type naming and schema collection
//! - [`emit`] - source text emission in static or getter mode
//! - [`error`] - error types and handling
//!
//! ## Example
//!
//! ```
//! use confgen::{EmissionMode, Generator};
//!
//! let source = Generator::new()
//!     .with_mode(EmissionMode::Static)
//!     .with_env_override(false)
//!     .generate("[server]\naddr = \":8080\"")
//!     .unwrap();
//! assert!(source.contains("pub struct ServerConfig"));
//! ```

pub mod classify;
pub mod embed;
pub mod emit;
pub mod envoverride;
pub mod error;
pub mod schema;
pub mod value;

use std::path::{Path, PathBuf};

// Re-export main types for convenience
pub use embed::{FileContentLoader, DEFAULT_MAX_FILE_SIZE};
pub use emit::EmissionMode;
pub use envoverride::DEFAULT_ENV_PREFIX;
pub use error::{GenerateError, GenerateResult};
pub use value::{ConfigTable, ConfigValue};

/// Configured generation pipeline.
///
/// A generator is cheap to build and carries no state between runs;
/// the watch loop constructs one per regeneration.
#[derive(Debug, Clone)]
pub struct Generator {
    mode: EmissionMode,
    env_override: bool,
    env_prefix: String,
    base_dir: PathBuf,
    max_file_size: u64,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            mode: EmissionMode::Static,
            env_override: true,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            base_dir: PathBuf::from("."),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Generator {
    /// Create a generator with default options: static mode, overrides
    /// enabled under the `CONFIG` prefix, 1 MB embed ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the emission strategy.
    pub fn with_mode(mut self, mode: EmissionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable the generation-time override pre-pass.
    pub fn with_env_override(mut self, enabled: bool) -> Self {
        self.env_override = enabled;
        self
    }

    /// Set the environment namespace prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Set the directory `file:` references resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Set the maximum size for a single embedded file.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Run the full pipeline on TOML text, returning the generated
    /// source. Nothing is written to disk; every failure surfaces
    /// before any output exists.
    pub fn generate(&self, toml_text: &str) -> GenerateResult<String> {
        let mut tree = value::parse_table(toml_text)?;

        if self.env_override {
            envoverride::apply(&mut tree, &self.env_prefix)?;
        }

        let loader = FileContentLoader::new(&self.base_dir, self.max_file_size);
        // Fail fast on any bad reference before a single line is
        // rendered.
        loader.validate_tree(&tree)?;

        let catalog = schema::collect(&tree);
        let emitter = emit::Emitter::new(self.mode, &self.env_prefix, &loader, &tree, &catalog);
        emitter.emit()
    }
}

/// Options for file-based generation.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Path to the input TOML file.
    pub input: PathBuf,

    /// Path the generated Rust source is written to.
    pub output: PathBuf,

    /// Emission strategy.
    pub mode: EmissionMode,

    /// Whether to apply environment overrides at generation time.
    pub env_override: bool,

    /// Environment namespace prefix.
    pub env_prefix: String,

    /// Maximum size for a single embedded file.
    pub max_file_size: u64,
}

impl GenerateOptions {
    /// Options for the given input/output pair with all defaults.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            mode: EmissionMode::Static,
            env_override: true,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Generate from a TOML file and write the result.
///
/// The output file is created or modified only after the whole
/// pipeline has succeeded.
pub fn generate_file(opts: &GenerateOptions) -> GenerateResult<()> {
    let text = std::fs::read_to_string(&opts.input)?;
    let base_dir = opts
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let source = Generator::new()
        .with_mode(opts.mode)
        .with_env_override(opts.env_override)
        .with_env_prefix(&opts.env_prefix)
        .with_base_dir(base_dir)
        .with_max_file_size(opts.max_file_size)
        .generate(&text)?;

    if let Some(parent) = opts.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&opts.output, source)?;

    Ok(())
}
