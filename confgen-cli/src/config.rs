//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `confgen.toml` files
//! and merging with command-line arguments.

use std::path::{Path, PathBuf};

use confgen::EmissionMode;
use serde::Deserialize;

use crate::error::{CliResult, ConfigError};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "confgen.toml";

/// Generation mode as spelled in flags and config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Values baked as literals at generation time.
    #[default]
    Static,
    /// Runtime-checked accessor methods with baked defaults.
    Getter,
}

impl From<Mode> for EmissionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Static => EmissionMode::Static,
            Mode::Getter => EmissionMode::Getter,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings.
    pub generate: GenerateConfig,

    /// Environment override settings.
    pub env: EnvConfig,

    /// Watch mode settings.
    pub watch: WatchConfig,
}

/// Generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Input TOML file.
    pub input: PathBuf,

    /// Output Rust file.
    pub output: PathBuf,

    /// Generation mode.
    pub mode: Mode,

    /// Maximum size for `file:` references, as a human-readable value
    /// like "1MB" or "512KB".
    pub max_file_size: String,
}

/// Environment override settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Whether generation-time overrides are applied.
    pub enabled: bool,

    /// Namespace prefix for override variables.
    pub prefix: String,
}

/// Watch mode settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds.
    pub debounce_ms: u64,

    /// Retry attempts after the watched file disappears.
    pub retry_attempts: u32,

    /// Interval between retry attempts in milliseconds.
    pub retry_interval_ms: u64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("config.toml"),
            output: PathBuf::from("src/config_gen.rs"),
            mode: Mode::Static,
            max_file_size: "1MB".to_string(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: confgen::DEFAULT_ENV_PREFIX.to_string(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            retry_attempts: 10,
            retry_interval_ms: 100,
        }
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists there, returns default configuration;
    /// an explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let (config_path, explicit) = match path {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(CONFIG_FILENAME), false),
        };

        if !config_path.exists() {
            if explicit {
                return Err(ConfigError::not_found(config_path).into());
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref input) = args.input {
            config.generate.input = input.clone();
        }

        if let Some(ref output) = args.output {
            config.generate.output = output.clone();
        }

        if let Some(mode) = args.mode {
            config.generate.mode = mode;
        }

        if let Some(ref max_file_size) = args.max_file_size {
            config.generate.max_file_size = max_file_size.clone();
        }

        if args.no_env {
            config.env.enabled = false;
        }

        if let Some(ref prefix) = args.env_prefix {
            config.env.prefix = prefix.clone();
        }

        if let Some(debounce_ms) = args.debounce_ms {
            config.watch.debounce_ms = debounce_ms;
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# confgen configuration file

[generate]
# Input TOML configuration file
input = "config.toml"

# Output Rust file
output = "src/config_gen.rs"

# Generation mode: "static" (values baked at generation time) or
# "getter" (runtime env var overrides with baked defaults)
mode = "static"

# Maximum file size for file: references (e.g. 10MB, 1GB, 512KB)
max_file_size = "1MB"

[env]
# Apply environment variable overrides at generation time
enabled = true

# Environment variable prefix (PREFIX_SECTION_KEY)
prefix = "CONFIG"

[watch]
# Debounce delay in milliseconds (prevents rapid regeneration)
debounce_ms = 100

# Bounded retry after the watched file disappears
retry_attempts = 10
retry_interval_ms = 100
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Input file override.
    pub input: Option<PathBuf>,

    /// Output file override.
    pub output: Option<PathBuf>,

    /// Mode override.
    pub mode: Option<Mode>,

    /// Disable env overrides.
    pub no_env: bool,

    /// Env prefix override.
    pub env_prefix: Option<String>,

    /// Max file size override.
    pub max_file_size: Option<String>,

    /// Debounce override.
    pub debounce_ms: Option<u64>,
}

/// Parse a human-readable file size string like "10MB", "1GB", "512KB"
/// into bytes. A bare number is taken as bytes.
pub fn parse_size(size: &str) -> CliResult<u64> {
    let normalized = size.trim().to_uppercase();

    // Longest suffix first, so "B" does not shadow "KB".
    const MULTIPLIERS: [(&str, u64); 5] = [
        ("TB", 1024 * 1024 * 1024 * 1024),
        ("GB", 1024 * 1024 * 1024),
        ("MB", 1024 * 1024),
        ("KB", 1024),
        ("B", 1),
    ];

    for (suffix, multiplier) in MULTIPLIERS {
        if let Some(number) = normalized.strip_suffix(suffix) {
            let number = number.trim();
            let parsed: u64 = number.parse().map_err(|_| {
                ConfigError::invalid_value("max_file_size", format!("invalid size: {size}"))
            })?;
            return Ok(parsed * multiplier);
        }
    }

    normalized.parse().map_err(|_| {
        ConfigError::invalid_value("max_file_size", format!("invalid size: {size}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generate.input, PathBuf::from("config.toml"));
        assert_eq!(config.generate.output, PathBuf::from("src/config_gen.rs"));
        assert_eq!(config.generate.mode, Mode::Static);
        assert_eq!(config.generate.max_file_size, "1MB");
        assert!(config.env.enabled);
        assert_eq!(config.env.prefix, "CONFIG");
        assert_eq!(config.watch.debounce_ms, 100);
        assert_eq!(config.watch.retry_attempts, 10);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[generate]
input = "app.toml"
output = "src/app_config.rs"
mode = "getter"
max_file_size = "5MB"

[env]
enabled = false
prefix = "APP"

[watch]
debounce_ms = 250
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.generate.input, PathBuf::from("app.toml"));
        assert_eq!(config.generate.mode, Mode::Getter);
        assert_eq!(config.generate.max_file_size, "5MB");
        assert!(!config.env.enabled);
        assert_eq!(config.env.prefix, "APP");
        assert_eq!(config.watch.debounce_ms, 250);
        // Unset sections keep their defaults.
        assert_eq!(config.watch.retry_attempts, 10);
    }

    #[test]
    fn test_merge_cli_args_take_precedence() {
        let config = Config::default();
        let args = CliArgs {
            input: Some(PathBuf::from("other.toml")),
            mode: Some(Mode::Getter),
            no_env: true,
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(config, &args);
        assert_eq!(merged.generate.input, PathBuf::from("other.toml"));
        assert_eq!(merged.generate.mode, Mode::Getter);
        assert!(!merged.env.enabled);
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let config = Config::default();
        let merged = ConfigManager::merge_cli_args(config.clone(), &CliArgs::default());
        assert_eq!(merged.generate.output, config.generate.output);
        assert_eq!(merged.env.prefix, config.env.prefix);
    }

    #[test]
    fn test_default_config_content_parses() {
        let config: Config = toml::from_str(ConfigManager::default_config_content()).unwrap();
        assert_eq!(config.generate.mode, Mode::Static);
    }

    #[test]
    fn test_parse_size_suffixes() {
        assert_eq!(parse_size("1MB").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("512KB").unwrap(), 512 * 1024);
        assert_eq!(parse_size("2GB").unwrap(), 2 * 1024 * 1024 * 1024);
        assert_eq!(parse_size("10B").unwrap(), 10);
        assert_eq!(parse_size("1mb").unwrap(), 1024 * 1024);
        assert_eq!(parse_size(" 4 KB ").unwrap(), 4096);
    }

    #[test]
    fn test_parse_size_plain_bytes() {
        assert_eq!(parse_size("1048576").unwrap(), 1024 * 1024);
    }

    #[test]
    fn test_parse_size_invalid() {
        assert!(parse_size("lots").is_err());
        assert!(parse_size("MB").is_err());
        assert!(parse_size("1.5MB").is_err());
    }
}
