//! # confgen-cli
//!
//! CLI library for generating type-safe Rust code from TOML
//! configuration files.
//!
//! This crate provides the functionality behind the `confgen` binary:
//! tool configuration, output writing, and the change-driven
//! regeneration coordinator. The generation engine itself lives in the
//! `confgen` crate.
//!
//! ## Architecture
//!
//! - [`config`] - `confgen.toml` loading and CLI argument merging
//! - [`coordinator`] - debounced watch loop driving regeneration
//! - [`writer`] - file output and dry-run support
//! - [`error`] - error types and handling

pub mod config;
pub mod coordinator;
pub mod error;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager, Mode};
pub use coordinator::{CoordinatorHandle, NotifyBackend, RegenerationCoordinator};
pub use error::{CliError, CliResult};
pub use writer::FileWriter;
