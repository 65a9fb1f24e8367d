//! Loading of `file:` references.
//!
//! References are resolved relative to the directory containing the
//! input file. The size ceiling is checked against file metadata before
//! the read, so an oversized file is rejected without buffering it.
//! Loads are cached by resolved path: the validation pre-pass touches
//! every reference once, and emission reuses the cached bytes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::classify::FILE_REFERENCE_PREFIX;
use crate::error::EmbedError;
use crate::value::{ConfigTable, ConfigValue};

/// Default maximum size (1 MB) for embedded files.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Resolves `file:` references to validated byte buffers.
#[derive(Debug)]
pub struct FileContentLoader {
    /// Directory `file:` paths are resolved against.
    base_dir: PathBuf,

    /// Maximum byte count for any single embedded file.
    max_bytes: u64,

    cache: RefCell<HashMap<PathBuf, Vec<u8>>>,
}

impl FileContentLoader {
    /// Create a loader rooted at the given directory.
    pub fn new(base_dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            base_dir: base_dir.into(),
            max_bytes,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a `file:` reference to its contents.
    pub fn resolve(&self, reference: &str) -> Result<Vec<u8>, EmbedError> {
        let relative = reference
            .strip_prefix(FILE_REFERENCE_PREFIX)
            .unwrap_or(reference);
        let resolved = self.base_dir.join(relative);

        if let Some(content) = self.cache.borrow().get(&resolved) {
            return Ok(content.clone());
        }

        let metadata = std::fs::metadata(&resolved).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EmbedError::not_found(resolved.clone())
            } else {
                EmbedError::Read {
                    path: resolved.clone(),
                    source: e,
                }
            }
        })?;

        if metadata.len() > self.max_bytes {
            return Err(EmbedError::size_exceeded(
                resolved,
                self.max_bytes,
                metadata.len(),
            ));
        }

        let content = std::fs::read(&resolved).map_err(|e| EmbedError::Read {
            path: resolved.clone(),
            source: e,
        })?;

        self.cache
            .borrow_mut()
            .insert(resolved, content.clone());
        Ok(content)
    }

    /// Validate every `file:` reference in the tree.
    ///
    /// Runs before any output is emitted so a bad reference can never
    /// leave a partial output file behind.
    pub fn validate_tree(&self, tree: &ConfigTable) -> Result<(), EmbedError> {
        for value in tree.values() {
            self.validate_value(value)?;
        }
        Ok(())
    }

    fn validate_value(&self, value: &ConfigValue) -> Result<(), EmbedError> {
        match value {
            ConfigValue::String(s) if crate::classify::is_file_reference(s) => {
                self.resolve(s).map(|_| ())
            }
            ConfigValue::Table(table) => self.validate_tree(table),
            ConfigValue::Array(items) => {
                for item in items {
                    self.validate_value(item)?;
                }
                Ok(())
            }
            ConfigValue::ArrayOfTables(tables) => {
                for table in tables {
                    self.validate_tree(table)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The directory references are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
