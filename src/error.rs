//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI/main layer uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: crate-level error for filesystem and tag operations
//! - [`CatalogError`](crate::catalog::CatalogError): lookup failures, which
//!   the pipeline degrades to "no suggestion" instead of propagating
//!
//! # Example
//!
//! ```ignore
//! use tune_sorter::error::{Error, Result};
//!
//! fn prepare(dir: &Path) -> Result<()> {
//!     std::fs::create_dir_all(dir)
//!         .map_err(|e| Error::relocation(dir, e.to_string()))?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Tag reading/writing error
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Copy/move of a source file failed
    #[error("Relocation error for {path}: {message}")]
    Relocation { path: PathBuf, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a relocation error.
    pub fn relocation(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Relocation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
