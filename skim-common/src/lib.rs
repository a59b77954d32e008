//! Common types and utilities shared across skim crates.
//!
//! This crate defines the shared error type and the observability helpers used
//! by every other crate in the workspace. It stays dependency-light so the
//! extraction and browser crates can depend on it without dragging anything
//! heavy along.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`SkimError`] and [`Result`]: Run-level error handling
//!
//! # Examples
//!
//! ```rust
//! use skim_common::SkimError;
//!
//! let err = SkimError::Setup("no WebDriver endpoint answered".into());
//! assert!(err.is_fatal());
//! ```

pub mod observability;

/// Errors that can end a skim run.
///
/// Per-page and per-card problems never surface here: the session recovers
/// from them locally and keeps whatever it already accumulated.
#[derive(thiserror::Error, Debug)]
pub enum SkimError {
    /// The page-providing backend could not be initialised at all.
    #[error("Setup error: {0}")]
    Setup(String),

    /// A driver (browser, script execution) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing results or logs failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialising the result table failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SkimError {
    /// Whether the error aborts the whole run rather than a single topic.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SkimError::Setup(_) | SkimError::Config(_))
    }
}

/// Convenient alias for results that use [`SkimError`].
pub type Result<T> = std::result::Result<T, SkimError>;
