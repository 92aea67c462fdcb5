// src/error.rs

//! Error types for descriptor evaluation, registration and staging

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the oblo-recipes library
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O failure with additional context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Descriptor, config or graph could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A named entity (dependency, component, version) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The same library is pinned twice in one requirement set
    #[error("Duplicate requirement '{0}'")]
    DuplicateRequirement(String),

    /// An option was referenced that the descriptor does not declare
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// An option value has the wrong shape
    #[error("Invalid value for option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    /// The build type has no known output configuration
    #[error("Unsupported build type '{0}' (expected Debug or Release)")]
    UnsupportedBuildType(String),

    /// A staging or packaging pattern is not a valid glob
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A downloaded file did not match its pinned checksum
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Source download failed
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// A required external binary is not on PATH
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// An external command exited unsuccessfully
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// A build step exited unsuccessfully
    #[error("Build failed: {0}")]
    BuildFailed(String),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
