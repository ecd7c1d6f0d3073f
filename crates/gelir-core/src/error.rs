//! Error types for the gelir-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the gelir library.
#[derive(Error, Debug)]
pub enum GelirError {
    /// Directory scan error.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to directory scanning.
///
/// Only the scan root itself can fail a scan; unreadable subtrees are
/// logged and skipped.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("scan root not found: {0}")]
    RootNotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan root exists but cannot be listed.
    #[error("cannot list scan root {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors related to the persisted record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persisted store document could not be parsed. The whole load
    /// fails; nothing is partially applied.
    #[error("record store is corrupt: {0}")]
    Corrupt(String),

    /// No record with the given id exists.
    #[error("no record with id: {0}")]
    NotFound(String),

    /// I/O error while loading or saving the store.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the external text decoder.
///
/// Decode failures are never fatal to a scan: the pipeline records a
/// sentinel record flagged for review and moves on.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The document file could not be read.
    #[error("failed to read document: {0}")]
    Read(String),

    /// The decoder could not produce text from the document.
    #[error("failed to decode text: {0}")]
    Decode(String),

    /// The decoder produced no usable text.
    #[error("document produced no text")]
    Empty,
}

/// Result type for the gelir library.
pub type Result<T> = std::result::Result<T, GelirError>;
