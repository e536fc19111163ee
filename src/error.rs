//! Error types for the note2post library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Note2PostError`] — **Fatal**: the post cannot be produced at all
//!   (input note missing, unreadable, bad date, output not writable).
//!   Returned as `Err(Note2PostError)` from the top-level `convert*` functions.
//!
//! * [`AssetError`] — **Non-fatal**: a referenced image could not be copied
//!   into the images directory. Stored in
//!   [`crate::output::ConversionOutput::asset_errors`] so callers can audit
//!   what was skipped; the rewritten post is still produced.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the note2post library.
///
/// Image copy failures use [`AssetError`] and never surface here.
#[derive(Debug, Error)]
pub enum Note2PostError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input note was not found at the given path.
    #[error("Input note not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the note.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The note exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The note is not valid UTF-8 text.
    #[error("Input note '{path}' is not valid UTF-8")]
    InvalidEncoding { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The publication date is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date '{date}': expected YYYY-MM-DD")]
    InvalidDate { date: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output post.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image copy.
///
/// The reference is still rewritten in the text; only the file is missing
/// from the images directory.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetError {
    /// The resolved source is not an existing regular file.
    #[error("Image source not found: '{}'", path.display())]
    SourceMissing { path: PathBuf },

    /// The target directory could not be created.
    #[error("Failed to create image directory '{}': {detail}", dir.display())]
    CreateDirFailed { dir: PathBuf, detail: String },

    /// The source already is the target file; it is left untouched.
    #[error("Image '{}' is already in place", path.display())]
    SameFile { path: PathBuf },

    /// The copy itself failed.
    #[error("Failed to copy '{}' to '{}': {detail}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        detail: String,
    },
}
