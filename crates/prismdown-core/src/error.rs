//! Error taxonomy for the pipeline.
//!
//! Nothing here is fatal: load errors become in-buffer text, save errors are
//! handed back to the front end with the buffer intact, and watch or render
//! failures are logged and swallowed.

use std::io;

/// Failure to produce a [`crate::document::Document`] from a path.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read file: {0}")]
    Io(#[from] io::Error),

    /// The bytes decode under none of the supported encodings.
    #[error("file is not text in any supported encoding")]
    UnsupportedEncoding,

    #[error("file is too large to load ({0} bytes)")]
    TooLarge(u64),
}

/// Failure to persist the buffer.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// No bound path; the front end should route to a save-as flow.
    #[error("document has no target path; use save-as")]
    NoTargetPath,

    #[error("could not write file: {0}")]
    Io(#[from] io::Error),
}

/// A render-surface invocation failed. Non-fatal by contract; the next
/// successful push self-corrects the visible state.
#[derive(Debug, thiserror::Error)]
#[error("render invocation failed: {0}")]
pub struct RenderError(String);

impl RenderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
