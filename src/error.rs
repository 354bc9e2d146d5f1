//! Error types for the biascope library.
//!
//! A single fatal-error enum covers the whole pipeline. Stage-gating failures
//! ([`BiasScopeError::StageNotReady`]) are deliberately ordinary variants
//! rather than panics: the front-end shows them as a message and the session
//! stays usable — invoking "Bias Score" before "Bias Analysis" must never
//! crash or silently run the missing stage.
//!
//! Service failures ([`BiasScopeError::LlmApiError`]) carry whatever the
//! provider reported and propagate unhandled; the pipeline performs no retry,
//! no backoff, and no fallback response.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the biascope library.
#[derive(Debug, Error)]
pub enum BiasScopeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium reported an error while reading text or image content.
    #[error("Extraction failed on page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── Stage-gating errors ───────────────────────────────────────────────
    /// A stage was invoked before the stage it depends on had run.
    ///
    /// The orchestrator rejects out-of-order invocations instead of skipping
    /// the gate or fabricating the missing input.
    #[error("Cannot run {stage}: {hint}")]
    StageNotReady {
        stage: &'static str,
        hint: &'static str,
    },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No usable provider credential was found at session start.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The completion endpoint returned an error; propagated as-is.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── Artifact I/O errors ───────────────────────────────────────────────
    /// Could not write an artifact file in the working directory.
    #[error("Failed to write artifact '{path}': {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read a persisted artifact back from disk.
    #[error("Failed to read artifact '{path}': {source}")]
    ArtifactReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
