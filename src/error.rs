//! Error types for the plainterms library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PlainTermsError`] (**run-level**): the request cannot produce a
//!   result (no input, nothing to narrate, summarizer unreachable, a run
//!   already in flight). Returned as `Err(PlainTermsError)` from the
//!   top-level `simplify*`, `summarize*`, `analyze*` and narration functions.
//!
//! * [`SummarizerError`] (**transport-level**): what exactly went wrong
//!   talking to a remote summarizer (the provider's own error, a timeout,
//!   an empty answer). It is logged in full and folded into
//!   [`PlainTermsError::SummarizerUnavailable`] before reaching the user, who
//!   only ever sees a generic message and a pointer to the configuration.
//!
//! Every failure is terminal for its run. Nothing here is retried by the
//! library unless the caller raises `max_retries`.

use crate::narration::NarrationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why an input was rejected as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyInputKind {
    /// No text and no image at all.
    Missing,
    /// Text was supplied but every section is blank.
    Blank,
}

impl fmt::Display for EmptyInputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyInputKind::Missing => f.write_str("no input supplied"),
            EmptyInputKind::Blank => f.write_str("input contains only whitespace"),
        }
    }
}

/// All run-level errors returned by the plainterms library.
#[derive(Debug, Error)]
pub enum PlainTermsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Nothing to simplify, summarize or analyze.
    #[error("Please paste some text to simplify ({kind}).")]
    EmptyInput { kind: EmptyInputKind },

    /// Narration requested before any simplification completed.
    #[error("Please simplify some text first to generate audio.")]
    NoPriorResult,

    /// Input file could not be read.
    #[error("Failed to read input '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image bytes are not a format the summarizer accepts.
    #[error("Unsupported image: {detail}\nUse a PNG, JPEG, WebP or GIF image.")]
    UnsupportedImage { detail: String },

    // ── Run control ───────────────────────────────────────────────────────
    /// A simplification run is already in flight on this simplifier.
    #[error("A simplification is already running; wait for it to finish.")]
    RunInProgress,

    /// The run was cancelled at a suspension point.
    #[error("Simplification cancelled")]
    Cancelled,

    // ── Summarizer errors ─────────────────────────────────────────────────
    /// No summarizer could be resolved (missing API key etc.).
    #[error("Summarizer provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The remote summarizer failed. `message` is safe to show to users;
    /// `detail` carries the transport-level cause for logs.
    #[error("{message}\nPlease check that your API key and provider are correctly configured.")]
    SummarizerUnavailable {
        provider: String,
        message: String,
        #[source]
        detail: SummarizerError,
    },

    // ── Narration ─────────────────────────────────────────────────────────
    #[error(transparent)]
    Narration(#[from] NarrationError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// A rule set failed validation or could not be parsed.
    #[error("Invalid rule set: {0}")]
    InvalidRules(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlainTermsError {
    /// True for errors the user fixes by changing what they typed, as opposed
    /// to environment or provider failures.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            PlainTermsError::EmptyInput { .. }
                | PlainTermsError::NoPriorResult
                | PlainTermsError::UnsupportedImage { .. }
        )
    }
}

/// Transport-level failure talking to a remote summarizer.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum SummarizerError {
    /// The LLM provider reported an error (HTTP status, auth, rate limit,
    /// network). Carries the provider's own message.
    #[error("provider error: {0}")]
    Provider(String),

    /// The call did not complete within the configured timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// A success response without any text.
    #[error("response contained no text")]
    EmptyResponse,
}

impl SummarizerError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SummarizerError::Provider(_) | SummarizerError::Timeout { .. } => true,
            SummarizerError::EmptyResponse => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_display_mentions_kind() {
        let e = PlainTermsError::EmptyInput {
            kind: EmptyInputKind::Blank,
        };
        let msg = e.to_string();
        assert!(msg.contains("paste some text"), "got: {msg}");
        assert!(msg.contains("whitespace"), "got: {msg}");
    }

    #[test]
    fn summarizer_unavailable_hides_detail() {
        let e = PlainTermsError::SummarizerUnavailable {
            provider: "gemini".into(),
            message: "Failed to summarize the document.".into(),
            detail: SummarizerError::Provider("403: API key not valid".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("Failed to summarize"));
        assert!(msg.contains("correctly configured"));
        assert!(!msg.contains("API key not valid"));
    }

    #[test]
    fn transient_classification() {
        assert!(SummarizerError::Provider("429".into()).is_transient());
        assert!(SummarizerError::Timeout { secs: 5 }.is_transient());
        assert!(!SummarizerError::EmptyResponse.is_transient());
    }

    #[test]
    fn user_input_errors() {
        assert!(PlainTermsError::NoPriorResult.is_user_input());
        assert!(!PlainTermsError::RunInProgress.is_user_input());
    }
}
