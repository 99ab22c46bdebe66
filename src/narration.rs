//! Narration: read the most recent simplification aloud.
//!
//! Synthesis itself lives behind the [`Narrator`] trait. The only shipped
//! implementation, [`UnavailableNarrator`], stands in until a speech backend
//! is wired up: it waits a moment, then reports that audio is unavailable.
//!
//! The library's own obligation is [`narrate_last_run`]: feed the narrator
//! the text of the last completed run, or fail fast with
//! [`PlainTermsError::NoPriorResult`] without calling the narrator at all.

use crate::audio::AudioBytes;
use crate::error::PlainTermsError;
use crate::simplify::LastRunStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure reported by a [`Narrator`].
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum NarrationError {
    /// No speech backend is available.
    #[error("Audio playback is not available. {hint}")]
    Unavailable { hint: String },

    /// The backend was reached but synthesis failed.
    #[error("Narration failed: {0}")]
    Failed(String),
}

/// Turns text into audio.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn request_narration(&self, text: &str, language: &str) -> Result<AudioBytes, NarrationError>;
}

/// Placeholder narrator: always unavailable after `delay`.
#[derive(Debug, Clone)]
pub struct UnavailableNarrator {
    delay: Duration,
}

impl UnavailableNarrator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for UnavailableNarrator {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl Narrator for UnavailableNarrator {
    async fn request_narration(&self, text: &str, language: &str) -> Result<AudioBytes, NarrationError> {
        debug!("Narration requested: {} chars in {}", text.len(), language);
        tokio::time::sleep(self.delay).await;
        Err(NarrationError::Unavailable {
            hint: "For a full version, please ensure your API key is correctly configured.".into(),
        })
    }
}

/// Narrate the last completed run.
///
/// Returns [`PlainTermsError::NoPriorResult`] immediately, without touching
/// the narrator, when no run has completed yet.
pub async fn narrate_last_run(
    store: &LastRunStore,
    narrator: &dyn Narrator,
) -> Result<AudioBytes, PlainTermsError> {
    let last = store.get().ok_or(PlainTermsError::NoPriorResult)?;
    if last.text.trim().is_empty() {
        return Err(PlainTermsError::NoPriorResult);
    }

    info!("Requesting narration of {} chars ({})", last.text.len(), last.language);
    narrator
        .request_narration(&last.text, &last.language)
        .await
        .map_err(|e| {
            warn!("Narration failed: {}", e);
            PlainTermsError::from(e)
        })
}
