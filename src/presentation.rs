//! Presentation callbacks for per-section simplification events.
//!
//! Inject a [`PresentationHandle`] via
//! [`crate::config::SimplifyConfigBuilder::presentation`] (or pass one to
//! [`crate::simplify::Simplifier::run`]) to receive events as the pipeline
//! walks the document.
//!
//! # Event order
//!
//! ```text
//! on_run_start ─▶ (on_section_start ─▶ on_section_ready)* ─▶ on_summary_ready
//!                                 └──────────── on_run_error ◀── (any failure)
//! ```
//!
//! `on_summary_ready` fires last, but presentation layers are expected to
//! lay the summary out **before** the per-section detail.
//!
//! # Example
//!
//! ```rust
//! use plainterms::{PresentationCallback, SimplifiedSection};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl PresentationCallback for Counter {
//!     fn on_section_ready(&self, _section: &SimplifiedSection, _total: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::error::PlainTermsError;
use crate::output::{SimplificationResult, SimplifiedSection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Called by the orchestrator as it processes each section.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PresentationCallback: Send + Sync {
    /// Called once after segmentation, before the first section.
    fn on_run_start(&self, total_sections: usize, language: &str) {
        let _ = (total_sections, language);
    }

    /// A section is about to be rewritten (1-indexed).
    fn on_section_start(&self, index: usize, total_sections: usize) {
        let _ = (index, total_sections);
    }

    /// A section's simplified text is ready.
    fn on_section_ready(&self, section: &SimplifiedSection, total_sections: usize) {
        let _ = (section, total_sections);
    }

    /// All sections are done; `result` is the full document.
    fn on_summary_ready(&self, result: &SimplificationResult) {
        let _ = result;
    }

    /// The run ended without a result.
    fn on_run_error(&self, error: &PlainTermsError) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need events.
pub struct NoopPresentation;

impl PresentationCallback for NoopPresentation {}

/// Convenience alias matching the type stored in [`crate::config::SimplifyConfig`].
pub type PresentationHandle = Arc<dyn PresentationCallback>;

/// One event of a simplification run, as delivered by
/// [`crate::stream::run_stream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SectionEvent {
    SectionStarted { index: usize, total: usize },
    SectionReady { section: SimplifiedSection, total: usize },
    SummaryReady { result: SimplificationResult },
}

/// Sending half of an event channel; the run's terminal error travels on it too.
pub type EventSender = mpsc::UnboundedSender<Result<SectionEvent, PlainTermsError>>;

/// Forwards callbacks into an unbounded channel as [`SectionEvent`]s.
///
/// Send errors (receiver dropped) are ignored here; the stream driver notices
/// the closed channel and cancels the run.
pub struct ChannelPresentation {
    tx: EventSender,
}

impl ChannelPresentation {
    pub fn new(tx: EventSender) -> Self {
        Self { tx }
    }
}

impl PresentationCallback for ChannelPresentation {
    fn on_section_start(&self, index: usize, total_sections: usize) {
        let _ = self.tx.send(Ok(SectionEvent::SectionStarted {
            index,
            total: total_sections,
        }));
    }

    fn on_section_ready(&self, section: &SimplifiedSection, total_sections: usize) {
        let _ = self.tx.send(Ok(SectionEvent::SectionReady {
            section: section.clone(),
            total: total_sections,
        }));
    }

    fn on_summary_ready(&self, result: &SimplificationResult) {
        let _ = self.tx.send(Ok(SectionEvent::SummaryReady {
            result: result.clone(),
        }));
    }
}
