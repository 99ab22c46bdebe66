//! The offline simplification pipeline: segment, pace, rewrite, store.
//!
//! ## Run lifecycle
//!
//! ```text
//! Idle ──▶ Segmenting ──▶ (Rewriting i/n)* ──▶ Summarized ──▶ Idle
//! ```
//!
//! A [`Simplifier`] runs at most one simplification at a time. It owns the
//! single-slot [`LastRunStore`] that narration reads from, so a second,
//! overlapping run would race the first one for that slot and interleave
//! presentation events. Overlap is rejected with
//! [`PlainTermsError::RunInProgress`] instead.
//!
//! Between sections the run suspends for `pacing_ms` so presentation layers
//! can reveal sections one at a time. Each suspension point also observes
//! [`Simplifier::cancel`]; a cancelled run leaves the last-run store untouched.

use crate::config::SimplifyConfig;
use crate::error::{EmptyInputKind, PlainTermsError};
use crate::output::{LastRun, RunStats, SimplificationResult, SimplifiedSection};
use crate::pipeline::segment::Document;
use crate::presentation::{NoopPresentation, PresentationCallback};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Where the simplifier currently is in its run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Segmenting,
    Rewriting { index: usize, total: usize },
    Summarized,
}

/// Single-slot, last-writer-wins store for the most recent completed run.
///
/// Cloning yields another handle to the same slot.
#[derive(Debug, Clone, Default)]
pub struct LastRunStore {
    slot: Arc<RwLock<Option<LastRun>>>,
}

impl LastRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<LastRun> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Overwrite the slot.
    pub fn set(&self, run: LastRun) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(run);
    }

    pub fn clear(&self) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}

/// Drives the segmenter and rewriter over whole documents.
pub struct Simplifier {
    config: SimplifyConfig,
    last_run: LastRunStore,
    busy: AtomicBool,
    state: Mutex<RunState>,
    cancel_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl Simplifier {
    pub fn new(config: SimplifyConfig) -> Self {
        Self::with_store(config, LastRunStore::new())
    }

    /// Share an existing last-run slot (e.g. one already handed to a narrator).
    pub fn with_store(config: SimplifyConfig, last_run: LastRunStore) -> Self {
        Self {
            config,
            last_run,
            busy: AtomicBool::new(false),
            state: Mutex::new(RunState::Idle),
            cancel_tx: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SimplifyConfig {
        &self.config
    }

    /// Handle to the most-recent-run slot, for narration.
    pub fn last_run(&self) -> &LastRunStore {
        &self.last_run
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Ask the in-flight run, if any, to stop at its next suspension point.
    ///
    /// Returns true when a run was signalled.
    pub fn cancel(&self) -> bool {
        let guard = self.cancel_tx.lock().unwrap_or_else(|p| p.into_inner());
        match guard.as_ref() {
            Some(tx) => {
                warn!("Cancelling in-flight simplification");
                tx.send(true).is_ok()
            }
            None => false,
        }
    }

    /// Simplify `document` using the configured language and presentation.
    pub async fn run(&self, document: &str) -> Result<SimplificationResult, PlainTermsError> {
        let language = self.config.language.clone();
        match self.config.presentation.clone() {
            Some(p) => self.run_with(document, &language, p.as_ref()).await,
            None => self.run_with(document, &language, &NoopPresentation).await,
        }
    }

    /// Simplify `document`, reporting progress to `presentation`.
    ///
    /// `language` is stored with the result as run metadata; the rule-based
    /// rewriter does not translate.
    pub async fn run_with(
        &self,
        document: &str,
        language: &str,
        presentation: &dyn PresentationCallback,
    ) -> Result<SimplificationResult, PlainTermsError> {
        let result = self.run_inner(document, language, presentation).await;
        if let Err(ref e) = result {
            match e {
                PlainTermsError::Cancelled => warn!("Simplification cancelled"),
                other => debug!("Simplification rejected: {}", other),
            }
            presentation.on_run_error(e);
        }
        result
    }

    async fn run_inner(
        &self,
        document: &str,
        language: &str,
        presentation: &dyn PresentationCallback,
    ) -> Result<SimplificationResult, PlainTermsError> {
        let start = Instant::now();

        // ── Step 1: Reject missing input ─────────────────────────────────────
        if document.is_empty() {
            return Err(PlainTermsError::EmptyInput {
                kind: EmptyInputKind::Missing,
            });
        }

        let _busy = BusyGuard::acquire(self)?;
        let mut cancel_rx = self.arm_cancellation();

        // ── Step 2: Segment ──────────────────────────────────────────────────
        self.set_state(RunState::Segmenting);
        let doc = Document::parse(document);
        if doc.is_empty() {
            return Err(PlainTermsError::EmptyInput {
                kind: EmptyInputKind::Blank,
            });
        }
        let total = doc.len();
        info!("Simplifying {} sections (language: {})", total, language);
        presentation.on_run_start(total, language);

        // ── Step 3: Rewrite section by section ───────────────────────────────
        let pacing = Duration::from_millis(self.config.pacing_ms);
        let mut sections = Vec::with_capacity(total);

        for (i, original) in doc.sections().iter().enumerate() {
            let index = i + 1;
            self.set_state(RunState::Rewriting { index, total });
            presentation.on_section_start(index, total);

            pace(pacing, &mut cancel_rx).await?;

            let spans = self.config.rules.rewrite(original);
            let section = SimplifiedSection {
                index,
                original: original.clone(),
                spans,
            };
            debug!(
                "Section {}/{}: {} → {} chars",
                index,
                total,
                original.len(),
                section.plain_text().len()
            );
            presentation.on_section_ready(&section, total);
            sections.push(section);
        }

        // ── Step 4: Assemble and store ───────────────────────────────────────
        let stats = RunStats {
            total_sections: total,
            emphasized_sections: sections.iter().filter(|s| s.has_emphasis()).count(),
            input_chars: document.chars().count(),
            output_chars: sections.iter().map(|s| s.plain_text().chars().count()).sum(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        let result = SimplificationResult {
            sections,
            language: language.to_string(),
            stats,
        };

        self.set_state(RunState::Summarized);
        self.last_run.set(LastRun::from(&result));
        info!(
            "Simplification complete: {} sections, {} → {} chars, {}ms",
            result.stats.total_sections,
            result.stats.input_chars,
            result.stats.output_chars,
            result.stats.duration_ms
        );

        // ── Step 5: Summary signal ───────────────────────────────────────────
        presentation.on_summary_ready(&result);
        Ok(result)
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = state;
    }

    fn arm_cancellation(&self) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        *self.cancel_tx.lock().unwrap_or_else(|p| p.into_inner()) = Some(tx);
        rx
    }
}

/// Marks the simplifier busy for the lifetime of one run.
///
/// Released on every exit path, including a dropped run future.
struct BusyGuard<'a> {
    owner: &'a Simplifier,
}

impl<'a> BusyGuard<'a> {
    fn acquire(owner: &'a Simplifier) -> Result<Self, PlainTermsError> {
        owner
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| PlainTermsError::RunInProgress)?;
        Ok(Self { owner })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self
            .owner
            .cancel_tx
            .lock()
            .unwrap_or_else(|p| p.into_inner()) = None;
        self.owner.set_state(RunState::Idle);
        self.owner.busy.store(false, Ordering::SeqCst);
    }
}

/// Cooperative suspension point between sections.
async fn pace(delay: Duration, cancel: &mut watch::Receiver<bool>) -> Result<(), PlainTermsError> {
    if *cancel.borrow_and_update() {
        return Err(PlainTermsError::Cancelled);
    }
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::select! {
            _ = sleep(delay) => {}
            _ = cancelled(cancel) => return Err(PlainTermsError::Cancelled),
        }
    }
    if *cancel.borrow() {
        return Err(PlainTermsError::Cancelled);
    }
    Ok(())
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        if *cancel.borrow_and_update() {
            return;
        }
    }
}

/// Simplify a document with a one-off [`Simplifier`].
///
/// Uses `config.language` and `config.presentation`.
pub async fn simplify(
    document: impl AsRef<str>,
    config: &SimplifyConfig,
) -> Result<SimplificationResult, PlainTermsError> {
    Simplifier::new(config.clone()).run(document.as_ref()).await
}

/// Synchronous wrapper around [`simplify`].
///
/// Creates a temporary tokio runtime internally.
pub fn simplify_sync(
    document: impl AsRef<str>,
    config: &SimplifyConfig,
) -> Result<SimplificationResult, PlainTermsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PlainTermsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(simplify(document, config))
}
