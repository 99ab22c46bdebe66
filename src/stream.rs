//! Streaming API: emit section events as the run progresses.
//!
//! The callback API ([`crate::presentation::PresentationCallback`]) suits
//! callers that already own a render loop. The stream API suits everyone
//! else: `while let Some(event) = stream.next().await { … }`.
//!
//! Events arrive in run order (`SectionStarted`, `SectionReady` per section,
//! then `SummaryReady`). A failed run yields a single terminal `Err` item.
//! Dropping the stream cancels the run at its next suspension point.

use crate::error::PlainTermsError;
use crate::presentation::{ChannelPresentation, SectionEvent};
use crate::simplify::Simplifier;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::debug;

/// A boxed stream of section events.
pub type SectionStream = Pin<Box<dyn Stream<Item = Result<SectionEvent, PlainTermsError>> + Send>>;

/// Run `simplifier` over `document` on a background task, streaming events.
///
/// # Example
/// ```rust,no_run
/// use futures::StreamExt;
/// use plainterms::{run_stream, SectionEvent, Simplifier, SimplifyConfig};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let simplifier = Arc::new(Simplifier::new(SimplifyConfig::default()));
/// let mut events = run_stream(&simplifier, "A\n\nB", "English");
/// while let Some(event) = events.next().await {
///     match event {
///         Ok(SectionEvent::SectionReady { section, .. }) => println!("{}", section.plain_text()),
///         Ok(_) => {}
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # }
/// ```
pub fn run_stream(
    simplifier: &Arc<Simplifier>,
    document: impl Into<String>,
    language: impl Into<String>,
) -> SectionStream {
    let (tx, rx) = mpsc::unbounded_channel();
    let simplifier = Arc::clone(simplifier);
    let document = document.into();
    let language = language.into();

    tokio::spawn(async move {
        let watcher = tx.clone();
        let presentation = ChannelPresentation::new(tx.clone());
        let outcome = tokio::select! {
            r = simplifier.run_with(&document, &language, &presentation) => r,
            _ = watcher.closed() => {
                debug!("Event stream dropped; abandoning run");
                return;
            }
        };
        if let Err(e) = outcome {
            let _ = tx.send(Err(e));
        }
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}

impl Simplifier {
    /// Method form of [`run_stream`].
    pub fn stream(self: &Arc<Self>, document: impl Into<String>, language: impl Into<String>) -> SectionStream {
        run_stream(self, document, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimplifyConfig;
    use futures::StreamExt;

    fn simplifier(pacing_ms: u64) -> Arc<Simplifier> {
        Arc::new(Simplifier::new(
            SimplifyConfig::builder().pacing_ms(pacing_ms).build().unwrap(),
        ))
    }

    #[tokio::test]
    async fn stream_yields_all_events() {
        let s = simplifier(0);
        let events: Vec<_> = s.stream("A\n\nB\n\nC", "English").collect().await;
        assert_eq!(events.len(), 7);
        assert!(matches!(
            events[0],
            Ok(SectionEvent::SectionStarted { index: 1, total: 3 })
        ));
        match events.last() {
            Some(Ok(SectionEvent::SummaryReady { result })) => {
                assert_eq!(result.sections.len(), 3)
            }
            other => panic!("unexpected last event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stream_reports_empty_input() {
        let s = simplifier(0);
        let events: Vec<_> = s.stream("", "English").collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Err(PlainTermsError::EmptyInput { .. })
        ));
    }

    #[tokio::test]
    async fn dropping_stream_releases_simplifier() {
        let s = simplifier(10_000);
        let mut events = s.stream("A\n\nB", "English");
        let first = events.next().await;
        assert!(matches!(first, Some(Ok(SectionEvent::SectionStarted { .. }))));
        drop(events);

        for _ in 0..100 {
            if !s.is_busy() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(!s.is_busy());
        assert!(s.last_run().is_empty());
    }
}
