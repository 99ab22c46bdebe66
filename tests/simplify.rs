//! Offline integration tests for plainterms.
//!
//! No network: summarizers and narrators are in-process fakes.
//!
//! Run with:
//!   cargo test --test simplify

use async_trait::async_trait;
use futures::StreamExt;
use plainterms::{
    extract_text, narrate_last_run, run_stream, simplify, summarize_text, AudioBytes,
    EmphasisStyle, EmptyInputKind, LastRun, NarrationError, Narrator, PlainTermsError,
    PresentationCallback, RuleSet, SectionEvent, SimplifiedSection, Simplifier, SimplifyConfig,
    Summarizer, SummarizerError, SummaryInput, SummaryRequest, SummaryResponse,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

const CONNECTIFY_TOS: &str = "Welcome to Connectify. By accessing or using our services, you agree to be bound by these Terms of Service (\"Terms\"). These Terms constitute a legally binding agreement between you and Connectify, Inc. If you do not agree to these Terms, you may not access or use the services.

You retain ownership of any intellectual property rights that you hold in the content you submit, post, or display on or through the services. However, by submitting content, you grant Connectify a worldwide, non-exclusive, royalty-free license to use, reproduce, adapt, publish, and distribute such content on behalf of the service.

The services are provided on an \"as-is\" and \"as-available\" basis without any warranties of any kind, either express or implied, including, but not limited to, implied warranties of merchantability, fitness for a particular purpose, or non-infringement. We do not warrant that the services will be uninterrupted, secure, or free from errors.

You represent and warrant that you have all the rights, power, and authority necessary to grant the rights granted herein to any content you submit.



We reserve the right, at our sole discretion, to modify or replace these Terms at any time. Your continued use of the services after any such changes constitutes your acceptance of the new Terms. Your use of the services is at your sole risk.";

/// The five phrases that may carry emphasis, in their emphasized form.
const EMPHASIZED: &[&str] = &[
    "By using our app, you agree to follow these rules.",
    "give us a license to use it",
    "Our app comes with no guarantees.",
    "We can change these rules at any time.",
    "You use the app at your own risk.",
];

// ── Test helpers ─────────────────────────────────────────────────────────────

fn config() -> SimplifyConfig {
    SimplifyConfig::builder().pacing_ms(0).build().unwrap()
}

struct CountingNarrator(Arc<AtomicUsize>);

#[async_trait]
impl Narrator for CountingNarrator {
    async fn request_narration(&self, _text: &str, _language: &str) -> Result<AudioBytes, NarrationError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(NarrationError::Failed("test".into()))
    }
}

struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    fn name(&self) -> &str {
        "failing"
    }
    fn model(&self) -> &str {
        "none"
    }
    async fn summarize(&self, _r: &SummaryRequest) -> Result<SummaryResponse, SummarizerError> {
        Err(SummarizerError::Provider("500 internal".into()))
    }
}

/// Answers every image request with a fixed transcription.
struct Transcriber(&'static str);

#[async_trait]
impl Summarizer for Transcriber {
    fn name(&self) -> &str {
        "transcriber"
    }
    fn model(&self) -> &str {
        "none"
    }
    async fn summarize(&self, r: &SummaryRequest) -> Result<SummaryResponse, SummarizerError> {
        assert!(matches!(r.input, SummaryInput::Image(_)));
        Ok(SummaryResponse {
            text: self.0.into(),
            ..Default::default()
        })
    }
}

/// Records when each section became ready.
#[derive(Default)]
struct Stopwatch(Mutex<Vec<Instant>>);

impl PresentationCallback for Stopwatch {
    fn on_section_ready(&self, _section: &SimplifiedSection, _total: usize) {
        self.0.lock().unwrap().push(Instant::now());
    }
}

fn png() -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

// ── Sectioning ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_section_per_non_blank_chunk() {
    let result = simplify(CONNECTIFY_TOS, &config()).await.unwrap();
    // Five chunks; the run of extra blank lines does not create empty sections.
    assert_eq!(result.sections.len(), 5);
    assert_eq!(result.stats.total_sections, 5);
    let indices: Vec<usize> = result.sections.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn two_sections_rewritten_independently() {
    let result = simplify("A\n\nB", &config()).await.unwrap();
    assert_eq!(result.sections.len(), 2);
    assert_eq!(result.sections[0].plain_text(), "A");
    assert_eq!(result.sections[1].plain_text(), "B");
    assert_eq!(result.plain_text(), "A B");
}

// ── Rewriting and emphasis ───────────────────────────────────────────────────

#[tokio::test]
async fn sole_risk_becomes_emphasized_plain_language() {
    let result = simplify("Your use of the services is at your sole risk.", &config())
        .await
        .unwrap();
    let md = result.render(&EmphasisStyle::Markdown);
    assert_eq!(md, "**You use the app at your own risk.**");
}

#[tokio::test]
async fn full_document_rewrite() {
    let result = simplify(CONNECTIFY_TOS, &config()).await.unwrap();
    assert_eq!(
        result.plain_text(),
        "By using our app, you agree to follow these rules. \
         You own what you post, but you give us a license to use it. \
         Our app comes with no guarantees. It might have bugs or stop working. \
         You promise you have the right to post any content you share. \
         We can change these rules at any time. By continuing to use our app, you agree to any new rules. \
         You use the app at your own risk."
    );
    assert_eq!(result.stats.emphasized_sections, 4);
}

#[tokio::test]
async fn emphasis_only_on_designated_phrases() {
    let result = simplify(CONNECTIFY_TOS, &config()).await.unwrap();
    for section in &result.sections {
        for span in section.spans.iter().filter(|s| s.emphasized) {
            assert!(
                EMPHASIZED.contains(&span.text.as_str()),
                "unexpected emphasized text: {:?}",
                span.text
            );
        }
    }
}

#[tokio::test]
async fn untransformed_phrase_is_never_emphasized() {
    // Already plain input: the phrase matches an emphasis rule but no rewrite produced it.
    let result = simplify("We can change these rules at any time.", &config())
        .await
        .unwrap();
    assert!(result.sections[0].spans.iter().all(|s| !s.emphasized));
}

#[tokio::test]
async fn rewriting_is_idempotent() {
    let first = simplify(CONNECTIFY_TOS, &config()).await.unwrap();
    let again = simplify(first.plain_text(), &config()).await.unwrap();
    assert_eq!(again.plain_text(), first.plain_text());
}

#[tokio::test]
async fn custom_rules_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"rules": [{{"pattern": "at its sole discretion", "replacement": "whenever it wants"}}],
            "emphasis": [{{"phrase": "whenever it wants", "emphasized": "whenever it wants"}}]}}"#
    )
    .unwrap();
    let rules = RuleSet::from_path(file.path()).unwrap();
    let cfg = SimplifyConfig::builder().pacing_ms(0).rules(rules).build().unwrap();
    let result = simplify("It may cancel at its sole discretion.", &cfg).await.unwrap();
    assert_eq!(
        result.render(&EmphasisStyle::Markdown),
        "It may cancel **whenever it wants**."
    );
}

#[tokio::test]
async fn configured_emphasis_drives_report() {
    let cfg = SimplifyConfig::builder()
        .pacing_ms(0)
        .emphasis(EmphasisStyle::Html)
        .build()
        .unwrap();
    let result = simplify("Your use of the services is at your sole risk.", &cfg)
        .await
        .unwrap();
    assert!(cfg
        .render_report(&result)
        .contains("<span class=\"text-red-500\">You use the app at your own risk.</span>"));
}

// ── Pacing ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn sections_are_paced() {
    let cfg = SimplifyConfig::builder().pacing_ms(500).build().unwrap();
    let simplifier = Simplifier::new(cfg);
    let watch = Stopwatch::default();

    let start = Instant::now();
    let result = simplifier.run_with("A\n\nB\n\nC", "English", &watch).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result.sections.len(), 3);
    assert!(elapsed >= Duration::from_millis(1500), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1600), "{elapsed:?}");

    let ready = watch.0.lock().unwrap();
    assert_eq!(ready.len(), 3);
    assert!(ready[0] - start >= Duration::from_millis(500));
    assert!(ready[1] - ready[0] >= Duration::from_millis(500));
    assert!(ready[2] - ready[1] >= Duration::from_millis(500));
}

// ── Images ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn photographed_terms_are_simplified() {
    let cfg = SimplifyConfig::builder()
        .pacing_ms(0)
        .provider(Arc::new(Transcriber(
            "Welcome.\n\nYour use of the services is at your sole risk.",
        )))
        .build()
        .unwrap();
    let text = extract_text(png(), &cfg).await.unwrap();
    let result = simplify(&text, &cfg).await.unwrap();
    assert_eq!(result.sections.len(), 2);
    assert_eq!(
        result.render(&EmphasisStyle::Markdown),
        "Welcome. **You use the app at your own risk.**"
    );
}

#[tokio::test]
async fn failed_transcription_is_generic() {
    let cfg = SimplifyConfig::builder()
        .provider(Arc::new(FailingSummarizer))
        .build()
        .unwrap();
    let err = assert_err!(extract_text(png(), &cfg).await);
    assert!(err.to_string().contains("Failed to extract text from the image."));
    assert!(!err.to_string().contains("500 internal"));
}

// ── Empty input ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_and_blank_input_are_rejected() {
    let simplifier = Simplifier::new(config());
    for (doc, kind) in [("", EmptyInputKind::Missing), (" \n\n\t\n", EmptyInputKind::Blank)] {
        let err = simplifier.run(doc).await.unwrap_err();
        assert!(
            matches!(err, PlainTermsError::EmptyInput { kind: k } if k == kind),
            "{doc:?} gave {err:?}"
        );
    }
    assert!(simplifier.last_run().is_empty());
}

// ── Narration ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn narration_without_prior_run_makes_no_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let simplifier = Simplifier::new(config());
    let err = narrate_last_run(simplifier.last_run(), &CountingNarrator(Arc::clone(&calls)))
        .await
        .unwrap_err();
    assert!(matches!(err, PlainTermsError::NoPriorResult));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn narration_reads_latest_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let simplifier = Simplifier::new(config());
    assert_ok!(simplifier.run("Your use of the services is at your sole risk.").await);
    assert_eq!(
        simplifier.last_run().get(),
        Some(LastRun {
            text: "You use the app at your own risk.".into(),
            language: "English".into(),
        })
    );
    let _ = narrate_last_run(simplifier.last_run(), &CountingNarrator(Arc::clone(&calls))).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ── Summarizer failure ───────────────────────────────────────────────────────

#[tokio::test]
async fn failing_summarizer_leaves_last_run_untouched() {
    let cfg = SimplifyConfig::builder()
        .pacing_ms(0)
        .provider(Arc::new(FailingSummarizer))
        .build()
        .unwrap();
    let simplifier = Simplifier::new(cfg.clone());
    assert_ok!(simplifier.run("A\n\nB").await);
    let before = simplifier.last_run().get();

    let err = assert_err!(summarize_text("Some terms.", &cfg).await);
    assert!(matches!(err, PlainTermsError::SummarizerUnavailable { .. }));
    assert_eq!(simplifier.last_run().get(), before);
}

// ── Streaming ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stream_delivers_sections_then_summary() {
    let simplifier = Arc::new(Simplifier::new(config()));
    let events: Vec<SectionEvent> = run_stream(&simplifier, CONNECTIFY_TOS, "Spanish")
        .map(|e| e.unwrap())
        .collect()
        .await;

    let ready = events
        .iter()
        .filter(|e| matches!(e, SectionEvent::SectionReady { .. }))
        .count();
    assert_eq!(ready, 5);
    match events.last().unwrap() {
        SectionEvent::SummaryReady { result } => assert_eq!(result.language, "Spanish"),
        other => panic!("expected summary last, got {other:?}"),
    }
    assert_eq!(simplifier.last_run().get().unwrap().language, "Spanish");
}
