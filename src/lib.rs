//! # plainterms
//!
//! Turn Terms-of-Service documents into plain language.
//!
//! Legal boilerplate hides the clauses that actually matter: the licence you
//! grant over your posts, the warranty you don't get, the right to change the
//! rules under you. This crate surfaces them two ways:
//!
//! * **Offline simplification**: split the document into sections and rewrite
//!   each one with a rule set, highlighting the risky rewritten phrases.
//!   Deterministic, no network.
//! * **Remote summarization**: hand the text, or a screenshot of it, to a
//!   generative-language API and get a summary in the language you choose.
//!   A screenshot can also be transcribed with [`extract_text`] and then
//!   simplified offline.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document
//!  │
//!  ├─ 1. Segment  split on blank-line runs (CRLF normalised)
//!  ├─ 2. Pace     wait pacing_ms, observe cancellation
//!  ├─ 3. Rewrite  rules → spans, emphasis on rewritten risk phrases
//!  ├─ 4. Emit     section events to the presentation layer / stream
//!  └─ 5. Store    summary-ready event, last-run slot for narration
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plainterms::{simplify, SimplifyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SimplifyConfig::builder().pacing_ms(0).build()?;
//!     let text = std::fs::read_to_string("terms.txt")?;
//!     let result = simplify(&text, &config).await?;
//!     println!("{}", config.render_report(&result));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `plainterms` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! plainterms = { version = "0.1", default-features = false }
//! ```
//!
//! ## Summarizer Providers
//!
//! Providers come from [`edgequake_llm::ProviderFactory`]; any provider it
//! knows works. Without an explicit `--provider`, the first key found wins.
//!
//! | Provider | Default model | Key |
//! |----------|---------------|-----|
//! | `gemini` | `gemini-2.0-flash` | `GEMINI_API_KEY` |
//! | `openai` | `gpt-4.1-nano` | `OPENAI_API_KEY` |
//! | `anthropic` | `claude-3-5-haiku-latest` | `ANTHROPIC_API_KEY` |
//! | `ollama` | `llama3.2-vision` | none |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod narration;
pub mod output;
pub mod pipeline;
pub mod presentation;
pub mod prompts;
pub mod provider;
pub mod rules;
pub mod simplify;
pub mod stream;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::{analyze, analyze_with_summary, RiskReport, SafetyScore, SafetyStatus};
pub use audio::{pcm_to_wav, AudioBytes};
pub use config::{EmphasisStyle, SimplifyConfig, SimplifyConfigBuilder};
pub use error::{EmptyInputKind, PlainTermsError, SummarizerError};
pub use narration::{narrate_last_run, NarrationError, Narrator, UnavailableNarrator};
pub use output::{LastRun, RunStats, SimplificationResult, SimplifiedSection, Span, SummaryOutput};
pub use presentation::{NoopPresentation, PresentationCallback, SectionEvent};
pub use provider::{LlmSummarizer, Summarizer, SummaryInput, SummaryRequest, SummaryResponse};
pub use rules::RuleSet;
pub use simplify::{simplify, simplify_sync, LastRunStore, RunState, Simplifier};
pub use stream::{run_stream, SectionStream};
pub use summarize::{
    extract_text, summarize, summarize_file, summarize_image, summarize_sync, summarize_text,
};
