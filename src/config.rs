//! Configuration types for simplification, summarization and narration.
//!
//! All behaviour is controlled through [`SimplifyConfig`], built via its
//! [`SimplifyConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks and to diff two runs.

use crate::error::PlainTermsError;
use crate::output::SimplificationResult;
use crate::presentation::PresentationHandle;
use crate::provider::{LlmSummarizer, Summarizer};
use crate::rules::RuleSet;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default target language for summaries and narration.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Configuration for simplification runs and summarizer calls.
///
/// # Example
/// ```rust
/// use plainterms::SimplifyConfig;
///
/// let config = SimplifyConfig::builder()
///     .language("Spanish")
///     .pacing_ms(0)
///     .build()
///     .unwrap();
/// assert_eq!(config.language, "Spanish");
/// ```
#[derive(Clone)]
pub struct SimplifyConfig {
    /// Target language. Passed to the summarizer; stored as run metadata by
    /// the offline rewriter. Default: "English".
    pub language: String,

    /// Delay before each section is rewritten, in milliseconds. Default: 500.
    ///
    /// Gives a presentation layer time to paint each section as it arrives.
    /// Set to 0 for batch use.
    pub pacing_ms: u64,

    /// Rule set used by the offline rewriter. Default: the built-in rules.
    pub rules: Arc<RuleSet>,

    /// How emphasized spans are marked by [`SimplifyConfig::render_report`].
    /// Default: Markdown.
    pub emphasis: EmphasisStyle,

    /// Delay the narration stub waits before reporting unavailability. Default: 1500.
    pub narration_delay_ms: u64,

    /// Pre-constructed summarizer. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn Summarizer>>,

    /// Provider name passed to `ProviderFactory` ("gemini", "openai", "ollama", ...).
    /// If None along with `provider`, the provider is detected from the environment.
    pub provider_name: Option<String>,

    /// Model identifier, e.g. "gemini-2.0-flash". If None, uses provider default.
    pub model: Option<String>,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the summarizer may generate. Default: 1024.
    pub max_tokens: usize,

    /// Retry attempts on a transient summarizer failure. Default: 0.
    ///
    /// Failures are terminal for the run unless the caller opts in here.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call summarizer timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom system instruction. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Longest image edge, in pixels, sent to the summarizer. Default: 2000.
    pub max_image_pixels: u32,

    /// Receives section events during a run. Default: None.
    pub presentation: Option<PresentationHandle>,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            pacing_ms: 500,
            rules: Arc::new(RuleSet::default()),
            emphasis: EmphasisStyle::default(),
            narration_delay_ms: 1500,
            provider: None,
            provider_name: None,
            model: None,
            temperature: 0.2,
            max_tokens: 1024,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            system_prompt: None,
            max_image_pixels: 2000,
            presentation: None,
        }
    }
}

impl fmt::Debug for SimplifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplifyConfig")
            .field("language", &self.language)
            .field("pacing_ms", &self.pacing_ms)
            .field("rules", &self.rules.rules().len())
            .field("emphasis", &self.emphasis)
            .field("narration_delay_ms", &self.narration_delay_ms)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn Summarizer>"))
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_image_pixels", &self.max_image_pixels)
            .finish()
    }
}

impl SimplifyConfig {
    /// Create a new builder for `SimplifyConfig`.
    pub fn builder() -> SimplifyConfigBuilder {
        SimplifyConfigBuilder {
            config: Self::default(),
        }
    }

    /// Final layout of `result` with this config's emphasis style.
    pub fn render_report(&self, result: &SimplificationResult) -> String {
        result.render_report(&self.emphasis)
    }
}

/// Builder for [`SimplifyConfig`].
#[derive(Debug)]
pub struct SimplifyConfigBuilder {
    config: SimplifyConfig,
}

impl SimplifyConfigBuilder {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn pacing_ms(mut self, ms: u64) -> Self {
        self.config.pacing_ms = ms;
        self
    }

    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.config.rules = Arc::new(rules);
        self
    }

    pub fn emphasis(mut self, style: EmphasisStyle) -> Self {
        self.config.emphasis = style;
        self
    }

    pub fn narration_delay_ms(mut self, ms: u64) -> Self {
        self.config.narration_delay_ms = ms;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn Summarizer>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    /// Use a pre-built `edgequake_llm` provider.
    pub fn llm_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(Arc::new(LlmSummarizer::new(provider)));
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_image_pixels(mut self, px: u32) -> Self {
        self.config.max_image_pixels = px.max(64);
        self
    }

    pub fn presentation(mut self, handle: PresentationHandle) -> Self {
        self.config.presentation = Some(handle);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SimplifyConfig, PlainTermsError> {
        let c = &self.config;
        if c.language.trim().is_empty() {
            return Err(PlainTermsError::InvalidConfig(
                "language must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(PlainTermsError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(PlainTermsError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How emphasized spans are marked in rendered output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmphasisStyle {
    /// `**bold**` (default).
    #[default]
    Markdown,
    /// `<span class="text-red-500">…</span>`, other text HTML-escaped.
    Html,
    /// Bold red terminal escape codes.
    Ansi,
    /// No markers at all; emphasis is not distinguishable. Opt-in only.
    Plain,
    /// Custom opening and closing markers.
    Custom { open: String, close: String },
}

impl EmphasisStyle {
    /// Wrap an emphasized run of text.
    pub fn wrap(&self, text: &str) -> String {
        match self {
            EmphasisStyle::Markdown => format!("**{text}**"),
            EmphasisStyle::Html => format!("<span class=\"text-red-500\">{}</span>", escape_html(text)),
            EmphasisStyle::Ansi => format!("\x1b[1;31m{text}\x1b[0m"),
            EmphasisStyle::Plain => text.to_string(),
            EmphasisStyle::Custom { open, close } => format!("{open}{text}{close}"),
        }
    }

    /// Render ordinary text for this style.
    pub fn escape(&self, text: &str) -> String {
        match self {
            EmphasisStyle::Html => escape_html(text),
            _ => text.to_string(),
        }
    }

    /// Render a heading line.
    pub fn heading(&self, text: &str) -> String {
        match self {
            EmphasisStyle::Markdown => format!("### {text}"),
            EmphasisStyle::Html => format!("<h3>{}</h3>", escape_html(text)),
            EmphasisStyle::Ansi => format!("\x1b[1m{text}\x1b[0m"),
            EmphasisStyle::Plain | EmphasisStyle::Custom { .. } => text.to_string(),
        }
    }

    /// Render a separator between summary and details.
    pub fn rule(&self) -> String {
        match self {
            EmphasisStyle::Html => "<hr>".to_string(),
            _ => "---".to_string(),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SimplifyConfig::default();
        assert_eq!(c.language, "English");
        assert_eq!(c.pacing_ms, 500);
        assert_eq!(c.max_retries, 0);
        assert_eq!(c.narration_delay_ms, 1500);
        assert_eq!(c.rules.rules().len(), 7);
    }

    #[test]
    fn builder_rejects_blank_language() {
        let err = SimplifyConfig::builder().language("  ").build().unwrap_err();
        assert!(matches!(err, PlainTermsError::InvalidConfig(_)));
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = SimplifyConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn render_report_uses_configured_emphasis() {
        let html = SimplifyConfig::builder()
            .pacing_ms(0)
            .emphasis(EmphasisStyle::Html)
            .build()
            .unwrap();
        let md = SimplifyConfig::builder().pacing_ms(0).build().unwrap();
        let result = crate::simplify::simplify_sync(
            "Your use of the services is at your sole risk.",
            &md,
        )
        .unwrap();

        assert!(html
            .render_report(&result)
            .contains("<span class=\"text-red-500\">You use the app at your own risk.</span>"));
        assert!(md
            .render_report(&result)
            .contains("**You use the app at your own risk.**"));
    }

    #[test]
    fn html_style_escapes_text() {
        let style = EmphasisStyle::Html;
        assert_eq!(style.escape("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(
            style.wrap("x"),
            "<span class=\"text-red-500\">x</span>"
        );
    }

    #[test]
    fn custom_markers() {
        let style = EmphasisStyle::Custom {
            open: "[!".into(),
            close: "!]".into(),
        };
        assert_eq!(style.wrap("risk"), "[!risk!]");
    }
}
