//! Remote entry points: summaries and image transcription.
//!
//! Unlike the offline [`crate::simplify`] pipeline, these functions hand the
//! whole document (or a screenshot of it) to a [`Summarizer`] in one call.
//! [`extract_text`] turns a photo of a document back into text so it can go
//! through the offline pipeline or the risk analysis.
//! A failed call is logged with its full transport detail and surfaced as
//! [`PlainTermsError::SummarizerUnavailable`] with a generic message. It
//! never touches any [`crate::simplify::LastRunStore`].

use crate::config::SimplifyConfig;
use crate::error::{EmptyInputKind, PlainTermsError};
use crate::output::SummaryOutput;
use crate::pipeline::{image, llm};
use crate::provider::{
    default_model, LlmSummarizer, Summarizer, SummaryInput, SummaryRequest, SummaryResponse,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// User-facing message for any summarizer failure.
pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to summarize the document.";

/// User-facing message for any transcription failure.
pub const EXTRACT_FAILED_MESSAGE: &str = "Failed to extract text from the image.";

/// Summarize text or an image in `language`.
///
/// # Errors
/// - [`PlainTermsError::EmptyInput`] for empty text or empty image bytes
/// - [`PlainTermsError::UnsupportedImage`] for bytes that aren't PNG/JPEG/WebP/GIF
/// - [`PlainTermsError::ProviderNotConfigured`] when no provider resolves
/// - [`PlainTermsError::SummarizerUnavailable`] when the call fails
pub async fn summarize(
    input: SummaryInput,
    language: &str,
    config: &SimplifyConfig,
) -> Result<SummaryOutput, PlainTermsError> {
    let start = Instant::now();

    // ── Step 1: Validate input ───────────────────────────────────────────
    let input = match input {
        SummaryInput::Text(text) => {
            if text.is_empty() {
                return Err(PlainTermsError::EmptyInput {
                    kind: EmptyInputKind::Missing,
                });
            }
            if text.trim().is_empty() {
                return Err(PlainTermsError::EmptyInput {
                    kind: EmptyInputKind::Blank,
                });
            }
            SummaryInput::Text(text)
        }
        SummaryInput::Image(img) => {
            SummaryInput::Image(image::prepare_image(&img.bytes, config.max_image_pixels)?)
        }
    };

    // ── Step 2: Get/create provider ──────────────────────────────────────
    let provider = resolve_provider(config)?;
    info!(
        "Summarizing {} with {}/{} in {}",
        if input.is_image() { "image" } else { "text" },
        provider.name(),
        provider.model(),
        language
    );

    // ── Step 3: Call the summarizer ──────────────────────────────────────
    let request = llm::build_request(input, language, config);
    let (response, attempts) =
        call(provider.as_ref(), &request, config, SUMMARY_FAILED_MESSAGE).await?;

    let duration_ms = start.elapsed().as_millis() as u64;
    debug!("Summary: {} chars in {}ms", response.text.len(), duration_ms);

    Ok(SummaryOutput {
        summary: response.text,
        language: language.to_string(),
        provider: provider.name().to_string(),
        model: provider.model().to_string(),
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        duration_ms,
        attempts,
    })
}

/// Transcribe the text in a photographed or scanned document.
///
/// The result is plain text with paragraphs separated by blank lines, ready
/// for [`crate::simplify::Simplifier::run`] or [`crate::analysis::analyze`].
///
/// # Errors
/// Same as [`summarize`] for image input; an answer with no text is
/// [`PlainTermsError::SummarizerUnavailable`].
pub async fn extract_text(
    bytes: impl Into<Vec<u8>>,
    config: &SimplifyConfig,
) -> Result<String, PlainTermsError> {
    let image = image::prepare_image(&bytes.into(), config.max_image_pixels)?;
    let provider = resolve_provider(config)?;
    info!(
        "Transcribing image ({}) with {}/{}",
        image.mime_type,
        provider.name(),
        provider.model()
    );

    let request = llm::build_transcription_request(image, config);
    let (response, _attempts) =
        call(provider.as_ref(), &request, config, EXTRACT_FAILED_MESSAGE).await?;
    debug!("Transcribed {} chars", response.text.len());
    Ok(response.text)
}

/// Summarize a text document in `config.language`.
pub async fn summarize_text(
    text: impl Into<String>,
    config: &SimplifyConfig,
) -> Result<SummaryOutput, PlainTermsError> {
    summarize(SummaryInput::Text(text.into()), &config.language, config).await
}

/// Summarize a screenshot or scan in `config.language`.
pub async fn summarize_image(
    bytes: impl Into<Vec<u8>>,
    config: &SimplifyConfig,
) -> Result<SummaryOutput, PlainTermsError> {
    let input = SummaryInput::Image(image::ImageInput {
        bytes: bytes.into(),
        mime_type: String::new(),
    });
    summarize(input, &config.language, config).await
}

/// Summarize a file: images are detected by magic bytes, anything else is
/// read as UTF-8 text.
pub async fn summarize_file(
    path: impl AsRef<Path>,
    config: &SimplifyConfig,
) -> Result<SummaryOutput, PlainTermsError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PlainTermsError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    if image::detect_format(&bytes).is_some() {
        return summarize_image(bytes, config).await;
    }
    let text = String::from_utf8(bytes).map_err(|e| PlainTermsError::InputReadFailed {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    summarize_text(text, config).await
}

/// Synchronous wrapper around [`summarize_text`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    text: impl Into<String>,
    config: &SimplifyConfig,
) -> Result<SummaryOutput, PlainTermsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PlainTermsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize_text(text, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run one request, logging a failure in full and surfacing `message`.
async fn call(
    provider: &dyn Summarizer,
    request: &SummaryRequest,
    config: &SimplifyConfig,
    message: &str,
) -> Result<(SummaryResponse, u32), PlainTermsError> {
    llm::call_summarizer(provider, request, config)
        .await
        .map_err(|detail| {
            error!(provider = provider.name(), "Summarizer call failed: {}", detail);
            PlainTermsError::SummarizerUnavailable {
                provider: provider.name().to_string(),
                message: message.to_string(),
                detail,
            }
        })
}

/// Resolve the summarizer, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is. Useful in
///    tests or with custom middleware.
/// 2. **Named provider** (`config.provider_name`) plus optional model,
///    built by `ProviderFactory`.
/// 3. **Environment pair** (`PLAINTERMS_PROVIDER` + `PLAINTERMS_MODEL`),
///    both set and non-empty.
/// 4. **Preferred key**: `GEMINI_API_KEY`, then `OPENAI_API_KEY`.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &SimplifyConfig) -> Result<Arc<dyn Summarizer>, PlainTermsError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or_else(|| default_model(name));
        return Ok(Arc::new(LlmSummarizer::from_name(name, model)?));
    }

    // 3) PLAINTERMS_PROVIDER + PLAINTERMS_MODEL when both set
    if let (Ok(prov), Ok(model)) = (
        std::env::var("PLAINTERMS_PROVIDER"),
        std::env::var("PLAINTERMS_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return Ok(Arc::new(LlmSummarizer::from_name(&prov, &model)?));
        }
    }

    // 4) Gemini first, then OpenAI, when their keys are present
    for (var, name) in [("GEMINI_API_KEY", "gemini"), ("OPENAI_API_KEY", "openai")] {
        if std::env::var(var).map(|k| !k.is_empty()).unwrap_or(false) {
            let model = config.model.as_deref().unwrap_or_else(|| default_model(name));
            return Ok(Arc::new(LlmSummarizer::from_name(name, model)?));
        }
    }

    // 5) Whatever else the factory can find
    Ok(Arc::new(LlmSummarizer::from_env()?))
}
