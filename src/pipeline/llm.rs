//! Summarizer interaction: build the request and drive the call.
//!
//! All prompt wording lives in [`crate::prompts`]; this module owns only
//! request assembly, the per-call timeout and the retry loop.
//!
//! ## Retry Strategy
//!
//! `max_retries` defaults to 0, so a failure is terminal for the run. When a
//! caller opts in, provider errors and timeouts are retried (an empty answer
//! is not), with exponential backoff (`retry_backoff_ms * 2^attempt`).

use crate::config::SimplifyConfig;
use crate::error::SummarizerError;
use crate::pipeline::image::ImageInput;
use crate::prompts::{user_text, DEFAULT_SYSTEM_PROMPT, TRANSCRIBE_INSTRUCTION, TRANSCRIBE_SYSTEM_PROMPT};
use crate::provider::{Summarizer, SummaryInput, SummaryRequest, SummaryResponse};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Assemble a [`SummaryRequest`] from `input` and the config's knobs.
pub fn build_request(input: SummaryInput, language: &str, config: &SimplifyConfig) -> SummaryRequest {
    SummaryRequest {
        system_instruction: config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        prompt: user_text(&input, language),
        input,
        language: language.to_string(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Request a verbatim transcription of `image`.
///
/// The system prompt override only applies to summaries, never here.
pub fn build_transcription_request(image: ImageInput, config: &SimplifyConfig) -> SummaryRequest {
    SummaryRequest {
        system_instruction: TRANSCRIBE_SYSTEM_PROMPT.to_string(),
        prompt: TRANSCRIBE_INSTRUCTION.to_string(),
        input: SummaryInput::Image(image),
        language: config.language.clone(),
        temperature: 0.0,
        max_tokens: config.max_tokens,
    }
}

/// Call `provider`, retrying transient failures up to `config.max_retries`.
///
/// Returns the response together with the number of attempts made.
pub async fn call_summarizer(
    provider: &dyn Summarizer,
    request: &SummaryRequest,
    config: &SimplifyConfig,
) -> Result<(SummaryResponse, u32), SummarizerError> {
    let limit = Duration::from_secs(config.api_timeout_secs);
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "{}: retry {}/{} after {}ms",
                provider.name(),
                attempt,
                config.max_retries,
                backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let outcome = match timeout(limit, provider.summarize(request)).await {
            Ok(r) => r,
            Err(_) => Err(SummarizerError::Timeout {
                secs: config.api_timeout_secs,
            }),
        };

        match outcome {
            Ok(response) => {
                debug!(
                    "{}: {:?} input tokens, {:?} output tokens",
                    provider.name(),
                    response.input_tokens,
                    response.output_tokens
                );
                return Ok((response, attempt + 1));
            }
            Err(e) if e.is_transient() && attempt < config.max_retries => {
                warn!("{}: attempt {} failed: {}", provider.name(), attempt + 1, e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
