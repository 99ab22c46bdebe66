//! Summarizer backends.
//!
//! Every remote call goes through an `edgequake_llm` [`LLMProvider`]; the
//! [`Summarizer`] trait is the seam the rest of the crate depends on, so
//! tests can swap in an in-process fake. [`LlmSummarizer`] adapts any
//! provider built by [`ProviderFactory`] (OpenAI, Gemini, Anthropic, Ollama,
//! LM Studio, ...).
//!
//! ## Message Layout
//!
//! 1. **System message**: the role instruction
//! 2. **User message**: the instruction text, with the document fenced in
//!    for text input, or the image attached for image input

use crate::error::{PlainTermsError, SummarizerError};
use crate::pipeline::image::ImageInput;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Default model per provider when none is configured.
pub fn default_model(provider: &str) -> &'static str {
    match provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => "gemini-2.0-flash",
        "ollama" => "llama3.2-vision",
        "anthropic" => "claude-3-5-haiku-latest",
        _ => "gpt-4.1-nano",
    }
}

/// What the model is asked to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryInput {
    Text(String),
    Image(ImageInput),
}

impl SummaryInput {
    pub fn is_image(&self) -> bool {
        matches!(self, SummaryInput::Image(_))
    }
}

/// One model call.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Role instruction sent as the system turn.
    pub system_instruction: String,
    /// Full text of the user turn (for text input, the document is included).
    pub prompt: String,
    pub input: SummaryInput,
    /// Language the answer must be written in.
    pub language: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A successful model answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryResponse {
    pub text: String,
    pub input_tokens: Option<usize>,
    pub output_tokens: Option<usize>,
}

/// A summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short provider name, e.g. "gemini".
    fn name(&self) -> &str;

    /// Model identifier used for requests.
    fn model(&self) -> &str;

    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, SummarizerError>;
}

/// [`Summarizer`] over an `edgequake_llm` provider.
pub struct LlmSummarizer {
    provider: Arc<dyn LLMProvider>,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Build a named provider through [`ProviderFactory`].
    ///
    /// The API key is read from the provider's environment variable
    /// (`OPENAI_API_KEY`, `GEMINI_API_KEY`, ...).
    pub fn from_name(provider_name: &str, model: &str) -> Result<Self, PlainTermsError> {
        ProviderFactory::create_llm_provider(provider_name, model)
            .map(Self::new)
            .map_err(|e| PlainTermsError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            })
    }

    /// Auto-detect a provider from whichever API key is set.
    pub fn from_env() -> Result<Self, PlainTermsError> {
        let (llm, _embedding) =
            ProviderFactory::from_env().map_err(|e| PlainTermsError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No summarizer could be detected from the environment.\n\
                     Set GEMINI_API_KEY or OPENAI_API_KEY, or pass --provider.\n\
                     Error: {e}"
                ),
            })?;
        Ok(Self::new(llm))
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn model(&self) -> &str {
        self.provider.model()
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, SummarizerError> {
        let messages = build_messages(request);
        let options = build_options(request);
        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| SummarizerError::Provider(e.to_string()))?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.provider.name(),
            response.prompt_tokens,
            response.completion_tokens
        );

        let text = response.content.trim();
        if text.is_empty() {
            return Err(SummarizerError::EmptyResponse);
        }
        Ok(SummaryResponse {
            text: text.to_string(),
            input_tokens: Some(response.prompt_tokens as usize),
            output_tokens: Some(response.completion_tokens as usize),
        })
    }
}

/// System turn, then a user turn carrying the prompt and any image.
pub fn build_messages(request: &SummaryRequest) -> Vec<ChatMessage> {
    let user = match request.input {
        SummaryInput::Text(_) => ChatMessage::user(request.prompt.as_str()),
        SummaryInput::Image(ref image) => {
            ChatMessage::user_with_images(request.prompt.as_str(), vec![image.to_image_data()])
        }
    };
    vec![ChatMessage::system(request.system_instruction.as_str()), user]
}

/// Build `CompletionOptions` from the request knobs.
fn build_options(request: &SummaryRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(input: SummaryInput) -> SummaryRequest {
        SummaryRequest {
            system_instruction: "Be plain.".into(),
            prompt: "Summarize in Spanish.".into(),
            input,
            language: "Spanish".into(),
            temperature: 0.2,
            max_tokens: 256,
        }
    }

    #[test]
    fn build_options_from_request() {
        let opts = build_options(&request(SummaryInput::Text("Terms".into())));
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(256));
    }

    #[test]
    fn text_request_is_system_then_user() {
        let messages = build_messages(&request(SummaryInput::Text("Terms".into())));
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn default_models() {
        assert_eq!(default_model("gemini"), "gemini-2.0-flash");
        assert_eq!(default_model("Ollama"), "llama3.2-vision");
        assert_eq!(default_model("openai"), "gpt-4.1-nano");
    }
}
