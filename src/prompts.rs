//! Instructions sent to remote summarizers.
//!
//! Every prompt lives here so wording changes touch one file and tests can
//! inspect prompts without a live provider. Callers override the role
//! instruction via [`crate::config::SimplifyConfig::system_prompt`].

use crate::provider::SummaryInput;

/// Default role instruction for Terms-of-Service summaries.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a consumer-rights assistant who explains Terms of Service to ordinary people.

Follow these rules precisely:

1. PLAIN LANGUAGE
   - Write short sentences a teenager could follow
   - Replace legal jargon with everyday words
   - Address the reader as "you" and the company as "they"

2. WHAT MATTERS
   - Lead with the clauses that cost the reader rights, money or data
   - Call out licences over user content, arbitration, liability waivers,
     unilateral changes to the terms and account termination
   - Skip boilerplate that does not change what the reader can do

3. FAITHFULNESS
   - Never invent obligations that are not in the document
   - If the document is unclear, say so instead of guessing

4. OUTPUT FORMAT
   - A one-sentence overview, then a short bulleted list of key points
   - No preamble, no legal advice disclaimers, no closing remarks"#;

/// Role instruction for transcribing a photographed or scanned document.
pub const TRANSCRIBE_SYSTEM_PROMPT: &str = r#"You are a precise transcriber of legal documents.

Follow these rules precisely:

1. VERBATIM
   - Reproduce the text exactly as written, word for word
   - Keep the original language; never translate or summarize

2. LAYOUT
   - Separate paragraphs and numbered sections with one blank line
   - Join lines that were only wrapped by the page width

3. NOTHING ELSE
   - Skip page numbers, running headers and footers
   - Output plain text only: no Markdown, no commentary, no code fences"#;

/// User-turn text sent alongside the image to transcribe.
pub const TRANSCRIBE_INSTRUCTION: &str = "Transcribe all text in this image.";

/// Instruction placed in the user turn ahead of the document.
pub fn summary_instruction(language: &str, is_image: bool) -> String {
    let source = if is_image {
        "the Terms of Service shown in this image"
    } else {
        "the following Terms of Service"
    };
    format!("Summarize {source} in {language}.")
}

/// Full text of the user turn for `input`.
///
/// For text input the document follows the instruction, fenced in triple
/// quotes. For image input only the instruction is returned; the image is
/// attached separately by the provider.
pub fn user_text(input: &SummaryInput, language: &str) -> String {
    match input {
        SummaryInput::Text(text) => format!(
            "{}\n\n\"\"\"{}\"\"\"",
            summary_instruction(language, false),
            text
        ),
        SummaryInput::Image(_) => summary_instruction(language, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::image::ImageInput;

    #[test]
    fn instruction_names_language() {
        assert_eq!(
            summary_instruction("Spanish", false),
            "Summarize the following Terms of Service in Spanish."
        );
        assert!(summary_instruction("French", true).contains("this image"));
    }

    #[test]
    fn text_input_is_fenced() {
        let s = user_text(&SummaryInput::Text("We may terminate.".into()), "English");
        assert!(s.ends_with("\"\"\"We may terminate.\"\"\""));
    }

    #[test]
    fn image_input_has_instruction_only() {
        let s = user_text(
            &SummaryInput::Image(ImageInput {
                bytes: vec![0],
                mime_type: "image/png".into(),
            }),
            "German",
        );
        assert_eq!(s, summary_instruction("German", true));
    }

    #[test]
    fn transcription_prompt_forbids_summaries() {
        assert!(TRANSCRIBE_SYSTEM_PROMPT.contains("never translate or summarize"));
        assert!(TRANSCRIBE_SYSTEM_PROMPT.contains("blank line"));
    }

    #[test]
    fn system_prompt_covers_key_clauses() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("arbitration"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("OUTPUT FORMAT"));
    }
}
