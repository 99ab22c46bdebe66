//! Result types produced by the simplification pipeline.

use crate::config::EmphasisStyle;
use serde::{Deserialize, Serialize};

/// A run of rewritten text, optionally marked for highlighted display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub emphasized: bool,
}

/// Concatenate spans without any markers.
pub fn spans_to_plain(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// Concatenate spans, wrapping emphasized ones in `style`'s markers.
pub fn render_spans(spans: &[Span], style: &EmphasisStyle) -> String {
    let mut out = String::new();
    for span in spans {
        if span.emphasized {
            out.push_str(&style.wrap(&span.text));
        } else {
            out.push_str(&style.escape(&span.text));
        }
    }
    out
}

/// One input section after rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedSection {
    /// 1-indexed position in the document.
    pub index: usize,
    /// The section as it appeared in the input.
    pub original: String,
    /// Trimmed rewritten text as emphasis-annotated spans.
    pub spans: Vec<Span>,
}

impl SimplifiedSection {
    pub fn plain_text(&self) -> String {
        spans_to_plain(&self.spans)
    }

    pub fn render(&self, style: &EmphasisStyle) -> String {
        render_spans(&self.spans, style)
    }

    pub fn has_emphasis(&self) -> bool {
        self.spans.iter().any(|s| s.emphasized)
    }
}

/// Full-document output of one simplification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplificationResult {
    pub sections: Vec<SimplifiedSection>,
    /// Requested target language. Carried through, not applied by the rules.
    pub language: String,
    pub stats: RunStats,
}

impl SimplificationResult {
    /// All sections joined by a single space, without emphasis markers.
    pub fn plain_text(&self) -> String {
        self.join(|s| s.plain_text())
    }

    /// All sections joined by a single space, with emphasis markers.
    pub fn render(&self, style: &EmphasisStyle) -> String {
        self.join(|s| s.render(style))
    }

    /// Final layout: the summary header and full text first, then one block
    /// per section. The summary is computed last but always shown first.
    pub fn render_report(&self, style: &EmphasisStyle) -> String {
        let mut out = String::new();
        out.push_str(&style.heading("Simplified Summary:"));
        out.push_str("\n\n");
        out.push_str(&self.render(style));
        out.push_str("\n\n");
        out.push_str(&style.rule());
        for section in &self.sections {
            out.push_str("\n\n");
            out.push_str(&style.heading(&format!("Section {}", section.index)));
            out.push_str("\n\n");
            out.push_str(&section.render(style));
        }
        out.push('\n');
        out
    }

    fn join(&self, f: impl Fn(&SimplifiedSection) -> String) -> String {
        self.sections
            .iter()
            .map(f)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Timing and volume of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_sections: usize,
    pub emphasized_sections: usize,
    pub input_chars: usize,
    pub output_chars: usize,
    pub duration_ms: u64,
}

/// The most recent completed run, kept for narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRun {
    pub text: String,
    pub language: String,
}

impl From<&SimplificationResult> for LastRun {
    fn from(result: &SimplificationResult) -> Self {
        Self {
            text: result.plain_text(),
            language: result.language.clone(),
        }
    }
}

/// A summary returned by a remote summarizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: String,
    pub language: String,
    pub provider: String,
    pub model: String,
    pub input_tokens: Option<usize>,
    pub output_tokens: Option<usize>,
    pub duration_ms: u64,
    pub attempts: u32,
}
