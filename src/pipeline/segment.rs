//! Segmenter: split a document into blank-line-delimited sections.
//!
//! A section boundary is a run of two or more newlines. Sections that are
//! empty after trimming are dropped; kept sections are **not** trimmed, the
//! rewriter trims its own output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_SECTION_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Lazily split already-normalised text into non-blank sections.
pub fn segments(text: &str) -> impl Iterator<Item = &str> {
    RE_SECTION_BREAK
        .split(text)
        .filter(|section| !section.trim().is_empty())
}

/// An immutable, ordered list of sections for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    sections: Vec<String>,
}

impl Document {
    /// Normalise line endings (CRLF / CR → LF) and split into sections.
    pub fn parse(text: &str) -> Self {
        let normalised = normalise_line_endings(text);
        Self {
            sections: segments(&normalised).map(str::to_string).collect(),
        }
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when the input held no non-blank section ("nothing to simplify").
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}
