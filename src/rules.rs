//! Rewrite rules: legal boilerplate → plain language, plus emphasis marks.
//!
//! Centralising the rule tables here serves the same two purposes as the
//! prompt constants in [`crate::prompts`]:
//!
//! 1. **Single source of truth**: adding or rewording a rule touches exactly
//!    one table.
//! 2. **Testability**: unit tests inspect the tables directly.
//!
//! Patterns are literal phrases, never user-supplied regexes. They are
//! compiled once with [`regex::escape`] so matching is exact, whole-phrase.
//!
//! Custom rule sets can be loaded from JSON:
//!
//! ```json
//! {
//!   "rules": [{ "pattern": "at its sole discretion", "replacement": "whenever it wants" }],
//!   "emphasis": [{ "phrase": "whenever it wants", "emphasized": "whenever it wants" }]
//! }
//! ```

use crate::error::PlainTermsError;
use crate::output::Span;
use crate::pipeline::rewrite;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default plain-language rules, applied in this order.
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    // Opening boilerplate
    (
        r#"Welcome to Connectify. By accessing or using our services, you agree to be bound by these Terms of Service ("Terms"). These Terms constitute a legally binding agreement between you and Connectify, Inc. If you do not agree to these Terms, you may not access or use the services."#,
        "By using our app, you agree to follow these rules.",
    ),
    // Content and license
    (
        "You retain ownership of any intellectual property rights that you hold in the content you submit, post, or display on or through the services. However, by submitting content, you grant Connectify a worldwide, non-exclusive, royalty-free license to use, reproduce, adapt, publish, and distribute such content on behalf of the service.",
        "You own what you post, but you give us a license to use it.",
    ),
    // "As-is" disclaimer
    (
        r#"The services are provided on an "as-is" and "as-available" basis without any warranties of any kind, either express or implied, including, but not limited to, implied warranties of merchantability, fitness for a particular purpose, or non-infringement. We do not warrant that the services will be uninterrupted, secure, or free from errors."#,
        "Our app comes with no guarantees. It might have bugs or stop working.",
    ),
    // User's responsibility
    (
        "You represent and warrant that you have all the rights, power, and authority necessary to grant the rights granted herein to any content you submit.",
        "You promise you have the right to post any content you share.",
    ),
    (
        "We reserve the right, at our sole discretion, to modify or replace these Terms at any time.",
        "We can change these rules at any time.",
    ),
    (
        "Your continued use of the services after any such changes constitutes your acceptance of the new Terms.",
        "By continuing to use our app, you agree to any new rules.",
    ),
    (
        "Your use of the services is at your sole risk.",
        "You use the app at your own risk.",
    ),
];

/// Default emphasis rules as `(phrase, emphasized)` pairs.
///
/// Rights transfer, no-warranty, unilateral change and risk acceptance.
pub const DEFAULT_EMPHASIS: &[(&str, &str)] = &[
    (
        "By using our app, you agree to follow these rules.",
        "By using our app, you agree to follow these rules.",
    ),
    (
        "but you give us a license to use it.",
        "give us a license to use it",
    ),
    (
        "Our app comes with no guarantees.",
        "Our app comes with no guarantees.",
    ),
    (
        "We can change these rules at any time.",
        "We can change these rules at any time.",
    ),
    (
        "You use the app at your own risk.",
        "You use the app at your own risk.",
    ),
];

static DEFAULT_RULE_SET: Lazy<RuleSet> = Lazy::new(|| {
    let spec = RuleSetSpec {
        rules: DEFAULT_RULES
            .iter()
            .map(|(p, r)| RuleSpec {
                pattern: (*p).to_string(),
                replacement: (*r).to_string(),
            })
            .collect(),
        emphasis: DEFAULT_EMPHASIS
            .iter()
            .map(|(p, e)| EmphasisSpec {
                phrase: (*p).to_string(),
                emphasized: (*e).to_string(),
            })
            .collect(),
    };
    RuleSet::from_spec(spec).expect("built-in rules are valid")
});

/// A literal phrase → plain-language substitution.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    replacement: String,
    re: Regex,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Result<Self, PlainTermsError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(PlainTermsError::InvalidRules(
                "rule pattern must not be empty".into(),
            ));
        }
        let re = Regex::new(&regex::escape(&pattern))
            .map_err(|e| PlainTermsError::InvalidRules(format!("pattern {pattern:?}: {e}")))?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
            re,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.re
    }
}

/// Marks part of a plain-language phrase for highlighted rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmphasisRule {
    phrase: String,
    emphasized: String,
    offset: usize,
}

impl EmphasisRule {
    /// `emphasized` must occur inside `phrase`; its first occurrence is marked.
    pub fn new(phrase: impl Into<String>, emphasized: impl Into<String>) -> Result<Self, PlainTermsError> {
        let phrase = phrase.into();
        let emphasized = emphasized.into();
        if emphasized.is_empty() {
            return Err(PlainTermsError::InvalidRules(format!(
                "emphasis for {phrase:?} marks nothing"
            )));
        }
        let offset = phrase.find(&emphasized).ok_or_else(|| {
            PlainTermsError::InvalidRules(format!(
                "emphasized text {emphasized:?} is not part of {phrase:?}"
            ))
        })?;
        Ok(Self {
            phrase,
            emphasized,
            offset,
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn emphasized(&self) -> &str {
        &self.emphasized
    }

    /// Byte range of the emphasized part within `phrase`.
    pub(crate) fn emphasized_range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.emphasized.len()
    }
}

/// Ordered plain-language rules followed by ordered emphasis rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    emphasis: Vec<EmphasisRule>,
}

impl RuleSet {
    /// The built-in rule set, compiled once per process.
    pub fn builtin() -> &'static RuleSet {
        &DEFAULT_RULE_SET
    }

    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            emphasis: Vec::new(),
        }
    }

    pub fn new(rules: Vec<Rule>, emphasis: Vec<EmphasisRule>) -> Self {
        Self { rules, emphasis }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn emphasis(&self) -> &[EmphasisRule] {
        &self.emphasis
    }

    /// Rewrite one section with this rule set.
    pub fn rewrite(&self, section: &str) -> Vec<Span> {
        rewrite::rewrite_section(section, self)
    }

    /// Parse a JSON rule file (see the module docs for the shape).
    pub fn from_json(json: &str) -> Result<Self, PlainTermsError> {
        let spec: RuleSetSpec = serde_json::from_str(json)
            .map_err(|e| PlainTermsError::InvalidRules(e.to_string()))?;
        Self::from_spec(spec)
    }

    /// Read and parse a JSON rule file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlainTermsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            PlainTermsError::InputReadFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(&json)
    }

    fn from_spec(spec: RuleSetSpec) -> Result<Self, PlainTermsError> {
        let rules = spec
            .rules
            .into_iter()
            .map(|r| Rule::new(r.pattern, r.replacement))
            .collect::<Result<Vec<_>, _>>()?;
        let emphasis = spec
            .emphasis
            .into_iter()
            .map(|e| EmphasisRule::new(e.phrase, e.emphasized))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules, emphasis })
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleSetSpec {
    rules: Vec<RuleSpec>,
    #[serde(default)]
    emphasis: Vec<EmphasisSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleSpec {
    pattern: String,
    replacement: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EmphasisSpec {
    phrase: String,
    emphasized: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_compile() {
        let set = RuleSet::from_spec(RuleSetSpec {
            rules: DEFAULT_RULES
                .iter()
                .map(|(p, r)| RuleSpec {
                    pattern: p.to_string(),
                    replacement: r.to_string(),
                })
                .collect(),
            emphasis: DEFAULT_EMPHASIS
                .iter()
                .map(|(p, e)| EmphasisSpec {
                    phrase: p.to_string(),
                    emphasized: e.to_string(),
                })
                .collect(),
        })
        .expect("built-in rules are valid");
        assert_eq!(set.rules().len(), 7);
        assert_eq!(set.emphasis().len(), 5);
        assert_eq!(RuleSet::builtin().rules().len(), 7);
    }

    #[test]
    fn emphasis_targets_are_rule_outputs() {
        for (phrase, _) in DEFAULT_EMPHASIS {
            assert!(
                DEFAULT_RULES.iter().any(|(_, r)| r.contains(phrase)),
                "{phrase:?} is not produced by any rule"
            );
        }
    }

    #[test]
    fn patterns_cannot_match_replacements() {
        for (pattern, _) in DEFAULT_RULES {
            for (_, replacement) in DEFAULT_RULES {
                assert!(!replacement.contains(pattern));
            }
        }
    }

    #[test]
    fn pattern_is_literal() {
        let rule = Rule::new("(a.b)", "x").unwrap();
        assert!(rule.regex().is_match("see (a.b) here"));
        assert!(!rule.regex().is_match("see axb here"));
    }

    #[test]
    fn empty_pattern_rejected() {
        assert!(matches!(
            Rule::new("  ", "x"),
            Err(PlainTermsError::InvalidRules(_))
        ));
    }

    #[test]
    fn emphasis_must_be_inside_phrase() {
        assert!(EmphasisRule::new("abc def", "xyz").is_err());
        let rule = EmphasisRule::new("but you give us it.", "give us it").unwrap();
        assert_eq!(rule.emphasized_range(), 8..18);
    }

    #[test]
    fn from_json_parses_and_defaults_emphasis() {
        let set = RuleSet::from_json(
            r#"{"rules":[{"pattern":"hereinafter","replacement":"from now on"}]}"#,
        )
        .unwrap();
        assert_eq!(set.rules().len(), 1);
        assert!(set.emphasis().is_empty());
        assert_eq!(set.rules()[0].replacement(), "from now on");
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            RuleSet::from_json("{ nope"),
            Err(PlainTermsError::InvalidRules(_))
        ));
    }
}
