//! Heuristic risk analysis of a Terms-of-Service document.
//!
//! Three signals, all local and deterministic:
//!
//! * **Aggressive language**: phrases that usually cost the reader rights
//!   (case-insensitive substring match).
//! * **Suspicious clauses**: named patterns worth a closer read.
//! * **Risk scores**: a fixed per-category baseline on a 0–5 scale, folded
//!   into an overall [`SafetyScore`].
//!
//! [`analyze_with_summary`] adds a remote summary on top.

use crate::config::SimplifyConfig;
use crate::error::{EmptyInputKind, PlainTermsError};
use crate::summarize::summarize_text;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Highest value on the risk scale.
pub const MAX_RISK: u8 = 5;

/// Phrases flagged as aggressive wherever they occur.
pub const AGGRESSIVE_PHRASES: &[&str] = &[
    "terminate",
    "without notice",
    "no liability",
    "binding arbitration",
];

/// Baseline category scores: (name, score, description).
const BASELINE_RISKS: &[(&str, u8, &str)] = &[
    ("Privacy", 3, "May involve some data collection."),
    ("Data Sharing", 2, "Limited third-party sharing detected."),
    ("Cancellation", 3, "Unclear process for account deletion."),
    ("User Rights", 4, "Service may claim broad licenses."),
    ("Amendments", 3, "Company can change terms without notice."),
    ("Clarity", 2, "Language is moderately clear."),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub name: String,
    /// 0 (harmless) to [`MAX_RISK`].
    pub score: u8,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousClause {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyStatus {
    Safe,
    PotentiallyUnsafe,
    Unsafe,
}

impl fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SafetyStatus::Safe => "Safe",
            SafetyStatus::PotentiallyUnsafe => "Potentially Unsafe",
            SafetyStatus::Unsafe => "Unsafe",
        })
    }
}

/// Overall safety as a percentage (100 = no risk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyScore {
    pub percentage: u8,
    pub status: SafetyStatus,
}

impl SafetyScore {
    /// `round((1 - avg/5) * 100)`, scores clamped to 0..=5. No scores means 100%.
    pub fn from_scores(scores: &[RiskScore]) -> Self {
        let avg = if scores.is_empty() {
            0.0
        } else {
            let total: u32 = scores.iter().map(|s| u32::from(s.score.min(MAX_RISK))).sum();
            f64::from(total) / scores.len() as f64
        };
        let percentage = ((1.0 - avg / f64::from(MAX_RISK)) * 100.0).round() as u8;
        let status = match percentage {
            60.. => SafetyStatus::Safe,
            30..=59 => SafetyStatus::PotentiallyUnsafe,
            _ => SafetyStatus::Unsafe,
        };
        Self { percentage, status }
    }
}

/// Result of [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub risk_scores: Vec<RiskScore>,
    pub aggressive_language: Vec<String>,
    pub suspicious_clauses: Vec<SuspiciousClause>,
    pub safety: SafetyScore,
}

/// Analyze `text` locally.
pub fn analyze(text: &str) -> Result<RiskReport, PlainTermsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PlainTermsError::EmptyInput {
            kind: EmptyInputKind::Missing,
        });
    }
    let lower = text.to_lowercase();

    let aggressive_language: Vec<String> = AGGRESSIVE_PHRASES
        .iter()
        .filter(|p| lower.contains(*p))
        .map(|p| p.to_string())
        .collect();

    let mut suspicious_clauses = Vec::new();
    if lower.contains("retain") {
        suspicious_clauses.push(SuspiciousClause {
            name: "Data retention clause".into(),
            text: "Contains vague retention language.".into(),
        });
    }

    let risk_scores: Vec<RiskScore> = BASELINE_RISKS
        .iter()
        .map(|(name, score, description)| RiskScore {
            name: name.to_string(),
            score: *score,
            description: description.to_string(),
        })
        .collect();
    let safety = SafetyScore::from_scores(&risk_scores);

    debug!(
        "Risk analysis: {} aggressive, {} suspicious, safety {}%",
        aggressive_language.len(),
        suspicious_clauses.len(),
        safety.percentage
    );

    Ok(RiskReport {
        summary: None,
        risk_scores,
        aggressive_language,
        suspicious_clauses,
        safety,
    })
}

/// [`analyze`], then attach a remote summary in `config.language`.
pub async fn analyze_with_summary(
    text: &str,
    config: &SimplifyConfig,
) -> Result<RiskReport, PlainTermsError> {
    let mut report = analyze(text)?;
    let summary = summarize_text(text, config).await?;
    info!("Attached {} summary from {}", summary.language, summary.provider);
    report.summary = Some(summary.summary);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(n: u8) -> RiskScore {
        RiskScore {
            name: "x".into(),
            score: n,
            description: String::new(),
        }
    }

    #[test]
    fn default_scores_are_potentially_unsafe() {
        let report = analyze("Some harmless words.").unwrap();
        assert_eq!(report.risk_scores.len(), 6);
        // avg 17/6 → 43%
        assert_eq!(report.safety.percentage, 43);
        assert_eq!(report.safety.status, SafetyStatus::PotentiallyUnsafe);
        assert!(report.aggressive_language.is_empty());
        assert!(report.suspicious_clauses.is_empty());
    }

    #[test]
    fn aggressive_phrases_are_case_insensitive() {
        let report = analyze("We may TERMINATE accounts Without Notice.").unwrap();
        assert_eq!(report.aggressive_language, vec!["terminate", "without notice"]);
    }

    #[test]
    fn retention_is_suspicious() {
        let report = analyze("We retain your data as long as needed.").unwrap();
        assert_eq!(report.suspicious_clauses.len(), 1);
        assert_eq!(report.suspicious_clauses[0].name, "Data retention clause");
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(matches!(
            analyze("   "),
            Err(PlainTermsError::EmptyInput { .. })
        ));
    }

    #[test]
    fn safety_thresholds() {
        assert_eq!(SafetyScore::from_scores(&[]).percentage, 100);
        assert_eq!(SafetyScore::from_scores(&[score(2)]).status, SafetyStatus::Safe);
        assert_eq!(
            SafetyScore::from_scores(&[score(3)]).status,
            SafetyStatus::PotentiallyUnsafe
        );
        assert_eq!(SafetyScore::from_scores(&[score(4)]).status, SafetyStatus::Unsafe);
        // out-of-range scores are clamped
        assert_eq!(SafetyScore::from_scores(&[score(9)]).percentage, 0);
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_value(analyze("terminate").unwrap()).unwrap();
        assert!(json.get("riskScores").is_some());
        assert!(json.get("aggressiveLanguage").is_some());
        assert!(json.get("summary").is_none());
    }
}
