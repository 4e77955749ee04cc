//! Draft content validator
//!
//! Cheap string heuristics that catch the common ways an LLM draft is
//! unusable: truncated output, leftover placeholder text, and phrases
//! the editorial style guide bans. A draft with any issue is rejected
//! and regenerated once with a larger token budget.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Minimum plausible length for a full article body
const MIN_BODY_CHARS: usize = 500;

/// Phrases the editorial style guide bans outright
const BANNED_PHRASES: &[&str] = &[
    "in today's fast-paced world",
    "delve into",
    "it's important to note that",
    "unlock the potential",
    "navigating the landscape",
    "game-changer",
    "in the ever-evolving",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Truncated,
    Placeholder,
    BannedPhrase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ValidationKind,
    pub detail: String,
}

impl ValidationIssue {
    fn new(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Run all validation checks over a draft. Empty result means the draft
/// is acceptable for the rest of the pipeline.
pub fn validate(html: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_truncation(html, &mut issues);
    check_placeholders(html, &mut issues);
    check_banned_phrases(html, &mut issues);

    issues
}

fn check_truncation(html: &str, issues: &mut Vec<ValidationIssue>) {
    let trimmed = html.trim();

    if trimmed.len() < MIN_BODY_CHARS {
        issues.push(ValidationIssue::new(
            ValidationKind::Truncated,
            format!("body is only {} characters", trimmed.len()),
        ));
        return;
    }

    // A complete draft ends with a closed tag or sentence punctuation,
    // not mid-word or on a dangling comma.
    let last = trimmed.chars().next_back().unwrap_or(' ');
    if !matches!(last, '>' | '.' | '!' | '?' | '"' | '\u{201d}') {
        issues.push(ValidationIssue::new(
            ValidationKind::Truncated,
            format!("body ends mid-sentence on {:?}", last),
        ));
    }

    // Unbalanced paragraph tags are the other common truncation tell
    let opens = trimmed.matches("<p").count();
    let closes = trimmed.matches("</p>").count();
    if opens > closes {
        issues.push(ValidationIssue::new(
            ValidationKind::Truncated,
            format!("{} unclosed <p> tags", opens - closes),
        ));
    }
}

fn check_placeholders(html: &str, issues: &mut Vec<ValidationIssue>) {
    let lower = html.to_lowercase();

    let placeholder_re =
        Regex::new(r"\[(insert|placeholder|your |add |todo)[^\]]*\]").expect("static regex");
    if let Some(m) = placeholder_re.find(&lower) {
        issues.push(ValidationIssue::new(
            ValidationKind::Placeholder,
            format!("placeholder text: {}", m.as_str()),
        ));
    }

    for marker in ["lorem ipsum", "as an ai", "i cannot ", "todo:"] {
        if lower.contains(marker) {
            issues.push(ValidationIssue::new(
                ValidationKind::Placeholder,
                format!("placeholder marker: {}", marker.trim()),
            ));
        }
    }
}

fn check_banned_phrases(html: &str, issues: &mut Vec<ValidationIssue>) {
    let lower = html.to_lowercase();

    for phrase in BANNED_PHRASES {
        if lower.contains(phrase) {
            issues.push(ValidationIssue::new(
                ValidationKind::BannedPhrase,
                format!("banned phrase: {}", phrase),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_paragraphs() -> String {
        let para = "<p>Graduate programs in this field prepare students for a wide \
                    range of roles. Coursework typically covers research methods, applied \
                    practice, and field placements with experienced mentors.</p>";
        para.repeat(4)
    }

    #[test]
    fn test_clean_content_passes() {
        let html = full_paragraphs();
        assert!(validate(&html).is_empty());
    }

    #[test]
    fn test_short_body_is_truncated() {
        let issues = validate("<p>Too short.</p>");
        assert!(issues
            .iter()
            .any(|i| i.kind == ValidationKind::Truncated));
    }

    #[test]
    fn test_mid_sentence_ending_is_truncated() {
        let mut html = full_paragraphs();
        html.push_str("<p>And the final point is that students");
        let issues = validate(&html);
        assert!(issues
            .iter()
            .any(|i| i.kind == ValidationKind::Truncated));
    }

    #[test]
    fn test_placeholder_detected() {
        let html = format!("{}<p>[insert statistics here]</p>", full_paragraphs());
        let issues = validate(&html);
        assert!(issues
            .iter()
            .any(|i| i.kind == ValidationKind::Placeholder));
    }

    #[test]
    fn test_banned_phrase_detected() {
        let html = format!(
            "{}<p>Let us delve into the details of accreditation.</p>",
            full_paragraphs()
        );
        let issues = validate(&html);
        assert!(issues
            .iter()
            .any(|i| i.kind == ValidationKind::BannedPhrase));
    }

    #[test]
    fn test_unclosed_paragraph_detected() {
        let html = format!("{}<p>Dangling paragraph with no close.", full_paragraphs());
        let issues = validate(&html);
        assert!(issues
            .iter()
            .any(|i| i.kind == ValidationKind::Truncated && i.detail.contains("unclosed")));
    }
}
