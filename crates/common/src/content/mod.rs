//! Content heuristics
//!
//! Pure string/HTML analysis shared by the pipeline:
//! - draft validation (truncation, placeholders, banned phrases)
//! - quality rule scoring
//! - slug generation
//! - internal link insertion

pub mod links;
pub mod quality;
pub mod slug;
pub mod validator;

pub use quality::{ContentStats, QualityIssue, QualityReport, QualityRule};
pub use validator::{validate, ValidationIssue, ValidationKind};

use regex_lite::Regex;

/// Strip HTML tags, leaving the visible text with single spaces
pub fn strip_tags(html: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").expect("static regex");
    let text = tag_re.replace_all(html, " ");
    let ws_re = Regex::new(r"\s+").expect("static regex");
    ws_re.replace_all(&text, " ").trim().to_string()
}

/// Count words in the visible text of an HTML fragment
pub fn word_count(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

/// Average sentence length in words over the visible text
pub fn avg_sentence_length(html: &str) -> f64 {
    let text = strip_tags(html);
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        return 0.0;
    }

    let total_words: usize = sentences
        .iter()
        .map(|s| s.split_whitespace().count())
        .sum();

    total_words as f64 / sentences.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<p>Hello <strong>world</strong></p>"),
            "Hello world"
        );
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("<p>one two three</p><h2>four</h2>"), 4);
    }

    #[test]
    fn test_avg_sentence_length() {
        let html = "<p>One two three. Four five six seven.</p>";
        let avg = avg_sentence_length(html);
        assert!((avg - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_avg_sentence_length_empty() {
        assert_eq!(avg_sentence_length(""), 0.0);
    }
}
