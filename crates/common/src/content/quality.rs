//! Quality rule scoring
//!
//! Every rule is an explicit `QualityRule` over precomputed `ContentStats`,
//! enumerated in a fixed list. The score starts at 100 and each violated
//! rule subtracts its fixed penalty, clamped at zero. Adding violations can
//! only lower the score, never raise it.

use super::{avg_sentence_length, word_count};
use regex_lite::Regex;
use serde::Serialize;

/// Acceptable article length band, in words
pub const WORD_COUNT_MIN: usize = 1500;
pub const WORD_COUNT_MAX: usize = 2500;

/// Minimum structural requirements
pub const MIN_INTERNAL_LINKS: usize = 3;
pub const MIN_EXTERNAL_LINKS: usize = 2;
pub const MIN_FAQ_ENTRIES: usize = 3;
pub const MIN_H2_HEADINGS: usize = 3;

/// Readability ceiling
pub const MAX_AVG_SENTENCE_WORDS: f64 = 25.0;

/// Counts extracted once per scoring pass
#[derive(Debug, Clone, PartialEq)]
pub struct ContentStats {
    pub word_count: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub faq_entries: usize,
    pub h2_headings: usize,
    pub avg_sentence_words: f64,
}

impl ContentStats {
    /// Compute all stats from an HTML body
    pub fn from_html(html: &str) -> Self {
        let internal_re = Regex::new(r#"<a\s[^>]*href="/"#).expect("static regex");
        let external_re = Regex::new(r#"<a\s[^>]*href="https?://"#).expect("static regex");
        let h2_re = Regex::new(r"<h2[\s>]").expect("static regex");
        // FAQ entries are question headings/bold lines ending in '?'
        let faq_re =
            Regex::new(r"<(h3|h4|strong|b)[^>]*>[^<]*\?\s*</(h3|h4|strong|b)>").expect("static regex");

        Self {
            word_count: word_count(html),
            internal_links: internal_re.find_iter(html).count(),
            external_links: external_re.find_iter(html).count(),
            faq_entries: faq_re.find_iter(html).count(),
            h2_headings: h2_re.find_iter(html).count(),
            avg_sentence_words: avg_sentence_length(html),
        }
    }
}

/// A single violated rule
#[derive(Debug, Clone, Serialize)]
pub struct QualityIssue {
    /// Stable rule identifier, also used as a risk flag
    pub rule: &'static str,
    pub message: String,
    pub penalty: i32,
}

/// A rule checked against precomputed stats
pub trait QualityRule: Send + Sync {
    fn check(&self, stats: &ContentStats) -> Option<QualityIssue>;
}

struct WordCountRule;

impl QualityRule for WordCountRule {
    fn check(&self, stats: &ContentStats) -> Option<QualityIssue> {
        if (WORD_COUNT_MIN..=WORD_COUNT_MAX).contains(&stats.word_count) {
            None
        } else {
            Some(QualityIssue {
                rule: "word_count",
                message: format!(
                    "word count {} outside [{}, {}]",
                    stats.word_count, WORD_COUNT_MIN, WORD_COUNT_MAX
                ),
                penalty: 15,
            })
        }
    }
}

struct InternalLinksRule;

impl QualityRule for InternalLinksRule {
    fn check(&self, stats: &ContentStats) -> Option<QualityIssue> {
        (stats.internal_links < MIN_INTERNAL_LINKS).then(|| QualityIssue {
            rule: "internal_links",
            message: format!(
                "only {} internal links, need {}",
                stats.internal_links, MIN_INTERNAL_LINKS
            ),
            penalty: 10,
        })
    }
}

struct ExternalLinksRule;

impl QualityRule for ExternalLinksRule {
    fn check(&self, stats: &ContentStats) -> Option<QualityIssue> {
        (stats.external_links < MIN_EXTERNAL_LINKS).then(|| QualityIssue {
            rule: "external_links",
            message: format!(
                "only {} external links, need {}",
                stats.external_links, MIN_EXTERNAL_LINKS
            ),
            penalty: 10,
        })
    }
}

struct FaqRule;

impl QualityRule for FaqRule {
    fn check(&self, stats: &ContentStats) -> Option<QualityIssue> {
        (stats.faq_entries < MIN_FAQ_ENTRIES).then(|| QualityIssue {
            rule: "faq_entries",
            message: format!(
                "only {} FAQ entries, need {}",
                stats.faq_entries, MIN_FAQ_ENTRIES
            ),
            penalty: 10,
        })
    }
}

struct HeadingsRule;

impl QualityRule for HeadingsRule {
    fn check(&self, stats: &ContentStats) -> Option<QualityIssue> {
        (stats.h2_headings < MIN_H2_HEADINGS).then(|| QualityIssue {
            rule: "h2_headings",
            message: format!(
                "only {} H2 headings, need {}",
                stats.h2_headings, MIN_H2_HEADINGS
            ),
            penalty: 10,
        })
    }
}

struct SentenceLengthRule;

impl QualityRule for SentenceLengthRule {
    fn check(&self, stats: &ContentStats) -> Option<QualityIssue> {
        (stats.avg_sentence_words > MAX_AVG_SENTENCE_WORDS).then(|| QualityIssue {
            rule: "sentence_length",
            message: format!(
                "average sentence length {:.1} words exceeds {}",
                stats.avg_sentence_words, MAX_AVG_SENTENCE_WORDS
            ),
            penalty: 10,
        })
    }
}

/// The fixed rule set, in evaluation order
pub fn default_rules() -> Vec<Box<dyn QualityRule>> {
    vec![
        Box::new(WordCountRule),
        Box::new(InternalLinksRule),
        Box::new(ExternalLinksRule),
        Box::new(FaqRule),
        Box::new(HeadingsRule),
        Box::new(SentenceLengthRule),
    ]
}

/// Scoring result for one pass
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub score: i32,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Issue messages, for the auto-fix prompt
    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }

    /// Stable rule identifiers, for article risk flags
    pub fn flags(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.rule.to_string()).collect()
    }
}

/// Score an HTML body against the default rule set
pub fn assess(html: &str) -> QualityReport {
    assess_stats(&ContentStats::from_html(html))
}

/// Score precomputed stats against the default rule set
pub fn assess_stats(stats: &ContentStats) -> QualityReport {
    let issues: Vec<QualityIssue> = default_rules()
        .iter()
        .filter_map(|rule| rule.check(stats))
        .collect();

    let penalty: i32 = issues.iter().map(|i| i.penalty).sum();

    QualityReport {
        score: (100 - penalty).max(0),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_stats() -> ContentStats {
        ContentStats {
            word_count: 2000,
            internal_links: 4,
            external_links: 3,
            faq_entries: 4,
            h2_headings: 5,
            avg_sentence_words: 18.0,
        }
    }

    #[test]
    fn test_perfect_content_scores_100() {
        let report = assess_stats(&good_stats());
        assert_eq!(report.score, 100);
        assert!(!report.has_issues());
    }

    #[test]
    fn test_score_monotonically_non_increasing() {
        // Each additional violation can only lower the score
        let mut stats = good_stats();
        let mut prev = assess_stats(&stats).score;

        stats.word_count = 900;
        let s = assess_stats(&stats).score;
        assert!(s < prev);
        prev = s;

        stats.internal_links = 0;
        let s = assess_stats(&stats).score;
        assert!(s < prev);
        prev = s;

        stats.external_links = 0;
        let s = assess_stats(&stats).score;
        assert!(s < prev);
        prev = s;

        stats.faq_entries = 0;
        let s = assess_stats(&stats).score;
        assert!(s < prev);
        prev = s;

        stats.h2_headings = 0;
        let s = assess_stats(&stats).score;
        assert!(s < prev);
        prev = s;

        stats.avg_sentence_words = 40.0;
        let s = assess_stats(&stats).score;
        assert!(s < prev);
    }

    #[test]
    fn test_score_never_negative() {
        let stats = ContentStats {
            word_count: 10,
            internal_links: 0,
            external_links: 0,
            faq_entries: 0,
            h2_headings: 0,
            avg_sentence_words: 60.0,
        };
        let report = assess_stats(&stats);
        assert!(report.score >= 0);
        assert_eq!(report.issues.len(), 6);
    }

    #[test]
    fn test_word_count_bounds_inclusive() {
        let mut stats = good_stats();
        stats.word_count = 1500;
        assert_eq!(assess_stats(&stats).score, 100);
        stats.word_count = 2500;
        assert_eq!(assess_stats(&stats).score, 100);
        stats.word_count = 2501;
        assert_eq!(assess_stats(&stats).score, 85);
    }

    #[test]
    fn test_stats_from_html() {
        let html = r#"
            <h2>Overview</h2>
            <p>Intro text with an <a href="/guides/nursing">internal link</a>.</p>
            <h2>Details</h2>
            <p>More text citing <a href="https://www.bls.gov/ooh/">BLS data</a>.</p>
            <h2>FAQ</h2>
            <h3>Is the degree worth it?</h3><p>Yes.</p>
            <h3>How long does it take?</h3><p>Two years.</p>
        "#;
        let stats = ContentStats::from_html(html);
        assert_eq!(stats.h2_headings, 3);
        assert_eq!(stats.internal_links, 1);
        assert_eq!(stats.external_links, 1);
        assert_eq!(stats.faq_entries, 2);
    }

    #[test]
    fn test_flags_are_stable_identifiers() {
        let mut stats = good_stats();
        stats.faq_entries = 0;
        let report = assess_stats(&stats);
        assert_eq!(report.flags(), vec!["faq_entries".to_string()]);
    }
}
