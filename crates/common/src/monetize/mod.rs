//! Monetization engine
//!
//! Matches a free-text article topic against the sponsored degree-program
//! taxonomy, generates the CTA shortcode, and inserts it at a designated
//! slot in the article HTML. Matching failures are non-fatal: an article
//! without a match simply carries no monetization.

use crate::db::models::MonetizationProgram;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scoring weights
const CONCENTRATION_MATCH: i32 = 50;
const KEYWORD_HIT: i32 = 10;
const CATEGORY_TOKEN_HIT: i32 = 5;

/// A record scoring below this is not a match
pub const MIN_MATCH_SCORE: i32 = 20;

/// In-memory taxonomy record, decoupled from the entity so the matcher
/// is testable without a database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub id: Option<Uuid>,
    pub category: String,
    pub concentration: String,
    pub degree_level: String,
    pub keywords: Vec<String>,
    pub shortcode_id: String,
}

impl From<&MonetizationProgram> for ProgramRecord {
    fn from(model: &MonetizationProgram) -> Self {
        Self {
            id: Some(model.id),
            category: model.category.clone(),
            concentration: model.concentration.clone(),
            degree_level: model.degree_level.clone(),
            keywords: model.keyword_list(),
            shortcode_id: model.shortcode_id.clone(),
        }
    }
}

/// Score one record against normalized topic text
fn score_record(topic: &str, record: &ProgramRecord) -> i32 {
    let mut score = 0;

    if topic.contains(&record.concentration.to_lowercase()) {
        score += CONCENTRATION_MATCH;
    }

    for keyword in &record.keywords {
        if topic.contains(&keyword.to_lowercase()) {
            score += KEYWORD_HIT;
        }
    }

    for token in record.category.to_lowercase().split_whitespace() {
        if topic.contains(token) {
            score += CATEGORY_TOKEN_HIT;
        }
    }

    score
}

/// Match free-text topic material to the best taxonomy record.
///
/// Ties keep the earlier record, so taxonomy seed order is the
/// deterministic tie-break.
pub fn match_program<'a>(
    topic_text: &str,
    programs: &'a [ProgramRecord],
) -> Option<(&'a ProgramRecord, i32)> {
    let topic = topic_text.to_lowercase();

    let mut best: Option<(&ProgramRecord, i32)> = None;
    for record in programs {
        let score = score_record(&topic, record);
        if score >= MIN_MATCH_SCORE && best.map_or(true, |(_, s)| score > s) {
            best = Some((record, score));
        }
    }

    best
}

/// Render the CTA shortcode for a matched program
pub fn shortcode(record: &ProgramRecord) -> String {
    format!(
        r#"[degree_program id="{}" level="{}"]"#,
        record.shortcode_id, record.degree_level
    )
}

/// Paragraph-boundary insertion slots: byte offsets just after each `</p>`
pub fn find_slots(html: &str) -> Vec<usize> {
    let mut slots = Vec::new();
    let mut from = 0;
    while let Some(rel) = html[from..].find("</p>") {
        let end = from + rel + "</p>".len();
        slots.push(end);
        from = end;
    }
    slots
}

/// Relative body positions that anchor CTA placements
const PLACEMENT_POINTS: [f64; 2] = [0.4, 0.8];

/// Placement slots: the paragraph boundaries nearest 40% and 80% of the
/// body, deduplicated, in document order. Empty when the article has no
/// paragraphs.
pub fn placement_slots(html: &str) -> Vec<usize> {
    let boundaries = find_slots(html);
    if boundaries.is_empty() {
        return Vec::new();
    }

    let mut slots: Vec<usize> = PLACEMENT_POINTS
        .iter()
        .filter_map(|point| {
            let target = (html.len() as f64 * point) as usize;
            boundaries
                .iter()
                .min_by_key(|&&pos| pos.abs_diff(target))
                .copied()
        })
        .collect();
    slots.sort_unstable();
    slots.dedup();
    slots
}

/// Insert the shortcode at the first available placement slot, or at every
/// slot up to `placements`. Falls back to appending when the article has no
/// paragraphs.
pub fn insert_shortcode(html: &str, code: &str, placements: usize) -> String {
    let slots = placement_slots(html);

    if slots.is_empty() {
        let mut result = String::with_capacity(html.len() + code.len() + 2);
        result.push_str(html);
        result.push('\n');
        result.push_str(code);
        result.push('\n');
        return result;
    }

    let chosen = &slots[..placements.clamp(1, slots.len())];
    let mut result = String::with_capacity(html.len() + (code.len() + 2) * chosen.len());
    let mut from = 0;
    for &slot in chosen {
        result.push_str(&html[from..slot]);
        result.push('\n');
        result.push_str(code);
        result.push('\n');
        from = slot;
    }
    result.push_str(&html[from..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Vec<ProgramRecord> {
        vec![
            ProgramRecord {
                id: None,
                category: "healthcare".into(),
                concentration: "nursing".into(),
                degree_level: "bachelors".into(),
                keywords: vec!["rn".into(), "bsn".into(), "patient care".into()],
                shortcode_id: "hc-nursing-bs".into(),
            },
            ProgramRecord {
                id: None,
                category: "healthcare".into(),
                concentration: "health informatics".into(),
                degree_level: "masters".into(),
                keywords: vec!["health data".into(), "ehr".into()],
                shortcode_id: "hc-informatics-ms".into(),
            },
            ProgramRecord {
                id: None,
                category: "technology".into(),
                concentration: "cybersecurity".into(),
                degree_level: "masters".into(),
                keywords: vec!["security".into(), "infosec".into()],
                shortcode_id: "tech-cyber-ms".into(),
            },
        ]
    }

    #[test]
    fn test_exact_concentration_beats_keyword_only() {
        let programs = taxonomy();
        // "security" alone is a cybersecurity keyword, but "health informatics"
        // appears verbatim
        let (record, _) =
            match_program("health informatics and data security careers", &programs).unwrap();
        assert_eq!(record.shortcode_id, "hc-informatics-ms");
    }

    #[test]
    fn test_below_threshold_is_no_match() {
        let programs = taxonomy();
        assert!(match_program("medieval poetry analysis", &programs).is_none());
    }

    #[test]
    fn test_tie_keeps_taxonomy_order() {
        let mut programs = taxonomy();
        // Force two records to score identically on the same keyword
        programs[0].keywords = vec!["degree".into(), "school".into()];
        programs[1].keywords = vec!["degree".into(), "school".into()];
        programs[0].concentration = "zzz".into();
        programs[1].concentration = "yyy".into();
        programs[0].category = "alpha".into();
        programs[1].category = "alpha".into();

        let (record, _) = match_program("alpha degree school options", &programs).unwrap();
        assert_eq!(record.shortcode_id, "hc-nursing-bs");
    }

    #[test]
    fn test_shortcode_format() {
        let programs = taxonomy();
        assert_eq!(
            shortcode(&programs[2]),
            r#"[degree_program id="tech-cyber-ms" level="masters"]"#
        );
    }

    #[test]
    fn test_insert_at_paragraph_boundary() {
        let html = "<p>one</p><p>two</p><p>three</p><p>four</p><p>five</p>";
        let out = insert_shortcode(html, "[degree_program id=\"x\" level=\"y\"]", 1);
        // Inserted between paragraphs, never inside one
        let idx = out.find("[degree_program").unwrap();
        assert!(out[..idx].trim_end().ends_with("</p>"));
        assert!(out[idx..].contains("<p>"));
    }

    #[test]
    fn test_two_placements_fill_both_slots() {
        let html = "<p>one</p><p>two</p><p>three</p><p>four</p><p>five</p>";
        let out = insert_shortcode(html, "[cta]", 2);
        assert_eq!(out.matches("[cta]").count(), 2);
        // Both copies sit on paragraph boundaries
        for (idx, _) in out.match_indices("[cta]") {
            assert!(out[..idx].trim_end().ends_with("</p>"));
        }
        // One before the midpoint, one after
        let first = out.find("[cta]").unwrap();
        let last = out.rfind("[cta]").unwrap();
        assert!(first < out.len() / 2);
        assert!(last > out.len() / 2);
    }

    #[test]
    fn test_single_paragraph_dedupes_slots() {
        let out = insert_shortcode("<p>only</p>", "[cta]", 2);
        assert_eq!(out.matches("[cta]").count(), 1);
    }

    #[test]
    fn test_insert_appends_without_paragraphs() {
        let out = insert_shortcode("no paragraphs here", "[cta]", 1);
        assert!(out.ends_with("[cta]\n"));
    }
}
