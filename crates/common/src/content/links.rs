//! Internal link insertion
//!
//! Given published articles as (title, slug) candidates, link the first
//! plain-text occurrence of each candidate's key phrase. Never inserts
//! inside a tag or an existing anchor, and each candidate links at most
//! once.

/// A published article available as a link target
#[derive(Debug, Clone)]
pub struct LinkCandidate {
    pub title: String,
    pub slug: String,
}

/// Words too generic to anchor a link on
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "best", "for", "from", "guide", "how", "in", "is", "it", "of", "on",
    "the", "to", "vs", "what", "which", "why", "with", "worth", "your",
];

impl LinkCandidate {
    /// The longest non-stop-word from the title, used as the anchor text
    fn anchor_phrase(&self) -> Option<String> {
        self.title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| w.len() >= 4)
            .map(|w| w.to_lowercase())
            .filter(|w| !STOP_WORDS.contains(&w.as_str()))
            .max_by_key(|w| w.len())
    }
}

/// Insert up to `max_links` internal links. Returns the updated HTML and
/// how many links were inserted.
pub fn insert_internal_links(
    html: &str,
    candidates: &[LinkCandidate],
    max_links: usize,
) -> (String, usize) {
    let mut result = html.to_string();
    let mut inserted = 0;

    for candidate in candidates {
        if inserted >= max_links {
            break;
        }

        let Some(phrase) = candidate.anchor_phrase() else {
            continue;
        };

        if let Some(pos) = find_linkable(&result, &phrase) {
            // Positions come from the lowercased copy; bail out if
            // lowercasing shifted byte offsets (non-ASCII titles)
            let end = pos + phrase.len();
            if end > result.len()
                || !result.is_char_boundary(pos)
                || !result.is_char_boundary(end)
            {
                continue;
            }
            let original = &result[pos..pos + phrase.len()];
            let anchor = format!(r#"<a href="/{}">{}</a>"#, candidate.slug, original);
            result.replace_range(pos..pos + phrase.len(), &anchor);
            inserted += 1;
        }
    }

    (result, inserted)
}

/// Find a case-insensitive, word-bounded occurrence of `phrase` that sits
/// in plain text: not inside a tag and not inside an existing anchor.
fn find_linkable(html: &str, phrase: &str) -> Option<usize> {
    let lower = html.to_lowercase();
    let mut search_from = 0;

    while let Some(rel) = lower[search_from..].find(phrase) {
        let pos = search_from + rel;
        search_from = pos + 1;

        // Word boundaries
        let before_ok = pos == 0
            || !lower[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        let after_ok = !lower[pos + phrase.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric());
        if !before_ok || !after_ok {
            continue;
        }

        if in_plain_text(&lower, pos) {
            return Some(pos);
        }
    }

    None
}

/// Scan from the start to decide whether `pos` is outside tags and anchors
fn in_plain_text(lower: &str, pos: usize) -> bool {
    let mut in_tag = false;
    let mut in_anchor = false;

    let mut i = 0;
    let bytes = lower.as_bytes();
    while i < pos {
        match bytes[i] {
            b'<' => {
                in_tag = true;
                let rest = &lower[i..];
                if rest.starts_with("<a ") || rest.starts_with("<a>") {
                    in_anchor = true;
                } else if rest.starts_with("</a>") {
                    in_anchor = false;
                }
            }
            b'>' => in_tag = false,
            _ => {}
        }
        i += 1;
    }

    !in_tag && !in_anchor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<LinkCandidate> {
        vec![
            LinkCandidate {
                title: "Is a Nursing Degree Worth It".into(),
                slug: "is-a-nursing-degree-worth-it".into(),
            },
            LinkCandidate {
                title: "Guide to Cybersecurity Careers".into(),
                slug: "guide-to-cybersecurity-careers".into(),
            },
        ]
    }

    #[test]
    fn test_inserts_inline_anchor() {
        let html = "<p>Many students consider nursing as a career path.</p>";
        let (out, count) = insert_internal_links(html, &candidates(), 5);
        assert_eq!(count, 1);
        assert!(out.contains(r#"<a href="/is-a-nursing-degree-worth-it">nursing</a>"#));
    }

    #[test]
    fn test_respects_max_links() {
        let html = "<p>Both nursing and cybersecurity pay well.</p>";
        let (_, count) = insert_internal_links(html, &candidates(), 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_skips_text_inside_existing_anchor() {
        let html = r#"<p>See <a href="/other">nursing overview</a> for details.</p>"#;
        let (out, count) = insert_internal_links(html, &candidates(), 5);
        assert_eq!(count, 0);
        assert_eq!(out, html);
    }

    #[test]
    fn test_skips_attribute_text() {
        let html = r#"<p><img alt="nursing chart" src="/img.png"> A chart.</p>"#;
        let (_, count) = insert_internal_links(html, &candidates(), 5);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_preserves_original_casing() {
        let html = "<p>Cybersecurity roles are growing fast.</p>";
        let (out, count) = insert_internal_links(html, &candidates(), 5);
        assert_eq!(count, 1);
        assert!(out.contains(">Cybersecurity</a>"));
    }

    #[test]
    fn test_word_boundary_respected() {
        // "nursings" must not match "nursing"
        let html = "<p>Many nursings-adjacent topics exist.</p>";
        let (_, count) = insert_internal_links(html, &[candidates()[0].clone()], 5);
        assert_eq!(count, 0);
    }
}
