//! URL slug generation

/// Slugify a title: lowercase, alphanumeric runs joined by single
/// hyphens, no leading or trailing hyphen. Idempotent: slugifying a
/// slug returns it unchanged.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // suppress leading hyphen

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(
            slugify("Is a Nursing Degree Worth It?"),
            "is-a-nursing-degree-worth-it"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = slugify("MBA vs. MS in Finance: Which Pays More?");
        let twice = slugify(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(slugify("  Data --- Science!!  "), "data-science");
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(slugify("Résumé Tips"), "r-sum-tips");
    }

    #[test]
    fn test_empty() {
        assert_eq!(slugify("???"), "");
    }
}
