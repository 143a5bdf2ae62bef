//! URL slug derivation for poem titles.

/// Derive a URL slug from a title.
///
/// The title is lower-cased and trimmed, every character outside
/// `[a-z0-9 -]` is dropped, and runs of spaces collapse into a single `-`.
///
/// # Examples
///
/// ```
/// use stanza_core::slug::slugify;
///
/// assert_eq!(slugify("Divide and Lose"), "divide-and-lose");
/// assert_eq!(slugify("  What's   Left?  "), "whats-left");
/// ```
pub fn slugify(title: &str) -> String {
    let filtered: String = title
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(filtered.len());
    let mut in_spaces = false;
    for c in filtered.chars() {
        if c == ' ' {
            if !in_spaces {
                slug.push('-');
            }
            in_spaces = true;
        } else {
            slug.push(c);
            in_spaces = false;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple_title() {
        assert_eq!(slugify("Fragments and Unity"), "fragments-and-unity");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("O, Captain! My Captain!"), "o-captain-my-captain");
    }

    #[test]
    fn test_slugify_keeps_existing_hyphens() {
        assert_eq!(slugify("Half-Light"), "half-light");
    }

    #[test]
    fn test_slugify_non_ascii_dropped() {
        assert_eq!(slugify("Café Noir"), "caf-noir");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("   "), "");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn check_slug_alphabet(title: &str) -> Result<(), TestCaseError> {
        let slug = slugify(title);
        prop_assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "unexpected character in slug {slug:?}"
        );
        Ok(())
    }

    fn check_slug_is_stable(title: &str) -> Result<(), TestCaseError> {
        let slug = slugify(title);
        prop_assert_eq!(slugify(&slug), slug);
        Ok(())
    }

    proptest! {
        #[test]
        fn slug_alphabet(title in ".{0,40}") {
            check_slug_alphabet(&title)?;
        }

        #[test]
        fn slug_is_stable(title in "[a-zA-Z0-9 ,.'-]{0,40}") {
            check_slug_is_stable(&title)?;
        }
    }
}
