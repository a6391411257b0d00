//! Text normalization for guess matching.
//!
//! Guesses and solutions are compared after stripping every whitespace
//! character and lower-casing, so "Sea Turtle", "seaturtle" and
//! " SEA  TURTLE " all match.

/// Remove all whitespace and lower-case.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Number of non-whitespace characters.
pub fn letter_count(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Whether two strings use exactly the same letters after normalization.
pub fn is_permutation(a: &str, b: &str) -> bool {
    let mut left: Vec<char> = normalize(a).chars().collect();
    let mut right: Vec<char> = normalize(b).chars().collect();
    if left.len() != right.len() {
        return false;
    }
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

/// Whether two strings match after normalization.
pub fn matches(guess: &str, solution: &str) -> bool {
    normalize(guess) == normalize(solution)
}

/// The first `len` characters of `text`, character-aware.
pub fn prefix(text: &str, len: usize) -> String {
    text.chars().take(len).collect()
}

/// Case-insensitive prefix test. Whitespace is compared literally.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Sea Turtle"), "seaturtle");
        assert_eq!(normalize("  BLUE\twhale \n"), "bluewhale");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_counts() {
        assert_eq!(letter_count("Fallow Deer"), 10);
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation("PLHNODI", "Dolphin"));
        assert!(is_permutation("eltrutaes", "Sea Turtle"));
        assert!(!is_permutation("dolphinn", "dolphin"));
        assert!(!is_permutation("dolphix", "dolphin"));
    }

    #[test]
    fn test_prefix_is_char_aware() {
        assert_eq!(prefix("Émeu", 3), "Éme");
        assert_eq!(prefix("Ox", 3), "Ox");
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("DOLphin", "Dol"));
        assert!(starts_with_ignore_case("ox bow", "Ox "));
        assert!(!starts_with_ignore_case("do", "Dol"));
        assert!(!starts_with_ignore_case("xdolphin", "Dol"));
        assert!(!starts_with_ignore_case("Oxbow", "Ox "));
        assert!(!starts_with_ignore_case(" D o l", "Dol"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "\\PC{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(!once.chars().any(char::is_whitespace));
        }

        #[test]
        fn prop_whitespace_and_case_do_not_affect_matching(word in "[a-z]{4,20}", gap in 0usize..4) {
            let spaced: String = word
                .chars()
                .enumerate()
                .map(|(i, c)| if i == gap { format!(" {}", c.to_ascii_uppercase()) } else { c.to_string() })
                .collect();
            prop_assert!(matches(&spaced, &word));
            prop_assert!(is_permutation(&spaced, &word));
        }
    }
}
