//! Text cleanup applied to every extracted value.

use std::collections::HashSet;

/// Longest value kept, in characters, including the ellipsis.
pub const MAX_VALUE_CHARS: usize = 500;
pub const ELLIPSIS: &str = "...";

/// Collapse whitespace runs, trim, and cap the length at [`MAX_VALUE_CHARS`].
pub fn clean(raw: &str) -> String {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= MAX_VALUE_CHARS {
        return text;
    }
    let keep = MAX_VALUE_CHARS - ELLIPSIS.chars().count();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Drop exact repeats, keeping the first occurrence and the original order.
pub fn dedupe<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean("  Breaking\n\n  news\t today "), "Breaking news today");
        assert_eq!(clean(""), "");
        assert_eq!(clean(" \n\t "), "");
    }

    #[test]
    fn truncates_long_values_to_exact_length() {
        let long = "word ".repeat(300);
        let out = clean(&long);
        assert_eq!(out.chars().count(), MAX_VALUE_CHARS);
        assert!(out.ends_with(ELLIPSIS));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(MAX_VALUE_CHARS + 20);
        let out = clean(&long);
        assert_eq!(out.chars().count(), MAX_VALUE_CHARS);
        assert!(out.starts_with("ééé"));
    }

    #[test]
    fn exactly_max_length_is_untouched() {
        let s = "a".repeat(MAX_VALUE_CHARS);
        assert_eq!(clean(&s), s);
    }

    #[test]
    fn clean_is_idempotent() {
        let samples = [
            "  a  b ".to_string(),
            "x".repeat(1200),
            format!("{} tail", "y ".repeat(400)),
            "already clean".to_string(),
        ];
        for s in samples {
            let once = clean(&s);
            assert_eq!(clean(&once), once);
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let input = ["b", "a", "b", "c", "a", "A"].map(String::from);
        assert_eq!(dedupe(input), vec!["b", "a", "c", "A"]);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input: Vec<String> = ["x", "y", "x", "z", "y"].map(String::from).to_vec();
        let once = dedupe(input);
        assert_eq!(dedupe(once.clone()), once);
    }
}
