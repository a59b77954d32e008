//! Synonym expansion for free-form field names.
//!
//! A requested field such as `"Date"` is widened into the whole family of
//! words that tend to show up in class names, ids and text near that kind of
//! value. Unknown names fall back to themselves so a literal match is still
//! attempted.

use std::fmt;

/// Synonym families, checked in this order. The first column is the
/// canonical key; a field that prefixes it selects the family too.
const FAMILIES: &[(&str, &[&str])] = &[
    ("title", &["title", "heading", "header", "name", "headline"]),
    ("date", &["date", "time", "published", "posted", "updated", "datetime"]),
    ("source", &["source", "author", "publisher", "by", "from", "origin"]),
    ("web_source", &["website", "domain", "url", "link", "web", "site"]),
    ("news_title", &["news", "article", "story", "headline", "post"]),
    ("description", &["desc", "description", "content", "text", "body", "summary"]),
    ("price", &["price", "cost", "amount", "value", "fee"]),
    ("rating", &["rating", "score", "stars", "review-score"]),
    ("review", &["review", "comment", "feedback", "testimonial"]),
    ("category", &["category", "type", "genre", "group", "section"]),
];

/// Ordered set of lower-case synonyms for one requested field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for w in words {
            let w = w.as_ref().to_lowercase();
            if !out.contains(&w) {
                out.push(w);
            }
        }
        Self { words: out }
    }

    /// Case-insensitive membership.
    pub fn contains(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.words.iter().any(|w| *w == word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether timestamp heuristics apply to this set.
    pub fn is_date_family(&self) -> bool {
        self.contains("date")
    }

    /// Whether authorship metadata heuristics apply to this set.
    pub fn is_author_family(&self) -> bool {
        self.contains("source") || self.contains("author")
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.words.join(", "))
    }
}

/// Expand a field name into its synonym family.
///
/// ```
/// use skim_extract::keywords::expand;
///
/// assert!(expand("Posted").contains("datetime"));
/// assert_eq!(expand("sku_code").iter().collect::<Vec<_>>(), vec!["sku_code"]);
/// ```
pub fn expand(field: &str) -> KeywordSet {
    let needle = field.to_lowercase();
    for (key, synonyms) in FAMILIES {
        if synonyms.contains(&needle.as_str()) || key.starts_with(&needle) {
            return KeywordSet::from_words(synonyms.iter());
        }
    }
    KeywordSet::from_words([needle])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonym_selects_whole_family() {
        let set = expand("author");
        assert!(set.contains("publisher"));
        assert!(set.contains("origin"));
        assert!(set.is_author_family());
        assert!(!set.is_date_family());
    }

    #[test]
    fn prefix_of_canonical_key_selects_family() {
        let set = expand("Desc");
        assert!(set.contains("summary"));

        let set = expand("cat");
        assert!(set.contains("genre"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(expand("DATE"), expand("date"));
        assert!(expand("date").contains("DateTime"));
        assert!(expand("TIME").is_date_family());
    }

    #[test]
    fn first_family_wins_for_shared_synonyms() {
        // "headline" sits in both the title and news_title families.
        let set = expand("headline");
        assert!(set.contains("heading"));
        assert!(!set.contains("story"));
    }

    #[test]
    fn unknown_field_falls_back_to_itself() {
        for raw in ["totally_unknown_xyz", "Sku-Code", "ünïcode"] {
            let set = expand(raw);
            assert_eq!(set.len(), 1);
            assert!(set.contains(&raw.to_lowercase()));
        }
    }

    #[test]
    fn never_empty() {
        for raw in ["", " ", "x", "price", "zzz"] {
            assert!(!expand(raw).is_empty());
        }
    }
}
