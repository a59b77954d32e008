//! Heuristic element matching for unlabeled markup.
//!
//! Strategies are additive, not first-wins:
//!
//! 1. date-family keyword sets pull in every `<time>` element,
//! 2. author-family sets pull in `<meta name="author|publisher|source">`,
//! 3. every non-empty text container whose class/id/`data-*` values or text
//!    contain a synonym qualifies, as does (for dates) any container whose
//!    text looks like a date literal.
//!
//! Each element is kept once, in discovery order. Matching is permissive on
//! purpose and noisy results are expected downstream.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::accumulator::FieldRequest;
use crate::keywords::{expand, KeywordSet};
use crate::normalize::{clean, dedupe};

static TIME_TAGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time").expect("static selector"));
static AUTHOR_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="author"], meta[name="publisher"], meta[name="source"]"#)
        .expect("static selector")
});
static TEXT_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div, span, p, h1, h2, h3, h4, a, article").expect("static selector")
});
static DATE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}|\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{4}",
    )
    .expect("static pattern")
});

/// Text carried by an element. `<meta>` elements carry theirs in `content`.
pub fn element_text(el: &ElementRef<'_>) -> String {
    if el.value().name() == "meta" {
        return el.value().attr("content").unwrap_or_default().to_string();
    }
    el.text().collect()
}

/// Lower-cased class tokens, id and `data-*` values, space separated.
fn attribute_haystack(el: &ElementRef<'_>) -> String {
    let node = el.value();
    let mut parts: Vec<&str> = node.classes().collect();
    if let Some(id) = node.id() {
        parts.push(id);
    }
    parts.extend(
        node.attrs()
            .filter(|(name, _)| name.starts_with("data-"))
            .map(|(_, value)| value),
    );
    parts.join(" ").to_lowercase()
}

/// Whether `text` contains something shaped like a calendar date.
pub fn looks_like_date(text: &str) -> bool {
    DATE_LITERAL.is_match(text)
}

/// Find every element likely to hold a value for `keywords`.
pub fn find_elements<'a>(keywords: &KeywordSet, doc: &'a Html) -> Vec<ElementRef<'a>> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut keep = |el: ElementRef<'a>, found: &mut Vec<ElementRef<'a>>| {
        if seen.insert(el.id()) {
            found.push(el);
        }
    };

    if keywords.is_date_family() {
        for el in doc.select(&TIME_TAGS) {
            keep(el, &mut found);
        }
    }

    if keywords.is_author_family() {
        for el in doc.select(&AUTHOR_META) {
            keep(el, &mut found);
        }
    }

    for el in doc.select(&TEXT_CONTAINERS) {
        let text = element_text(&el);
        if text.trim().is_empty() {
            continue;
        }

        if keywords.is_date_family() && looks_like_date(&text) {
            keep(el, &mut found);
            continue;
        }

        let haystack = attribute_haystack(&el);
        let lowered = text.to_lowercase();
        if keywords
            .iter()
            .any(|kw| haystack.contains(kw) || lowered.contains(kw))
        {
            keep(el, &mut found);
        }
    }

    found
}

/// Cleaned, page-level deduplicated values for one keyword set.
pub fn extract_values(keywords: &KeywordSet, doc: &Html) -> Vec<String> {
    let texts = find_elements(keywords, doc)
        .into_iter()
        .map(|el| element_text(&el))
        .filter(|t| !t.trim().is_empty())
        .map(|t| clean(&t));
    dedupe(texts)
}

/// Values found on one page, aligned with the requested fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub values: Vec<(FieldRequest, Vec<String>)>,
}

impl PageExtraction {
    pub fn total(&self) -> usize {
        self.values.iter().map(|(_, v)| v.len()).sum()
    }
}

/// Parse a page source once and run the matcher for every field.
pub fn extract_fields(html: &str, fields: &[FieldRequest]) -> PageExtraction {
    let doc = Html::parse_document(html);
    let values = fields
        .iter()
        .map(|field| {
            let keywords = expand(field.as_str());
            let found = extract_values(&keywords, &doc);
            tracing::debug!(
                target: "skim.matcher",
                field = %field,
                %keywords,
                hits = found.len(),
                "matched field"
            );
            (field.clone(), found)
        })
        .collect();
    PageExtraction { values }
}
