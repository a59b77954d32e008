//! Record-per-card extraction for listing pages built from repeated
//! containers (one `<article>` per story, one `<li>` per result, ...).
//!
//! Every column is described by an ordered list of [`Candidate`]s. The first
//! candidate that finds an element inside the card wins, even when that
//! element's text is empty; a column with no candidate found gets its
//! [`ValueRule`]'s missing value. Rows therefore always have one cell per
//! column.
//!
//! A fault while extracting a card (an invalid configured selector or
//! pattern) stops that card: the remaining cells are padded with empty
//! strings and the next card is processed normally.

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

use crate::accumulator::SessionResult;
use crate::compiled;
use crate::normalize::clean;

fn default_card() -> String {
    "article".to_string()
}

/// Column layout and fallback chains for one kind of card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSchema {
    /// Selector for the repeating card container.
    #[serde(default = "default_card")]
    pub card: String,
    pub fields: Vec<CardField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardField {
    pub name: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub value: ValueRule,
    /// Join every element matched by the first productive candidate instead
    /// of taking the first one.
    #[serde(default)]
    pub collect: bool,
}

/// One way of locating an element inside a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub css: String,
    /// Element text (leading whitespace ignored) must start with this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_prefix: Option<String>,
    /// Element text must match this regex somewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_pattern: Option<String>,
    /// Some class token must contain this, case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_contains: Option<String>,
}

impl Candidate {
    pub fn css(css: &str) -> Self {
        Self {
            css: css.to_string(),
            text_prefix: None,
            text_pattern: None,
            class_contains: None,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.text_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.text_pattern = Some(pattern.to_string());
        self
    }

    pub fn with_class_containing(mut self, needle: &str) -> Self {
        self.class_contains = Some(needle.to_string());
        self
    }
}

/// How a found element becomes a cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRule {
    /// Cleaned element text.
    #[default]
    Text,
    /// Cleaned text with a leading marker such as `"by "` removed.
    StripPrefix(String),
    /// The attribute when present, otherwise the cleaned text.
    AttrOrText(String),
    /// Only the digits of the text; the given default when nothing was found
    /// or the text has no digits.
    DigitsOr(String),
}

impl ValueRule {
    fn missing(&self) -> String {
        match self {
            ValueRule::DigitsOr(default) => default.clone(),
            _ => String::new(),
        }
    }

    fn apply(&self, el: &ElementRef<'_>) -> String {
        let text = clean(&el.text().collect::<String>());
        match self {
            ValueRule::Text => text,
            ValueRule::StripPrefix(prefix) => text
                .strip_prefix(prefix.as_str())
                .unwrap_or(&text)
                .trim()
                .to_string(),
            ValueRule::AttrOrText(attr) => match el.value().attr(attr) {
                Some(v) => v.trim().to_string(),
                None => text,
            },
            ValueRule::DigitsOr(default) => {
                let digits: String = text.chars().filter(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    default.clone()
                } else {
                    digits
                }
            }
        }
    }
}

/// Problems that abort the extraction of a single card.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CardFault {
    #[error("invalid selector `{css}` for column {column}")]
    Selector { column: String, css: String },

    #[error("invalid pattern `{pattern}` for column {column}")]
    Pattern { column: String, pattern: String },
}

impl CardSchema {
    /// Layout for article listing cards.
    pub fn article() -> Self {
        let field = |name: &str, candidates: Vec<Candidate>, value: ValueRule| CardField {
            name: name.to_string(),
            candidates,
            value,
            collect: false,
        };
        Self {
            card: default_card(),
            fields: vec![
                field(
                    "headline",
                    vec![Candidate::css("h2"), Candidate::css("h3"), Candidate::css("a.ae")],
                    ValueRule::Text,
                ),
                field(
                    "author",
                    vec![
                        Candidate::css("div").with_prefix("by "),
                        Candidate::css("a.au"),
                        Candidate::css("span.author"),
                    ],
                    ValueRule::StripPrefix("by ".into()),
                ),
                field(
                    "published",
                    vec![
                        Candidate::css("time"),
                        Candidate::css("span.published-date"),
                        Candidate::css("span.pw-published-date"),
                    ],
                    ValueRule::AttrOrText("datetime".into()),
                ),
                field(
                    "description",
                    vec![
                        Candidate::css("p.preview-content"),
                        Candidate::css("h3.preview-content"),
                        Candidate::css("div.preview-content"),
                    ],
                    ValueRule::Text,
                ),
                field(
                    "read_time",
                    vec![
                        Candidate::css("span").with_pattern(r"\d+\s*min read"),
                        Candidate::css("span.reading-time"),
                    ],
                    ValueRule::Text,
                ),
                field(
                    "claps",
                    vec![
                        Candidate::css(r#"span[data-testid="clapCount"]"#),
                        Candidate::css("span.clap-count"),
                        Candidate::css("button.clap-button"),
                    ],
                    ValueRule::DigitsOr("0".into()),
                ),
                CardField {
                    name: "tags".into(),
                    candidates: vec![Candidate::css("a, div").with_class_containing("tag")],
                    value: ValueRule::Text,
                    collect: true,
                },
            ],
        }
    }

    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Every selector or pattern that will fault at extraction time.
    pub fn problems(&self) -> Vec<CardFault> {
        let mut out = Vec::new();
        if compiled::selector(&self.card).is_none() {
            out.push(CardFault::Selector {
                column: "<card>".into(),
                css: self.card.clone(),
            });
        }
        for field in &self.fields {
            for c in &field.candidates {
                if compiled::selector(&c.css).is_none() {
                    out.push(CardFault::Selector {
                        column: field.name.clone(),
                        css: c.css.clone(),
                    });
                }
                if let Some(p) = &c.text_pattern {
                    if compiled::pattern(p).is_none() {
                        out.push(CardFault::Pattern {
                            column: field.name.clone(),
                            pattern: p.clone(),
                        });
                    }
                }
            }
        }
        out
    }
}

impl Default for CardSchema {
    fn default() -> Self {
        Self::article()
    }
}

/// Rows extracted from one page snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Cards that hit a [`CardFault`] and were padded.
    pub faults: usize,
}

impl CardBatch {
    /// Non-empty cells per column, as `(column, filled, total)`.
    pub fn fill_report(&self) -> Vec<(&str, usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let filled = self.rows.iter().filter(|r| !r[i].is_empty()).count();
                (name.as_str(), filled, self.rows.len())
            })
            .collect()
    }

    pub fn into_result(self) -> SessionResult {
        SessionResult::from_rows(self.columns, self.rows)
    }
}

/// Applies a [`CardSchema`] to page sources.
#[derive(Debug, Clone, Default)]
pub struct CardExtractor {
    schema: CardSchema,
}

impl CardExtractor {
    pub fn new(schema: CardSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &CardSchema {
        &self.schema
    }

    /// Extract one row per card found in `html`.
    pub fn extract(&self, html: &str) -> CardBatch {
        let columns: Vec<String> = self.schema.fields.iter().map(|f| f.name.clone()).collect();
        let doc = Html::parse_document(html);

        let Some(card_sel) = compiled::selector(&self.schema.card) else {
            tracing::warn!(target: "skim.cards", card = %self.schema.card, "invalid card selector");
            return CardBatch {
                columns,
                rows: Vec::new(),
                faults: 0,
            };
        };

        let mut rows = Vec::new();
        let mut faults = 0;
        for card in doc.select(&card_sel) {
            let mut row = Vec::with_capacity(columns.len());
            if let Err(fault) = self.fill_row(&card, &mut row) {
                faults += 1;
                tracing::warn!(target: "skim.cards", %fault, "card extraction failed; padding row");
            }
            row.resize(columns.len(), String::new());
            tracing::debug!(
                target: "skim.cards",
                headline = row.first().map(String::as_str).unwrap_or_default(),
                "card processed"
            );
            rows.push(row);
        }

        CardBatch {
            columns,
            rows,
            faults,
        }
    }

    /// Push cells left to right; on a fault the cells pushed so far stay.
    fn fill_row(&self, card: &ElementRef<'_>, row: &mut Vec<String>) -> Result<(), CardFault> {
        for field in &self.schema.fields {
            let cell = extract_cell(card, field)?;
            row.push(cell);
        }
        Ok(())
    }
}

fn extract_cell(card: &ElementRef<'_>, field: &CardField) -> Result<String, CardFault> {
    for candidate in &field.candidates {
        let matches = find_matches(card, candidate, &field.name)?;
        if matches.is_empty() {
            continue;
        }
        if field.collect {
            let joined = matches
                .iter()
                .map(|el| field.value.apply(el))
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(",");
            return Ok(joined);
        }
        return Ok(field.value.apply(&matches[0]));
    }
    Ok(field.value.missing())
}

fn find_matches<'a>(
    card: &ElementRef<'a>,
    candidate: &Candidate,
    column: &str,
) -> Result<Vec<ElementRef<'a>>, CardFault> {
    let selector = compiled::selector(&candidate.css).ok_or_else(|| CardFault::Selector {
        column: column.to_string(),
        css: candidate.css.clone(),
    })?;
    let pattern: Option<Regex> = match &candidate.text_pattern {
        Some(p) => Some(compiled::pattern(p).ok_or_else(|| CardFault::Pattern {
            column: column.to_string(),
            pattern: p.clone(),
        })?),
        None => None,
    };
    let needle = candidate.class_contains.as_ref().map(|n| n.to_lowercase());

    let found = card
        .select(&selector)
        .filter(|el| {
            let text = own_text(el);
            if let Some(prefix) = &candidate.text_prefix {
                if !text.trim_start().starts_with(prefix.as_str()) {
                    return false;
                }
            }
            if let Some(re) = &pattern {
                if !re.is_match(&text) {
                    return false;
                }
            }
            if let Some(needle) = &needle {
                if !el.value().classes().any(|c| c.to_lowercase().contains(needle)) {
                    return false;
                }
            }
            true
        })
        .collect();
    Ok(found)
}

/// Text nodes directly under `el`; nested elements do not contribute.
fn own_text(el: &ElementRef<'_>) -> String {
    el.children()
        .filter_map(|n| n.value().as_text().map(|t| &**t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTING: &str = r#"<html><body>
        <article>
            <h2>Ownership in practice</h2>
            <div>by Jane Doe</div>
            <time datetime="2024-05-01T10:00:00Z">May 1</time>
            <p class="preview-content">A tour of   borrowing.</p>
            <span>7 min read</span>
            <span data-testid="clapCount">1.2K claps</span>
            <a class="post-tag" href="/t/rust">Rust</a>
            <div class="TagChip">Systems</div>
        </article>
        <article>
            <h3>No byline here</h3>
            <span class="published-date">Apr 2</span>
        </article>
    </body></html>"#;

    #[test]
    fn article_schema_fills_every_column() {
        let batch = CardExtractor::default().extract(LISTING);
        assert_eq!(
            batch.columns,
            vec!["headline", "author", "published", "description", "read_time", "claps", "tags"]
        );
        assert_eq!(
            batch.rows[0],
            vec![
                "Ownership in practice",
                "Jane Doe",
                "2024-05-01T10:00:00Z",
                "A tour of borrowing.",
                "7 min read",
                "12",
                "Rust,Systems",
            ]
        );
    }

    #[test]
    fn missing_author_is_empty_and_row_keeps_shape() {
        let batch = CardExtractor::default().extract(LISTING);
        let second = &batch.rows[1];
        assert_eq!(second.len(), batch.rows[0].len());
        assert_eq!(second[0], "No byline here");
        assert_eq!(second[1], "");
        assert_eq!(second[2], "Apr 2");
        assert_eq!(second[5], "0");
        assert_eq!(second[6], "");
    }

    #[test]
    fn text_filters_ignore_wrapping_elements() {
        let html = r#"<article><div><div>by Jane Doe</div><h2>Ownership</h2>
            <span><span>Jan 5</span> <span>7 min read</span></span></div></article>"#;
        let batch = CardExtractor::default().extract(html);
        let row = &batch.rows[0];
        assert_eq!(row[0], "Ownership");
        assert_eq!(row[1], "Jane Doe");
        assert_eq!(row[4], "7 min read");
    }

    #[test]
    fn first_found_candidate_wins_even_when_empty() {
        let html = "<article><h2></h2><h3>Fallback</h3></article>";
        let batch = CardExtractor::default().extract(html);
        assert_eq!(batch.rows[0][0], "");
    }

    #[test]
    fn fault_pads_remaining_columns_and_batch_continues() {
        let schema = CardSchema {
            card: "li".into(),
            fields: vec![
                CardField {
                    name: "title".into(),
                    candidates: vec![Candidate::css("b")],
                    value: ValueRule::Text,
                    collect: false,
                },
                CardField {
                    name: "broken".into(),
                    candidates: vec![Candidate::css("[[[")],
                    value: ValueRule::Text,
                    collect: false,
                },
                CardField {
                    name: "count".into(),
                    candidates: vec![Candidate::css("i")],
                    value: ValueRule::DigitsOr("0".into()),
                    collect: false,
                },
            ],
        };
        assert_eq!(schema.problems().len(), 1);

        let html = "<ul><li><b>one</b><i>3</i></li><li><b>two</b></li></ul>";
        let batch = CardExtractor::new(schema).extract(html);
        assert_eq!(batch.faults, 2);
        assert_eq!(batch.rows, vec![vec!["one", "", ""], vec!["two", "", ""]]);
    }

    #[test]
    fn fill_report_counts_non_empty_cells() {
        let batch = CardExtractor::default().extract(LISTING);
        let report = batch.fill_report();
        assert_eq!(report[0], ("headline", 2, 2));
        assert_eq!(report[1], ("author", 1, 2));
    }

    #[test]
    fn no_cards_yields_empty_batch() {
        let batch = CardExtractor::default().extract("<html><body><p>nothing</p></body></html>");
        assert!(batch.rows.is_empty());
        assert_eq!(batch.columns.len(), 7);
    }

    #[test]
    fn schema_round_trips_through_serde() {
        let json = serde_json::json!({
            "card": "div.result",
            "fields": [
                { "name": "title", "candidates": [{ "css": "h2" }] },
                { "name": "when", "candidates": [{ "css": "time" }], "value": { "attr_or_text": "datetime" } },
                { "name": "votes", "candidates": [{ "css": ".votes" }], "value": { "digits_or": "0" } }
            ]
        });
        let schema: CardSchema = serde_json::from_value(json).unwrap();
        assert_eq!(schema.columns(), vec!["title", "when", "votes"]);
        assert_eq!(schema.fields[1].value, ValueRule::AttrOrText("datetime".into()));
        assert!(schema.problems().is_empty());
    }
}
