//! Heuristic extraction over static HTML snapshots.
//!
//! Nothing in this crate touches a browser or the network: callers hand in a
//! page source and get owned strings back, so parsed documents never live
//! across an `.await`.
//!
//! - [`keywords`]: field name to synonym family
//! - [`matcher`]: keyword-driven element discovery for generic pages
//! - [`normalize`]: whitespace and length cleanup, value dedup
//! - [`accumulator`]: cross-page value collection and the final table
//! - [`cards`]: schema-driven, one-row-per-card extraction
//!
//! ```
//! use skim_extract::{extract_fields, parse_field_list};
//!
//! let html = r#"<div class="headline">Rust 2.0</div><time>6h ago</time>"#;
//! let page = extract_fields(html, &parse_field_list("title,date"));
//! assert_eq!(page.values[0].1, vec!["Rust 2.0"]);
//! assert_eq!(page.values[1].1, vec!["6h ago"]);
//! ```

pub mod accumulator;
pub mod cards;
pub mod compiled;
pub mod keywords;
pub mod matcher;
pub mod normalize;

pub use accumulator::{
    parse_field_list, ExtractedValue, FieldAccumulator, FieldRequest, SessionResult,
};
pub use cards::{CardBatch, CardExtractor, CardFault, CardSchema};
pub use keywords::{expand, KeywordSet};
pub use matcher::{extract_fields, PageExtraction};
pub use normalize::clean;
