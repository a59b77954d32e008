//! Process-wide caches for CSS selectors and regex patterns.
//!
//! Card schemas may come from user configuration, so selectors and patterns
//! are compiled on first use. Invalid entries are cached as `None` and
//! reported by the caller.

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use regex::Regex;
use scraper::Selector;

static SELECTOR_CACHE: LazyLock<RwLock<HashMap<String, Option<Selector>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

static PATTERN_CACHE: LazyLock<RwLock<HashMap<String, Option<Regex>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Get or compile a CSS selector. `None` means the selector is invalid.
pub fn selector(css: &str) -> Option<Selector> {
    lookup(&SELECTOR_CACHE, css, |s| Selector::parse(s).ok())
}

/// Get or compile a regex pattern. `None` means the pattern is invalid.
pub fn pattern(re: &str) -> Option<Regex> {
    lookup(&PATTERN_CACHE, re, |s| Regex::new(s).ok())
}

fn lookup<T: Clone>(
    cache: &RwLock<HashMap<String, Option<T>>>,
    key: &str,
    compile: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    {
        let read = cache.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = read.get(key) {
            return cached.clone();
        }
    }

    let compiled = compile(key);
    let mut write = cache.write().unwrap_or_else(PoisonError::into_inner);
    write
        .entry(key.to_string())
        .or_insert_with(|| compiled.clone());
    compiled
}
