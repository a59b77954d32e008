//! Driver layer for browser automation.
//!
//! This crate owns the WebDriver session and the small set of page
//! operations the pagination and extraction layers need.
//!
//! - [`skim_browser::driver::SkimDriver`]: WebDriver client wrapper
//! - [`skim_browser::page::SkimPage`]: navigation, source, scrolling and link clicks
//! - [`skim_browser::behavioral::BehavioralEngine`]: randomised human-like pauses
pub mod skim_browser;
