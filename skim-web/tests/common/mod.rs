#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use skim_common::observability::{LogConfig, LogFormat};
use skim_web::provider::{ClickMode, PageProvider, ProviderError, ProviderResult};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "skim-tests",
            log_dir: Some(std::env::temp_dir().join("skim-tests")),
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "debug".to_string(),
        };
        skim_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Deterministic in-memory site.
///
/// Pages are looked up by URL. Navigating to an unknown URL fails unless
/// `fallback_html` is set. Links map visible text to a target URL. When
/// `snapshots` is non-empty, `current_dom` ignores the URL and returns the
/// snapshots in order, repeating the last one.
#[derive(Default)]
pub struct StubProvider {
    pub url: String,
    pub pages: HashMap<String, String>,
    pub fallback_html: Option<String>,
    pub links: HashMap<String, String>,
    pub snapshots: Vec<String>,
    pub dom_reads: usize,
    pub heights: Vec<u64>,
    pub height_reads: usize,
    pub viewport: u64,
    pub offset: u64,
    pub fail_scripted_clicks: bool,
    pub fail_dom: bool,

    pub navigations: Vec<String>,
    pub clicks: Vec<(String, ClickMode)>,
    pub scroll_positions: Vec<u64>,
    pub bottom_scrolls: usize,
    pub paused: Duration,
}

impl StubProvider {
    pub fn site(start: &str, pages: &[(&str, &str)]) -> Self {
        Self {
            url: start.to_string(),
            pages: pages
                .iter()
                .map(|(u, h)| (u.to_string(), h.to_string()))
                .collect(),
            heights: vec![1000],
            viewport: 800,
            ..Self::default()
        }
    }

    pub fn with_link(mut self, text: &str, target: &str) -> Self {
        self.links.insert(text.to_string(), target.to_string());
        self
    }

    pub fn with_snapshots(mut self, snapshots: Vec<String>) -> Self {
        self.snapshots = snapshots;
        self
    }
}

#[async_trait]
impl PageProvider for StubProvider {
    type Link = String;

    async fn current_url(&mut self) -> ProviderResult<String> {
        Ok(self.url.clone())
    }

    async fn current_dom(&mut self) -> ProviderResult<String> {
        if self.fail_dom {
            return Err(ProviderError::Source("stub source failure".into()));
        }
        if !self.snapshots.is_empty() {
            let idx = self.dom_reads.min(self.snapshots.len() - 1);
            self.dom_reads += 1;
            return Ok(self.snapshots[idx].clone());
        }
        self.dom_reads += 1;
        self.pages
            .get(&self.url)
            .cloned()
            .or_else(|| self.fallback_html.clone())
            .ok_or_else(|| ProviderError::Source(format!("no page at {}", self.url)))
    }

    async fn navigate(&mut self, url: &str) -> ProviderResult<()> {
        self.navigations.push(url.to_string());
        if self.pages.contains_key(url) || self.fallback_html.is_some() {
            self.url = url.to_string();
            self.offset = 0;
            Ok(())
        } else {
            Err(ProviderError::Navigation(format!("404 {url}")))
        }
    }

    async fn scroll_to(&mut self, y: u64) -> ProviderResult<()> {
        self.scroll_positions.push(y);
        self.offset = y;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> ProviderResult<()> {
        self.bottom_scrolls += 1;
        Ok(())
    }

    async fn scroll_offset(&mut self) -> ProviderResult<u64> {
        Ok(self.offset)
    }

    async fn viewport_height(&mut self) -> ProviderResult<u64> {
        Ok(self.viewport)
    }

    async fn document_height(&mut self) -> ProviderResult<u64> {
        let idx = self.height_reads.min(self.heights.len().saturating_sub(1));
        self.height_reads += 1;
        Ok(self.heights.get(idx).copied().unwrap_or(0))
    }

    async fn find_link_by_text(&mut self, text: &str) -> ProviderResult<Option<String>> {
        Ok(self.links.get(text).cloned())
    }

    async fn click(&mut self, link: &String, mode: ClickMode) -> ProviderResult<()> {
        self.clicks.push((link.clone(), mode));
        if mode == ClickMode::Scripted && self.fail_scripted_clicks {
            return Err(ProviderError::Click("scripted click blocked".into()));
        }
        self.url = link.clone();
        Ok(())
    }

    async fn pause(&mut self, duration: Duration) {
        self.paused += duration;
    }
}
