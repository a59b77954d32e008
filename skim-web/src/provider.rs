use std::time::Duration;

use async_trait::async_trait;
use skim_drivers::skim_browser::page::{Element, SkimPage};

/// Failures reported by a [`PageProvider`]. None of them end a session on
/// their own; callers decide whether to skip, fall back or stop.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page source unavailable: {0}")]
    Source(String),

    #[error("script failed: {0}")]
    Script(String),

    #[error("click failed: {0}")]
    Click(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// How a link is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMode {
    /// `element.click()` run inside the page.
    Scripted,
    /// A WebDriver-level click.
    Native,
}

/// A rendered page the extraction engine can read, scroll and navigate.
///
/// Implementations hold one page view at a time; every method acts on that
/// view. `pause` is the only source of waiting so tests can skip it.
#[async_trait]
pub trait PageProvider: Send {
    /// Handle to a clickable element found on the current view.
    type Link: Send + Sync;

    async fn current_url(&mut self) -> ProviderResult<String>;

    /// Serialized DOM of the current view.
    async fn current_dom(&mut self) -> ProviderResult<String>;

    async fn navigate(&mut self, url: &str) -> ProviderResult<()>;

    async fn scroll_to(&mut self, y: u64) -> ProviderResult<()>;

    async fn scroll_to_bottom(&mut self) -> ProviderResult<()>;

    async fn scroll_offset(&mut self) -> ProviderResult<u64>;

    async fn viewport_height(&mut self) -> ProviderResult<u64>;

    async fn document_height(&mut self) -> ProviderResult<u64>;

    /// A displayed, enabled anchor whose visible text is exactly `text`.
    async fn find_link_by_text(&mut self, text: &str) -> ProviderResult<Option<Self::Link>>;

    /// A displayed, enabled tab-like control whose visible text is exactly
    /// `text`. Defaults to anchors only.
    async fn find_tab_by_text(&mut self, text: &str) -> ProviderResult<Option<Self::Link>> {
        self.find_link_by_text(text).await
    }

    async fn click(&mut self, link: &Self::Link, mode: ClickMode) -> ProviderResult<()>;

    async fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// blake3 hex digest of a page source, used to detect unchanged pages.
pub fn fingerprint(source: &str) -> String {
    blake3::hash(source.as_bytes()).to_hex().to_string()
}

/// [`PageProvider`] over a live WebDriver session.
pub struct BrowserProvider {
    page: SkimPage,
}

impl BrowserProvider {
    pub fn new(page: SkimPage) -> Self {
        Self { page }
    }
}

fn script_err(e: anyhow::Error) -> ProviderError {
    ProviderError::Script(format!("{e:#}"))
}

#[async_trait]
impl PageProvider for BrowserProvider {
    type Link = Element;

    async fn current_url(&mut self) -> ProviderResult<String> {
        self.page
            .get_url()
            .await
            .map_err(|e| ProviderError::Navigation(format!("{e:#}")))
    }

    async fn current_dom(&mut self) -> ProviderResult<String> {
        self.page
            .get_content()
            .await
            .map_err(|e| ProviderError::Source(format!("{e:#}")))
    }

    async fn navigate(&mut self, url: &str) -> ProviderResult<()> {
        tracing::debug!(target: "skim.browser", %url, "navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| ProviderError::Navigation(format!("{url}: {e:#}")))
    }

    async fn scroll_to(&mut self, y: u64) -> ProviderResult<()> {
        self.page.scroll_to(y).await.map_err(script_err)
    }

    async fn scroll_to_bottom(&mut self) -> ProviderResult<()> {
        self.page.scroll_to_bottom().await.map_err(script_err)
    }

    async fn scroll_offset(&mut self) -> ProviderResult<u64> {
        self.page.scroll_offset().await.map_err(script_err)
    }

    async fn viewport_height(&mut self) -> ProviderResult<u64> {
        self.page.viewport_height().await.map_err(script_err)
    }

    async fn document_height(&mut self) -> ProviderResult<u64> {
        self.page.document_height().await.map_err(script_err)
    }

    async fn find_link_by_text(&mut self, text: &str) -> ProviderResult<Option<Element>> {
        self.page.find_link_by_text(text).await.map_err(script_err)
    }

    async fn find_tab_by_text(&mut self, text: &str) -> ProviderResult<Option<Element>> {
        self.page.find_tab_by_text(text).await.map_err(script_err)
    }

    async fn click(&mut self, link: &Element, mode: ClickMode) -> ProviderResult<()> {
        let res = match mode {
            ClickMode::Scripted => self.page.click_scripted(link).await,
            ClickMode::Native => self.page.click_native(link).await,
        };
        res.map_err(|e| ProviderError::Click(format!("{mode:?}: {e:#}")))
    }
}
