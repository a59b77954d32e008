//! Deciding whether more content exists and moving the provider to it.
//!
//! Generic listings advance by rewriting the page number in the URL and fall
//! back to clicking numbered links. Infinite-scroll listings advance one
//! viewport at a time until a pass yields no new records. Running out of
//! pages is a normal outcome: [`PaginationController::advance`] returns
//! `false` and never an error.

use std::time::Duration;

use regex::Regex;
use skim_config::{PaginationConfig, ScrollConfig, SessionConfig};
use skim_drivers::skim_browser::behavioral::BehavioralEngine;
use tracing::{debug, info, warn};

use crate::provider::{fingerprint, ClickMode, PageProvider, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    Start,
    UrlParam,
    Link,
    Scroll,
    Exhausted,
}

/// The URL of the next page: `param` incremented when present (set to 2
/// when its value is not a number), otherwise `param=2` added.
///
/// Fragment-routed URLs (`#/?...`) carry the parameter inside the fragment.
///
/// ```
/// use skim_web::pagination::next_page_url;
///
/// assert_eq!(next_page_url("https://a.test/list", "page"), "https://a.test/list?page=2");
/// assert_eq!(next_page_url("https://a.test/list?page=4&q=x", "page"), "https://a.test/list?page=5&q=x");
/// assert_eq!(
///     next_page_url("https://example.com/#/?topic=x", "page"),
///     "https://example.com/#/?page=2&topic=x"
/// );
/// ```
pub fn next_page_url(url: &str, param: &str) -> String {
    let pattern = format!(r"([?&]){}=([^&#]*)", regex::escape(param));
    if let Ok(re) = Regex::new(&pattern) {
        if let Some(caps) = re.captures(url) {
            let next = caps[2].parse::<u64>().map(|n| n + 1).unwrap_or(2);
            let replacement = format!("{}{param}={next}", &caps[1]);
            return re.replacen(url, 1, regex::NoExpand(&replacement)).into_owned();
        }
    }

    if url.contains("#/?") {
        return url.replacen("#/?", &format!("#/?{param}=2&"), 1);
    }

    let (base, fragment) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{param}=2{fragment}")
}

pub struct PaginationController {
    mode: PaginationMode,
    page_param: String,
    link_window: u32,
    verify_progress: bool,
    navigation_pause: Duration,
    scroll: ScrollConfig,
    scrolls: u32,
    current_page: u32,
    behavioral: BehavioralEngine,
}

impl PaginationController {
    /// Controller for numbered listings, starting on page 1.
    pub fn new(pagination: &PaginationConfig, session: &SessionConfig) -> Self {
        Self {
            mode: PaginationMode::Start,
            page_param: pagination.page_param.clone(),
            link_window: pagination.link_window,
            verify_progress: pagination.verify_progress,
            navigation_pause: session.navigation_pause(),
            scroll: ScrollConfig::default(),
            scrolls: 0,
            current_page: 1,
            behavioral: BehavioralEngine::new(),
        }
    }

    /// Controller for infinite-scroll listings.
    pub fn scrolling(scroll: &ScrollConfig) -> Self {
        Self {
            mode: PaginationMode::Scroll,
            page_param: PaginationConfig::default().page_param,
            link_window: 0,
            verify_progress: false,
            navigation_pause: Duration::ZERO,
            scroll: scroll.clone(),
            scrolls: 0,
            current_page: 1,
            behavioral: BehavioralEngine::new(),
        }
    }

    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    /// Page number the provider is believed to show.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Scroll passes performed so far.
    pub fn scrolls(&self) -> u32 {
        self.scrolls
    }

    /// Move to the next page. `false` means there is nothing more to read.
    ///
    /// In scroll mode this performs one pass without a new-record check;
    /// use [`advance_scroll`](Self::advance_scroll) to feed that signal.
    pub async fn advance<P>(&mut self, provider: &mut P) -> bool
    where
        P: PageProvider + ?Sized,
    {
        match self.mode {
            PaginationMode::Exhausted => false,
            PaginationMode::Start | PaginationMode::UrlParam => self.advance_by_url(provider).await,
            PaginationMode::Link => self.advance_by_link(provider).await,
            PaginationMode::Scroll => self.scroll_pass(provider).await,
        }
    }

    /// Scroll one viewport further if the last pass produced `new_records`.
    pub async fn advance_scroll<P>(&mut self, provider: &mut P, new_records: usize) -> bool
    where
        P: PageProvider + ?Sized,
    {
        if self.mode == PaginationMode::Exhausted {
            return false;
        }
        self.mode = PaginationMode::Scroll;
        if new_records == 0 {
            info!(target: "skim.pagination", scrolls = self.scrolls, "no new records after scroll");
            self.mode = PaginationMode::Exhausted;
            return false;
        }
        self.scroll_pass(provider).await
    }

    async fn advance_by_url<P>(&mut self, provider: &mut P) -> bool
    where
        P: PageProvider + ?Sized,
    {
        let before = if self.verify_progress {
            provider.current_dom().await.ok().map(|dom| fingerprint(&dom))
        } else {
            None
        };

        let url = match provider.current_url().await {
            Ok(url) => url,
            Err(e) => {
                warn!(target: "skim.pagination", error = %e, "current url unavailable; trying links");
                return self.advance_by_link(provider).await;
            }
        };
        let next = next_page_url(&url, &self.page_param);
        info!(target: "skim.pagination", from = %url, to = %next, "advancing by url");

        if let Err(e) = provider.navigate(&next).await {
            warn!(target: "skim.pagination", error = %e, "url navigation failed; trying links");
            return self.advance_by_link(provider).await;
        }
        provider.pause(self.navigation_pause).await;

        if let Some(before) = before {
            if let Ok(after) = provider.current_dom().await {
                if fingerprint(&after) == before {
                    warn!(target: "skim.pagination", url = %next, "page unchanged after url change; trying links");
                    return self.advance_by_link(provider).await;
                }
            }
        }

        self.mode = PaginationMode::UrlParam;
        self.current_page += 1;
        true
    }

    async fn advance_by_link<P>(&mut self, provider: &mut P) -> bool
    where
        P: PageProvider + ?Sized,
    {
        let first = self.current_page + 1;
        let last = self.current_page + self.link_window;
        for n in first..=last {
            let text = n.to_string();
            let link = match provider.find_link_by_text(&text).await {
                Ok(Some(link)) => link,
                Ok(None) => continue,
                Err(e) => {
                    debug!(target: "skim.pagination", page = n, error = %e, "link lookup failed");
                    continue;
                }
            };
            for mode in [ClickMode::Scripted, ClickMode::Native] {
                match provider.click(&link, mode).await {
                    Ok(()) => {
                        provider.pause(self.navigation_pause).await;
                        info!(target: "skim.pagination", page = n, ?mode, "advanced by link");
                        self.mode = PaginationMode::Link;
                        self.current_page = n;
                        return true;
                    }
                    Err(e) => {
                        debug!(target: "skim.pagination", page = n, ?mode, error = %e, "click failed")
                    }
                }
            }
        }
        info!(target: "skim.pagination", page = self.current_page, "no further pages");
        self.mode = PaginationMode::Exhausted;
        false
    }

    async fn scroll_pass<P>(&mut self, provider: &mut P) -> bool
    where
        P: PageProvider + ?Sized,
    {
        if self.scrolls >= self.scroll.max_scrolls {
            info!(target: "skim.pagination", max = self.scroll.max_scrolls, "scroll ceiling reached");
            self.mode = PaginationMode::Exhausted;
            return false;
        }
        self.scrolls += 1;
        if let Err(e) = self.smooth_scroll(provider).await {
            warn!(target: "skim.pagination", error = %e, "scroll failed");
        }
        let pass_pause = self
            .behavioral
            .pick_delay(self.scroll.pass_pause_min_ms, self.scroll.pass_pause_max_ms);
        provider.pause(pass_pause).await;
        true
    }

    /// Move down one viewport in `step_divisor` steps, never past the last
    /// full viewport of the document.
    async fn smooth_scroll<P>(&mut self, provider: &mut P) -> ProviderResult<()>
    where
        P: PageProvider + ?Sized,
    {
        let viewport = provider.viewport_height().await?;
        let document = provider.document_height().await?;
        let mut position = provider.scroll_offset().await?;

        let step = (viewport / u64::from(self.scroll.step_divisor.max(1))).max(1);
        let target = (position + viewport).min(document.saturating_sub(viewport));
        while position < target {
            position = (position + step).min(target);
            provider.scroll_to(position).await?;
            let pause = self
                .behavioral
                .pick_delay(self.scroll.step_pause_min_ms, self.scroll.step_pause_max_ms);
            provider.pause(pause).await;
        }
        Ok(())
    }
}
