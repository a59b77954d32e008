//! Topic searches over infinite-scroll listings, one CSV per topic.

use std::path::{Path, PathBuf};

use skim_config::{CardsConfig, ScrollConfig, SessionConfig};
use skim_extract::{CardExtractor, SessionResult};
use tracing::{error, info, info_span, warn, Instrument};
use url::Url;

use crate::output::write_csv;
use crate::pagination::PaginationController;
use crate::provider::{ClickMode, PageProvider, ProviderError, ProviderResult};

/// Split a comma-separated topic list, dropping blanks.
pub fn split_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Search URL for `topic`, e.g. `https://medium.com/search?q=rust%20async`.
pub fn search_url(base: &str, param: &str, topic: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair(param, topic);
    Ok(url.to_string())
}

/// `<prefix>_<topic>.csv` with spaces in the topic turned into underscores.
pub fn topic_file_name(prefix: &str, topic: &str) -> String {
    format!("{prefix}_{}.csv", topic.replace(' ', "_"))
}

/// What happened to one topic.
#[derive(Debug)]
pub struct TopicOutcome {
    pub topic: String,
    pub rows: usize,
    /// Set when a file was written.
    pub path: Option<PathBuf>,
    pub error: Option<String>,
}

pub struct CardSession {
    extractor: CardExtractor,
    cards: CardsConfig,
    session: SessionConfig,
    scroll: ScrollConfig,
}

impl CardSession {
    pub fn new(cards: &CardsConfig, session: &SessionConfig, scroll: &ScrollConfig) -> Self {
        Self {
            extractor: CardExtractor::new(cards.schema()),
            cards: cards.clone(),
            session: session.clone(),
            scroll: scroll.clone(),
        }
    }

    /// Run every topic in turn, writing `<prefix>_<topic>.csv` under `dir`.
    /// A failing topic is recorded and the next one still runs.
    pub async fn run_topics<P>(
        &self,
        provider: &mut P,
        topics: &[String],
        dir: &Path,
        prefix: &str,
    ) -> Vec<TopicOutcome>
    where
        P: PageProvider + ?Sized,
    {
        let mut outcomes = Vec::with_capacity(topics.len());
        for topic in topics {
            let span = info_span!(target: "skim.cards", "topic", %topic);
            let outcome = async {
                let result = match self.run_topic(provider, topic).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(target: "skim.cards", error = %e, "topic failed");
                        return TopicOutcome {
                            topic: topic.clone(),
                            rows: 0,
                            path: None,
                            error: Some(e.to_string()),
                        };
                    }
                };
                let path = dir.join(topic_file_name(prefix, topic));
                match write_csv(&result, &path) {
                    Ok(written) => TopicOutcome {
                        topic: topic.clone(),
                        rows: result.len(),
                        path: written.then_some(path),
                        error: None,
                    },
                    Err(e) => {
                        error!(target: "skim.cards", error = %e, "saving topic failed");
                        TopicOutcome {
                            topic: topic.clone(),
                            rows: result.len(),
                            path: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
            .instrument(span)
            .await;
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Search for `topic` and collect cards until scrolling stops producing
    /// new ones.
    pub async fn run_topic<P>(&self, provider: &mut P, topic: &str) -> ProviderResult<SessionResult>
    where
        P: PageProvider + ?Sized,
    {
        let url = search_url(&self.cards.search_url, &self.cards.search_param, topic)
            .map_err(|e| ProviderError::Navigation(format!("{}: {e}", self.cards.search_url)))?;
        info!(target: "skim.cards", %url, "opening search");
        provider.navigate(&url).await?;
        provider.pause(self.session.initial_load_pause()).await;

        if let Some(tab) = &self.cards.tab_text {
            self.open_tab(provider, tab).await;
        }

        let columns: Vec<String> = self
            .extractor
            .schema()
            .columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut controller = PaginationController::scrolling(&self.scroll);

        loop {
            let html = match provider.current_dom().await {
                Ok(html) => html,
                Err(e) => {
                    warn!(target: "skim.cards", error = %e, "snapshot failed; keeping rows so far");
                    break;
                }
            };
            let batch = self.extractor.extract(&html);
            for (column, filled, total) in batch.fill_report() {
                tracing::debug!(target: "skim.cards", column, filled, total, "column fill");
            }
            let before = rows.len();
            rows.extend(batch.rows.into_iter().skip(before));
            let added = rows.len() - before;
            info!(target: "skim.cards", scroll = controller.scrolls(), added, total = rows.len(), "cards collected");

            if !controller.advance_scroll(provider, added).await {
                break;
            }
        }

        Ok(SessionResult::from_rows(columns, rows))
    }

    async fn open_tab<P>(&self, provider: &mut P, tab: &str)
    where
        P: PageProvider + ?Sized,
    {
        match provider.find_tab_by_text(tab).await {
            Ok(Some(link)) => match provider.click(&link, ClickMode::Native).await {
                Ok(()) => provider.pause(self.session.navigation_pause()).await,
                Err(e) => warn!(target: "skim.cards", %tab, error = %e, "tab click failed; continuing"),
            },
            Ok(None) => info!(target: "skim.cards", %tab, "tab not found; continuing"),
            Err(e) => warn!(target: "skim.cards", %tab, error = %e, "tab lookup failed; continuing"),
        }
    }
}
