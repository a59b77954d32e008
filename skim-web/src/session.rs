//! The page-by-page field extraction loop.

use serde::Serialize;
use skim_config::{PaginationConfig, SessionConfig};
use skim_extract::{extract_fields, ExtractedValue, FieldAccumulator, FieldRequest, SessionResult};
use tracing::{info, info_span, warn, Instrument};

use crate::pagination::PaginationController;
use crate::provider::{fingerprint, PageProvider};
use crate::settle::settle;

/// Where the provider was when a page was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub url: String,
    pub scroll_offset: u64,
    /// 1-based.
    pub page_index: u32,
    /// blake3 hex of the snapshot; empty when the snapshot failed.
    pub fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub result: SessionResult,
    /// Every accumulated value with the page it was first seen on.
    pub values: Vec<(FieldRequest, Vec<ExtractedValue>)>,
    pub pages: u32,
    pub last_page: Option<PageState>,
}

/// Extracts free-form fields from a listing, page after page, until the
/// listing runs out or `max_pages` pages have been read.
pub struct FieldSession {
    fields: Vec<FieldRequest>,
    session: SessionConfig,
    controller: PaginationController,
}

impl FieldSession {
    pub fn new(
        fields: Vec<FieldRequest>,
        session: &SessionConfig,
        pagination: &PaginationConfig,
    ) -> Self {
        Self {
            controller: PaginationController::new(pagination, session),
            session: session.clone(),
            fields,
        }
    }

    /// Run against whatever page `provider` currently shows.
    pub async fn run<P>(mut self, provider: &mut P) -> SessionReport
    where
        P: PageProvider + ?Sized,
    {
        let mut acc = FieldAccumulator::new(&self.fields);
        let mut last_page = None;
        let mut pages = 0;

        for index in 1..=self.session.max_pages {
            let span = info_span!(target: "skim.session", "page", index);
            let state = self
                .process_page(provider, index, &mut acc)
                .instrument(span)
                .await;
            pages = index;
            last_page = Some(state);

            if index == self.session.max_pages {
                info!(target: "skim.session", max_pages = index, "page cap reached");
                break;
            }
            if !self.controller.advance(provider).await {
                info!(target: "skim.session", pages, "listing exhausted");
                break;
            }
            provider.pause(self.session.between_pages_pause()).await;
        }

        info!(target: "skim.session", pages, values = acc.total(), "session finished");
        let values = acc
            .fields()
            .map(|f| (f.clone(), acc.values(f).to_vec()))
            .collect();
        SessionReport {
            result: acc.finalize(),
            values,
            pages,
            last_page,
        }
    }

    async fn process_page<P>(
        &self,
        provider: &mut P,
        index: u32,
        acc: &mut FieldAccumulator,
    ) -> PageState
    where
        P: PageProvider + ?Sized,
    {
        match settle(
            provider,
            self.session.max_settle_attempts,
            self.session.settle_pause(),
        )
        .await
        {
            Ok(outcome) if !outcome.converged => {
                warn!(target: "skim.session", growths = outcome.growths, "page still growing; snapshotting anyway")
            }
            Ok(_) => {}
            Err(e) => warn!(target: "skim.session", error = %e, "settle failed"),
        }

        let fingerprint = match provider.current_dom().await {
            Ok(html) => {
                let page = extract_fields(&html, &self.fields);
                for (field, values) in page.values {
                    let found = values.len();
                    let added = acc.append(&field, index, values);
                    info!(target: "skim.session", %field, found, added, "field extracted");
                }
                fingerprint(&html)
            }
            Err(e) => {
                warn!(target: "skim.session", error = %e, "snapshot failed; skipping page");
                String::new()
            }
        };

        PageState {
            url: provider.current_url().await.unwrap_or_default(),
            scroll_offset: provider.scroll_offset().await.unwrap_or_default(),
            page_index: index,
            fingerprint,
        }
    }
}
