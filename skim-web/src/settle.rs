//! Waiting for lazily loaded content before a snapshot.

use std::time::Duration;

use crate::provider::{PageProvider, ProviderResult};

/// How a settle run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOutcome {
    /// Scrolls that made the document grow.
    pub growths: u32,
    pub final_height: u64,
    /// `false` when the attempt bound stopped a still-growing page.
    pub converged: bool,
}

/// Scroll to the bottom until the document height stops growing, at most
/// `max_attempts` growth rounds.
pub async fn settle<P>(
    provider: &mut P,
    max_attempts: u32,
    pause: Duration,
) -> ProviderResult<SettleOutcome>
where
    P: PageProvider + ?Sized,
{
    let mut last = provider.document_height().await?;
    let mut growths = 0;
    while growths < max_attempts {
        provider.scroll_to_bottom().await?;
        provider.pause(pause).await;
        let height = provider.document_height().await?;
        if height == last {
            return Ok(SettleOutcome {
                growths,
                final_height: height,
                converged: true,
            });
        }
        tracing::debug!(target: "skim.settle", from = last, to = height, "document grew");
        last = height;
        growths += 1;
    }
    Ok(SettleOutcome {
        growths,
        final_height: last,
        converged: false,
    })
}
