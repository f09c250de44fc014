//! Remote log fetcher: one page in, aggregates updated

use super::aggregates::LogAggregates;
use super::error::IngestError;
use crate::game::{GameApi, LogPage, Timestamp};

/// What a processed page tells the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutcome {
    /// Whether an older page should be fetched next
    pub has_next: bool,
    /// Newest timestamp seen so far in this run
    pub newest: Timestamp,
    /// Entries folded into the aggregates
    pub processed: usize,
}

/// Fold a page into `aggregates`
///
/// `watermark` is the `newestSeen` value stored before the run started.
/// Processing stops at the first entry at or before it; entries earlier in
/// the page are still counted, and no further page is requested.
pub fn apply_page(
    page: &LogPage,
    watermark: Timestamp,
    newest: Timestamp,
    aggregates: &mut LogAggregates,
) -> PageOutcome {
    let mut newest = newest;
    let mut processed = 0;
    let mut reached_seen = false;

    for (i, entry) in page.entries.iter().enumerate() {
        if entry.date <= watermark {
            reached_seen = true;
            break;
        }
        if i == 0 && entry.date > newest {
            newest = entry.date;
        }
        aggregates.apply(entry);
        processed += 1;
    }

    PageOutcome {
        has_next: !reached_seen && page.has_next,
        newest,
        processed,
    }
}

/// Fetch page `page` of `event_key` and fold it into `aggregates`
pub async fn fetch_page(
    api: &dyn GameApi,
    event_key: &str,
    page: u32,
    page_size: u32,
    watermark: Timestamp,
    newest: Timestamp,
    aggregates: &mut LogAggregates,
) -> Result<PageOutcome, IngestError> {
    let log_page = api
        .fetch_log_page(event_key, page, page_size)
        .await
        .map_err(|source| IngestError::Remote { page, source })?;

    let outcome = apply_page(&log_page, watermark, newest, aggregates);
    tracing::debug!(
        "Log page {}: {} of {} entries new, has_next={}",
        page,
        outcome.processed,
        log_page.entries.len(),
        outcome.has_next
    );
    Ok(outcome)
}
