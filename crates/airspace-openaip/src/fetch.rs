//! Sequential paginated fetch loop.

use std::time::Duration;

use airspace_core::RawAirspaceRecord;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backoff::Backoff;
use crate::client::{PageReply, PageSource};
use crate::error::FetchError;
use crate::query::AirspaceQuery;
use crate::rate_limit::RateLimiter;

/// Pacing and retry settings for [`fetch_all_pages`].
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Minimum spacing between two page requests
    pub page_interval: Duration,
    pub initial_backoff: Duration,
    /// Retrying stops once the next backoff delay would exceed this
    pub backoff_ceiling: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            page_interval: Duration::from_millis(10),
            initial_backoff: Duration::from_millis(10),
            backoff_ceiling: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Records of every fetched page, in page order
    pub records: Vec<RawAirspaceRecord>,
    pub pages_fetched: u32,
    /// Last page count reported by the server
    pub total_pages: u32,
    /// False when retries ran out before the last page
    pub complete: bool,
}

/// Fetches pages 1..=total in order, one request at a time.
///
/// A non-2xx reply retries the same page after the backoff delay. When the
/// backoff gives up, the pages gathered so far are returned with
/// `complete = false`. Transport failures and cancellation are errors.
pub async fn fetch_all_pages<S: PageSource>(
    source: &S,
    query: &AirspaceQuery,
    policy: &FetchPolicy,
    cancel: &CancellationToken,
) -> Result<FetchOutcome, FetchError> {
    let mut limiter = RateLimiter::new(policy.page_interval);
    let mut backoff = Backoff::new(policy.initial_backoff, policy.backoff_ceiling);
    let mut outcome = FetchOutcome {
        records: Vec::new(),
        pages_fetched: 0,
        total_pages: 1,
        complete: true,
    };
    let mut page = 1;

    while page <= outcome.total_pages {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            _ = limiter.wait() => {}
        }

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            reply = source.fetch_page(query, page) => reply?,
        };

        match reply {
            PageReply::Page(data) => {
                outcome.total_pages = data.total_pages;
                outcome.records.extend(data.items);
                outcome.pages_fetched += 1;
                page += 1;
                backoff.reset();
            }
            PageReply::Status(status) => match backoff.fail() {
                Some(delay) => {
                    warn!(
                        "Airspace page {} failed with HTTP {}; retrying in {:?}",
                        page, status, delay
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None => {
                    warn!(
                        "Giving up on airspace page {} after {} failures; returning {} of {} pages",
                        page,
                        backoff.failures(),
                        outcome.pages_fetched,
                        outcome.total_pages
                    );
                    outcome.complete = false;
                    return Ok(outcome);
                }
            },
        }
    }

    info!(
        "Fetched {} airspace records in {} pages",
        outcome.records.len(),
        outcome.pages_fetched
    );
    Ok(outcome)
}
