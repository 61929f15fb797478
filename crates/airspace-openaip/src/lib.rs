//! OpenAIP airspace client.
//!
//! Fetches every page of airspace records matching a bounding box or a
//! centre plus radius. Requests are strictly sequential, paced by a
//! [`RateLimiter`] and retried on non-2xx replies under a separate
//! [`Backoff`] policy.

pub mod backoff;
pub mod client;
pub mod error;
pub mod fetch;
pub mod query;
pub mod rate_limit;

pub use backoff::Backoff;
pub use client::{AirspacePage, OpenAipClient, PageReply, PageSource};
pub use error::FetchError;
pub use fetch::{fetch_all_pages, FetchOutcome, FetchPolicy};
pub use query::{AirspaceQuery, PAGE_LIMIT};
pub use rate_limit::RateLimiter;
