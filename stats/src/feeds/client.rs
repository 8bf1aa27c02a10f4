use crate::metrics::{
    ActiveCallsReport,
    PerformanceReport,
    RecoveredCallsReport,
};
use callcenter_dashboard_config::Sector;
use serde::Serialize;
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};
use strum::Display;

/// The four independent upstream feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Daily,
    Monthly,
    ActiveCalls,
    RecoveredCalls,
}

impl FeedKind {
    /// Endpoint path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            FeedKind::Daily => "api/dados/hoje",
            FeedKind::Monthly => "api/dados/mes",
            FeedKind::ActiveCalls => "api/dados/ligacoes-ativas-mes",
            FeedKind::RecoveredCalls => "api/dados/ligacoes-recuperadas",
        }
    }
}

/// A single feed could not be fetched. Always recovered by fallback data.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("request to the {feed} feed failed: {source}")]
    Transport {
        feed: FeedKind,
        #[source]
        source: reqwest::Error,
    },
    #[error("the {feed} feed did not answer within {after:?}")]
    Timeout { feed: FeedKind, after: Duration },
    #[error("the {feed} feed answered with status {status}")]
    Status { feed: FeedKind, status: u16 },
    #[error("the {feed} feed returned an unreadable body: {source}")]
    Decode {
        feed: FeedKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("the {feed} feed is unavailable: {reason}")]
    Unavailable { feed: FeedKind, reason: String },
    #[error("fetching the {feed} feed panicked: {message}")]
    Panicked { feed: FeedKind, message: String },
}

pub type FeedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FeedError>> + Send + 'a>>;

/// Fetch capability for the four feeds. Each call is independent and may fail
/// on its own; callers are expected to substitute fallback data on error.
pub trait FeedClient: Send + Sync {
    fn fetch_daily(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, PerformanceReport>;

    fn fetch_monthly(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, PerformanceReport>;

    fn fetch_active_calls(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, ActiveCallsReport>;

    fn fetch_recovered_calls(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, RecoveredCallsReport>;
}
