use super::{
    FeedClient,
    FeedError,
    FeedFuture,
    FeedKind,
};
use crate::metrics::{
    ActiveCallsReport,
    PerformanceReport,
    RecoveredCallsReport,
};
use callcenter_dashboard_config::{
    Config,
    Sector,
};
use chrono::Utc;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Fetches the feeds from the dashboard API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    http_client: HttpClient,
    base_url: Url,
    timeout: Duration,
}

impl HttpFeedClient {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    fn endpoint(&self, feed: FeedKind) -> Result<Url, FeedError> {
        // A base URL without trailing slash would otherwise drop its last segment on join.
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(feed.path()).map_err(|err| FeedError::Unavailable {
            feed,
            reason: format!("invalid endpoint url: {err}"),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, feed: FeedKind, sector: Sector, force_refresh: bool) -> Result<T, FeedError> {
        let url = self.endpoint(feed)?;
        let mut query = vec![("setor", sector.as_wire_str().to_string())];
        if force_refresh {
            query.push(("force_refresh", "true".to_string()));
            query.push(("_t", Utc::now().timestamp_millis().to_string()));
        }

        trace!(%feed, %url, force_refresh, "fetching feed");
        let response = self
            .http_client
            .get(url)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| transport_error(feed, self.timeout, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                feed,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| transport_error(feed, self.timeout, source))?;
        serde_json::from_slice(&body).map_err(|source| FeedError::Decode { feed, source })
    }
}

fn transport_error(feed: FeedKind, timeout: Duration, source: reqwest::Error) -> FeedError {
    if source.is_timeout() {
        FeedError::Timeout { feed, after: timeout }
    } else {
        FeedError::Transport { feed, source }
    }
}

impl FeedClient for HttpFeedClient {
    fn fetch_daily(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, PerformanceReport> {
        Box::pin(self.fetch(FeedKind::Daily, sector, force_refresh))
    }

    fn fetch_monthly(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, PerformanceReport> {
        Box::pin(self.fetch(FeedKind::Monthly, sector, force_refresh))
    }

    fn fetch_active_calls(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, ActiveCallsReport> {
        Box::pin(self.fetch(FeedKind::ActiveCalls, sector, force_refresh))
    }

    fn fetch_recovered_calls(&self, sector: Sector, force_refresh: bool) -> FeedFuture<'_, RecoveredCallsReport> {
        Box::pin(self.fetch(FeedKind::RecoveredCalls, sector, force_refresh))
    }
}
