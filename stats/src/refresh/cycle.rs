use crate::{
    feeds::{
        FallbackSynthesizer,
        FeedClient,
        FeedError,
        FeedFuture,
        FeedKind,
    },
    metrics::{
        Snapshot,
        Sourced,
    },
};
use callcenter_dashboard_config::Sector;
use chrono::Utc;
use futures::FutureExt as _;
use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::Duration,
};

/// A refresh cycle that could not produce a snapshot. The previously held
/// snapshot stays in place.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    #[error("the {feed} feed answered for sector {reported:?} but {requested} was requested")]
    SectorMismatch {
        feed: FeedKind,
        requested: Sector,
        reported: String,
    },
    /// The merge step panicked. Panics inside a feed fetch fall back instead.
    #[error("refresh cycle panicked: {0}")]
    Panicked(String),
    #[error("refresh for {requested} was dropped after switching to {active}")]
    Superseded { requested: Sector, active: Sector },
    #[error("the refresh orchestrator has stopped")]
    Stopped,
}

/// One fan-out of the four feed fetches followed by the merge into a [`Snapshot`].
#[derive(Clone)]
pub struct RefreshCycle {
    client: Arc<dyn FeedClient>,
    feed_timeout: Duration,
}

impl RefreshCycle {
    pub fn new(client: Arc<dyn FeedClient>, feed_timeout: Duration) -> Self {
        Self { client, feed_timeout }
    }

    /// Runs the four fetches concurrently. Failed, timed out or panicking
    /// feeds are replaced with fallback data; only the merge itself can fail.
    pub async fn run(&self, sector: Sector, force_refresh: bool) -> Result<Snapshot, CycleError> {
        AssertUnwindSafe(self.collect(sector, force_refresh))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(CycleError::Panicked(panic_message(panic))))
    }

    async fn collect(&self, sector: Sector, force_refresh: bool) -> Result<Snapshot, CycleError> {
        let client = self.client.as_ref();
        let (daily, monthly, active_calls, recovered_calls) = tokio::join!(
            self.fetch_or_fallback(
                FeedKind::Daily,
                sector,
                client.fetch_daily(sector, force_refresh),
                FallbackSynthesizer::daily,
            ),
            self.fetch_or_fallback(
                FeedKind::Monthly,
                sector,
                client.fetch_monthly(sector, force_refresh),
                FallbackSynthesizer::monthly,
            ),
            self.fetch_or_fallback(
                FeedKind::ActiveCalls,
                sector,
                client.fetch_active_calls(sector, force_refresh),
                FallbackSynthesizer::active_calls,
            ),
            self.fetch_or_fallback(
                FeedKind::RecoveredCalls,
                sector,
                client.fetch_recovered_calls(sector, force_refresh),
                FallbackSynthesizer::recovered_calls,
            ),
        );

        ensure_sector(FeedKind::Daily, sector, daily.get().sector.as_deref())?;
        ensure_sector(FeedKind::Monthly, sector, monthly.get().sector.as_deref())?;
        ensure_sector(FeedKind::ActiveCalls, sector, active_calls.get().sector.as_deref())?;
        ensure_sector(FeedKind::RecoveredCalls, sector, recovered_calls.get().sector.as_deref())?;

        Ok(Snapshot::new(
            sector,
            force_refresh,
            Utc::now(),
            daily,
            monthly,
            active_calls,
            recovered_calls,
        ))
    }

    async fn fetch_or_fallback<T>(
        &self,
        feed: FeedKind,
        sector: Sector,
        fetch: FeedFuture<'_, T>,
        fallback: fn(Sector) -> T,
    ) -> Sourced<T> {
        let fetch = AssertUnwindSafe(fetch).catch_unwind();
        let result = match tokio::time::timeout(self.feed_timeout, fetch).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(FeedError::Panicked {
                feed,
                message: panic_message(panic),
            }),
            Err(_) => Err(FeedError::Timeout {
                feed,
                after: self.feed_timeout,
            }),
        };
        match result {
            Ok(data) => Sourced::Live(data),
            Err(err) => {
                warn!(%feed, %sector, "using fallback data: {err}");
                Sourced::Fallback(fallback(sector))
            }
        }
    }
}

/// Payloads that name no sector are accepted as-is.
fn ensure_sector(feed: FeedKind, requested: Sector, reported: Option<&str>) -> Result<(), CycleError> {
    match reported {
        None => Ok(()),
        Some(reported) if reported.trim().parse::<Sector>().ok() == Some(requested) => Ok(()),
        Some(reported) => Err(CycleError::SectorMismatch {
            feed,
            requested,
            reported: reported.to_string(),
        }),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{
        ActiveCallsReport,
        PerformanceRecord,
        PerformanceReport,
        RecoveredCallsReport,
    };
    use pretty_assertions::assert_eq;

    /// Serves fixed payloads; `None` makes that feed fail.
    #[derive(Default)]
    struct StaticClient {
        daily: Option<PerformanceReport>,
        monthly: Option<PerformanceReport>,
        active_calls: Option<ActiveCallsReport>,
        recovered_calls: Option<RecoveredCallsReport>,
        hang_monthly: bool,
        panic_daily: bool,
    }

    fn unavailable<T>(feed: FeedKind) -> Result<T, FeedError> {
        Err(FeedError::Unavailable {
            feed,
            reason: "offline".to_string(),
        })
    }

    impl FeedClient for StaticClient {
        fn fetch_daily(&self, _: Sector, _: bool) -> FeedFuture<'_, PerformanceReport> {
            Box::pin(async move {
                if self.panic_daily {
                    panic!("daily feed exploded");
                }
                self.daily.clone().map_or_else(|| unavailable(FeedKind::Daily), Ok)
            })
        }

        fn fetch_monthly(&self, _: Sector, _: bool) -> FeedFuture<'_, PerformanceReport> {
            Box::pin(async move {
                if self.hang_monthly {
                    std::future::pending::<()>().await;
                }
                self.monthly.clone().map_or_else(|| unavailable(FeedKind::Monthly), Ok)
            })
        }

        fn fetch_active_calls(&self, _: Sector, _: bool) -> FeedFuture<'_, ActiveCallsReport> {
            Box::pin(async move { self.active_calls.clone().map_or_else(|| unavailable(FeedKind::ActiveCalls), Ok) })
        }

        fn fetch_recovered_calls(&self, _: Sector, _: bool) -> FeedFuture<'_, RecoveredCallsReport> {
            Box::pin(async move {
                self.recovered_calls
                    .clone()
                    .map_or_else(|| unavailable(FeedKind::RecoveredCalls), Ok)
            })
        }
    }

    fn daily_for(sector: Option<&str>) -> PerformanceReport {
        PerformanceReport {
            records: vec![PerformanceRecord {
                code: "4002".to_string(),
                name: "Pedro Henrique".to_string(),
                offered: 10,
                answered: 9,
                answer_rate: 90.0,
                ..Default::default()
            }],
            sector: sector.map(str::to_string),
            ..Default::default()
        }
    }

    fn cycle(client: StaticClient) -> RefreshCycle {
        RefreshCycle::new(Arc::new(client), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn all_feeds_failing_yields_fallback_snapshot() {
        let snapshot = cycle(StaticClient::default()).run(Sector::Commercial, false).await.unwrap();

        assert_eq!(snapshot.sector(), Sector::Commercial);
        assert_eq!(
            snapshot.fallback_feeds(),
            vec![
                FeedKind::Daily,
                FeedKind::Monthly,
                FeedKind::ActiveCalls,
                FeedKind::RecoveredCalls
            ]
        );
        assert_eq!(snapshot.roster(), FallbackSynthesizer::roster(Sector::Commercial));
        assert!(snapshot.daily().get().records.iter().all(|r| r.offered == 0));
    }

    #[tokio::test]
    async fn single_failure_only_replaces_that_feed() {
        let client = StaticClient {
            daily: Some(daily_for(Some("suporte"))),
            monthly: Some(daily_for(None)),
            recovered_calls: Some(RecoveredCallsReport::default()),
            ..Default::default()
        };
        let snapshot = cycle(client).run(Sector::Support, true).await.unwrap();

        assert!(snapshot.force_refresh());
        assert_eq!(snapshot.fallback_feeds(), vec![FeedKind::ActiveCalls]);
        assert_eq!(snapshot.daily().get().records[0].answered, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_feed_times_out_into_fallback() {
        let client = StaticClient {
            daily: Some(daily_for(None)),
            hang_monthly: true,
            ..Default::default()
        };
        let snapshot = cycle(client).run(Sector::Support, false).await.unwrap();

        assert!(snapshot.monthly().is_fallback());
        assert!(!snapshot.daily().is_fallback());
    }

    #[tokio::test]
    async fn foreign_sector_payload_fails_the_cycle() {
        let client = StaticClient {
            daily: Some(daily_for(Some("comercial"))),
            ..Default::default()
        };
        let err = cycle(client).run(Sector::Support, false).await.unwrap_err();

        assert_eq!(
            err,
            CycleError::SectorMismatch {
                feed: FeedKind::Daily,
                requested: Sector::Support,
                reported: "comercial".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn panicking_feed_only_replaces_that_feed() {
        let client = StaticClient {
            panic_daily: true,
            monthly: Some(daily_for(Some("suporte"))),
            active_calls: Some(ActiveCallsReport::default()),
            recovered_calls: Some(RecoveredCallsReport::default()),
            ..Default::default()
        };
        let snapshot = cycle(client).run(Sector::Support, false).await.unwrap();

        assert_eq!(snapshot.fallback_feeds(), vec![FeedKind::Daily]);
        assert_eq!(snapshot.daily().get(), &FallbackSynthesizer::daily(Sector::Support));
        assert_eq!(snapshot.monthly().get().records[0].answered, 9);
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(7_u8)), "unknown panic payload");
    }
}
