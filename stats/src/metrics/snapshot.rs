use super::{
    ActiveCallsReport,
    CollaboratorIdentity,
    PerformanceReport,
    RecoveredCallsReport,
};
use crate::feeds::FeedKind;
use callcenter_dashboard_config::Sector;
use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;

/// Where the data of one feed inside a [`Snapshot`] came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "origin", content = "data", rename_all = "snake_case")]
pub enum Sourced<T> {
    Live(T),
    /// Synthesized zero-valued data standing in for a failed fetch.
    Fallback(T),
}

impl<T> Sourced<T> {
    pub fn get(&self) -> &T {
        match self {
            Sourced::Live(data) | Sourced::Fallback(data) => data,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback(_))
    }
}

/// Presence of an optional per-collaborator record. A missing record is not
/// the same as a measured zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability<T> {
    Present(T),
    Unavailable,
}

/// One immutable, atomically produced merge of all four feeds for one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    sector: Sector,
    force_refresh: bool,
    captured_at: DateTime<Utc>,
    daily: Sourced<PerformanceReport>,
    monthly: Sourced<PerformanceReport>,
    active_calls: Sourced<ActiveCallsReport>,
    recovered_calls: Sourced<RecoveredCallsReport>,
}

impl Snapshot {
    pub fn new(
        sector: Sector,
        force_refresh: bool,
        captured_at: DateTime<Utc>,
        daily: Sourced<PerformanceReport>,
        monthly: Sourced<PerformanceReport>,
        active_calls: Sourced<ActiveCallsReport>,
        recovered_calls: Sourced<RecoveredCallsReport>,
    ) -> Self {
        Self {
            sector,
            force_refresh,
            captured_at,
            daily,
            monthly,
            active_calls,
            recovered_calls,
        }
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }

    /// Whether the cycle that produced this snapshot bypassed upstream caches.
    pub fn force_refresh(&self) -> bool {
        self.force_refresh
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn daily(&self) -> &Sourced<PerformanceReport> {
        &self.daily
    }

    pub fn monthly(&self) -> &Sourced<PerformanceReport> {
        &self.monthly
    }

    pub fn active_calls(&self) -> &Sourced<ActiveCallsReport> {
        &self.active_calls
    }

    pub fn recovered_calls(&self) -> &Sourced<RecoveredCallsReport> {
        &self.recovered_calls
    }

    /// Feeds that were replaced by fallback data in this snapshot.
    pub fn fallback_feeds(&self) -> Vec<FeedKind> {
        [
            (FeedKind::Daily, self.daily.is_fallback()),
            (FeedKind::Monthly, self.monthly.is_fallback()),
            (FeedKind::ActiveCalls, self.active_calls.is_fallback()),
            (FeedKind::RecoveredCalls, self.recovered_calls.is_fallback()),
        ]
        .into_iter()
        .filter_map(|(feed, fallback)| fallback.then_some(feed))
        .collect()
    }

    pub fn is_degraded(&self) -> bool {
        !self.fallback_feeds().is_empty()
    }

    /// Collaborators listed by the daily feed, in feed order.
    pub fn roster(&self) -> Vec<CollaboratorIdentity> {
        self.daily.get().records.iter().map(|record| record.identity()).collect()
    }

    pub fn active_calls_for(&self, code: &str) -> Availability<u32> {
        match self.active_calls.get().record(code) {
            Some(record) => Availability::Present(record.active_calls_this_month),
            None => Availability::Unavailable,
        }
    }
}
