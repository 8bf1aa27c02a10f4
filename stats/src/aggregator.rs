//! # Metrics aggregation
//!
//! Pure views derived from a [`Snapshot`]: sector totals, the collaborator
//! ranking, the top performers and per-collaborator detail.
//!
//! Ranking treats answer rates within [`RATE_TOLERANCE`] points of each other
//! as equal. Because that relation is not transitive, rate-sorted entries are
//! grouped into windows anchored at each window's highest rate and the
//! remaining criteria only order entries inside a window. Entries more than
//! the tolerance apart therefore always stay ordered by rate.

use crate::metrics::{
    Availability,
    CollaboratorIdentity,
    PerformanceRecord,
    Snapshot,
};
use callcenter_dashboard_config::RosterFilter;
use serde::Serialize;
use std::cmp::Ordering;
use strum::Display;

pub const RATE_TOLERANCE: f64 = 0.1;
pub const TOP_PERFORMER_THRESHOLD: f64 = 90.0;
pub const TOP_PERFORMER_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub offered: u64,
    pub answered: u64,
    /// `answered / offered * 100`, zero when nothing was offered.
    pub answer_rate: f64,
}

impl Totals {
    fn from_records<'a>(records: impl IntoIterator<Item = &'a PerformanceRecord>) -> Self {
        let (offered, answered) = records.into_iter().fold((0u64, 0u64), |(offered, answered), record| {
            (offered + u64::from(record.offered), answered + u64::from(record.answered))
        });
        Self {
            offered,
            answered,
            answer_rate: percentage(answered, offered),
        }
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecoveredCalls {
    pub today: u32,
    pub month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    Good,
    Fair,
    Poor,
}

impl PerformanceBand {
    pub fn for_rate(answer_rate: f64) -> Self {
        if answer_rate >= 90.0 {
            PerformanceBand::Good
        } else if answer_rate >= 70.0 {
            PerformanceBand::Fair
        } else {
            PerformanceBand::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCollaborator<'a> {
    /// 1-based position in the ranking.
    pub position: usize,
    pub record: &'a PerformanceRecord,
    pub band: PerformanceBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPerformer<'a> {
    pub position: usize,
    pub today: &'a PerformanceRecord,
    /// Month-to-date record with the same code, when the monthly feed has one.
    pub month: Option<&'a PerformanceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SectorStats {
    pub collaborators: usize,
    pub offered: u64,
    pub answered: u64,
    /// Mean of the per-collaborator answer rates.
    pub average_answer_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaboratorDetail<'a> {
    pub identity: CollaboratorIdentity,
    pub today: Option<&'a PerformanceRecord>,
    pub month: Option<&'a PerformanceRecord>,
    pub active_calls: Availability<u32>,
    pub recovered: RecoveredCalls,
    pub band: PerformanceBand,
    /// Whether any feed contributing to this view is fallback data.
    pub uses_fallback: bool,
}

/// Read-only calculations over one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Sector-wide totals over today's records.
    pub fn totals(&self) -> Totals {
        Totals::from_records(&self.snapshot.daily().get().records)
    }

    /// Sector-wide totals over this month's records.
    pub fn monthly_totals(&self) -> Totals {
        Totals::from_records(&self.snapshot.monthly().get().records)
    }

    pub fn recovered_lookup(&self, code: &str) -> RecoveredCalls {
        let recovered = self.snapshot.recovered_calls().get();
        RecoveredCalls {
            today: recovered
                .daily
                .iter()
                .find(|record| record.code == code)
                .map_or(0, |record| record.recovered_today),
            month: recovered
                .monthly
                .iter()
                .find(|record| record.code == code)
                .map_or(0, |record| record.recovered_this_month),
        }
    }

    pub fn rank(&self, filter: RosterFilter) -> Vec<RankedCollaborator<'a>> {
        self.rank_by(|record| filter.matches_name(&record.name))
    }

    /// Ranks today's records accepted by `include`: answer rate descending
    /// (within tolerance), then answered descending, then handle time
    /// ascending, then feed order.
    pub fn rank_by(&self, include: impl Fn(&PerformanceRecord) -> bool) -> Vec<RankedCollaborator<'a>> {
        let entries = self
            .snapshot
            .daily()
            .get()
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| include(*record))
            .collect::<Vec<_>>();

        order_within_tolerance(
            entries,
            |(_, record)| record.answer_rate,
            |(a_index, a), (b_index, b)| {
                b.answered
                    .cmp(&a.answered)
                    .then_with(|| a.handle_time.total_cmp(&b.handle_time))
                    .then_with(|| a_index.cmp(b_index))
            },
        )
        .into_iter()
        .enumerate()
        .map(|(index, (_, record))| RankedCollaborator {
            position: index + 1,
            record,
            band: PerformanceBand::for_rate(record.answer_rate),
        })
        .collect()
    }

    /// At most [`TOP_PERFORMER_LIMIT`] collaborators with an answer rate
    /// strictly above [`TOP_PERFORMER_THRESHOLD`]. Ties within tolerance are
    /// broken by answered today, then answered this month, then this month's
    /// handle time.
    pub fn top_performers(&self, filter: RosterFilter) -> Vec<TopPerformer<'a>> {
        let monthly = self.snapshot.monthly().get();
        let qualifiers = self
            .rank(filter)
            .into_iter()
            .filter(|ranked| ranked.record.answer_rate > TOP_PERFORMER_THRESHOLD)
            .map(|ranked| (ranked.position, ranked.record, monthly.record(&ranked.record.code)))
            .collect::<Vec<_>>();

        order_within_tolerance(
            qualifiers,
            |(_, today, _)| today.answer_rate,
            |(a_position, a_today, a_month), (b_position, b_today, b_month)| {
                let (a_month_answered, a_month_handle) = month_key(*a_month);
                let (b_month_answered, b_month_handle) = month_key(*b_month);
                b_today
                    .answered
                    .cmp(&a_today.answered)
                    .then_with(|| b_month_answered.cmp(&a_month_answered))
                    .then_with(|| a_month_handle.total_cmp(&b_month_handle))
                    .then_with(|| a_position.cmp(b_position))
            },
        )
        .into_iter()
        .take(TOP_PERFORMER_LIMIT)
        .enumerate()
        .map(|(index, (_, today, month))| TopPerformer {
            position: index + 1,
            today,
            month,
        })
        .collect()
    }

    pub fn sector_stats(&self, filter: RosterFilter) -> SectorStats {
        let records = self
            .snapshot
            .daily()
            .get()
            .records
            .iter()
            .filter(|record| filter.matches_name(&record.name))
            .collect::<Vec<_>>();
        if records.is_empty() {
            return SectorStats::default();
        }

        let totals = Totals::from_records(records.iter().copied());
        let rate_sum = records.iter().map(|record| record.answer_rate).sum::<f64>();
        SectorStats {
            collaborators: records.len(),
            offered: totals.offered,
            answered: totals.answered,
            average_answer_rate: rate_sum / records.len() as f64,
        }
    }

    /// `None` when neither today's nor this month's feed knows `code`.
    pub fn collaborator_detail(&self, code: &str) -> Option<CollaboratorDetail<'a>> {
        let today = self.snapshot.daily().get().record(code);
        let month = self.snapshot.monthly().get().record(code);
        let identity = today.or(month)?.identity();

        Some(CollaboratorDetail {
            identity,
            today,
            month,
            active_calls: self.snapshot.active_calls_for(code),
            recovered: self.recovered_lookup(code),
            band: PerformanceBand::for_rate(today.map_or(0.0, |record| record.answer_rate)),
            uses_fallback: self.snapshot.is_degraded(),
        })
    }
}

fn month_key(month: Option<&PerformanceRecord>) -> (u32, f64) {
    month.map_or((0, 0.0), |record| (record.answered, record.handle_time))
}

/// Orders by `rate` descending, treating rates within [`RATE_TOLERANCE`] of a
/// window's highest rate as equal and ordering those with `tie_break`.
fn order_within_tolerance<T>(
    mut entries: Vec<T>,
    rate: impl Fn(&T) -> f64,
    tie_break: impl Fn(&T, &T) -> Ordering,
) -> Vec<T> {
    entries.sort_by(|a, b| rate(b).total_cmp(&rate(a)));

    let mut ordered = Vec::with_capacity(entries.len());
    let mut remaining = entries.into_iter().peekable();
    while let Some(anchor) = remaining.next() {
        let anchor_rate = rate(&anchor);
        let mut window = vec![anchor];
        while let Some(entry) = remaining.next_if(|entry| anchor_rate - rate(entry) <= RATE_TOLERANCE) {
            window.push(entry);
        }
        window.sort_by(&tie_break);
        ordered.extend(window);
    }
    ordered
}
