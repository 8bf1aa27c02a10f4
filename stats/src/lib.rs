//! # Call-Center Dashboard Stats
//!
//! Data side of the agent dashboard: the feed model, fetching with per-feed
//! fallback, the refresh orchestrator holding the last known good snapshot and
//! the aggregations the dashboard displays.
//!
//! - **`metrics`**: wire records, lenient measurement decoding and [`Snapshot`]
//! - **`feeds`**: the [`FeedClient`] contract, its HTTP implementation and the
//!   fallback rosters
//! - **`refresh`**: one [`RefreshCycle`] and the [`RefreshOrchestrator`] actor
//!   that schedules them
//! - **`aggregator`**: totals, ranking and top performers over a snapshot

#[macro_use]
extern crate tracing;

pub mod aggregator;
pub mod feeds;
pub mod metrics;
pub mod refresh;

pub use aggregator::*;
pub use feeds::*;
pub use metrics::*;
pub use refresh::*;
