//! Terminal and JSON presentation of the dashboard state.

use callcenter_dashboard_config::RosterFilter;
use callcenter_dashboard_stats::{
    format_handle_time,
    Availability,
    DashboardState,
    MetricsAggregator,
    PerformanceBand,
    PerformanceRecord,
    Snapshot,
    Totals,
};
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use std::fmt::Write as _;

/// Renders the dashboard as tables, either styled for the terminal or as
/// plain text sized to its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    filter: RosterFilter,
    terminal: bool,
}

impl Report {
    pub fn new(filter: RosterFilter) -> Self {
        Self { filter, terminal: true }
    }

    /// No colors and no wrapping to the terminal width.
    pub fn plain(filter: RosterFilter) -> Self {
        Self {
            filter,
            terminal: false,
        }
    }

    pub fn filter(&self) -> RosterFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: RosterFilter) {
        self.filter = filter;
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.terminal {
            table.force_no_tty();
        }
        table
    }

    /// Status header followed by totals, top performers and the ranking.
    pub fn dashboard(&self, state: &DashboardState) -> String {
        let mut header = self.table();
        header.set_header(vec![
            Cell::new(format!("{} DASHBOARD", state.sector.label().to_uppercase()))
                .add_attribute(Attribute::Bold)
                .fg(Color::Cyan),
            Cell::new(""),
        ]);

        match &state.snapshot {
            Some(snapshot) => {
                header.add_row(vec![
                    label("Captured"),
                    Cell::new(snapshot.captured_at().format("%Y-%m-%d %H:%M:%S UTC")),
                ]);
                if snapshot.sector() != state.sector {
                    header.add_row(vec![
                        label("Showing"),
                        Cell::new(format!("{} data until the next refresh", snapshot.sector().label()))
                            .fg(Color::Yellow),
                    ]);
                }
                let trigger = state
                    .last_trigger
                    .map(|trigger| format!(" ({trigger})"))
                    .unwrap_or_default();
                let mode = if snapshot.force_refresh() { "forced" } else { "automatic" };
                header.add_row(vec![label("Refresh"), Cell::new(format!("{mode}{trigger}"))]);

                let fallback_feeds = snapshot.fallback_feeds();
                let feeds = if fallback_feeds.is_empty() {
                    Cell::new("all live").fg(Color::Green)
                } else {
                    let names = fallback_feeds.iter().map(ToString::to_string).collect::<Vec<_>>();
                    Cell::new(format!("fallback data for {}", names.join(", "))).fg(Color::Yellow)
                };
                header.add_row(vec![label("Feeds"), feeds]);
            }
            None => {
                header.add_row(vec![label("Data"), Cell::new("no snapshot yet")]);
            }
        }
        if state.refreshing {
            header.add_row(vec![label("Status"), Cell::new("refreshing...")]);
        }
        if let Some(err) = &state.last_error {
            header.add_row(vec![label("Last error"), Cell::new(err).fg(Color::Red)]);
        }

        let mut output = format!("{header}\n");
        if let Some(snapshot) = &state.snapshot {
            output.push_str(&self.snapshot(snapshot));
        }
        output
    }

    fn snapshot(&self, snapshot: &Snapshot) -> String {
        let filter = self.filter;
        let aggregator = MetricsAggregator::new(snapshot);
        let mut output = String::new();

        let mut totals = self.table();
        totals.set_header(vec![
            label("Period"),
            label("Offered"),
            label("Answered"),
            label("Answer rate"),
        ]);
        totals.add_row(totals_row("Today", aggregator.totals()));
        totals.add_row(totals_row("Month", aggregator.monthly_totals()));
        let stats = aggregator.sector_stats(filter);
        let _ = writeln!(output, "\nTOTALS\n{totals}");
        let _ = writeln!(
            output,
            "{} collaborators ({filter}), average answer rate {:.1}%",
            stats.collaborators, stats.average_answer_rate
        );

        let top_performers = aggregator.top_performers(filter);
        if top_performers.is_empty() {
            let _ = writeln!(output, "\nTOP PERFORMERS\nnobody above 90% yet");
        } else {
            let mut top = self.table();
            top.set_header(vec![
                label("#"),
                label("Code"),
                label("Name"),
                label("Rate"),
                label("Answered today"),
                label("Answered month"),
                label("TMA month"),
            ]);
            for performer in &top_performers {
                top.add_row(vec![
                    Cell::new(performer.position),
                    Cell::new(&performer.today.code),
                    Cell::new(&performer.today.name),
                    rate_cell(performer.today.answer_rate),
                    Cell::new(performer.today.answered),
                    Cell::new(performer.month.map_or(0, |month| month.answered)),
                    Cell::new(format_handle_time(performer.month.map_or(0.0, |month| month.handle_time))),
                ]);
            }
            let _ = writeln!(output, "\nTOP PERFORMERS\n{top}");
        }

        let mut ranking = self.table();
        ranking.set_header(vec![
            label("#"),
            label("Code"),
            label("Name"),
            label("Offered"),
            label("Answered"),
            label("Rate"),
            label("TMA"),
            label("Active (month)"),
            label("Recovered (day/month)"),
        ]);
        for ranked in aggregator.rank(filter) {
            let record = ranked.record;
            let recovered = aggregator.recovered_lookup(&record.code);
            ranking.add_row(vec![
                Cell::new(ranked.position),
                Cell::new(&record.code),
                Cell::new(&record.name),
                Cell::new(record.offered),
                Cell::new(record.answered),
                rate_cell(record.answer_rate),
                Cell::new(format_handle_time(record.handle_time)),
                availability_cell(snapshot.active_calls_for(&record.code)),
                Cell::new(format!("{}/{}", recovered.today, recovered.month)),
            ]);
        }
        let _ = writeln!(output, "\nRANKING\n{ranking}");
        output
    }

    /// One collaborator's day and month side by side.
    pub fn detail(&self, snapshot: &Snapshot, code: &str) -> String {
        let aggregator = MetricsAggregator::new(snapshot);
        let Some(detail) = aggregator.collaborator_detail(code) else {
            return format!("No collaborator with code {code} in {}", snapshot.sector().label());
        };

        let mut table = self.table();
        table.set_header(vec![
            Cell::new(format!("{} ({})", detail.identity.name, detail.identity.code))
                .add_attribute(Attribute::Bold)
                .fg(Color::Cyan),
            label("Today"),
            label("Month"),
        ]);

        let rows: [(&str, fn(&PerformanceRecord) -> String); 9] = [
            ("Offered", |r| r.offered.to_string()),
            ("Answered", |r| r.answered.to_string()),
            ("Answer rate", |r| format!("{:.1}%", r.answer_rate)),
            ("TMA", |r| format_handle_time(r.handle_time)),
            ("Talk time", |r| format_handle_time(r.talk_time)),
            ("Outbound calls", |r| r.outbound_calls.to_string()),
            ("Login time", |r| format_handle_time(r.login_time)),
            ("Pause time", |r| format_handle_time(r.pause_time)),
            ("Calls per hour", |r| format!("{:.1}", r.calls_per_hour)),
        ];
        for (name, value) in rows {
            table.add_row(vec![
                label(name),
                Cell::new(detail.today.map_or_else(|| "-".to_string(), value)),
                Cell::new(detail.month.map_or_else(|| "-".to_string(), value)),
            ]);
        }
        table.add_row(vec![
            label("Active calls"),
            Cell::new("-"),
            availability_cell(detail.active_calls),
        ]);
        table.add_row(vec![
            label("Recovered calls"),
            Cell::new(detail.recovered.today),
            Cell::new(detail.recovered.month),
        ]);
        table.add_row(vec![
            label("Performance"),
            Cell::new(detail.band).fg(band_color(detail.band)),
            Cell::new(""),
        ]);

        let mut output = format!("{table}\n");
        if detail.uses_fallback {
            output.push_str("Some feeds are showing fallback data.\n");
        }
        output
    }
}

fn band_color(band: PerformanceBand) -> Color {
    match band {
        PerformanceBand::Good => Color::Green,
        PerformanceBand::Fair => Color::Yellow,
        PerformanceBand::Poor => Color::Red,
    }
}

fn rate_cell(answer_rate: f64) -> Cell {
    Cell::new(format!("{answer_rate:.1}%")).fg(band_color(PerformanceBand::for_rate(answer_rate)))
}

fn label(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn totals_row(period: &str, totals: Totals) -> Vec<Cell> {
    vec![
        label(period),
        Cell::new(totals.offered),
        Cell::new(totals.answered),
        rate_cell(totals.answer_rate),
    ]
}

fn availability_cell(value: Availability<u32>) -> Cell {
    match value {
        Availability::Present(count) => Cell::new(count),
        Availability::Unavailable => Cell::new("n/a").fg(Color::DarkGrey),
    }
}

/// Machine-readable export of one snapshot.
pub fn summary(snapshot: &Snapshot, filter: RosterFilter) -> serde_json::Value {
    let aggregator = MetricsAggregator::new(snapshot);
    serde_json::json!({
        "sector": snapshot.sector(),
        "captured_at": snapshot.captured_at(),
        "force_refresh": snapshot.force_refresh(),
        "fallback_feeds": snapshot.fallback_feeds(),
        "filter": filter,
        "totals": aggregator.totals(),
        "monthly_totals": aggregator.monthly_totals(),
        "sector_stats": aggregator.sector_stats(filter),
        "top_performers": aggregator.top_performers(filter),
        "ranking": aggregator.rank(filter),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use callcenter_dashboard_config::Sector;
    use callcenter_dashboard_stats::{
        ActiveCallsReport,
        CycleError,
        FallbackSynthesizer,
        FeedKind,
        PerformanceReport,
        RefreshTrigger,
        Sourced,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn live_snapshot() -> Snapshot {
        let daily = PerformanceReport {
            records: vec![
                PerformanceRecord {
                    code: "4002".to_string(),
                    name: "Pedro Henrique".to_string(),
                    offered: 20,
                    answered: 19,
                    answer_rate: 95.0,
                    handle_time: 190.0,
                    ..Default::default()
                },
                PerformanceRecord {
                    code: "4004".to_string(),
                    name: "João Miyake".to_string(),
                    offered: 10,
                    answered: 6,
                    answer_rate: 60.0,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        Snapshot::new(
            Sector::Support,
            true,
            Utc::now(),
            Sourced::Live(daily.clone()),
            Sourced::Live(daily),
            Sourced::Live(ActiveCallsReport::default()),
            Sourced::Fallback(FallbackSynthesizer::recovered_calls(Sector::Support)),
        )
    }

    #[test]
    fn dashboard_lists_ranking_and_degraded_feeds() {
        let state = DashboardState {
            sector: Sector::Support,
            snapshot: Some(Arc::new(live_snapshot())),
            refreshing: false,
            last_error: None,
            last_trigger: Some(RefreshTrigger::Manual),
        };
        let output = Report::plain(RosterFilter::All).dashboard(&state);

        assert!(output.contains("SUPPORT DASHBOARD"));
        assert!(output.contains("forced (manual)"));
        assert!(output.contains("fallback data for recovered_calls"));
        assert!(output.contains("Pedro Henrique"));
        assert!(output.contains("João Miyake"));
        assert!(output.contains("03:10"));
        assert!(output.contains("n/a"));
    }

    #[test]
    fn filter_narrows_the_ranking() {
        let mut report = Report::plain(RosterFilter::All);
        report.set_filter(RosterFilter::Interns);
        let state = DashboardState {
            snapshot: Some(Arc::new(live_snapshot())),
            ..Default::default()
        };
        let output = report.dashboard(&state);

        assert!(output.contains("0 collaborators (interns)"));
        assert!(!output.contains("Pedro Henrique"));
    }

    #[test]
    fn dashboard_without_snapshot_shows_error() {
        let state = DashboardState {
            sector: Sector::Commercial,
            last_error: Some(CycleError::Panicked("boom".to_string())),
            ..Default::default()
        };
        let output = Report::plain(RosterFilter::All).dashboard(&state);

        assert!(output.contains("no snapshot yet"));
        assert!(output.contains("refresh cycle panicked: boom"));
        assert!(!output.contains("RANKING"));
    }

    #[test]
    fn detail_view() {
        let report = Report::plain(RosterFilter::All);
        assert_eq!(
            report.detail(&live_snapshot(), "9999"),
            "No collaborator with code 9999 in Support"
        );

        let detail = report.detail(&live_snapshot(), "4002");
        assert!(detail.contains("Pedro Henrique (4002)"));
        assert!(detail.contains("good"));
        assert!(detail.contains("fallback data"));
    }

    #[test]
    fn summary_exports_views() {
        let value = summary(&live_snapshot(), RosterFilter::Staff);

        assert_eq!(value["sector"], "suporte");
        assert_eq!(value["filter"], "staff");
        assert_eq!(value["fallback_feeds"], serde_json::json!([FeedKind::RecoveredCalls]));
        assert_eq!(value["totals"]["offered"], 30);
        assert_eq!(value["ranking"][0]["record"]["codigo"], "4002");
        assert_eq!(value["top_performers"].as_array().map(Vec::len), Some(1));
    }
}
