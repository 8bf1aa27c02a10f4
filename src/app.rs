use crate::{
    console::{
        ConsoleCommand,
        HELP,
    },
    report::{
        summary,
        Report,
    },
};
use callcenter_dashboard_config::{
    Args,
    Config,
    Sector,
    SectorStore,
};
use callcenter_dashboard_stats::{
    CycleError,
    DashboardState,
    HttpFeedClient,
    RefreshOrchestrator,
    RefreshSettings,
    Snapshot,
};
use color_eyre::Result;
use eyre::{
    eyre,
    Context as _,
};
use std::sync::Arc;
use tokio::io::{
    AsyncBufReadExt,
    BufReader,
};

pub struct App {
    config: Config,
    args: Args,
    report: Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl App {
    pub fn new(config: Config, args: Args) -> Self {
        let report = Report::new(config.roster_filter);
        Self { config, args, report }
    }

    pub async fn run(mut self) -> Result<()> {
        let store = self.config.sector_store();
        let sector = initial_sector(self.args.sector, &store, self.config.default_sector);
        remember_sector(&store, sector);

        info!(api_url = %self.config.api_url, %sector, "starting dashboard");
        let client = Arc::new(HttpFeedClient::from_config(&self.config));
        let orchestrator = RefreshOrchestrator::spawn(client, RefreshSettings::from_config(&self.config), sector);

        let result = if self.args.once {
            self.run_once(&orchestrator).await
        } else {
            self.run_interactive(&orchestrator, &store).await
        };
        orchestrator.stop();
        result
    }

    /// Waits for the first cycle to settle, prints it and exits.
    async fn run_once(&self, orchestrator: &RefreshOrchestrator) -> Result<()> {
        let mut receiver = orchestrator.subscribe();
        let state = receiver
            .wait_for(|state| !state.refreshing && (state.snapshot.is_some() || state.last_error.is_some()))
            .await
            .wrap_err("Refresh orchestrator stopped before producing a snapshot")?
            .clone();

        self.present(&state).await?;
        match state.last_error {
            Some(err) if state.snapshot.is_none() => Err(eyre!(err)),
            _ => Ok(()),
        }
    }

    async fn run_interactive(&mut self, orchestrator: &RefreshOrchestrator, store: &dyn SectorStore) -> Result<()> {
        let mut state = orchestrator.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut presented = Presented::default();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        println!("{HELP}");
        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    debug!("interrupted");
                    break;
                }
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = state.borrow_and_update().clone();
                    if presented.update(&current) {
                        self.present(&current).await?;
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line.wrap_err("Failed to read from stdin")? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<ConsoleCommand>() {
                        Ok(command) => {
                            if self.handle(command, orchestrator, store).await? == Flow::Quit {
                                break;
                            }
                        }
                        Err(err) => eprintln!("{err}"),
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle(
        &mut self,
        command: ConsoleCommand,
        orchestrator: &RefreshOrchestrator,
        store: &dyn SectorStore,
    ) -> Result<Flow> {
        debug!(?command, "console command");
        match command {
            ConsoleCommand::Refresh => {
                println!("Refreshing {}...", orchestrator.sector().label());
                orchestrator.refresh_now(true);
            }
            ConsoleCommand::Sector(sector) => {
                if sector != orchestrator.sector() {
                    println!("Switching to {}...", sector.label());
                }
                orchestrator.set_sector(sector);
                remember_sector(store, sector);
            }
            ConsoleCommand::Filter(filter) => {
                self.report.set_filter(filter);
                let current = orchestrator.subscribe().borrow().clone();
                self.present(&current).await?;
            }
            ConsoleCommand::Detail(code) => match orchestrator.current_snapshot() {
                Some(snapshot) => println!("{}", self.report.detail(&snapshot, &code)),
                None => println!("No snapshot yet."),
            },
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn present(&self, state: &DashboardState) -> Result<()> {
        println!("{}", self.report.dashboard(state));

        let (Some(path), Some(snapshot)) = (&self.args.output_file, &state.snapshot) else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&summary(snapshot, self.report.filter()))
            .wrap_err("Failed to serialize summary")?;
        tokio::fs::write(path, json)
            .await
            .wrap_err_with(|| format!("Failed to write summary to {path:?}"))?;
        debug!(?path, "summary written");
        Ok(())
    }
}

/// The explicitly requested sector wins, then the last one selected, then
/// the configured default.
fn initial_sector(requested: Option<Sector>, store: &dyn SectorStore, default: Sector) -> Sector {
    if let Some(sector) = requested {
        return sector;
    }
    match store.load() {
        Ok(stored) => stored.unwrap_or(default),
        Err(err) => {
            warn!("Failed to load the last selected sector: {err}");
            default
        }
    }
}

fn remember_sector(store: &dyn SectorStore, sector: Sector) {
    if let Err(err) = store.save(sector) {
        warn!(%sector, "Failed to remember the selected sector: {err}");
    }
}

/// Tracks what was last printed so state updates that only toggle the
/// refreshing flag are not re-rendered.
#[derive(Default)]
struct Presented {
    snapshot: Option<Arc<Snapshot>>,
    error: Option<CycleError>,
}

impl Presented {
    fn update(&mut self, state: &DashboardState) -> bool {
        let same_snapshot = match (&self.snapshot, &state.snapshot) {
            (Some(shown), Some(current)) => Arc::ptr_eq(shown, current),
            (None, None) => true,
            _ => false,
        };
        if same_snapshot && self.error == state.last_error {
            return false;
        }
        self.snapshot = state.snapshot.clone();
        self.error = state.last_error.clone();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callcenter_dashboard_stats::{
        FallbackSynthesizer,
        Sourced,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        sector: Mutex<Option<Sector>>,
        broken: bool,
    }

    impl SectorStore for MemoryStore {
        fn load(&self) -> Result<Option<Sector>> {
            if self.broken {
                return Err(eyre!("disk on fire"));
            }
            Ok(*self.sector.lock().unwrap())
        }

        fn save(&self, sector: Sector) -> Result<()> {
            *self.sector.lock().unwrap() = Some(sector);
            Ok(())
        }
    }

    fn snapshot() -> Arc<Snapshot> {
        Arc::new(Snapshot::new(
            Sector::Support,
            false,
            Utc::now(),
            Sourced::Fallback(FallbackSynthesizer::daily(Sector::Support)),
            Sourced::Fallback(FallbackSynthesizer::monthly(Sector::Support)),
            Sourced::Fallback(FallbackSynthesizer::active_calls(Sector::Support)),
            Sourced::Fallback(FallbackSynthesizer::recovered_calls(Sector::Support)),
        ))
    }

    #[test]
    fn sector_resolution_order() {
        let store = MemoryStore::default();
        assert_eq!(initial_sector(None, &store, Sector::Support), Sector::Support);

        remember_sector(&store, Sector::Commercial);
        assert_eq!(initial_sector(None, &store, Sector::Support), Sector::Commercial);
        assert_eq!(
            initial_sector(Some(Sector::Support), &store, Sector::Commercial),
            Sector::Support
        );
    }

    #[test]
    fn unreadable_store_falls_back_to_default() {
        let store = MemoryStore {
            broken: true,
            ..Default::default()
        };
        assert_eq!(initial_sector(None, &store, Sector::Commercial), Sector::Commercial);
    }

    #[test]
    fn refreshing_flag_alone_is_not_presented() {
        let mut presented = Presented::default();
        let mut state = DashboardState {
            snapshot: Some(snapshot()),
            ..Default::default()
        };
        assert!(presented.update(&state));

        state.refreshing = true;
        assert!(!presented.update(&state));

        state.last_error = Some(CycleError::Panicked("boom".to_string()));
        assert!(presented.update(&state));
        assert!(!presented.update(&state));

        state.snapshot = Some(snapshot());
        assert!(presented.update(&state));
    }
}
