use super::{
    CycleError,
    RefreshCycle,
};
use crate::{
    feeds::FeedClient,
    metrics::Snapshot,
};
use callcenter_dashboard_config::{
    Config,
    Sector,
};
use serde::Serialize;
use std::{
    collections::VecDeque,
    sync::Arc,
    time::Duration,
};
use strum::Display;
use tokio::{
    sync::{
        mpsc::{
            unbounded_channel,
            UnboundedReceiver,
            UnboundedSender,
        },
        oneshot,
        watch,
    },
    task::JoinHandle,
    time::{
        interval_at,
        Instant,
        Interval,
        MissedTickBehavior,
    },
};
use tokio_util::sync::{
    CancellationToken,
    DropGuard,
};

pub type RefreshResult = Result<Arc<Snapshot>, CycleError>;

/// What caused a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    /// First activation of the initial sector.
    Mount,
    SectorChange,
    Manual,
    Periodic,
    /// An explicit `refresh(sector, force)` call.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// `None` disables periodic refresh.
    pub interval: Option<Duration>,
    pub feed_timeout: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_secs(60 * 60)),
            feed_timeout: Duration::from_secs(30),
        }
    }
}

impl RefreshSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.refresh_interval(),
            feed_timeout: config.request_timeout(),
        }
    }
}

/// Observable state of the dashboard, published after every change.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub sector: Sector,
    /// Last known good snapshot. Only ever replaced by a newer one.
    pub snapshot: Option<Arc<Snapshot>>,
    pub refreshing: bool,
    pub last_error: Option<CycleError>,
    pub last_trigger: Option<RefreshTrigger>,
}

enum RefreshCommand {
    Refresh {
        /// `None` means the active sector at the time the command is handled.
        sector: Option<Sector>,
        force_refresh: bool,
        trigger: RefreshTrigger,
        reply: Option<oneshot::Sender<RefreshResult>>,
    },
    SetSector(Sector),
}

/// Handle to the task that owns refresh cycles, the periodic timer and the
/// pending queue. Cloning is cheap; the task stops when the last clone is
/// dropped or [`RefreshOrchestrator::stop`] is called.
#[derive(Debug, Clone)]
pub struct RefreshOrchestrator {
    state: watch::Receiver<DashboardState>,
    sender: UnboundedSender<RefreshCommand>,
    cancellation_token: CancellationToken,
    _task_guard: Arc<DropGuard>,
}

impl std::fmt::Debug for RefreshCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshCommand::Refresh {
                sector,
                force_refresh,
                trigger,
                ..
            } => write!(f, "Refresh({sector:?}, force_refresh={force_refresh}, {trigger})"),
            RefreshCommand::SetSector(sector) => write!(f, "SetSector({sector})"),
        }
    }
}

impl RefreshOrchestrator {
    /// Spawns the refresh task and immediately issues the first refresh for `sector`.
    pub fn spawn(client: Arc<dyn FeedClient>, settings: RefreshSettings, sector: Sector) -> Self {
        let (sender, receiver) = unbounded_channel();
        let (state_sender, state_receiver) = watch::channel(DashboardState {
            sector,
            ..Default::default()
        });
        let cancellation_token = CancellationToken::new();
        let task_guard = cancellation_token.clone().drop_guard();

        let mut worker = RefreshWorker {
            cycle: RefreshCycle::new(client, settings.feed_timeout),
            interval: settings.interval,
            timer: None,
            pending: VecDeque::new(),
            receiver,
            state: state_sender,
        };
        worker.rearm_timer();
        worker.enqueue(sector, false, RefreshTrigger::Mount, None);

        tokio::spawn({
            let cancellation_token = cancellation_token.clone();
            async move {
                tokio::select! {
                    biased;
                    _ = cancellation_token.cancelled() => {},
                    _ = worker.run() => {},
                }
                debug!("refresh orchestrator stopped");
            }
        });

        Self {
            state: state_receiver,
            sender,
            cancellation_token,
            _task_guard: Arc::new(task_guard),
        }
    }

    /// Refreshes `sector` and waits for the resulting snapshot. A sector other
    /// than the active one becomes the active sector first.
    pub async fn refresh(&self, sector: Sector, force_refresh: bool) -> RefreshResult {
        let (reply, response) = oneshot::channel();
        self.send(RefreshCommand::Refresh {
            sector: Some(sector),
            force_refresh,
            trigger: RefreshTrigger::Direct,
            reply: Some(reply),
        });
        response.await.unwrap_or(Err(CycleError::Stopped))
    }

    /// Queues a manual refresh of the active sector without waiting for it.
    pub fn refresh_now(&self, force_refresh: bool) {
        self.send(RefreshCommand::Refresh {
            sector: None,
            force_refresh,
            trigger: RefreshTrigger::Manual,
            reply: None,
        });
    }

    /// Activates `sector`. Refreshes it once and re-arms the periodic timer;
    /// selecting the already active sector does nothing.
    ///
    /// While a cycle is in flight the switch is applied once that cycle
    /// settles: until then [`Self::sector`] reports the previous sector and
    /// the new timer period starts from the moment the switch is applied.
    pub fn set_sector(&self, sector: Sector) {
        self.send(RefreshCommand::SetSector(sector));
    }

    pub fn sector(&self) -> Sector {
        self.state.borrow().sector
    }

    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.borrow().snapshot.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.borrow().refreshing
    }

    pub fn last_error(&self) -> Option<CycleError> {
        self.state.borrow().last_error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    /// Calls `callback` for every snapshot published after this call. The
    /// listener ends with the orchestrator or when the handle is aborted.
    pub fn on_snapshot_changed<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(Arc<Snapshot>) + Send + 'static,
    {
        let mut state = self.state.clone();
        let mut last_seen = state.borrow_and_update().snapshot.clone();
        tokio::spawn(async move {
            while state.changed().await.is_ok() {
                let current = state.borrow_and_update().snapshot.clone();
                let Some(snapshot) = current else {
                    continue;
                };
                if last_seen.as_ref().is_some_and(|seen| Arc::ptr_eq(seen, &snapshot)) {
                    continue;
                }
                last_seen = Some(snapshot.clone());
                callback(snapshot);
            }
        })
    }

    pub fn stop(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancellation_token.is_cancelled() || self.sender.is_closed()
    }

    fn send(&self, command: RefreshCommand) {
        if let Err(err) = self.sender.send(command) {
            warn!("refresh orchestrator is gone, dropping {:?}", err.0);
        }
    }
}

struct PendingRefresh {
    sector: Sector,
    force_refresh: bool,
    trigger: RefreshTrigger,
    replies: Vec<oneshot::Sender<RefreshResult>>,
}

struct RefreshWorker {
    cycle: RefreshCycle,
    interval: Option<Duration>,
    timer: Option<Interval>,
    pending: VecDeque<PendingRefresh>,
    receiver: UnboundedReceiver<RefreshCommand>,
    state: watch::Sender<DashboardState>,
}

impl RefreshWorker {
    async fn run(&mut self) {
        loop {
            if let Some(request) = self.pending.pop_front() {
                self.execute(request).await;
                // Commands that arrived during the cycle are queued behind it.
                while let Ok(command) = self.receiver.try_recv() {
                    self.handle(command);
                }
                continue;
            }

            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = next_tick(&mut self.timer) => {
                    let sector = self.active_sector();
                    self.enqueue(sector, false, RefreshTrigger::Periodic, None);
                }
            }
        }
    }

    fn active_sector(&self) -> Sector {
        self.state.borrow().sector
    }

    fn handle(&mut self, command: RefreshCommand) {
        debug!(?command, "refresh command");
        match command {
            RefreshCommand::Refresh {
                sector,
                force_refresh,
                trigger,
                reply,
            } => {
                let sector = sector.unwrap_or_else(|| self.active_sector());
                self.switch_sector(sector);
                self.enqueue(sector, force_refresh, trigger, reply);
            }
            RefreshCommand::SetSector(sector) => self.switch_sector(sector),
        }
    }

    fn switch_sector(&mut self, sector: Sector) {
        let previous = self.active_sector();
        if previous == sector {
            return;
        }
        info!(%previous, %sector, "switching sector");
        self.state.send_modify(|state| state.sector = sector);

        for stale in self.pending.iter_mut().filter(|request| request.sector != sector) {
            for reply in stale.replies.drain(..) {
                let _ = reply.send(Err(CycleError::Superseded {
                    requested: stale.sector,
                    active: sector,
                }));
            }
        }
        self.pending.retain(|request| request.sector == sector);

        self.rearm_timer();
        self.enqueue(sector, false, RefreshTrigger::SectorChange, None);
    }

    /// Queues a cycle, merging into the last queued one when it targets the same sector.
    fn enqueue(
        &mut self,
        sector: Sector,
        force_refresh: bool,
        trigger: RefreshTrigger,
        reply: Option<oneshot::Sender<RefreshResult>>,
    ) {
        if let Some(queued) = self.pending.back_mut().filter(|queued| queued.sector == sector) {
            debug!(%sector, %trigger, queued = %queued.trigger, "coalescing refresh request");
            queued.force_refresh |= force_refresh;
            if force_refresh {
                queued.trigger = trigger;
            }
            queued.replies.extend(reply);
            return;
        }

        self.pending.push_back(PendingRefresh {
            sector,
            force_refresh,
            trigger,
            replies: reply.into_iter().collect(),
        });
    }

    fn rearm_timer(&mut self) {
        self.timer = self.interval.filter(|period| !period.is_zero()).map(|period| {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });
    }

    async fn execute(&mut self, request: PendingRefresh) {
        let PendingRefresh {
            sector,
            force_refresh,
            trigger,
            replies,
        } = request;

        info!(%sector, force_refresh, %trigger, "refresh cycle started");
        self.state.send_modify(|state| {
            state.refreshing = true;
            state.last_trigger = Some(trigger);
        });

        let result = self.cycle.run(sector, force_refresh).await.map(Arc::new);

        match &result {
            Ok(snapshot) => {
                let fallback_feeds = snapshot.fallback_feeds();
                if fallback_feeds.is_empty() {
                    info!(%sector, force_refresh, %trigger, "refresh cycle finished");
                } else {
                    info!(%sector, force_refresh, %trigger, ?fallback_feeds, "refresh cycle finished with fallback data");
                }
                self.state.send_modify(|state| {
                    state.snapshot = Some(snapshot.clone());
                    state.last_error = None;
                    state.refreshing = false;
                });
            }
            Err(err) => {
                error!(%sector, force_refresh, %trigger, "refresh cycle failed: {err}");
                self.state.send_modify(|state| {
                    state.last_error = Some(err.clone());
                    state.refreshing = false;
                });
            }
        }

        for reply in replies {
            let _ = reply.send(result.clone());
        }
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
