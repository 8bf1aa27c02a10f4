pub mod cycle;
pub mod orchestrator;

pub use cycle::{
    CycleError,
    RefreshCycle,
};
pub use orchestrator::{
    DashboardState,
    RefreshOrchestrator,
    RefreshResult,
    RefreshSettings,
    RefreshTrigger,
};
