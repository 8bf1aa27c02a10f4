//! Terminal front end of the call-center dashboard: console commands, table
//! rendering and the interactive loop driving the refresh orchestrator.

#[macro_use]
extern crate tracing;

mod app;
pub mod console;
pub mod logging;
pub mod report;

pub use app::App;
pub use callcenter_dashboard_config::{
    Args,
    Config,
};
pub use logging::{
    init_errors,
    init_logging,
};
