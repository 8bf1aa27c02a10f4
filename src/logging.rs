use callcenter_dashboard_config::Config;
use color_eyre::Result;
use eyre::Context as _;
use std::sync::Arc;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

lazy_static::lazy_static! {
    static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

pub fn init_errors() -> Result<()> {
    color_eyre::install()
}

/// Logs to a file in the data directory, mirrored to stderr with `--verbose`.
/// `RUST_LOG` overrides the default levels.
pub fn init_logging(config: &Config) -> Result<()> {
    let directory = config.data_dir();
    std::fs::create_dir_all(directory).wrap_err_with(|| format!("Failed to create data directory {directory:?}"))?;
    let log_path = directory.join(LOG_FILE.as_str());
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .wrap_err_with(|| format!("Failed to open log file {log_path:?}"))?;

    let level = if config.verbose { "debug" } else { "info" };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,callcenter_dashboard={level},callcenter_dashboard_stats={level},callcenter_dashboard_config={level}"
            ))
        })
    };

    let file_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_filter(filter());
    let stderr_layer = config
        .verbose
        .then(|| fmt::layer().with_writer(std::io::stderr).with_filter(filter()));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .wrap_err("Failed to initialize tracing subscriber")?;

    debug!(?log_path, "logging initialized");
    Ok(())
}
