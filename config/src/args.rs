use crate::{
    RosterFilter,
    Sector,
};
use clap::Parser;
use std::{
    path::PathBuf,
    time::Duration,
};

/// Call-center agent performance dashboard
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Base URL of the metrics API, overrides the stored configuration.
    #[clap(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Sector to display (`suporte` or `comercial`). Defaults to the last selected sector.
    #[clap(long, value_name = "SECTOR")]
    pub sector: Option<Sector>,

    /// Interval between automatic refreshes (e.g. "1h", "15m"). "0s" disables them.
    #[clap(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub refresh_interval: Option<Duration>,

    /// Upper bound for a single feed request (e.g. "30s").
    #[clap(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub request_timeout: Option<Duration>,

    /// Initial roster filter (`all`, `interns` or `staff`).
    #[clap(long, value_name = "FILTER")]
    pub filter: Option<RosterFilter>,

    /// Run a single refresh cycle, print the report and exit.
    #[clap(long, action)]
    pub once: bool,

    /// Also write the JSON summary of every rendered snapshot to this file.
    #[clap(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Mirror logs to stderr.
    #[clap(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(api_url) = &self.api_url {
                cache.insert("api_url".to_string(), api_url.clone().into());
            }
            if let Some(interval) = &self.refresh_interval {
                cache.insert("refresh_interval_ms".to_string(), (interval.as_millis() as u64).into());
            }
            if let Some(timeout) = &self.request_timeout {
                cache.insert("request_timeout_ms".to_string(), (timeout.as_millis() as u64).into());
            }
            if let Some(filter) = &self.filter {
                cache.insert("roster_filter".to_string(), filter.to_string().into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "\
Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}
