#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod roster_filter;
mod sector;
mod sector_store;

use app_config::AppConfig;
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::Args;
pub use roster_filter::{
    RosterFilter,
    RosterFilterIter,
};
pub use sector::{
    Sector,
    SectorIter,
};
pub use sector_store::{
    FileSectorStore,
    SectorStore,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    path::Path,
    time::Duration,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub(crate) app_config: AppConfig,
    pub api_url: url::Url,
    #[serde(default)]
    pub default_sector: Sector,
    /// Zero disables the periodic refresh.
    pub refresh_interval_ms: u64,
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub roster_filter: RosterFilter,
    #[serde(default)]
    pub verbose: bool,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        cache.insert("api_url".to_string(), self.api_url.to_string().into());
        cache.insert("default_sector".to_string(), self.default_sector.to_string().into());
        cache.insert("refresh_interval_ms".to_string(), self.refresh_interval_ms.into());
        cache.insert("request_timeout_ms".to_string(), self.request_timeout_ms.into());
        cache.insert("roster_filter".to_string(), self.roster_filter.to_string().into());
        cache.insert("verbose".to_string(), self.verbose.into());
        Ok(cache)
    }
}

impl Config {
    /// Layers the built-in defaults, an optional `config.yaml` from the config
    /// directory and the command-line arguments, in that order.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder =
            config::Config::builder().set_default("data_dir", data_dir.to_string_lossy().to_string())?;

        builder = builder.add_source(Config::default());

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_ms > 0).then(|| Duration::from_millis(self.refresh_interval_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    pub fn sector_store(&self) -> FileSectorStore {
        FileSectorStore::in_data_dir(self.data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_embedded_yaml() {
        let config = Config::default();
        assert_eq!(config.api_url.as_str(), "http://localhost:9494/");
        assert_eq!(config.default_sector, Sector::Support);
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(3600)));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.roster_filter, RosterFilter::All);
    }

    #[test]
    fn zero_interval_disables_the_timer() {
        let config = Config {
            refresh_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn arguments_override_defaults() {
        let args = Args {
            api_url: Some("http://metrics.internal:9494".to_string()),
            refresh_interval: Some(Duration::from_secs(900)),
            request_timeout: Some(Duration::from_secs(5)),
            filter: Some(RosterFilter::Interns),
            ..Args::default()
        };
        let config: Config = config::Config::builder()
            .add_source(Config::default())
            .add_source(args)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api_url.host_str(), Some("metrics.internal"));
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(900)));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.roster_filter, RosterFilter::Interns);
    }
}
