use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    env,
    path::PathBuf,
};

/// Directories resolved before the layered config is built. Only the data
/// directory is carried into [`crate::Config`]; the config directory is read
/// once while layering.
#[derive(Clone, Debug, Deserialize, Default)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub(crate) data_dir: PathBuf,
}

/// Overrides are named after the binary, not after this crate:
/// `CALLCENTER_DASHBOARD_DATA` and `CALLCENTER_DASHBOARD_CONFIG`.
const ENV_PREFIX: &str = "CALLCENTER_DASHBOARD";

lazy_static::lazy_static! {
    static ref PROJECT_DIRS: Option<ProjectDirs> = ProjectDirs::from("com", "callcenter", "callcenter-dashboard");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirKind {
    Data,
    Config,
}

impl DirKind {
    fn env_var(self) -> String {
        let suffix = match self {
            DirKind::Data => "DATA",
            DirKind::Config => "CONFIG",
        };
        format!("{ENV_PREFIX}_{suffix}")
    }

    fn from_project(self, dirs: &ProjectDirs) -> PathBuf {
        match self {
            DirKind::Data => dirs.data_local_dir().to_path_buf(),
            DirKind::Config => dirs.config_local_dir().to_path_buf(),
        }
    }

    /// Used when the platform has no home directory to derive one from.
    fn local(self) -> PathBuf {
        match self {
            DirKind::Data => PathBuf::from(".").join(".data"),
            DirKind::Config => PathBuf::from(".").join(".config"),
        }
    }

    fn resolve(self, overridden: Option<PathBuf>, project: Option<&ProjectDirs>) -> PathBuf {
        overridden
            .or_else(|| project.map(|dirs| self.from_project(dirs)))
            .unwrap_or_else(|| self.local())
    }

    fn current(self) -> PathBuf {
        let overridden = env::var_os(self.env_var()).map(PathBuf::from);
        self.resolve(overridden, PROJECT_DIRS.as_ref())
    }
}

pub fn get_data_dir() -> PathBuf {
    DirKind::Data.current()
}

pub fn get_config_dir() -> PathBuf {
    DirKind::Config.current()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_name_the_binary() {
        assert_eq!(DirKind::Data.env_var(), "CALLCENTER_DASHBOARD_DATA");
        assert_eq!(DirKind::Config.env_var(), "CALLCENTER_DASHBOARD_CONFIG");
    }

    #[test]
    fn override_wins_then_project_then_local() {
        let overridden = PathBuf::from("/srv/dashboard");
        assert_eq!(
            DirKind::Data.resolve(Some(overridden.clone()), PROJECT_DIRS.as_ref()),
            overridden
        );
        assert_eq!(DirKind::Config.resolve(None, None), PathBuf::from("./.config"));
        if let Some(dirs) = PROJECT_DIRS.as_ref() {
            assert_eq!(DirKind::Data.resolve(None, Some(dirs)), dirs.data_local_dir());
        }
    }
}
