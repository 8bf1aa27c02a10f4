use crate::Sector;
use color_eyre::Result;
use eyre::Context as _;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};

const SECTOR_FILE: &str = "sector.yaml";

/// Key/value persistence for the sector the user selected last.
pub trait SectorStore: Send + Sync {
    fn load(&self) -> Result<Option<Sector>>;

    fn save(&self, sector: Sector) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSector {
    sector: Sector,
}

/// Keeps the selected sector in `sector.yaml` inside the data directory.
#[derive(Debug, Clone)]
pub struct FileSectorStore {
    path: PathBuf,
}

impl FileSectorStore {
    pub fn in_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SECTOR_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SectorStore for FileSectorStore {
    fn load(&self) -> Result<Option<Sector>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(&self.path).wrap_err_with(|| format!("Failed to read {:?}", self.path))?;
        match serde_yml::from_str::<StoredSector>(&content) {
            Ok(stored) => Ok(Some(stored.sector)),
            Err(err) => {
                warn!(path = ?self.path, "Ignoring unreadable sector file: {err}");
                Ok(None)
            }
        }
    }

    fn save(&self, sector: Sector) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let content = serde_yml::to_string(&StoredSector { sector }).context("Failed to serialize sector")?;
        std::fs::write(&self.path, content).wrap_err_with(|| format!("Failed to write sector to {:?}", self.path))
    }
}
