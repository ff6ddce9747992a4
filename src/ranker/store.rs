//! Persistence of rank artifacts: one JSON file per modality under the rank
//! output directory, written once at the end of a ranking pass and read back
//! by fusion.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::{Modality, RankError};

pub struct RankStore {
    dir: PathBuf,
}

impl RankStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, modality: Modality) -> PathBuf {
        self.dir.join(modality.artifact_name())
    }

    pub fn save(&self, modality: Modality, values: &[f64]) -> Result<PathBuf, RankError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(modality);
        fs::write(&path, serde_json::to_string(values)?)?;
        info!("{:?} ranking saved to {:?}", modality, path);
        Ok(path)
    }

    pub fn load(&self, modality: Modality) -> Result<Vec<f64>, RankError> {
        let path = self.path_for(modality);
        if !path.is_file() {
            return Err(RankError::FeatureMissing(modality));
        }
        Ok(serde_json::from_str(&fs::read_to_string(&path)?)?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
