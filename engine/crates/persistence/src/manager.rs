use std::path::{Path, PathBuf};

use crate::codec::{self, Format};
use crate::error::PersistenceError;
use crate::registry::{ComponentList, ContextList};
use crate::snapshot::Snapshot;

/// Manages snapshot persistence to disk.
pub struct SnapshotManager {
    save_dir: PathBuf,
    format: Format,
}

impl SnapshotManager {
    pub fn new(save_dir: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            save_dir: save_dir.into(),
            format,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn latest_path(&self) -> PathBuf {
        self.save_dir.join(format!("latest.{}", self.format.extension()))
    }

    /// Save a snapshot to disk as `snapshot_<label>` and as the latest save.
    pub fn save<C: ComponentList, X: ContextList>(
        &self,
        snapshot: &Snapshot<C, X>,
        label: &str,
    ) -> Result<PathBuf, PersistenceError> {
        std::fs::create_dir_all(&self.save_dir)?;

        let filename = format!("snapshot_{}.{}", label, self.format.extension());
        let path = self.save_dir.join(&filename);

        let bytes = codec::encode(snapshot, self.format)?;

        // Write to temp file first, then rename for atomicity
        let tmp_path = self.save_dir.join(format!("{}.tmp", filename));
        std::fs::write(&tmp_path, &bytes)?;
        std::fs::rename(&tmp_path, &path)?;

        let latest_path = self.latest_path();
        let latest_tmp = latest_path.with_extension(format!("{}.tmp", self.format.extension()));
        std::fs::write(&latest_tmp, &bytes)?;
        std::fs::rename(&latest_tmp, &latest_path)?;

        tracing::info!(
            format = %self.format,
            bytes = bytes.len(),
            path = %path.display(),
            "Snapshot saved"
        );

        Ok(path)
    }

    /// Load the latest snapshot from disk.
    pub fn load_latest<C: ComponentList, X: ContextList>(
        &self,
    ) -> Result<Snapshot<C, X>, PersistenceError> {
        self.load_from_path(&self.latest_path())
    }

    /// Load a snapshot from a specific path.
    pub fn load_from_path<C: ComponentList, X: ContextList>(
        &self,
        path: &Path,
    ) -> Result<Snapshot<C, X>, PersistenceError> {
        let bytes = std::fs::read(path)?;
        let snapshot = codec::decode::<C, X>(&bytes, self.format)?;
        tracing::info!(
            format = %self.format,
            bytes = bytes.len(),
            path = %path.display(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Check if a latest snapshot exists.
    pub fn has_latest(&self) -> bool {
        self.latest_path().exists()
    }
}
