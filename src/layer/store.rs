//! Layer metadata persistence
//!
//! The orchestrator only sees [`LayerStore`]: load the previous metadata once
//! at the start of a build, store the new metadata at most once at the end.

use crate::error::{PylayerError, PylayerResult};
use crate::layer::manifest::{LayerManifest, LayerMetadata, LayerTypes};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Persistent storage for one layer's metadata
#[async_trait]
pub trait LayerStore: Send + Sync {
    /// Directory holding the layer contents
    fn layer_dir(&self) -> PathBuf;

    /// Metadata from the last successful build, if any
    async fn load(&self) -> PylayerResult<Option<LayerMetadata>>;

    /// Replace the persisted metadata
    async fn store(&self, metadata: &LayerMetadata) -> PylayerResult<()>;

    /// Forget the persisted metadata so the next load sees no previous layer.
    ///
    /// Used when the layer contents changed but the new record could not be
    /// written.
    async fn invalidate(&self) -> PylayerResult<()>;
}

/// Stores metadata in `<layers>/<name>.toml`, contents in `<layers>/<name>/`
#[derive(Debug, Clone)]
pub struct FileLayerStore {
    layers_dir: PathBuf,
    name: String,
    types: LayerTypes,
}

impl FileLayerStore {
    pub fn new(layers_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            layers_dir: layers_dir.into(),
            name: name.into(),
            types: LayerTypes::default(),
        }
    }

    /// Override the launch/build/cache flags written with the metadata
    pub fn with_types(mut self, types: LayerTypes) -> Self {
        self.types = types;
        self
    }

    /// Path of the metadata file
    pub fn metadata_path(&self) -> PathBuf {
        self.layers_dir.join(format!("{}.toml", self.name))
    }

    /// Load the full manifest, types included
    pub async fn load_manifest(&self) -> PylayerResult<Option<LayerManifest>> {
        let path = self.metadata_path();

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No layer metadata at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(PylayerError::io(
                    format!("reading layer metadata {}", path.display()),
                    e,
                ))
            }
        };

        match LayerManifest::parse(&content) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(e) => {
                // An unreadable record is treated like no record: rebuild.
                warn!("Ignoring invalid layer metadata {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Remove the layer contents and its metadata.
    ///
    /// Returns whether anything was removed.
    pub async fn clear(&self) -> PylayerResult<bool> {
        let mut removed = false;

        let path = self.metadata_path();
        if path.exists() {
            fs::remove_file(&path).await.map_err(|e| {
                PylayerError::io(format!("removing layer metadata {}", path.display()), e)
            })?;
            removed = true;
        }

        let dir = self.layer_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir).await.map_err(|e| {
                PylayerError::io(format!("removing layer directory {}", dir.display()), e)
            })?;
            removed = true;
        }

        Ok(removed)
    }

    async fn write_atomic(&self, path: &Path, content: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.layers_dir).await?;

        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, path).await
    }
}

#[async_trait]
impl LayerStore for FileLayerStore {
    fn layer_dir(&self) -> PathBuf {
        self.layers_dir.join(&self.name)
    }

    async fn load(&self) -> PylayerResult<Option<LayerMetadata>> {
        Ok(self.load_manifest().await?.map(|m| m.metadata))
    }

    async fn store(&self, metadata: &LayerMetadata) -> PylayerResult<()> {
        let path = self.metadata_path();
        let content = LayerManifest::new(self.types, metadata.clone()).to_toml()?;

        self.write_atomic(&path, &content)
            .await
            .map_err(|e| PylayerError::persist(&path, e))?;

        debug!("Wrote layer metadata {}", path.display());
        Ok(())
    }

    async fn invalidate(&self) -> PylayerResult<()> {
        let path = self.metadata_path();
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed layer metadata {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PylayerError::persist(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn metadata() -> LayerMetadata {
        LayerMetadata {
            version: "3.10.2".to_string(),
            checksum: "sha-3102".to_string(),
            built_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let temp = TempDir::new().unwrap();
        let store = FileLayerStore::new(temp.path(), "cpython");
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_and_load() {
        let temp = TempDir::new().unwrap();
        let store = FileLayerStore::new(temp.path(), "cpython");

        store.store(&metadata()).await.unwrap();

        assert!(temp.path().join("cpython.toml").exists());
        assert!(!temp.path().join("cpython.toml.tmp").exists());
        assert_eq!(store.load().await.unwrap(), Some(metadata()));
    }

    #[tokio::test]
    async fn store_creates_layers_dir() {
        let temp = TempDir::new().unwrap();
        let store = FileLayerStore::new(temp.path().join("nested").join("layers"), "cpython");
        store.store(&metadata()).await.unwrap();
        assert!(store.metadata_path().exists());
    }

    #[tokio::test]
    async fn store_writes_types() {
        let temp = TempDir::new().unwrap();
        let types = LayerTypes {
            launch: true,
            build: false,
            cache: true,
        };
        let store = FileLayerStore::new(temp.path(), "cpython").with_types(types);
        store.store(&metadata()).await.unwrap();

        let manifest = store.load_manifest().await.unwrap().unwrap();
        assert_eq!(manifest.types, types);
    }

    #[tokio::test]
    async fn invalid_metadata_is_treated_as_absent() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("cpython.toml"), "not = [valid").unwrap();
        let store = FileLayerStore::new(temp.path(), "cpython");
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_contents_and_metadata() {
        let temp = TempDir::new().unwrap();
        let store = FileLayerStore::new(temp.path(), "cpython");
        store.store(&metadata()).await.unwrap();
        std::fs::create_dir_all(store.layer_dir()).unwrap();
        std::fs::write(store.layer_dir().join("python.tgz"), b"x").unwrap();

        assert!(store.clear().await.unwrap());
        assert!(!store.metadata_path().exists());
        assert!(!store.layer_dir().exists());
        assert!(!store.clear().await.unwrap());
    }

    #[tokio::test]
    async fn persist_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        // A file where the layers directory should be
        let blocker = temp.path().join("layers");
        std::fs::write(&blocker, b"").unwrap();
        let store = FileLayerStore::new(&blocker, "cpython");

        let err = store.store(&metadata()).await.unwrap_err();
        assert!(matches!(err, PylayerError::Persist { .. }));
    }

    #[tokio::test]
    async fn invalidate_removes_only_metadata() {
        let temp = TempDir::new().unwrap();
        let store = FileLayerStore::new(temp.path(), "cpython");
        store.store(&metadata()).await.unwrap();
        std::fs::create_dir_all(store.layer_dir()).unwrap();

        store.invalidate().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        assert!(store.layer_dir().exists());

        // Nothing left to remove
        store.invalidate().await.unwrap();
    }
}
