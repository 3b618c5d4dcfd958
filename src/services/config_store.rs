use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{fs, sync::Mutex};

use crate::{error::StoreError, models::WatchConfig};

/// Flat JSON document holding the watch list and monitor settings.
///
/// Every operation runs under one lock, so concurrent commands never
/// interleave a read with a half-written file. `update` keeps the lock
/// across a whole read-modify-write.
#[derive(Clone)]
pub struct ConfigStore {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<WatchConfig, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked()
            .await
            .inspect_err(|e| tracing::error!("Failed to read configuration file {}: {}", self.path.display(), e))
    }

    pub async fn write(&self, config: &WatchConfig) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write_unlocked(config)
            .await
            .inspect_err(|e| tracing::error!("Failed to write configuration file {}: {}", self.path.display(), e))
    }

    /// Makes sure the document exists and returns its location and raw contents.
    pub async fn open(&self) -> Result<(PathBuf, String), StoreError> {
        let _guard = self.lock.lock().await;
        self.ensure_exists().await?;
        let raw = fs::read_to_string(self.path.as_path()).await?;
        Ok(((*self.path).clone(), raw))
    }

    /// Read, let `f` mutate, write back. Nothing is written when `f` fails.
    pub async fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut WatchConfig) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;

        let mut config = self
            .read_unlocked()
            .await
            .inspect_err(|e| tracing::error!("Failed to read configuration file {}: {}", self.path.display(), e))?;

        let out = f(&mut config)?;

        self.write_unlocked(&config)
            .await
            .inspect_err(|e| tracing::error!("Failed to write configuration file {}: {}", self.path.display(), e))?;

        Ok(out)
    }

    async fn ensure_exists(&self) -> Result<(), StoreError> {
        if fs::try_exists(self.path.as_path()).await? {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let raw = serde_json::to_string_pretty(&WatchConfig::default())?;
        fs::write(self.path.as_path(), raw).await?;
        tracing::info!("created default watch configuration at {}", self.path.display());
        Ok(())
    }

    async fn read_unlocked(&self) -> Result<WatchConfig, StoreError> {
        self.ensure_exists().await?;

        let raw = fs::read_to_string(self.path.as_path()).await?;
        let mut config: WatchConfig = serde_json::from_str(&raw)?;
        config.validate().map_err(StoreError::Invalid)?;
        config.normalize();
        Ok(config)
    }

    async fn write_unlocked(&self, config: &WatchConfig) -> Result<(), StoreError> {
        config.validate().map_err(StoreError::Invalid)?;

        let mut config = config.clone();
        config.normalize();

        let raw = serde_json::to_string_pretty(&config)?;
        fs::write(self.path.as_path(), raw).await?;
        Ok(())
    }
}
