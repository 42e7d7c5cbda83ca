//! Whole-file JSON storage

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::StorageConfig;
use crate::state::CompanyData;
use crate::traits::*;
use crate::types::*;

/// Stores the company snapshot as one pretty-printed JSON document.
///
/// Saves go to a sibling temp file which is then renamed over the target, so
/// a crash mid-write leaves the previous snapshot intact. Snapshots written
/// before godowns or employees existed load with the seed godown and no
/// employees.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the configured snapshot path
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "company.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CompanyStorage for JsonFileStorage {
    async fn load(&self) -> LedgerResult<Option<CompanyData>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut data: CompanyData = serde_json::from_str(&text)?;
        data.normalize_sequence();
        debug!(path = %self.path.display(), vouchers = data.vouchers.len(), "snapshot loaded");
        Ok(Some(data))
    }

    async fn save(&mut self, data: &CompanyData) -> LedgerResult<()> {
        let json = serde_json::to_vec_pretty(data)?;
        let temp_path = self.temp_path();

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!(path = %self.path.display(), bytes = json.len(), "snapshot saved");
        Ok(())
    }
}
