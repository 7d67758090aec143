//! Storage for the per-session fingerprinting scripts served to devices.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{models::device_session::AssetRef, validation::rules};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Writes the asset; once this returns `Ok` the asset is readable.
    async fn write(&self, asset: &AssetRef, contents: &str) -> anyhow::Result<()>;

    async fn read(&self, asset: &AssetRef) -> anyhow::Result<Option<String>>;

    /// Removes the asset. A missing asset is not an error.
    async fn delete(&self, asset: &AssetRef) -> anyhow::Result<()>;
}

/// Keeps assets as files directly under one directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, asset: &AssetRef) -> anyhow::Result<PathBuf> {
        rules::validate_asset_name(asset.as_str())
            .map_err(|e| anyhow!("invalid asset name {:?}: {}", asset.as_str(), e.code))?;
        Ok(self.root.join(asset.as_str()))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn write(&self, asset: &AssetRef, contents: &str) -> anyhow::Result<()> {
        let path = self.path_for(asset)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create asset dir {}", self.root.display()))?;

        // Write then rename so readers never see a partial script.
        let tmp = path.with_extension("js.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .with_context(|| format!("write asset {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("move asset into {}", path.display()))?;

        tracing::debug!(asset = %asset, bytes = contents.len(), "Stored asset");
        Ok(())
    }

    async fn read(&self, asset: &AssetRef) -> anyhow::Result<Option<String>> {
        let path = self.path_for(asset)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read asset {}", path.display())),
        }
    }

    async fn delete(&self, asset: &AssetRef) -> anyhow::Result<()> {
        let path = self.path_for(asset)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(asset = %asset, "Deleted asset");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("delete asset {}", path.display())),
        }
    }
}
