use crate::domain::asset::{normalized_name, Asset};
use crate::ports::storage::AssetStore;
use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Assets stored as plain files: `<upload_dir>/<name>` and `<hls_dir>/<stem>/...`.
#[derive(Clone, Debug)]
pub struct FsAdapter {
    upload_dir: PathBuf,
    hls_dir: PathBuf,
}

impl FsAdapter {
    pub fn new(upload_dir: impl Into<PathBuf>, hls_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            hls_dir: hls_dir.into(),
        }
    }

    pub fn hls_dir(&self) -> &Path {
        &self.hls_dir
    }
}

#[async_trait]
impl AssetStore for FsAdapter {
    async fn prepare(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::create_dir_all(&self.hls_dir).await?;
        Ok(())
    }

    fn upload_path(&self, asset: &Asset) -> PathBuf {
        asset.upload_path(&self.upload_dir)
    }

    fn playlist_path(&self, asset: &Asset) -> PathBuf {
        asset.playlist_path(&self.hls_dir)
    }

    async fn create_output_dir(&self, asset: &Asset) -> io::Result<()> {
        tokio::fs::create_dir_all(asset.output_dir(&self.hls_dir)).await
    }

    async fn remove_asset(&self, asset: &Asset) -> io::Result<()> {
        ignore_missing(tokio::fs::remove_file(asset.upload_path(&self.upload_dir)).await)?;
        ignore_missing(tokio::fs::remove_dir_all(asset.output_dir(&self.hls_dir)).await)?;
        Ok(())
    }

    async fn discover(&self) -> io::Result<Vec<(String, SystemTime)>> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        let mut uploads = tokio::fs::read_dir(&self.upload_dir).await?;
        while let Some(entry) = uploads.next_entry().await? {
            let metadata = entry.metadata().await?;
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Some(key) = normalized_name(&name) else {
                continue;
            };
            if key != name {
                // Keep the file where the sweeper will look for it.
                tokio::fs::rename(entry.path(), self.upload_dir.join(&key)).await?;
            }
            seen.insert(Asset::from_key(&key).stem().to_owned());
            found.push((key, metadata.modified()?));
        }

        // Output directories whose upload is already gone.
        let mut outputs = tokio::fs::read_dir(&self.hls_dir).await?;
        while let Some(entry) = outputs.next_entry().await? {
            let metadata = entry.metadata().await?;
            let Some(stem) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if metadata.is_dir() && !seen.contains(&stem) {
                found.push((Asset::key_for_stream(&stem), metadata.modified()?));
            }
        }

        found.sort();
        Ok(found)
    }
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
