use crate::domain::Asset;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Create the upload and output roots if they are missing.
    async fn prepare(&self) -> io::Result<()>;

    /// Where the uploaded file for `asset` lives.
    fn upload_path(&self, asset: &Asset) -> PathBuf;

    /// Where the transcoder should write the playlist for `asset`.
    fn playlist_path(&self, asset: &Asset) -> PathBuf;

    /// Create the per asset output directory.
    async fn create_output_dir(&self, asset: &Asset) -> io::Result<()>;

    /// Delete the uploaded file and the whole output directory.
    /// Missing pieces are not an error.
    async fn remove_asset(&self, asset: &Asset) -> io::Result<()>;

    /// Assets found on disk, keyed like the tracker, with their last modification time.
    async fn discover(&self) -> io::Result<Vec<(String, SystemTime)>>;
}
