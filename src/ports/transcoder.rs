use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Output;

/// Runs the external transcoder that turns an mp4 into an HLS playlist plus segments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscodeExecutor: Send + Sync {
    /// Transcode `input` and write the playlist to `playlist` (segments land next to it).
    async fn run_hls_transcode(&self, input: &Path, playlist: &Path) -> io::Result<Output>;
}
