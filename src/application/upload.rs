use crate::application::transcode::convert_to_hls;
use crate::clock::Clock;
use crate::domain::{Asset, AssetError, ExpiryTracker};
use crate::ports::storage::AssetStore;
use crate::ports::transcoder::TranscodeExecutor;
use axum::body::Bytes;
use axum::BoxError;
use chrono::{DateTime, Utc};
use futures::{Stream, TryStreamExt};
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::{fs::File, io::AsyncWriteExt, io::BufWriter};
use tokio_util::io::StreamReader;
use tracing::{info, warn};

#[derive(Debug)]
pub enum UploadError {
    Invalid(AssetError),
    Multipart(String),
    Io(io::Error),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Invalid(e) => write!(f, "{}", e),
            UploadError::Multipart(e) => write!(f, "Malformed upload: {}", e),
            UploadError::Io(e) => write!(f, "Could not store upload: {}", e),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Invalid(e) => Some(e),
            UploadError::Multipart(_) => None,
            UploadError::Io(e) => Some(e),
        }
    }
}

impl From<AssetError> for UploadError {
    fn from(err: AssetError) -> Self {
        UploadError::Invalid(err)
    }
}

impl From<io::Error> for UploadError {
    fn from(err: io::Error) -> Self {
        UploadError::Io(err)
    }
}

impl From<axum::extract::multipart::MultipartError> for UploadError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        UploadError::Multipart(err.body_text())
    }
}

/// Body returned to the client once an upload is stored.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub message: String,
    pub stream_url: String,
    pub expires_at: DateTime<Utc>,
}

pub struct UploadService {
    store: Arc<dyn AssetStore>,
    transcoder: Arc<dyn TranscodeExecutor>,
    tracker: ExpiryTracker,
    clock: Arc<dyn Clock>,
    public_base_url: String,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn AssetStore>,
        transcoder: Arc<dyn TranscodeExecutor>,
        tracker: ExpiryTracker,
        clock: Arc<dyn Clock>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            transcoder,
            tracker,
            clock,
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Persist the file, start tracking it and kick off the conversion in the background.
    ///
    /// Returns as soon as the conversion is spawned: the playlist advertised in the
    /// receipt may not exist yet, and a failed conversion is only visible in the logs.
    pub async fn accept<S, E>(&self, asset: Asset, body: S) -> Result<UploadReceipt, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let input = self.store.upload_path(&asset);
        info!(asset = asset.name(), path = %input.display(), "Saving upload");

        if let Err(e) = stream_to_file(&input, body).await {
            // Nothing tracks a half-written file, so drop it right away.
            let _ = tokio::fs::remove_file(&input).await;
            return Err(e.into());
        }

        if let Err(e) = self.store.create_output_dir(&asset).await {
            let _ = tokio::fs::remove_file(&input).await;
            return Err(e.into());
        }

        let created_at = self.clock.now();
        self.tracker.record(asset.name(), created_at);

        let playlist = self.store.playlist_path(&asset);
        let transcoder = self.transcoder.clone();
        let key = asset.name().to_owned();
        tokio::spawn(async move {
            if !convert_to_hls(transcoder.as_ref(), &input, &playlist).await {
                warn!(asset = %key, "Stream will stay incomplete");
            }
        });

        Ok(UploadReceipt {
            message: String::from("Conversion started"),
            stream_url: format!("{}/stream/{}", self.public_base_url, asset.stream_path()),
            expires_at: created_at + self.tracker.retention(),
        })
    }
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &Path, stream: S) -> io::Result<()>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    tokio::io::copy(&mut body_reader, &mut file).await?;
    file.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::FsAdapter;
    use crate::clock::ManualClock;
    use crate::ports::transcoder::MockTranscodeExecutor;
    use bytes::Bytes;
    use chrono::{Duration, TimeZone};
    use futures::stream;
    use std::fs;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};
    use tempfile::tempdir;
    use tokio::sync::oneshot;

    type E = std::io::Error;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_stream_to_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.mp4");

        let test_data = "Hello, world!";
        let mock_stream = stream::iter(vec![Ok::<Bytes, E>(Bytes::from(test_data))]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_ok());

        let file_contents = fs::read_to_string(file_path).unwrap();
        assert_eq!(file_contents, test_data);
    }

    #[tokio::test]
    async fn test_stream_to_file_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.mp4");

        let mock_stream = stream::iter(vec![Err("Test error")]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert_eq!(result.unwrap_err().to_string(), "Test error");
    }

    #[tokio::test]
    async fn test_accept_tracks_and_spawns_conversion() {
        let temp_dir = tempdir().unwrap();
        let store = FsAdapter::new(temp_dir.path().join("uploads"), temp_dir.path().join("hls"));
        store.prepare().await.unwrap();

        let (done_tx, done_rx) = oneshot::channel();
        let done_tx = std::sync::Mutex::new(Some(done_tx));
        let mut transcoder = MockTranscodeExecutor::new();
        transcoder
            .expect_run_hls_transcode()
            .times(1)
            .returning(move |input, playlist| {
                if let Some(tx) = done_tx.lock().unwrap().take() {
                    let _ = tx.send((input.to_path_buf(), playlist.to_path_buf()));
                }
                Ok(Output {
                    status: ExitStatus::from_raw(0),
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                })
            });

        let tracker = ExpiryTracker::new(Duration::minutes(60));
        let service = UploadService::new(
            Arc::new(store),
            Arc::new(transcoder),
            tracker.clone(),
            Arc::new(ManualClock::new(t0())),
            "https://streams.example/",
        );

        let body = stream::iter(vec![Ok::<Bytes, E>(Bytes::from_static(b"fake mp4"))]);
        let receipt = service
            .accept(Asset::from_upload_name("clip.mp4").unwrap(), body)
            .await
            .unwrap();

        assert_eq!(receipt.stream_url, "https://streams.example/stream/clip/playlist.m3u8");
        assert_eq!(receipt.expires_at, t0() + Duration::minutes(60));
        assert_eq!(tracker.get("clip.mp4"), Some(t0()));
        assert!(temp_dir.path().join("uploads/clip.mp4").is_file());
        assert!(temp_dir.path().join("hls/clip").is_dir());

        let (input, playlist) = done_rx.await.unwrap();
        assert_eq!(input, temp_dir.path().join("uploads/clip.mp4"));
        assert_eq!(playlist, temp_dir.path().join("hls/clip/playlist.m3u8"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_entry() {
        let temp_dir = tempdir().unwrap();
        let store = FsAdapter::new(temp_dir.path().join("uploads"), temp_dir.path().join("hls"));
        store.prepare().await.unwrap();

        let mut transcoder = MockTranscodeExecutor::new();
        transcoder.expect_run_hls_transcode().times(0);

        let tracker = ExpiryTracker::new(Duration::minutes(60));
        let service = UploadService::new(
            Arc::new(store),
            Arc::new(transcoder),
            tracker.clone(),
            Arc::new(ManualClock::new(t0())),
            "http://localhost:8080",
        );

        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err("connection reset"),
        ]);
        let result = service
            .accept(Asset::from_upload_name("clip.mp4").unwrap(), body)
            .await;

        assert!(matches!(result, Err(UploadError::Io(_))));
        assert!(tracker.is_empty());
        assert!(!temp_dir.path().join("uploads/clip.mp4").exists());
    }

    #[tokio::test]
    async fn test_failed_output_dir_leaves_no_entry() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("uploads")).unwrap();
        // A plain file where the output root should be makes mkdir fail.
        fs::write(temp_dir.path().join("hls"), b"not a directory").unwrap();
        let store = FsAdapter::new(temp_dir.path().join("uploads"), temp_dir.path().join("hls"));

        let mut transcoder = MockTranscodeExecutor::new();
        transcoder.expect_run_hls_transcode().times(0);

        let tracker = ExpiryTracker::new(Duration::minutes(60));
        let service = UploadService::new(
            Arc::new(store),
            Arc::new(transcoder),
            tracker.clone(),
            Arc::new(ManualClock::new(t0())),
            "http://localhost:8080",
        );

        let body = stream::iter(vec![Ok::<Bytes, E>(Bytes::from_static(b"fake mp4"))]);
        let result = service
            .accept(Asset::from_upload_name("clip.mp4").unwrap(), body)
            .await;

        assert!(matches!(result, Err(UploadError::Io(_))));
        assert!(tracker.is_empty());
        assert!(!temp_dir.path().join("uploads/clip.mp4").exists());
    }
}
