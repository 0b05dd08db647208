//! Configuration loaded from the environment.

use chrono::Duration;
use std::env;
use std::path::PathBuf;

/// Minutes an asset stays streamable after upload.
pub const RETENTION_MINUTES: i64 = 60;
/// Minutes between two cleanup sweeps.
pub const SWEEP_INTERVAL_MINUTES: u64 = 10;
/// Target duration of a single HLS segment, in seconds.
pub const SEGMENT_SECONDS: u32 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Flat directory holding the uploaded mp4 files
    pub upload_dir: PathBuf,
    /// Root of the HLS output, one subdirectory per asset
    pub hls_dir: PathBuf,
    /// Prefix used to build the `stream_url` handed back to clients
    pub public_base_url: String,
    /// The single origin allowed by the CORS layer
    pub allowed_origin: String,
    /// ffmpeg executable
    pub ffmpeg_bin: String,
    pub retention_minutes: i64,
    pub sweep_interval_minutes: u64,
    pub segment_seconds: u32,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("0.0.0.0")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("8080")),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| String::from("uploads")),
            ),
            hls_dir: PathBuf::from(
                env::var("HLS_DIR").unwrap_or_else(|_| String::from("hls_output")),
            ),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| String::from("http://localhost:8080")),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| String::from("https://mp4-hls-mocker.netlify.app")),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| String::from("ffmpeg")),
            retention_minutes: parse_var("RETENTION_MINUTES", RETENTION_MINUTES),
            sweep_interval_minutes: parse_var("SWEEP_INTERVAL_MINUTES", SWEEP_INTERVAL_MINUTES),
            segment_seconds: parse_var("SEGMENT_SECONDS", SEGMENT_SECONDS),
        }
    }

    pub fn retention(&self) -> Duration {
        Duration::minutes(self.retention_minutes)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_minutes * 60)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: String::from("0.0.0.0"),
            port: String::from("8080"),
            upload_dir: PathBuf::from("uploads"),
            hls_dir: PathBuf::from("hls_output"),
            public_base_url: String::from("http://localhost:8080"),
            allowed_origin: String::from("https://mp4-hls-mocker.netlify.app"),
            ffmpeg_bin: String::from("ffmpeg"),
            retention_minutes: RETENTION_MINUTES,
            sweep_interval_minutes: SWEEP_INTERVAL_MINUTES,
            segment_seconds: SEGMENT_SECONDS,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
