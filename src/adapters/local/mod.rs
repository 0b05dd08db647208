//! Local adapters: filesystem storage, ffmpeg process, HTTP surface.

pub mod ffmpeg;
pub mod fs;
pub mod http;

pub use ffmpeg::FfmpegExecutor;
pub use fs::FsAdapter;
