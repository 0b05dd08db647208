//! HLS mocker - upload an mp4, stream it back as HLS for a limited time.
//!
//! Hexagonal Architecture:
//! - domain/: Asset naming rules and the expiry tracker
//! - ports/: Trait definitions (storage, transcoder)
//! - adapters/: Concrete implementations (filesystem, ffmpeg, HTTP)
//! - application/: Upload service, transcode runner, cleanup sweeper
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod clock;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use adapters::local::{http, FfmpegExecutor, FsAdapter};
pub use config::Config;
pub use domain::{Asset, ExpiryTracker};
