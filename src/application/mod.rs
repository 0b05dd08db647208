//! Application layer - Services wiring the domain to the ports.

pub mod sweeper;
pub mod transcode;
pub mod upload;

pub use sweeper::{SweepReport, Sweeper};
pub use upload::{UploadError, UploadReceipt, UploadService};
