//! Domain layer - asset naming rules and expiry bookkeeping.

pub mod asset;
pub mod expiry;

pub use asset::{Asset, AssetError};
pub use expiry::ExpiryTracker;
