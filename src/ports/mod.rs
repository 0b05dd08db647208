//! Ports - Trait definitions for the outside world.

pub mod storage;
pub mod transcoder;
