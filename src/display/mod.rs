// src/display/mod.rs
// Windowed display buffers: geometry, per-channel storage, decimation and the
// roll/sweep refresh engine.
pub mod config;
pub mod decimate;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod minmax;
pub mod store;
pub mod window;
pub use config::{DisplaySettings, ScaleCategory, ScaleSettings, WindowMode};
pub use decimate::Partition;
pub use engine::{DisplayBufferEngine, ScaleUsage};
pub use error::DisplayError;
pub use geometry::Geometry;
pub use minmax::MinMax;
pub use store::{ChannelBufferStore, ChannelSpec, StorageData, StorageKind};
pub use window::{window_for, RefreshWindow, RollWindow, SweepWindow};
