// src/lib.rs
pub mod acquisition;
pub mod display;
pub use acquisition::{AcquisitionReader, SampleBlock, SampleFifo, SignalSource};
pub use display::{
    ChannelSpec, DisplayBufferEngine, DisplayError, DisplaySettings, Geometry, ScaleCategory,
    WindowMode,
};
