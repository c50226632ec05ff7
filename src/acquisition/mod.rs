// src/acquisition/mod.rs
// Acquisition-side collaborators of the display engine: the read boundary it consumes,
// an in-memory FIFO implementing it, and a synthetic signal generator.
pub mod fifo;
pub mod source;
pub mod synthetic;
pub use fifo::SampleFifo;
pub use source::{ManualSource, SampleBlock, SignalSource};
pub use synthetic::{spawn_thread, SyntheticChannel, SyntheticSource};
use crate::display::DisplayError;
/// Read access to already-published samples.
///
/// Offsets are relative to the end of the published stream; negative offsets address
/// history. Implementations must reject ranges they do not fully hold.
pub trait AcquisitionReader {
    /// Number of published samples still retained per channel.
    fn available(&self) -> usize;
    fn read_analog(&self, channel: &str, offset: i64, out: &mut [f32]) -> Result<(), DisplayError>;
    fn read_digital(&self, channel: &str, offset: i64, out: &mut [u16]) -> Result<(), DisplayError>;
}
