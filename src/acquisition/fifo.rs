use std::collections::HashMap;
use log::warn;
use ndarray::{s, Array2, ArrayView1, ArrayView2};
use crate::acquisition::{AcquisitionReader, SampleBlock};
use crate::display::DisplayError;
/// Bounded per-channel sample history.
///
/// Pushed samples are *pending* until the display thread commits them; readers only see
/// committed samples, addressed by offset from the committed end (offset `-n` is the
/// sample `n` positions before the end). This lets the host hand the engine exactly one
/// zone of new data per frame.
pub struct SampleFifo {
    channel_labels: Vec<String>,
    rows: HashMap<String, usize>,
    analog: Array2<f32>,  // channel -> ring of samples
    digital: Array2<u16>, // channel -> ring of flag words
    capacity: usize,
    written: u64,
    committed: u64,
}
impl SampleFifo {
    pub fn new(channel_labels: Vec<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let rows = channel_labels
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let channels = channel_labels.len();
        Self {
            channel_labels,
            rows,
            analog: Array2::zeros((channels, capacity)),
            digital: Array2::zeros((channels, capacity)),
            capacity,
            written: 0,
            committed: 0,
        }
    }
    /// Sized to hold `window_samples` of history plus `headroom` samples of pending data.
    pub fn with_history(channel_labels: Vec<String>, window_samples: usize, headroom: usize) -> Self {
        Self::new(channel_labels, window_samples + headroom)
    }
    pub fn channel_labels(&self) -> &[String] {
        &self.channel_labels
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn pending(&self) -> usize {
        (self.written - self.committed) as usize
    }
    pub fn push_block(&mut self, block: &SampleBlock) -> Result<(), DisplayError> {
        block.validate()?;
        self.push(block.analog.view(), block.digital.view())
    }
    /// Appends `channels x samples` planes.
    pub fn push(&mut self, analog: ArrayView2<f32>, digital: ArrayView2<u16>) -> Result<(), DisplayError> {
        let channels = self.channel_labels.len();
        if analog.nrows() != channels {
            return Err(DisplayError::ChannelMismatch {
                expected: channels,
                actual: analog.nrows(),
            });
        }
        if digital.dim() != analog.dim() {
            return Err(DisplayError::ChannelMismatch {
                expected: channels,
                actual: digital.nrows(),
            });
        }
        for i in 0..analog.ncols() {
            let col = (self.written % self.capacity as u64) as usize;
            self.analog.column_mut(col).assign(&analog.column(i));
            self.digital.column_mut(col).assign(&digital.column(i));
            self.written += 1;
        }
        let pending = self.written - self.committed;
        if pending > self.capacity as u64 {
            warn!(
                "display fell behind acquisition; dropping {} uncommitted samples",
                pending - self.capacity as u64
            );
            self.committed = self.written - self.capacity as u64;
        }
        Ok(())
    }
    /// Single multi-channel sample.
    pub fn push_frame(&mut self, analog: &[f32], digital: &[u16]) -> Result<(), DisplayError> {
        let analog = ArrayView2::from_shape((analog.len(), 1), analog).map_err(|_| {
            DisplayError::ChannelMismatch {
                expected: self.channel_labels.len(),
                actual: analog.len(),
            }
        })?;
        let digital = ArrayView2::from_shape((digital.len(), 1), digital).map_err(|_| {
            DisplayError::ChannelMismatch {
                expected: self.channel_labels.len(),
                actual: digital.len(),
            }
        })?;
        self.push(analog, digital)
    }
    /// Exposes up to `count` pending samples to readers; returns how many were committed.
    pub fn commit(&mut self, count: usize) -> usize {
        let n = count.min(self.pending());
        self.committed += n as u64;
        n
    }
    fn oldest_retained(&self) -> u64 {
        self.written.saturating_sub(self.capacity as u64)
    }
    fn locate(&self, channel: &str, offset: i64, count: usize) -> Result<(usize, u64), DisplayError> {
        let row = *self
            .rows
            .get(channel)
            .ok_or_else(|| DisplayError::UnknownChannel(channel.to_owned()))?;
        let start = self.committed as i64 + offset;
        let end = start + count as i64;
        if start < self.oldest_retained() as i64 || end > self.committed as i64 {
            return Err(DisplayError::InsufficientSamples {
                channel: channel.to_owned(),
                requested_start: offset,
                requested: count,
                available: self.available(),
            });
        }
        Ok((row, start as u64))
    }
}
fn copy_ring<T: Copy>(ring: ArrayView1<T>, start: u64, out: &mut [T]) {
    let capacity = ring.len();
    let first = (start % capacity as u64) as usize;
    let head = out.len().min(capacity - first);
    let (front, back) = out.split_at_mut(head);
    for (o, v) in front.iter_mut().zip(ring.slice(s![first..first + head])) {
        *o = *v;
    }
    let tail = back.len();
    for (o, v) in back.iter_mut().zip(ring.slice(s![..tail])) {
        *o = *v;
    }
}
impl AcquisitionReader for SampleFifo {
    fn available(&self) -> usize {
        (self.committed - self.oldest_retained().min(self.committed)) as usize
    }
    fn read_analog(&self, channel: &str, offset: i64, out: &mut [f32]) -> Result<(), DisplayError> {
        let (row, start) = self.locate(channel, offset, out.len())?;
        copy_ring(self.analog.row(row), start, out);
        Ok(())
    }
    fn read_digital(&self, channel: &str, offset: i64, out: &mut [u16]) -> Result<(), DisplayError> {
        let (row, start) = self.locate(channel, offset, out.len())?;
        copy_ring(self.digital.row(row), start, out);
        Ok(())
    }
}
