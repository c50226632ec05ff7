use std::collections::VecDeque;
use std::time::{Duration, SystemTime};
use ndarray::{s, Array2, ArrayView2};
use crate::display::DisplayError;
/// One block of multi-channel samples as published by the acquisition thread.
#[derive(Clone, Debug)]
pub struct SampleBlock {
    pub started_at: SystemTime,
    pub sample_rate_hz: f64,
    pub analog: Array2<f32>,  // channels x samples
    pub digital: Array2<u16>, // channels x samples, event / stimulation flag words
}
impl SampleBlock {
    pub fn new(sample_rate_hz: f64, analog: Array2<f32>, digital: Array2<u16>) -> Self {
        Self {
            started_at: SystemTime::now(),
            sample_rate_hz,
            analog,
            digital,
        }
    }
    pub fn validate(&self) -> Result<(), DisplayError> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(DisplayError::InvalidSampleRate);
        }
        if self.analog.dim() != self.digital.dim() {
            return Err(DisplayError::ChannelMismatch {
                expected: self.analog.nrows(),
                actual: self.digital.nrows(),
            });
        }
        Ok(())
    }
    pub fn num_channels(&self) -> usize {
        self.analog.nrows()
    }
    pub fn samples_per_channel(&self) -> usize {
        self.analog.ncols()
    }
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples_per_channel() as f64 / self.sample_rate_hz)
    }
}
/// Something that can yield sample blocks on demand.
pub trait SignalSource {
    fn next_block(&mut self) -> Result<Option<SampleBlock>, DisplayError>;
}
/// Replays a finished recording block by block, for tests and offline review.
pub struct ManualSource {
    queue: VecDeque<SampleBlock>,
}
impl ManualSource {
    /// Cuts `channels x samples` planes into blocks of `block_len` samples; the last block
    /// may be shorter.
    pub fn from_recording(
        sample_rate_hz: f64,
        analog: ArrayView2<f32>,
        digital: ArrayView2<u16>,
        block_len: usize,
    ) -> Result<Self, DisplayError> {
        if analog.dim() != digital.dim() {
            return Err(DisplayError::ChannelMismatch {
                expected: analog.nrows(),
                actual: digital.nrows(),
            });
        }
        let block_len = block_len.max(1);
        let total = analog.ncols();
        let mut queue = VecDeque::with_capacity(total.div_ceil(block_len));
        let mut start = 0;
        while start < total {
            let end = (start + block_len).min(total);
            let block = SampleBlock::new(
                sample_rate_hz,
                analog.slice(s![.., start..end]).to_owned(),
                digital.slice(s![.., start..end]).to_owned(),
            );
            block.validate()?;
            queue.push_back(block);
            start = end;
        }
        Ok(Self { queue })
    }
    /// Blocks not yet replayed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}
impl SignalSource for ManualSource {
    fn next_block(&mut self) -> Result<Option<SampleBlock>, DisplayError> {
        Ok(self.queue.pop_front())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn validate_rejects_mismatched_planes() {
        let block = SampleBlock::new(1000.0, Array2::zeros((2, 10)), Array2::zeros((3, 10)));
        assert!(matches!(
            block.validate(),
            Err(DisplayError::ChannelMismatch { expected: 2, actual: 3 })
        ));
        let block = SampleBlock::new(0.0, Array2::zeros((2, 10)), Array2::zeros((2, 10)));
        assert!(matches!(block.validate(), Err(DisplayError::InvalidSampleRate)));
    }
    #[test]
    fn recording_is_cut_into_ordered_blocks() {
        let analog = Array2::from_shape_fn((2, 250), |(c, i)| (c * 1000 + i) as f32);
        let digital = Array2::from_shape_fn((2, 250), |(_, i)| (i == 240) as u16);
        let mut source = ManualSource::from_recording(250.0, analog.view(), digital.view(), 100).unwrap();
        assert_eq!(source.remaining(), 3);
        let first = source.next_block().unwrap().unwrap();
        assert!((first.duration().as_secs_f64() - 0.4).abs() < 1e-9);
        assert_eq!(first.analog[[1, 99]], 1099.0);
        source.next_block().unwrap().unwrap();
        let last = source.next_block().unwrap().unwrap();
        assert_eq!(last.samples_per_channel(), 50);
        assert_eq!(last.analog[[0, 0]], 200.0);
        assert_eq!(last.digital[[1, 40]], 1);
        assert!(source.next_block().unwrap().is_none());
    }
    #[test]
    fn recording_with_mismatched_planes_is_rejected() {
        let analog = Array2::<f32>::zeros((2, 10));
        let digital = Array2::<u16>::zeros((1, 10));
        assert!(matches!(
            ManualSource::from_recording(250.0, analog.view(), digital.view(), 4),
            Err(DisplayError::ChannelMismatch { expected: 2, actual: 1 })
        ));
        let planes = Array2::<f32>::zeros((1, 10));
        assert!(matches!(
            ManualSource::from_recording(0.0, planes.view(), Array2::<u16>::zeros((1, 10)).view(), 4),
            Err(DisplayError::InvalidSampleRate)
        ));
    }
}
