// src/acquisition/synthetic.rs
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use log::{debug, info};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::acquisition::{SampleBlock, SignalSource};
use crate::display::DisplayError;
/// Flag bit set on samples that carry a spike / event marker.
pub const EVENT_BIT: u16 = 0b01;
/// Flag bit set while a stimulation pulse is active.
pub const STIM_BIT: u16 = 0b10;
/// Parameters of one generated signal.
#[derive(Clone, Debug)]
pub struct SyntheticChannel {
    pub label: String,
    pub freq_hz: f64,
    pub phase: f64,
    pub amplitude: f32,
    pub noise: f32,
    /// Mean event rate; events set `EVENT_BIT` and add a brief spike to the waveform.
    pub event_rate_hz: f64,
    /// Stimulation pulse period; `None` for channels without stimulation.
    pub stim_period_s: Option<f64>,
}
impl SyntheticChannel {
    pub fn sine(label: impl Into<String>, freq_hz: f64, amplitude: f32) -> Self {
        Self {
            label: label.into(),
            freq_hz,
            phase: 0.0,
            amplitude,
            noise: 0.0,
            event_rate_hz: 0.0,
            stim_period_s: None,
        }
    }
}
pub struct SyntheticSource {
    sample_rate_hz: f64,
    block_len: usize,
    channels: Vec<SyntheticChannel>,
    rng: StdRng,
    next_index: u64,
}
impl SyntheticSource {
    pub fn new(
        sample_rate_hz: f64,
        block_len: usize,
        channels: Vec<SyntheticChannel>,
        seed: u64,
    ) -> Result<Self, DisplayError> {
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(DisplayError::InvalidSampleRate);
        }
        Ok(Self {
            sample_rate_hz,
            block_len: block_len.max(1),
            channels,
            rng: StdRng::seed_from_u64(seed),
            next_index: 0,
        })
    }
    /// EEG-like demo montage: alpha-band sines, one spiking channel, one stimulated channel.
    pub fn demo(sample_rate_hz: f64, channel_count: usize) -> Result<Self, DisplayError> {
        let channels = (0..channel_count)
            .map(|idx| SyntheticChannel {
                label: format!("A-{idx:03}"),
                freq_hz: 8.0 + idx as f64 * 1.5,
                phase: idx as f64 * 0.6,
                amplitude: 150.0,
                noise: 20.0,
                event_rate_hz: if idx % 4 == 1 { 12.0 } else { 0.0 },
                stim_period_s: if idx % 4 == 2 { Some(0.25) } else { None },
            })
            .collect();
        // ~60 blocks per second
        let block_len = (sample_rate_hz / 60.0).ceil() as usize;
        Self::new(sample_rate_hz, block_len, channels, 0x5eed)
    }
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
    pub fn channels(&self) -> &[SyntheticChannel] {
        &self.channels
    }
    pub fn channel_labels(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.label.clone()).collect()
    }
    pub fn generate(&mut self) -> SampleBlock {
        let n = self.block_len;
        let mut analog = Array2::<f32>::zeros((self.channels.len(), n));
        let mut digital = Array2::<u16>::zeros((self.channels.len(), n));
        for (c, ch) in self.channels.iter().enumerate() {
            let event_p = ch.event_rate_hz / self.sample_rate_hz;
            let stim = ch.stim_period_s.map(|period| {
                let period = ((period * self.sample_rate_hz).round() as u64).max(1);
                // 1 ms pulse at the start of each period
                let pulse = ((0.001 * self.sample_rate_hz).round() as u64).max(1);
                (period, pulse)
            });
            for i in 0..n {
                let index = self.next_index + i as u64;
                let t = index as f64 / self.sample_rate_hz;
                let mut value = ((2.0 * PI * ch.freq_hz * t + ch.phase).sin() as f32) * ch.amplitude;
                if ch.noise > 0.0 {
                    value += self.rng.gen_range(-ch.noise..ch.noise);
                }
                let mut word = 0u16;
                if event_p > 0.0 && self.rng.gen_bool(event_p.min(1.0)) {
                    word |= EVENT_BIT;
                    value -= 3.0 * ch.amplitude;
                }
                if let Some((period, pulse)) = stim {
                    if index % period < pulse {
                        word |= STIM_BIT;
                    }
                }
                analog[[c, i]] = value;
                digital[[c, i]] = word;
            }
        }
        self.next_index += n as u64;
        SampleBlock::new(self.sample_rate_hz, analog, digital)
    }
}
impl SignalSource for SyntheticSource {
    fn next_block(&mut self) -> Result<Option<SampleBlock>, DisplayError> {
        Ok(Some(self.generate()))
    }
}
/// Runs `source` on a producer thread, paced to real time, until `stop` is set or the
/// receiving side hangs up.
pub fn spawn_thread(
    mut source: SyntheticSource,
    tx: Sender<SampleBlock>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!(
            "synthetic acquisition started: {} channels at {} Hz",
            source.channels.len(),
            source.sample_rate_hz
        );
        let started = Instant::now();
        let mut produced = 0.0f64;
        while !stop.load(Ordering::Relaxed) {
            let block = match source.next_block() {
                Ok(Some(block)) => block,
                _ => break,
            };
            produced += block.duration().as_secs_f64();
            if tx.send(block).is_err() {
                debug!("display side hung up; stopping acquisition");
                break;
            }
            let ahead = produced - started.elapsed().as_secs_f64();
            if ahead > 0.0 {
                thread::sleep(std::time::Duration::from_secs_f64(ahead));
            }
        }
        info!("synthetic acquisition stopped");
    })
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    #[test]
    fn generation_is_deterministic_per_seed() {
        let make = || SyntheticSource::demo(1000.0, 4).unwrap();
        let (mut a, mut b) = (make(), make());
        for _ in 0..3 {
            let (x, y) = (a.generate(), b.generate());
            assert_eq!(x.analog, y.analog);
            assert_eq!(x.digital, y.digital);
        }
    }
    #[test]
    fn clean_sine_has_expected_shape() {
        let mut src =
            SyntheticSource::new(1000.0, 250, vec![SyntheticChannel::sine("S", 1.0, 10.0)], 1).unwrap();
        let block = src.generate();
        assert_eq!(block.num_channels(), 1);
        assert_eq!(block.samples_per_channel(), 250);
        assert!(block.analog[[0, 0]].abs() < 1e-6);
        assert!((block.analog[[0, 249]] - 10.0).abs() < 0.01);
        assert!(block.digital.iter().all(|w| *w == 0));
    }
    #[test]
    fn stim_channel_raises_stim_bit_each_period() {
        let mut ch = SyntheticChannel::sine("S", 1.0, 1.0);
        ch.stim_period_s = Some(0.1);
        let mut src = SyntheticSource::new(1000.0, 1000, vec![ch], 1).unwrap();
        let block = src.generate();
        let pulses = block.digital.iter().filter(|w| **w & STIM_BIT != 0).count();
        assert_eq!(pulses, 10);
    }
    #[test]
    fn producer_thread_stops_on_flag() {
        let (tx, rx) = channel();
        let stop = Arc::new(AtomicBool::new(false));
        let src = SyntheticSource::new(10_000.0, 100, vec![SyntheticChannel::sine("S", 5.0, 1.0)], 3).unwrap();
        let handle = spawn_thread(src, tx, stop.clone());
        let first = rx.recv().unwrap();
        assert_eq!(first.samples_per_channel(), 100);
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();
    }
}
