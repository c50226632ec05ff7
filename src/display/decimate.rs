//! Maps one zone of acquired samples onto its destination storage units.
//!
//! Samples are spread over the units with a greedy proportional partition: each unit
//! takes `round(remaining_samples / remaining_units)` samples, left to right, so the
//! rounding error never exceeds one sample. Envelope cells, raster ticks and stimulation
//! flags all use the same partition, keeping markers aligned with the waveform.
use std::ops::Range;
use log::warn;
use super::minmax::MinMax;
use super::store::StorageData;
/// Greedy proportional split of `samples` source samples over `units` destination units.
#[derive(Clone, Debug)]
pub struct Partition {
    next_sample: usize,
    remaining_samples: usize,
    remaining_units: usize,
}
impl Partition {
    pub fn new(samples: usize, units: usize) -> Self {
        Self {
            next_sample: 0,
            remaining_samples: samples,
            remaining_units: units,
        }
    }
}
impl Iterator for Partition {
    type Item = Range<usize>;
    fn next(&mut self) -> Option<Range<usize>> {
        if self.remaining_units == 0 {
            return None;
        }
        // round-half-up of remaining_samples / remaining_units
        let take = (2 * self.remaining_samples + self.remaining_units) / (2 * self.remaining_units);
        let take = take.min(self.remaining_samples);
        let range = self.next_sample..self.next_sample + take;
        self.next_sample += take;
        self.remaining_samples -= take;
        self.remaining_units -= 1;
        Some(range)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining_units, Some(self.remaining_units))
    }
}
impl ExactSizeIterator for Partition {}
/// Min/max envelope of `samples` into `cells`.
///
/// Each cell starts from the previous cell's extremes swapped, so it always reaches back
/// to where the previous cell left off and adjacent vertical segments join without a gap.
pub fn decimate_envelope(samples: &[f32], cells: &mut [MinMax<f32>], carry: &mut Option<MinMax<f32>>) {
    let units = cells.len();
    for (cell, range) in cells.iter_mut().zip(Partition::new(samples.len(), units)) {
        let chunk = &samples[range];
        let Some((&first, rest)) = chunk.split_first() else {
            *cell = carry.unwrap_or_default();
            continue;
        };
        let mut mm = match carry {
            Some(prev) => {
                let mut seeded = prev.swapped();
                seeded.update(first);
                seeded
            }
            None => MinMax::new(first),
        };
        for &value in rest {
            mm.update(value);
        }
        *cell = mm;
        *carry = Some(mm);
    }
}
/// A unit is active if any of its samples carries an event.
pub fn decimate_raster(words: &[u16], cells: &mut [bool]) {
    let units = cells.len();
    for (cell, range) in cells.iter_mut().zip(Partition::new(words.len(), units)) {
        *cell = words[range].iter().any(|w| *w != 0);
    }
}
/// Bitwise OR of every flag word that falls in a unit.
pub fn decimate_flags(words: &[u16], cells: &mut [u16]) {
    let units = cells.len();
    for (cell, range) in cells.iter_mut().zip(Partition::new(words.len(), units)) {
        *cell = words[range].iter().fold(0, |acc, w| acc | *w);
    }
}
/// Writes one zone of source data into `units` of a channel's storage.
///
/// `analog` feeds raw and envelope storage; `digital` feeds raster storage and the
/// stimulation flag plane. Either may be empty when the channel does not use it.
pub fn write_zone(
    data: &mut StorageData,
    flags: Option<&mut Vec<u16>>,
    units: Range<usize>,
    analog: &[f32],
    digital: &[u16],
    carry: &mut Option<MinMax<f32>>,
) {
    if units.is_empty() {
        return;
    }
    match data {
        StorageData::Raw(values) => {
            if analog.len() != units.len() {
                warn!(
                    "direct zone expects {} samples, got {}; zone left unchanged",
                    units.len(),
                    analog.len()
                );
                return;
            }
            values[units.clone()].copy_from_slice(analog);
        }
        StorageData::Envelope(cells) => decimate_envelope(analog, &mut cells[units.clone()], carry),
        StorageData::Raster(cells) => decimate_raster(digital, &mut cells[units.clone()]),
    }
    if let Some(flags) = flags {
        decimate_flags(digital, &mut flags[units]);
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    #[test]
    fn partition_covers_every_sample_once() {
        for (samples, units) in [(15_000, 25), (1001, 7), (10, 10), (3, 5), (0, 4), (999, 1)] {
            let parts: Vec<_> = Partition::new(samples, units).collect();
            assert_eq!(parts.len(), units);
            let mut next = 0;
            for p in &parts {
                assert_eq!(p.start, next);
                next = p.end;
            }
            assert_eq!(next, samples);
            if units > 0 && samples >= units {
                let ideal = samples as f64 / units as f64;
                for p in &parts {
                    assert!((p.len() as f64 - ideal).abs() <= 1.0);
                }
            }
        }
    }
    #[test]
    fn monotonic_zone_gives_contiguous_increasing_cells() {
        let samples: Vec<f32> = (0..15_000).map(|v| v as f32).collect();
        let mut cells = vec![MinMax::default(); 25];
        let mut carry = None;
        decimate_envelope(&samples, &mut cells, &mut carry);
        assert_eq!(cells[0].min, 0.0);
        assert_eq!(cells[24].max, 14_999.0);
        for k in 0..25 {
            assert!(cells[k].min < cells[k].max);
            assert_eq!(cells[k].max, (600 * k + 599) as f32);
            if k > 0 {
                // Adjacent cells meet at exactly one endpoint.
                assert_eq!(cells[k].min, cells[k - 1].max);
            }
        }
        assert_eq!(carry, Some(cells[24]));
    }
    #[test]
    fn falling_signal_joins_at_previous_minimum() {
        let samples: Vec<f32> = (0..100).rev().map(|v| v as f32).collect();
        let mut cells = vec![MinMax::default(); 10];
        let mut carry = None;
        decimate_envelope(&samples, &mut cells, &mut carry);
        for k in 1..10 {
            assert_eq!(cells[k].max, cells[k - 1].min);
        }
    }
    #[test]
    fn envelope_bounds_every_assigned_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<f32> = (0..4321).map(|_| rng.gen_range(-300.0..300.0)).collect();
        let mut cells = vec![MinMax::default(); 37];
        let mut carry = Some(MinMax { min: -5.0, max: 5.0 });
        decimate_envelope(&samples, &mut cells, &mut carry);
        for (cell, range) in cells.iter().zip(Partition::new(samples.len(), cells.len())) {
            assert!(cell.min <= cell.max);
            for s in &samples[range] {
                assert!(cell.contains(*s));
            }
        }
    }
    #[test]
    fn raster_is_logical_or() {
        let mut words = vec![0u16; 40];
        words[3] = 1;
        words[39] = 4;
        let mut cells = vec![false; 4];
        decimate_raster(&words, &mut cells);
        assert_eq!(cells, vec![true, false, false, true]);
    }
    #[test]
    fn flags_share_the_waveform_partition() {
        let words: Vec<u16> = (0..12).map(|i| if i == 5 { 0b10 } else if i == 6 { 0b01 } else { 0 }).collect();
        let mut cells = vec![0u16; 3];
        decimate_flags(&words, &mut cells);
        assert_eq!(cells, vec![0, 0b11, 0]);
    }
    #[test]
    fn raw_zone_is_copied_verbatim() {
        let mut data = StorageData::Raw(vec![0.0; 8]);
        let mut flags = vec![0u16; 8];
        let mut carry = None;
        write_zone(&mut data, Some(&mut flags), 4..8, &[1.0, 2.0, 3.0, 4.0], &[0, 1, 0, 2], &mut carry);
        assert_eq!(data, StorageData::Raw(vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0]));
        assert_eq!(flags, vec![0, 0, 0, 0, 0, 1, 0, 2]);
        assert!(carry.is_none());
    }
    #[test]
    fn short_direct_zone_is_rejected_whole() {
        let mut data = StorageData::Raw(vec![7.0; 6]);
        let mut flags = vec![0u16; 6];
        let mut carry = None;
        write_zone(&mut data, Some(&mut flags), 3..6, &[1.0, 2.0], &[1, 1], &mut carry);
        assert_eq!(data, StorageData::Raw(vec![7.0; 6]));
        assert_eq!(flags, vec![0; 6]);
    }
    #[test]
    fn empty_unit_range_is_a_no_op() {
        let mut data = StorageData::Envelope(vec![MinMax::new(9.0); 4]);
        let mut carry = None;
        write_zone(&mut data, None, 2..2, &[1.0, 2.0], &[], &mut carry);
        assert_eq!(data, StorageData::Envelope(vec![MinMax::new(9.0); 4]));
    }
}
