//! Roll and sweep cursor state machines.
//!
//! Both keep the write cursor (`valid_data_index`) and decide where the newest zones
//! land in a channel's storage. Everything that differs between the two temporal
//! semantics lives here; the engine only talks to `RefreshWindow`.
use std::ops::Range;
use super::config::WindowMode;
use super::geometry::Geometry;
use super::store::ChannelBufferStore;
pub trait RefreshWindow {
    fn mode(&self) -> WindowMode;
    fn reset(&mut self, geometry: &Geometry);
    /// Live frame: move the cursor by one zone.
    fn advance(&mut self, geometry: &Geometry);
    /// Seek frame: `zones` complete zones of history are available to show.
    fn seek(&mut self, geometry: &Geometry, zones: usize);
    fn valid_data_index(&self) -> usize;
    fn sweep_first_time(&self) -> bool;
    /// Zones currently holding (or about to hold) current data.
    fn valid_zones(&self, geometry: &Geometry) -> usize;
    /// First storage unit of each of the newest `zones` zones, oldest first.
    fn zone_starts(&self, geometry: &Geometry, zones: usize) -> Vec<usize>;
    /// Prepares `store` to receive the newest `zones` zones.
    fn make_room(&self, store: &mut ChannelBufferStore, geometry: &Geometry, zones: usize);
    /// Drawable storage ranges, oldest data first.
    fn segments(&self, geometry: &Geometry) -> Vec<Range<usize>>;
    fn refresh_x_position(&self, geometry: &Geometry) -> f32;
}
pub fn window_for(mode: WindowMode, geometry: &Geometry) -> Box<dyn RefreshWindow> {
    let mut window: Box<dyn RefreshWindow> = match mode {
        WindowMode::Roll => Box::new(RollWindow::default()),
        WindowMode::Sweep => Box::new(SweepWindow::default()),
    };
    window.reset(geometry);
    window
}
/// Valid data occupies `[valid_data_index, length)`; new zones enter at the right edge.
#[derive(Clone, Debug, Default)]
pub struct RollWindow {
    valid_data_index: usize,
}
impl RefreshWindow for RollWindow {
    fn mode(&self) -> WindowMode {
        WindowMode::Roll
    }
    fn reset(&mut self, geometry: &Geometry) {
        self.valid_data_index = geometry.length;
    }
    fn advance(&mut self, geometry: &Geometry) {
        self.valid_data_index = self.valid_data_index.saturating_sub(geometry.zone_length);
    }
    fn seek(&mut self, geometry: &Geometry, zones: usize) {
        let zones = zones.min(geometry.num_refresh_zones);
        self.valid_data_index = geometry.length - zones * geometry.zone_length;
    }
    fn valid_data_index(&self) -> usize {
        self.valid_data_index
    }
    fn sweep_first_time(&self) -> bool {
        true
    }
    fn valid_zones(&self, geometry: &Geometry) -> usize {
        (geometry.length - self.valid_data_index) / geometry.zone_length
    }
    fn zone_starts(&self, geometry: &Geometry, zones: usize) -> Vec<usize> {
        let zones = zones.min(geometry.num_refresh_zones);
        (0..zones)
            .map(|k| geometry.length - (zones - k) * geometry.zone_length)
            .collect()
    }
    fn make_room(&self, store: &mut ChannelBufferStore, geometry: &Geometry, zones: usize) {
        // A full-window rewrite needs no shift.
        if geometry.num_refresh_zones > 1 && zones < geometry.num_refresh_zones {
            store.shift_left(zones * geometry.zone_length);
        }
    }
    fn segments(&self, geometry: &Geometry) -> Vec<Range<usize>> {
        non_empty([self.valid_data_index..geometry.length])
    }
    fn refresh_x_position(&self, geometry: &Geometry) -> f32 {
        geometry.unit_x(geometry.length)
    }
}
/// Current pass occupies `[0, valid_data_index)`; after the first pass the rest of the
/// buffer still shows the previous pass.
#[derive(Clone, Debug)]
pub struct SweepWindow {
    valid_data_index: usize,
    sweep_first_time: bool,
}
impl Default for SweepWindow {
    fn default() -> Self {
        Self {
            valid_data_index: 0,
            sweep_first_time: true,
        }
    }
}
impl RefreshWindow for SweepWindow {
    fn mode(&self) -> WindowMode {
        WindowMode::Sweep
    }
    fn reset(&mut self, _geometry: &Geometry) {
        self.valid_data_index = 0;
        self.sweep_first_time = true;
    }
    fn advance(&mut self, geometry: &Geometry) {
        self.valid_data_index += geometry.zone_length;
        if self.valid_data_index > geometry.length {
            self.valid_data_index = geometry.zone_length;
            self.sweep_first_time = false;
        }
    }
    fn seek(&mut self, geometry: &Geometry, zones: usize) {
        let zones = zones.min(geometry.num_refresh_zones);
        self.valid_data_index = zones * geometry.zone_length;
        self.sweep_first_time = true;
    }
    fn valid_data_index(&self) -> usize {
        self.valid_data_index
    }
    fn sweep_first_time(&self) -> bool {
        self.sweep_first_time
    }
    fn valid_zones(&self, geometry: &Geometry) -> usize {
        if self.sweep_first_time {
            self.valid_data_index / geometry.zone_length
        } else {
            geometry.num_refresh_zones
        }
    }
    fn zone_starts(&self, geometry: &Geometry, zones: usize) -> Vec<usize> {
        let mut starts = Vec::with_capacity(zones);
        let mut cursor = self.valid_data_index;
        for _ in 0..zones {
            if cursor < geometry.zone_length {
                break;
            }
            let start = cursor - geometry.zone_length;
            starts.push(start);
            if start > 0 {
                cursor = start;
            } else if self.sweep_first_time {
                // nothing was written before the first pass
                break;
            } else {
                cursor = geometry.length;
            }
        }
        starts.reverse();
        starts
    }
    fn make_room(&self, _store: &mut ChannelBufferStore, _geometry: &Geometry, _zones: usize) {}
    fn segments(&self, geometry: &Geometry) -> Vec<Range<usize>> {
        if self.sweep_first_time {
            non_empty([0..self.valid_data_index])
        } else {
            non_empty([self.valid_data_index..geometry.length, 0..self.valid_data_index])
        }
    }
    fn refresh_x_position(&self, geometry: &Geometry) -> f32 {
        geometry.unit_x(self.valid_data_index)
    }
}
fn non_empty<const N: usize>(ranges: [Range<usize>; N]) -> Vec<Range<usize>> {
    ranges.into_iter().filter(|r| !r.is_empty()).collect()
}
