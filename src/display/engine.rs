// src/display/engine.rs
use std::collections::BTreeMap;
use std::ops::Range;
use log::{debug, info, warn};
use crate::acquisition::AcquisitionReader;
use super::config::{DisplaySettings, ScaleCategory, ScaleSettings, WindowMode};
use super::decimate::write_zone;
use super::error::DisplayError;
use super::geometry::Geometry;
use super::store::{ChannelBufferStore, ChannelSpec, StorageKind};
use super::window::{window_for, RefreshWindow};
/// Scale categories exercised by the channels refreshed in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScaleUsage {
    bits: u8,
}
impl ScaleUsage {
    pub fn insert(&mut self, category: ScaleCategory) {
        self.bits |= category.bit();
    }
    pub fn contains(&self, category: ScaleCategory) -> bool {
        self.bits & category.bit() != 0
    }
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
    pub fn iter(&self) -> impl Iterator<Item = ScaleCategory> + '_ {
        ScaleCategory::ALL.into_iter().filter(move |c| self.contains(*c))
    }
    /// Each used category paired with its current full-scale value.
    pub fn with_values(&self, scales: &ScaleSettings) -> Vec<(ScaleCategory, f32)> {
        self.iter().map(|c| (c, scales.value(c))).collect()
    }
}
/// Per-channel windowed display buffers refreshed one zone per frame.
///
/// Single-threaded by contract: every call comes from the thread that renders. A frame is
/// `begin_frame` (or `begin_seek_frame`), then at most one load per visible channel, then
/// `end_frame`. Channels skipped in a frame go stale and are backfilled when next loaded.
pub struct DisplayBufferEngine {
    geometry: Geometry,
    window: Box<dyn RefreshWindow>,
    channels: BTreeMap<String, ChannelBufferStore>,
    frame_counter: u64,
    old_data_present: bool,
    scratch_analog: Vec<f32>,
    scratch_digital: Vec<u16>,
}
impl DisplayBufferEngine {
    pub fn new(sample_rate_hz: f64, settings: &DisplaySettings) -> Result<Self, DisplayError> {
        let geometry = Geometry::new(
            sample_rate_hz,
            settings.span_milliseconds,
            settings.max_width_pixels,
            settings.num_refresh_zones,
        )?;
        Ok(Self::with_geometry(geometry, settings.window_mode))
    }
    pub fn with_geometry(geometry: Geometry, mode: WindowMode) -> Self {
        Self {
            window: window_for(mode, &geometry),
            geometry,
            channels: BTreeMap::new(),
            frame_counter: 0,
            old_data_present: false,
            scratch_analog: Vec::new(),
            scratch_digital: Vec::new(),
        }
    }
    /// Recomputes the geometry and discards all channel content.
    ///
    /// Invalid inputs are rejected before anything changes.
    pub fn configure(
        &mut self,
        sample_rate_hz: f64,
        span_milliseconds: f64,
        max_width_pixels: usize,
        num_refresh_zones: usize,
    ) -> Result<(), DisplayError> {
        self.geometry = Geometry::new(
            sample_rate_hz,
            span_milliseconds,
            max_width_pixels,
            num_refresh_zones,
        )?;
        info!(
            "display geometry: {} px, {} samples/zone x {} zones, {} mode, length {}",
            self.geometry.width_pixels,
            self.geometry.samples_per_zone,
            self.geometry.num_refresh_zones,
            if self.geometry.use_envelope_mode { "envelope" } else { "direct" },
            self.geometry.length
        );
        self.reset_all();
        Ok(())
    }
    /// `configure` from shared settings, also adopting their window mode.
    pub fn configure_from(
        &mut self,
        sample_rate_hz: f64,
        settings: &DisplaySettings,
    ) -> Result<(), DisplayError> {
        self.configure(
            sample_rate_hz,
            settings.span_milliseconds,
            settings.max_width_pixels,
            settings.num_refresh_zones,
        )?;
        if settings.window_mode != self.window.mode() {
            self.window = window_for(settings.window_mode, &self.geometry);
        }
        Ok(())
    }
    pub fn register_channel(&mut self, name: &str, spec: ChannelSpec) -> bool {
        if self.channels.contains_key(name) {
            warn!("channel '{name}' is already registered for display");
            return false;
        }
        let store = ChannelBufferStore::new(spec, &self.geometry);
        debug!("registered '{name}' as {:?}", store.kind());
        self.channels.insert(name.to_owned(), store);
        true
    }
    pub fn unregister_channel(&mut self, name: &str) -> bool {
        if self.channels.remove(name).is_none() {
            warn!("cannot unregister unknown channel '{name}'");
            return false;
        }
        true
    }
    pub fn reset_all(&mut self) {
        self.old_data_present = false;
        self.frame_counter = 0;
        self.window.reset(&self.geometry);
        for store in self.channels.values_mut() {
            store.reset(&self.geometry);
        }
    }
    fn ensure_mode(&mut self, mode: WindowMode) {
        if mode != self.window.mode() {
            info!("switching display to {mode:?} mode");
            self.window = window_for(mode, &self.geometry);
            self.reset_all();
        }
    }
    /// Live frame: advances the write cursor by one zone.
    pub fn begin_frame(&mut self, mode: WindowMode) {
        self.ensure_mode(mode);
        self.window.advance(&self.geometry);
        self.frame_counter += 1;
        for store in self.channels.values_mut() {
            store.has_already_loaded_this_frame = false;
        }
    }
    /// Seek frame: `history_samples` acquired samples precede the seek point, so the
    /// window can show that many samples, rounded down to whole zones.
    pub fn begin_seek_frame(&mut self, mode: WindowMode, history_samples: usize) {
        self.ensure_mode(mode);
        let zones = history_samples / self.geometry.samples_per_zone;
        self.window.seek(&self.geometry, zones);
        self.frame_counter += 1;
        for store in self.channels.values_mut() {
            store.has_already_loaded_this_frame = false;
            store.synced_frame = None;
        }
    }
    /// Refreshes `name` from the live tail of `reader`, backfilling any zones the channel
    /// missed while it was not loaded.
    ///
    /// Returns true if the channel holds current data for this frame.
    pub fn load_live_data<R: AcquisitionReader + ?Sized>(&mut self, name: &str, reader: &R) -> bool {
        let geometry = self.geometry;
        let Some(store) = self.channels.get_mut(name) else {
            warn!("load requested for unregistered channel '{name}'");
            return false;
        };
        if store.has_already_loaded_this_frame {
            return true;
        }
        let valid_zones = self.window.valid_zones(&geometry);
        let missed = match store.synced_frame {
            Some(frame) => self.frame_counter.saturating_sub(frame),
            None => u64::MAX,
        };
        if valid_zones == 0 || missed == 0 {
            store.has_already_loaded_this_frame = true;
            store.is_out_of_date = false;
            return true;
        }
        let zones = missed.min(valid_zones as u64) as usize;
        if zones > 1 {
            debug!("'{name}': catching up {zones} zones ({missed} frames stale)");
        }
        let count = zones * geometry.samples_per_zone;
        if let Err(err) = read_source(
            reader,
            name,
            store.kind(),
            store.stim_flags().is_some(),
            i64::try_from(count).map_or(i64::MIN, |c| -c),
            count,
            &mut self.scratch_analog,
            &mut self.scratch_digital,
        ) {
            warn!("skipping refresh: {err}");
            return false;
        }
        if missed > zones as u64 {
            // older zones fell off the window; the continuity chain restarts here
            store.carry = None;
        }
        self.window.make_room(store, &geometry, zones);
        let starts = self.window.zone_starts(&geometry, zones);
        write_zones(
            store,
            &geometry,
            &starts,
            zones,
            &self.scratch_analog,
            &self.scratch_digital,
        );
        store.synced_frame = Some(self.frame_counter);
        store.has_already_loaded_this_frame = true;
        store.is_out_of_date = false;
        true
    }
    /// Refills the whole valid region of `name` from history, starting `start_offset`
    /// samples before the end of `reader`.
    pub fn load_historical_data<R: AcquisitionReader + ?Sized>(
        &mut self,
        name: &str,
        reader: &R,
        start_offset: i64,
    ) -> bool {
        let geometry = self.geometry;
        let Some(store) = self.channels.get_mut(name) else {
            warn!("historical load requested for unregistered channel '{name}'");
            return false;
        };
        if store.has_already_loaded_this_frame {
            return true;
        }
        let zones = self.window.valid_zones(&geometry);
        if zones > 0 {
            let count = zones * geometry.samples_per_zone;
            if let Err(err) = read_source(
                reader,
                name,
                store.kind(),
                store.stim_flags().is_some(),
                start_offset,
                count,
                &mut self.scratch_analog,
                &mut self.scratch_digital,
            ) {
                warn!("skipping historical refresh: {err}");
                return false;
            }
            store.carry = None;
            let starts = self.window.zone_starts(&geometry, zones);
            write_zones(
                store,
                &geometry,
                &starts,
                zones,
                &self.scratch_analog,
                &self.scratch_digital,
            );
        }
        store.synced_frame = Some(self.frame_counter);
        store.has_already_loaded_this_frame = true;
        store.is_out_of_date = false;
        true
    }
    /// Closes the frame: channels not refreshed go stale. Returns the scale categories of
    /// the channels that were refreshed.
    pub fn end_frame(&mut self) -> ScaleUsage {
        self.old_data_present = true;
        let mut usage = ScaleUsage::default();
        for store in self.channels.values_mut() {
            if store.has_already_loaded_this_frame {
                usage.insert(store.scale());
            } else {
                store.is_out_of_date = true;
            }
        }
        usage
    }
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
    pub fn window_mode(&self) -> WindowMode {
        self.window.mode()
    }
    pub fn length(&self) -> usize {
        self.geometry.length
    }
    pub fn zone_length(&self) -> usize {
        self.geometry.zone_length
    }
    pub fn width_pixels(&self) -> usize {
        self.geometry.width_pixels
    }
    pub fn samples_per_zone(&self) -> usize {
        self.geometry.samples_per_zone
    }
    pub fn use_envelope_mode(&self) -> bool {
        self.geometry.use_envelope_mode
    }
    pub fn valid_data_index(&self) -> usize {
        self.window.valid_data_index()
    }
    pub fn sweep_first_time(&self) -> bool {
        self.window.sweep_first_time()
    }
    pub fn old_data_present(&self) -> bool {
        self.old_data_present
    }
    /// Drawable storage ranges, oldest first.
    pub fn segments(&self) -> Vec<Range<usize>> {
        self.window.segments(&self.geometry)
    }
    /// Screen x of the live write cursor, for the scan-line indicator.
    pub fn refresh_x_position(&self) -> f32 {
        self.window.refresh_x_position(&self.geometry)
    }
    pub fn unit_x(&self, index: usize) -> f32 {
        self.geometry.unit_x(index)
    }
    pub fn store(&self, name: &str) -> Option<&ChannelBufferStore> {
        self.channels.get(name)
    }
    pub fn contains_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
/// Reads the planes a channel needs into the scratch buffers.
#[allow(clippy::too_many_arguments)]
fn read_source<R: AcquisitionReader + ?Sized>(
    reader: &R,
    name: &str,
    kind: StorageKind,
    has_flags: bool,
    offset: i64,
    count: usize,
    analog: &mut Vec<f32>,
    digital: &mut Vec<u16>,
) -> Result<(), DisplayError> {
    let available = reader.available();
    let oldest = i64::try_from(available).map_or(i64::MIN, |a| -a);
    let end = i64::try_from(count).ok().and_then(|c| offset.checked_add(c));
    if offset < oldest || end.map_or(true, |end| end > 0) {
        return Err(DisplayError::InsufficientSamples {
            channel: name.to_owned(),
            requested_start: offset,
            requested: count,
            available,
        });
    }
    analog.clear();
    digital.clear();
    if kind != StorageKind::Raster {
        analog.resize(count, 0.0);
        reader.read_analog(name, offset, analog)?;
    }
    if kind == StorageKind::Raster || has_flags {
        digital.resize(count, 0);
        reader.read_digital(name, offset, digital)?;
    }
    Ok(())
}
/// Writes the newest `starts.len()` of `zones` consecutive zones held in the scratch planes.
fn write_zones(
    store: &mut ChannelBufferStore,
    geometry: &Geometry,
    starts: &[usize],
    zones: usize,
    analog: &[f32],
    digital: &[u16],
) {
    let spz = geometry.samples_per_zone;
    let first = zones - starts.len();
    let mut carry = store.carry;
    let (data, mut flags) = store.parts_mut();
    for (k, &start) in starts.iter().enumerate() {
        let zone = first + k;
        let samples = zone * spz..(zone + 1) * spz;
        let analog = analog.get(samples.clone()).unwrap_or(&[]);
        let digital = digital.get(samples).unwrap_or(&[]);
        write_zone(
            data,
            flags.as_deref_mut(),
            start..start + geometry.zone_length,
            analog,
            digital,
            &mut carry,
        );
    }
    store.carry = carry;
}
