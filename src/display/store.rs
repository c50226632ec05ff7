use super::config::ScaleCategory;
use super::geometry::Geometry;
use super::minmax::MinMax;
/// Registration parameters for a displayed signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelSpec {
    pub scale: ScaleCategory,
    /// Channel also carries stimulation-state flag bits.
    pub stim_capable: bool,
    /// Event/spike-marker channel drawn as raster ticks instead of a waveform.
    pub raster: bool,
}
impl ChannelSpec {
    pub fn analog(scale: ScaleCategory) -> Self {
        Self {
            scale,
            stim_capable: false,
            raster: false,
        }
    }
    pub fn stim(scale: ScaleCategory) -> Self {
        Self {
            scale,
            stim_capable: true,
            raster: false,
        }
    }
    pub fn raster(scale: ScaleCategory) -> Self {
        Self {
            scale,
            stim_capable: false,
            raster: true,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    /// One raw sample per storage unit.
    Raw,
    /// One min/max pair per pixel column.
    Envelope,
    /// One event flag per storage unit.
    Raster,
}
impl StorageKind {
    pub fn for_channel(spec: &ChannelSpec, geometry: &Geometry) -> Self {
        if spec.raster {
            StorageKind::Raster
        } else if geometry.use_envelope_mode {
            StorageKind::Envelope
        } else {
            StorageKind::Raw
        }
    }
}
#[derive(Clone, Debug, PartialEq)]
pub enum StorageData {
    Raw(Vec<f32>),
    Envelope(Vec<MinMax<f32>>),
    Raster(Vec<bool>),
}
impl StorageData {
    fn zeroed(kind: StorageKind, length: usize) -> Self {
        match kind {
            StorageKind::Raw => StorageData::Raw(vec![0.0; length]),
            StorageKind::Envelope => StorageData::Envelope(vec![MinMax::default(); length]),
            StorageKind::Raster => StorageData::Raster(vec![false; length]),
        }
    }
    pub fn kind(&self) -> StorageKind {
        match self {
            StorageData::Raw(_) => StorageKind::Raw,
            StorageData::Envelope(_) => StorageKind::Envelope,
            StorageData::Raster(_) => StorageKind::Raster,
        }
    }
    pub fn len(&self) -> usize {
        match self {
            StorageData::Raw(v) => v.len(),
            StorageData::Envelope(v) => v.len(),
            StorageData::Raster(v) => v.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn shift_left(&mut self, units: usize) {
        match self {
            StorageData::Raw(v) => shift_slice(v, units),
            StorageData::Envelope(v) => shift_slice(v, units),
            StorageData::Raster(v) => shift_slice(v, units),
        }
    }
}
/// Moves `[units, len)` to the front. The vacated tail keeps its old contents;
/// callers overwrite it with the incoming zones.
fn shift_slice<T: Copy>(data: &mut [T], units: usize) {
    if units == 0 || units >= data.len() {
        return;
    }
    data.copy_within(units.., 0);
}
/// Windowed, screen-ready history for one displayed signal.
pub struct ChannelBufferStore {
    spec: ChannelSpec,
    data: StorageData,
    stim_flags: Option<Vec<u16>>,
    /// Last envelope cell written, in time order. Seeds the next cell's swap.
    pub(crate) carry: Option<MinMax<f32>>,
    /// Frame counter value of the last successful refresh; `None` forces a full refill.
    pub(crate) synced_frame: Option<u64>,
    pub(crate) is_out_of_date: bool,
    pub(crate) has_already_loaded_this_frame: bool,
}
impl ChannelBufferStore {
    pub fn new(spec: ChannelSpec, geometry: &Geometry) -> Self {
        let mut store = Self {
            spec,
            data: StorageData::Raw(Vec::new()),
            stim_flags: None,
            carry: None,
            synced_frame: None,
            is_out_of_date: false,
            has_already_loaded_this_frame: false,
        };
        store.reset(geometry);
        store
    }
    /// Re-sizes and zeroes all arrays for `geometry`, picking the storage kind anew.
    pub fn reset(&mut self, geometry: &Geometry) {
        let kind = StorageKind::for_channel(&self.spec, geometry);
        self.data = StorageData::zeroed(kind, geometry.length);
        self.stim_flags = if self.spec.stim_capable && !self.spec.raster {
            Some(vec![0; geometry.length])
        } else {
            None
        };
        self.carry = None;
        self.synced_frame = Some(0);
        self.is_out_of_date = false;
        self.has_already_loaded_this_frame = false;
    }
    pub(crate) fn shift_left(&mut self, units: usize) {
        self.data.shift_left(units);
        if let Some(flags) = &mut self.stim_flags {
            shift_slice(flags, units);
        }
    }
    pub(crate) fn parts_mut(&mut self) -> (&mut StorageData, Option<&mut Vec<u16>>) {
        (&mut self.data, self.stim_flags.as_mut())
    }
    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }
    pub fn scale(&self) -> ScaleCategory {
        self.spec.scale
    }
    pub fn kind(&self) -> StorageKind {
        self.data.kind()
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn data(&self) -> &StorageData {
        &self.data
    }
    pub fn raw(&self) -> Option<&[f32]> {
        match &self.data {
            StorageData::Raw(v) => Some(v),
            _ => None,
        }
    }
    pub fn envelope(&self) -> Option<&[MinMax<f32>]> {
        match &self.data {
            StorageData::Envelope(v) => Some(v),
            _ => None,
        }
    }
    pub fn raster(&self) -> Option<&[bool]> {
        match &self.data {
            StorageData::Raster(v) => Some(v),
            _ => None,
        }
    }
    pub fn stim_flags(&self) -> Option<&[u16]> {
        self.stim_flags.as_deref()
    }
    pub fn is_out_of_date(&self) -> bool {
        self.is_out_of_date
    }
    pub fn has_already_loaded_this_frame(&self) -> bool {
        self.has_already_loaded_this_frame
    }
    /// `(x, value)` pairs for raw channels over `range`, x in screen pixels.
    pub fn points<'a>(
        &'a self,
        geometry: &'a Geometry,
        range: std::ops::Range<usize>,
    ) -> impl Iterator<Item = (f32, f32)> + 'a {
        let values = self.raw().unwrap_or(&[]);
        let end = range.end.min(values.len());
        let start = range.start.min(end);
        values[start..end]
            .iter()
            .enumerate()
            .map(move |(i, v)| (geometry.unit_x(start + i), *v))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn envelope_geometry() -> Geometry {
        Geometry::new(30_000.0, 2000.0, 100, 4).unwrap()
    }
    fn direct_geometry() -> Geometry {
        Geometry::new(1000.0, 100.0, 500, 1).unwrap()
    }
    #[test]
    fn storage_kind_follows_geometry_and_spec() {
        let env = envelope_geometry();
        let direct = direct_geometry();
        let analog = ChannelSpec::analog(ScaleCategory::Wideband);
        let raster = ChannelSpec::raster(ScaleCategory::DigitalIo);
        assert_eq!(StorageKind::for_channel(&analog, &env), StorageKind::Envelope);
        assert_eq!(StorageKind::for_channel(&analog, &direct), StorageKind::Raw);
        assert_eq!(StorageKind::for_channel(&raster, &env), StorageKind::Raster);
        assert_eq!(StorageKind::for_channel(&raster, &direct), StorageKind::Raster);
    }
    #[test]
    fn stim_flags_only_for_stim_capable_waveforms() {
        let g = envelope_geometry();
        let stim = ChannelBufferStore::new(ChannelSpec::stim(ScaleCategory::Wideband), &g);
        assert_eq!(stim.stim_flags().map(|f| f.len()), Some(g.length));
        let plain = ChannelBufferStore::new(ChannelSpec::analog(ScaleCategory::Wideband), &g);
        assert!(plain.stim_flags().is_none());
        let raster_stim = ChannelSpec {
            scale: ScaleCategory::DigitalIo,
            stim_capable: true,
            raster: true,
        };
        assert!(ChannelBufferStore::new(raster_stim, &g).stim_flags().is_none());
    }
    #[test]
    fn reset_resizes_and_reclassifies() {
        let mut store =
            ChannelBufferStore::new(ChannelSpec::analog(ScaleCategory::Lowpass), &envelope_geometry());
        assert_eq!(store.kind(), StorageKind::Envelope);
        let g = direct_geometry();
        store.reset(&g);
        assert_eq!(store.kind(), StorageKind::Raw);
        assert_eq!(store.len(), g.length);
        assert!(store.raw().unwrap().iter().all(|v| *v == 0.0));
    }
    #[test]
    fn shift_moves_data_and_flags_together() {
        let g = envelope_geometry();
        let mut store = ChannelBufferStore::new(ChannelSpec::stim(ScaleCategory::Wideband), &g);
        {
            let (data, flags) = store.parts_mut();
            if let StorageData::Envelope(cells) = data {
                for (i, c) in cells.iter_mut().enumerate() {
                    c.reset(i as f32);
                }
            }
            let flags = flags.unwrap();
            for (i, f) in flags.iter_mut().enumerate() {
                *f = i as u16;
            }
        }
        store.shift_left(25);
        assert_eq!(store.envelope().unwrap()[0].min, 25.0);
        assert_eq!(store.envelope().unwrap()[74].max, 99.0);
        assert_eq!(store.stim_flags().unwrap()[0], 25);
    }
    #[test]
    fn points_carry_screen_x() {
        let g = direct_geometry();
        let store = ChannelBufferStore::new(ChannelSpec::analog(ScaleCategory::AnalogIo), &g);
        let pts: Vec<_> = store.points(&g, 10..13).collect();
        assert_eq!(pts, vec![(50.0, 0.0), (55.0, 0.0), (60.0, 0.0)]);
    }
}
