use super::error::DisplayError;
/// Buffer geometry derived from sample rate, time span, pixel width and zone count.
///
/// Every field is a pure function of the four inputs; `Geometry::new` either
/// produces a complete, consistent set or rejects the inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub sample_rate_hz: f64,
    pub span_milliseconds: f64,
    pub max_width_pixels: usize,
    pub num_refresh_zones: usize,
    pub zone_width_pixels: usize,
    pub width_pixels: usize,
    pub samples_per_zone: usize,
    pub pixels_per_sample: f64,
    /// More than one sample falls in a pixel column, so cells hold min/max envelopes.
    pub use_envelope_mode: bool,
    /// Buffer length in storage units (pixels in envelope mode, samples otherwise).
    pub length: usize,
    pub zone_length: usize,
}
impl Geometry {
    pub fn new(
        sample_rate_hz: f64,
        span_milliseconds: f64,
        max_width_pixels: usize,
        num_refresh_zones: usize,
    ) -> Result<Self, DisplayError> {
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(DisplayError::InvalidSampleRate);
        }
        if !span_milliseconds.is_finite() || span_milliseconds <= 0.0 {
            return Err(DisplayError::InvalidSpan);
        }
        if num_refresh_zones == 0 {
            return Err(DisplayError::InvalidZoneCount);
        }
        let zone_width_pixels = max_width_pixels / num_refresh_zones;
        if zone_width_pixels == 0 {
            return Err(DisplayError::InvalidWidth {
                width: max_width_pixels,
                zones: num_refresh_zones,
            });
        }
        let width_pixels = num_refresh_zones * zone_width_pixels;
        let samples_per_zone =
            (sample_rate_hz * span_milliseconds / 1000.0 / num_refresh_zones as f64).round();
        if samples_per_zone < 1.0 {
            return Err(DisplayError::EmptyZone);
        }
        if samples_per_zone >= i64::MAX as f64 {
            return Err(DisplayError::WindowTooLarge);
        }
        let samples_per_zone = samples_per_zone as usize;
        // sample offsets into the window must stay representable as i64
        samples_per_zone
            .checked_mul(num_refresh_zones)
            .filter(|total| i64::try_from(*total).is_ok())
            .ok_or(DisplayError::WindowTooLarge)?;
        let pixels_per_sample = zone_width_pixels as f64 / samples_per_zone as f64;
        let use_envelope_mode = pixels_per_sample < 1.0;
        let length = if use_envelope_mode {
            width_pixels
        } else {
            samples_per_zone * num_refresh_zones
        };
        Ok(Self {
            sample_rate_hz,
            span_milliseconds,
            max_width_pixels,
            num_refresh_zones,
            zone_width_pixels,
            width_pixels,
            samples_per_zone,
            pixels_per_sample,
            use_envelope_mode,
            length,
            zone_length: length / num_refresh_zones,
        })
    }
    /// Horizontal screen distance covered by one storage unit.
    pub fn pixels_per_unit(&self) -> f64 {
        if self.use_envelope_mode {
            1.0
        } else {
            self.pixels_per_sample
        }
    }
    /// Screen x-coordinate of storage unit `index`.
    pub fn unit_x(&self, index: usize) -> f32 {
        (index as f64 * self.pixels_per_unit()) as f32
    }
    pub fn window_samples(&self) -> usize {
        self.samples_per_zone * self.num_refresh_zones
    }
}
