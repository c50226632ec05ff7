use std::path::Path;
use serde::{Deserialize, Serialize};
use super::error::DisplayError;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Scroll left continuously; the newest zone always lands at the right edge.
    Roll,
    /// Overwrite in place left to right, restarting at the left edge after each pass.
    Sweep,
}
impl Default for WindowMode {
    fn default() -> Self {
        WindowMode::Sweep
    }
}
/// Which shared vertical-scale setting applies to a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleCategory {
    Wideband,
    Lowpass,
    Highpass,
    Dc,
    AuxInput,
    SupplyVoltage,
    AnalogIo,
    DigitalIo,
}
impl ScaleCategory {
    pub const ALL: [ScaleCategory; 8] = [
        ScaleCategory::Wideband,
        ScaleCategory::Lowpass,
        ScaleCategory::Highpass,
        ScaleCategory::Dc,
        ScaleCategory::AuxInput,
        ScaleCategory::SupplyVoltage,
        ScaleCategory::AnalogIo,
        ScaleCategory::DigitalIo,
    ];
    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }
}
/// Vertical full-scale values per category, in the category's natural unit
/// (µV for amplifier signals, V for auxiliary and I/O signals).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleSettings {
    pub wideband: f32,
    pub lowpass: f32,
    pub highpass: f32,
    pub dc: f32,
    pub aux_input: f32,
    pub supply_voltage: f32,
    pub analog_io: f32,
    pub digital_io: f32,
}
impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            wideband: 500.0,
            lowpass: 500.0,
            highpass: 100.0,
            dc: 5.0,
            aux_input: 2.0,
            supply_voltage: 3.6,
            analog_io: 10.0,
            digital_io: 1.0,
        }
    }
}
impl ScaleSettings {
    pub fn value(&self, category: ScaleCategory) -> f32 {
        match category {
            ScaleCategory::Wideband => self.wideband,
            ScaleCategory::Lowpass => self.lowpass,
            ScaleCategory::Highpass => self.highpass,
            ScaleCategory::Dc => self.dc,
            ScaleCategory::AuxInput => self.aux_input,
            ScaleCategory::SupplyVoltage => self.supply_voltage,
            ScaleCategory::AnalogIo => self.analog_io,
            ScaleCategory::DigitalIo => self.digital_io,
        }
    }
}
/// Shared display configuration handed to the engine by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub window_mode: WindowMode,
    pub span_milliseconds: f64,
    pub max_width_pixels: usize,
    pub num_refresh_zones: usize,
    pub scales: ScaleSettings,
    /// False while acquisition is paused or the user is reviewing history.
    pub realtime_active: bool,
}
impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            window_mode: WindowMode::default(),
            span_milliseconds: 2000.0,
            max_width_pixels: 1000,
            num_refresh_zones: 4,
            scales: ScaleSettings::default(),
            realtime_active: true,
        }
    }
}
impl DisplaySettings {
    pub fn from_json_str(text: &str) -> Result<Self, DisplayError> {
        Ok(serde_json::from_str(text)?)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DisplayError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
    pub fn to_json_string(&self) -> Result<String, DisplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn partial_json_falls_back_to_defaults() {
        let settings =
            DisplaySettings::from_json_str(r#"{"window_mode":"roll","scales":{"highpass":50.0}}"#)
                .unwrap();
        assert_eq!(settings.window_mode, WindowMode::Roll);
        assert_eq!(settings.num_refresh_zones, 4);
        assert_eq!(settings.scales.highpass, 50.0);
        assert_eq!(settings.scales.wideband, 500.0);
    }
    #[test]
    fn json_round_trip_preserves_settings() {
        let mut settings = DisplaySettings::default();
        settings.span_milliseconds = 500.0;
        let text = settings.to_json_string().unwrap();
        assert_eq!(DisplaySettings::from_json_str(&text).unwrap(), settings);
    }
    #[test]
    fn malformed_json_is_reported() {
        let err = DisplaySettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, DisplayError::Settings(_)));
    }
    #[test]
    fn scale_bits_are_distinct() {
        let mut seen = 0u8;
        for cat in ScaleCategory::ALL {
            assert_eq!(seen & cat.bit(), 0);
            seen |= cat.bit();
        }
        assert_eq!(seen, u8::MAX);
    }
}
