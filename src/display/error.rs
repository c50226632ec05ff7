use thiserror::Error;
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("sample rate must be a finite value greater than zero")]
    InvalidSampleRate,
    #[error("time span must be a finite value greater than zero")]
    InvalidSpan,
    #[error("refresh zone count must be at least one")]
    InvalidZoneCount,
    #[error("width of {width} px cannot hold {zones} refresh zones")]
    InvalidWidth { width: usize, zones: usize },
    #[error("time span is too short to hold one sample per refresh zone")]
    EmptyZone,
    #[error("time span holds more samples than the display window can address")]
    WindowTooLarge,
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("channel '{0}' is not known")]
    UnknownChannel(String),
    #[error(
        "channel '{channel}': requested {requested} samples at offset {requested_start}, only {available} available"
    )]
    InsufficientSamples {
        channel: String,
        requested_start: i64,
        requested: usize,
        available: usize,
    },
    #[error("invalid display settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("failed to read display settings: {0}")]
    Io(#[from] std::io::Error),
}
