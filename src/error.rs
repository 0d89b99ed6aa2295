use thiserror::Error;

/// A frame that violates the capture contract. These are the only faults
/// `HandTracker::step` reports; a missing hand is a normal outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("expected {expected} color channels, got {actual}")]
    ChannelCount { expected: usize, actual: usize },
    #[error("frame buffer for {width}x{height} should hold {expected} bytes, got {actual}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame resolution changed from {expected:?} to {actual:?} mid-session")]
    ResolutionChanged {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite, positive number of pixels (got {value})")]
    InvalidRadius { name: &'static str, value: f64 },
    #[error("danger radius ({danger}) must be smaller than warning radius ({warning})")]
    RadiiOrder { danger: f64, warning: f64 },
    #[error("boundary center ({x}, {y}) is not finite")]
    InvalidCenter { x: f64, y: f64 },
    #[error("dead zone {dead_zone} must be finite, >= 0 and below {limit}")]
    DeadZone { dead_zone: f64, limit: f64 },
    #[error("confirm_frames must be at least 1")]
    ConfirmFrames,
    #[error("skin {channel} bounds {min}..={max} are invalid")]
    SkinRange {
        channel: &'static str,
        min: f32,
        max: f32,
    },
    #[error("minimum region area must be finite and >= 0 (got {0})")]
    MinArea(f64),
    #[error("blur sigma must be finite and >= 0 (got {0})")]
    BlurSigma(f32),
}
