use std::time::Instant;

use image::{DynamicImage, GrayImage, ImageBuffer, Rgb};

use crate::error::FrameError;

pub const RGB_CHANNELS: usize = 3;

/// Borrowed RGB view over a frame's pixel buffer.
pub type RgbView<'a> = ImageBuffer<Rgb<u8>, &'a [u8]>;

#[derive(Clone, Debug)]
pub struct Frame {
    rgb: Vec<u8>,
    width: u32,
    height: u32,
    pub timestamp: Instant,
}

impl Frame {
    /// Wraps a packed RGB buffer, rejecting buffers whose length does not
    /// match the declared dimensions.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, FrameError> {
        Self::from_raw(width, height, RGB_CHANNELS, rgb)
    }

    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if channels != RGB_CHANNELS {
            return Err(FrameError::ChannelCount {
                expected: RGB_CHANNELS,
                actual: channels,
            });
        }
        let expected = width as usize * height as usize * RGB_CHANNELS;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            rgb: data,
            width,
            height,
            timestamp: Instant::now(),
        })
    }

    /// Builds a frame from packed RGBA, dropping the alpha channel.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }

        let mut rgb = Vec::with_capacity(rgba.len() / 4 * RGB_CHANNELS);
        for chunk in rgba.chunks_exact(4) {
            rgb.extend_from_slice(&chunk[..RGB_CHANNELS]);
        }
        Self::from_rgb(width, height, rgb)
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let rgb = image.into_rgb8();
        let (width, height) = rgb.dimensions();
        Self {
            rgb: rgb.into_raw(),
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_rgb(&self) -> &[u8] {
        &self.rgb
    }

    pub fn into_rgb(self) -> Vec<u8> {
        self.rgb
    }

    pub fn view(&self) -> Option<RgbView<'_>> {
        ImageBuffer::from_raw(self.width, self.height, self.rgb.as_slice())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Nearest pixel coordinate, for drawing.
    pub fn to_pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingState {
    Safe,
    Warning,
    Danger,
    #[default]
    NoHand,
}

impl TrackingState {
    pub fn label(&self) -> &'static str {
        match self {
            TrackingState::Safe => "SAFE",
            TrackingState::Warning => "WARNING",
            TrackingState::Danger => "DANGER",
            TrackingState::NoHand => "NO HAND",
        }
    }

    pub fn is_hand_present(&self) -> bool {
        !matches!(self, TrackingState::NoHand)
    }
}

impl std::fmt::Display for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackingOutput {
    pub frame_index: u64,
    pub centroid: Option<Point2D>,
    pub distance: Option<f64>,
    pub state: TrackingState,
    /// Enclosed area of the selected region, in square pixels.
    pub region_area: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct TrackedFrame {
    pub frame: Frame,
    pub output: TrackingOutput,
    /// Cleaned skin mask the output was computed from.
    pub mask: Option<GrayImage>,
}
