use image::{GrayImage, imageops};
use rayon::prelude::*;

use crate::{error::ConfigError, types::Frame};

pub const MASK_FOREGROUND: u8 = 255;
pub const MASK_BACKGROUND: u8 = 0;

/// Sigma of a 5x5 Gaussian kernel (0.3 * ((5 - 1) * 0.5 - 1) + 0.8).
pub const DEFAULT_BLUR_SIGMA: f32 = 1.1;

/// Closed HSV box accepted as skin. Hue is in degrees, saturation and value
/// use a 0..=255 scale. `hue_min > hue_max` selects a range that wraps
/// through 0 degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinRange {
    pub hue_min: f32,
    pub hue_max: f32,
    pub saturation_min: f32,
    pub saturation_max: f32,
    pub value_min: f32,
    pub value_max: f32,
}

impl Default for SkinRange {
    fn default() -> Self {
        Self {
            hue_min: 0.0,
            hue_max: 40.0,
            saturation_min: 20.0,
            saturation_max: 255.0,
            value_min: 70.0,
            value_max: 255.0,
        }
    }
}

impl SkinRange {
    pub fn contains(&self, hsv: Hsv) -> bool {
        let hue_ok = if self.hue_min <= self.hue_max {
            hsv.hue >= self.hue_min && hsv.hue <= self.hue_max
        } else {
            hsv.hue >= self.hue_min || hsv.hue <= self.hue_max
        };

        hue_ok
            && hsv.saturation >= self.saturation_min
            && hsv.saturation <= self.saturation_max
            && hsv.value >= self.value_min
            && hsv.value <= self.value_max
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bounds("hue", self.hue_min, self.hue_max, 360.0, true)?;
        check_bounds(
            "saturation",
            self.saturation_min,
            self.saturation_max,
            255.0,
            false,
        )?;
        check_bounds("value", self.value_min, self.value_max, 255.0, false)
    }
}

fn check_bounds(
    channel: &'static str,
    min: f32,
    max: f32,
    limit: f32,
    wraps: bool,
) -> Result<(), ConfigError> {
    let in_limit = |v: f32| v.is_finite() && (0.0..=limit).contains(&v);
    if !in_limit(min) || !in_limit(max) || (!wraps && min > max) {
        return Err(ConfigError::SkinRange { channel, min, max });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinMaskConfig {
    pub range: SkinRange,
    /// Gaussian sigma applied before thresholding; 0 disables smoothing.
    pub blur_sigma: f32,
}

impl Default for SkinMaskConfig {
    fn default() -> Self {
        Self {
            range: SkinRange::default(),
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }
}

impl SkinMaskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(ConfigError::BlurSigma(self.blur_sigma));
        }
        self.range.validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    /// Degrees in [0, 360).
    pub hue: f32,
    /// 0..=255
    pub saturation: f32,
    /// 0..=255
    pub value: f32,
}

impl Hsv {
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let r = red as f32;
        let g = green as f32;
        let b = blue as f32;
        let maximum_channel = r.max(g.max(b));
        let minimum_channel = r.min(g.min(b));
        let chroma = maximum_channel - minimum_channel;

        let saturation = if maximum_channel <= 0.0 {
            0.0
        } else {
            chroma / maximum_channel * 255.0
        };

        if chroma <= 1e-6 {
            return Self {
                hue: 0.0,
                saturation,
                value: maximum_channel,
            };
        }

        let (base_difference, sector_offset) = if maximum_channel == r {
            (g - b, 0.0)
        } else if maximum_channel == g {
            (b - r, 2.0)
        } else {
            (r - g, 4.0)
        };

        let mut hue = (base_difference / chroma + sector_offset) * 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }
        if hue >= 360.0 {
            hue -= 360.0;
        }

        Self {
            hue,
            saturation,
            value: maximum_channel,
        }
    }
}

/// Marks every plausibly skin-colored pixel of `frame` as foreground.
pub fn compute_mask(frame: &Frame, config: &SkinMaskConfig) -> GrayImage {
    let (width, height) = frame.dimensions();
    let Some(view) = frame.view().filter(|_| !frame.is_empty()) else {
        return GrayImage::new(width, height);
    };

    let range = config.range;
    let classify = |px: &[u8]| {
        if range.contains(Hsv::from_rgb(px[0], px[1], px[2])) {
            MASK_FOREGROUND
        } else {
            MASK_BACKGROUND
        }
    };

    let data: Vec<u8> = if config.blur_sigma > 0.0 {
        let smoothed = imageops::blur(&view, config.blur_sigma);
        smoothed.as_raw().par_chunks_exact(3).map(classify).collect()
    } else {
        frame.as_rgb().par_chunks_exact(3).map(classify).collect()
    };

    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIN: [u8; 3] = [224, 172, 140];

    fn solid(width: u32, height: u32, color: [u8; 3]) -> Frame {
        let rgb = color.repeat((width * height) as usize);
        Frame::from_rgb(width, height, rgb).unwrap()
    }

    #[test]
    fn hsv_of_skin_tone() {
        let hsv = Hsv::from_rgb(SKIN[0], SKIN[1], SKIN[2]);
        assert!((hsv.hue - 22.857).abs() < 0.01, "hue {}", hsv.hue);
        assert!((hsv.saturation - 95.625).abs() < 0.01);
        assert_eq!(hsv.value, 224.0);
    }

    #[test]
    fn hsv_primary_hues() {
        assert_eq!(Hsv::from_rgb(255, 0, 0).hue, 0.0);
        assert_eq!(Hsv::from_rgb(0, 255, 0).hue, 120.0);
        assert_eq!(Hsv::from_rgb(0, 0, 255).hue, 240.0);
        assert_eq!(Hsv::from_rgb(255, 0, 255).hue, 300.0);
    }

    #[test]
    fn gray_has_no_saturation() {
        let hsv = Hsv::from_rgb(128, 128, 128);
        assert_eq!(hsv.saturation, 0.0);
        assert_eq!(hsv.hue, 0.0);
        assert_eq!(Hsv::from_rgb(0, 0, 0).saturation, 0.0);
    }

    #[test]
    fn default_range_accepts_skin_and_rejects_others() {
        let range = SkinRange::default();
        assert!(range.contains(Hsv::from_rgb(SKIN[0], SKIN[1], SKIN[2])));
        assert!(!range.contains(Hsv::from_rgb(40, 60, 200)));
        assert!(!range.contains(Hsv::from_rgb(255, 255, 255)));
        // Skin hue but too dark.
        assert!(!range.contains(Hsv::from_rgb(60, 45, 35)));
    }

    #[test]
    fn wrapping_hue_range() {
        let range = SkinRange {
            hue_min: 340.0,
            hue_max: 20.0,
            ..SkinRange::default()
        };
        assert!(range.contains(Hsv::from_rgb(200, 60, 100)));
        assert!(range.contains(Hsv::from_rgb(SKIN[0], 100, 90)));
        assert!(!range.contains(Hsv::from_rgb(60, 200, 60)));
        assert!(range.validate().is_ok());
    }

    #[test]
    fn inverted_saturation_is_rejected() {
        let range = SkinRange {
            saturation_min: 200.0,
            saturation_max: 10.0,
            ..SkinRange::default()
        };
        assert!(matches!(
            range.validate(),
            Err(ConfigError::SkinRange {
                channel: "saturation",
                ..
            })
        ));
    }

    #[test]
    fn black_frame_yields_empty_mask() {
        let mask = compute_mask(&solid(32, 24, [0, 0, 0]), &SkinMaskConfig::default());
        assert_eq!(mask.dimensions(), (32, 24));
        assert!(mask.pixels().all(|p| p.0[0] == MASK_BACKGROUND));
    }

    #[test]
    fn skin_frame_yields_full_mask() {
        let mask = compute_mask(&solid(16, 16, SKIN), &SkinMaskConfig::default());
        assert!(mask.pixels().all(|p| p.0[0] == MASK_FOREGROUND));
    }

    #[test]
    fn empty_frame_yields_empty_mask() {
        let frame = Frame::from_rgb(0, 0, Vec::new()).unwrap();
        let mask = compute_mask(&frame, &SkinMaskConfig::default());
        assert_eq!(mask.dimensions(), (0, 0));
    }

    #[test]
    fn blur_suppresses_single_pixel_noise() {
        let mut rgb = [0u8, 0, 0].repeat(15 * 15);
        let center = (7 * 15 + 7) * 3;
        rgb[center..center + 3].copy_from_slice(&SKIN);
        let frame = Frame::from_rgb(15, 15, rgb).unwrap();

        let smoothed = compute_mask(&frame, &SkinMaskConfig::default());
        assert!(smoothed.pixels().all(|p| p.0[0] == MASK_BACKGROUND));

        let raw = compute_mask(
            &frame,
            &SkinMaskConfig {
                blur_sigma: 0.0,
                ..SkinMaskConfig::default()
            },
        );
        assert_eq!(raw.get_pixel(7, 7).0[0], MASK_FOREGROUND);
    }
}
