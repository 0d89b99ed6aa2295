pub mod moments;
pub mod region;
pub mod skin;

use image::GrayImage;

use crate::{
    error::ConfigError,
    types::{Frame, Point2D},
};

pub use moments::{DegenerateRegion, Moments, centroid};
pub use region::{Region, RegionConfig, extract_region};
pub use skin::{Hsv, SkinMaskConfig, SkinRange, compute_mask};

/// What a detector found in one frame.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    pub centroid: Option<Point2D>,
    pub region: Option<Region>,
    /// Cleaned binary mask, when the detector produces one.
    pub mask: Option<GrayImage>,
}

impl Detection {
    pub fn none() -> Self {
        Self::default()
    }
}

pub trait HandDetector {
    fn detect(&mut self, frame: &Frame) -> Detection;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DetectorConfig {
    pub skin: SkinMaskConfig,
    pub region: RegionConfig,
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.skin.validate()?;
        self.region.validate()
    }
}

/// Skin-color segmentation followed by largest-contour selection.
#[derive(Clone, Debug, Default)]
pub struct SkinRegionDetector {
    cfg: DetectorConfig,
}

impl SkinRegionDetector {
    pub fn new(cfg: DetectorConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }
}

impl HandDetector for SkinRegionDetector {
    fn detect(&mut self, frame: &Frame) -> Detection {
        let raw_mask = compute_mask(frame, &self.cfg.skin);
        let (mask, region) = extract_region(&raw_mask, &self.cfg.region);

        let Some(region) = region else {
            return Detection {
                mask: Some(mask),
                ..Detection::none()
            };
        };

        match centroid(&region) {
            Ok(point) => {
                log::trace!(
                    "hand region area {:.0} centroid ({:.1}, {:.1})",
                    region.area,
                    point.x,
                    point.y
                );
                Detection {
                    centroid: Some(point),
                    region: Some(region),
                    mask: Some(mask),
                }
            }
            Err(err) => {
                log::debug!("discarding hand candidate: {err}");
                Detection {
                    mask: Some(mask),
                    ..Detection::none()
                }
            }
        }
    }
}
