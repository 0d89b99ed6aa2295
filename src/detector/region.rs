use image::{GrayImage, imageops};
use imageproc::{
    contours::{BorderType, find_contours},
    distance_transform::Norm,
    morphology,
};

use super::moments::Moments;
use crate::error::ConfigError;

/// Regions enclosing less than this many square pixels are noise.
pub const DEFAULT_MIN_AREA: f64 = 3000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionConfig {
    /// Radius of the hole-filling close, in pixels.
    pub close_radius: u8,
    pub open_radius: u8,
    pub dilate_radius: u8,
    pub min_area: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            close_radius: 6,
            open_radius: 3,
            dilate_radius: 3,
            min_area: DEFAULT_MIN_AREA,
        }
    }
}

impl RegionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(ConfigError::MinArea(self.min_area));
        }
        Ok(())
    }
}

/// Outer boundary of one connected foreground blob.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub boundary: Vec<(i32, i32)>,
    pub area: f64,
}

impl Region {
    pub fn from_boundary(boundary: Vec<(i32, i32)>) -> Self {
        let area = Moments::of_polygon(&boundary).area();
        Self { boundary, area }
    }

    pub fn bounding_box(&self) -> Option<((i32, i32), (i32, i32))> {
        let first = *self.boundary.first()?;
        Some(self.boundary.iter().fold((first, first), |(min, max), &(x, y)| {
            ((min.0.min(x), min.1.min(y)), (max.0.max(x), max.1.max(y)))
        }))
    }
}

/// Closing, opening, then a mild dilation, each with a disk-shaped element.
pub fn clean_mask(mask: &GrayImage, config: &RegionConfig) -> GrayImage {
    let mut cleaned = mask.clone();
    if cleaned.width() == 0 || cleaned.height() == 0 {
        return cleaned;
    }
    if config.close_radius > 0 {
        cleaned = morphology::close(&cleaned, Norm::L2, config.close_radius);
    }
    if config.open_radius > 0 {
        cleaned = morphology::open(&cleaned, Norm::L2, config.open_radius);
    }
    if config.dilate_radius > 0 {
        cleaned = morphology::dilate(&cleaned, Norm::L2, config.dilate_radius);
    }
    cleaned
}

/// Outer boundaries of the top-level foreground components.
pub fn outer_regions(mask: &GrayImage) -> Vec<Region> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    // Blobs starting in column 0 are only traced as outer borders when
    // there is background to their left, so trace on a padded copy.
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| {
            Region::from_boundary(contour.points.iter().map(|p| (p.x - 1, p.y - 1)).collect())
        })
        .collect()
}

/// Largest region by enclosed area; the first found wins ties. Returns
/// `None` when nothing reaches `min_area`.
pub fn select_largest(regions: Vec<Region>, min_area: f64) -> Option<Region> {
    let mut best: Option<Region> = None;
    for region in regions {
        let better = match &best {
            Some(current) => region.area > current.area,
            None => true,
        };
        if better {
            best = Some(region);
        }
    }
    best.filter(|region| region.area >= min_area)
}

/// Cleans the mask and picks the hand candidate. The cleaned mask is
/// returned alongside for inspection.
pub fn extract_region(mask: &GrayImage, config: &RegionConfig) -> (GrayImage, Option<Region>) {
    let cleaned = clean_mask(mask, config);
    let regions = outer_regions(&cleaned);
    log::trace!("found {} outer contours", regions.len());
    let region = select_largest(regions, config.min_area);
    (cleaned, region)
}
