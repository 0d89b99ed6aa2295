use thiserror::Error;

use super::region::Region;
use crate::types::Point2D;

const MIN_SIGNED_AREA: f64 = 1e-9;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("region has zero enclosed area (m00 = {m00})")]
pub struct DegenerateRegion {
    pub m00: f64,
}

/// Spatial moments up to first order of a filled polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Green's theorem over the closed boundary. The sign of `m00` follows
    /// the winding direction and cancels out in the centroid.
    pub fn of_polygon(points: &[(i32, i32)]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut moments = Self::default();
        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            let (x0, y0, x1, y1) = (x0 as f64, y0 as f64, x1 as f64, y1 as f64);
            let cross = x0 * y1 - x1 * y0;
            moments.m00 += cross;
            moments.m10 += (x0 + x1) * cross;
            moments.m01 += (y0 + y1) * cross;
        }
        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;
        moments
    }

    pub fn area(&self) -> f64 {
        self.m00.abs()
    }

    pub fn centroid(&self) -> Result<Point2D, DegenerateRegion> {
        if self.m00.abs() < MIN_SIGNED_AREA {
            return Err(DegenerateRegion { m00: self.m00 });
        }
        Ok(Point2D::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Area-weighted center of the filled region.
pub fn centroid(region: &Region) -> Result<Point2D, DegenerateRegion> {
    Moments::of_polygon(&region.boundary).centroid()
}
