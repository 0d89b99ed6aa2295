//! Hand tracking against a virtual circular boundary.
//!
//! Each frame is segmented by skin color, the largest cleaned region is
//! taken as the hand, and its centroid's distance to the boundary center
//! is classified as SAFE, WARNING or DANGER (or NO HAND).

pub mod detector;
pub mod error;
pub mod fps;
pub mod pipeline;
pub mod proximity;
pub mod tracker;
pub mod types;

pub use detector::{Detection, DetectorConfig, HandDetector, SkinRegionDetector};
pub use error::{ConfigError, FrameError};
pub use proximity::{BoundaryReference, TransitionPolicy};
pub use tracker::{HandTracker, TrackerConfig};
pub use types::{Frame, Point2D, TrackedFrame, TrackingOutput, TrackingState};
