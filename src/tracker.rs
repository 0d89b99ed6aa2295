use image::GrayImage;

use crate::{
    detector::{Detection, DetectorConfig, HandDetector, SkinRegionDetector},
    error::{ConfigError, FrameError},
    proximity::{BoundaryReference, TransitionFilter, TransitionPolicy, classify},
    types::{Frame, Point2D, TrackingOutput, TrackingState},
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackerConfig {
    pub detector: DetectorConfig,
    pub boundary: BoundaryReference,
    pub transition: TransitionPolicy,
}

impl TrackerConfig {
    /// Defaults with the boundary centered on a `width` x `height` frame.
    pub fn for_resolution(width: u32, height: u32) -> Self {
        Self {
            boundary: BoundaryReference::for_frame(width, height),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;
        self.boundary.validate()?;
        self.transition.validate(&self.boundary)
    }
}

/// Per-stream tracking session: one frame in, one classified output out.
pub struct HandTracker<D: HandDetector = SkinRegionDetector> {
    detector: D,
    boundary: BoundaryReference,
    dead_zone: f64,
    filter: TransitionFilter,
    previous_centroid: Option<Point2D>,
    resolution: Option<(u32, u32)>,
    frame_index: u64,
}

impl HandTracker<SkinRegionDetector> {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        Self::with_detector(SkinRegionDetector::new(config.detector), config)
    }
}

impl<D: HandDetector> HandTracker<D> {
    pub fn with_detector(detector: D, config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector,
            boundary: config.boundary,
            dead_zone: config.transition.dead_zone,
            filter: TransitionFilter::new(config.transition.confirm_frames),
            previous_centroid: None,
            resolution: None,
            frame_index: 0,
        })
    }

    pub fn boundary(&self) -> &BoundaryReference {
        &self.boundary
    }

    pub fn state(&self) -> TrackingState {
        self.filter.current()
    }

    pub fn previous_centroid(&self) -> Option<Point2D> {
        self.previous_centroid
    }

    pub fn step(&mut self, frame: &Frame) -> Result<TrackingOutput, FrameError> {
        self.step_with_mask(frame).map(|(output, _)| output)
    }

    /// Same as [`step`](Self::step), also handing back the cleaned mask.
    pub fn step_with_mask(
        &mut self,
        frame: &Frame,
    ) -> Result<(TrackingOutput, Option<GrayImage>), FrameError> {
        self.check_resolution(frame)?;

        let Detection {
            centroid,
            region,
            mask,
        } = self.detector.detect(frame);

        let previous = self.filter.current();
        let classification = classify(centroid, &self.boundary, previous, self.dead_zone);
        let state = self.filter.update(classification.state);

        if state != previous {
            match classification.distance {
                Some(distance) => log::info!(
                    "frame {}: {} -> {} at {:.1}px",
                    self.frame_index,
                    previous,
                    state,
                    distance
                ),
                None => log::info!("frame {}: {} -> {}", self.frame_index, previous, state),
            }
        }

        let output = TrackingOutput {
            frame_index: self.frame_index,
            centroid,
            distance: classification.distance,
            state,
            region_area: region.map(|r| r.area),
        };
        log::trace!("{output:?}");

        self.previous_centroid = centroid;
        self.frame_index += 1;
        Ok((output, mask))
    }

    /// Forgets rolling state, starting a new session on the next frame.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.previous_centroid = None;
        self.resolution = None;
        self.frame_index = 0;
    }

    fn check_resolution(&mut self, frame: &Frame) -> Result<(), FrameError> {
        let actual = frame.dimensions();
        match self.resolution {
            Some(expected) if expected != actual => {
                Err(FrameError::ResolutionChanged { expected, actual })
            }
            Some(_) => Ok(()),
            None => {
                self.resolution = Some(actual);
                Ok(())
            }
        }
    }
}
