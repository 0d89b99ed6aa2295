use crate::{
    error::ConfigError,
    types::{Point2D, TrackingState},
};

pub const REFERENCE_WIDTH: u32 = 640;
pub const REFERENCE_HEIGHT: u32 = 480;
pub const DEFAULT_WARNING_RADIUS: f64 = 120.0;
pub const DEFAULT_DANGER_RADIUS: f64 = 50.0;

/// Virtual circular boundary the hand is measured against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryReference {
    pub center: Point2D,
    pub warning_radius: f64,
    pub danger_radius: f64,
}

impl Default for BoundaryReference {
    fn default() -> Self {
        Self {
            center: Point2D::new(
                REFERENCE_WIDTH as f64 / 2.0,
                REFERENCE_HEIGHT as f64 / 2.0,
            ),
            warning_radius: DEFAULT_WARNING_RADIUS,
            danger_radius: DEFAULT_DANGER_RADIUS,
        }
    }
}

impl BoundaryReference {
    /// Centered on the frame, with the default radii scaled from 640x480.
    pub fn for_frame(width: u32, height: u32) -> Self {
        let scale = (width as f64 / REFERENCE_WIDTH as f64)
            .min(height as f64 / REFERENCE_HEIGHT as f64);
        Self {
            center: Point2D::new(width as f64 / 2.0, height as f64 / 2.0),
            warning_radius: DEFAULT_WARNING_RADIUS * scale,
            danger_radius: DEFAULT_DANGER_RADIUS * scale,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.center.x.is_finite() || !self.center.y.is_finite() {
            return Err(ConfigError::InvalidCenter {
                x: self.center.x,
                y: self.center.y,
            });
        }
        for (name, value) in [
            ("warning radius", self.warning_radius),
            ("danger radius", self.danger_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidRadius { name, value });
            }
        }
        if self.danger_radius >= self.warning_radius {
            return Err(ConfigError::RadiiOrder {
                danger: self.danger_radius,
                warning: self.warning_radius,
            });
        }
        Ok(())
    }
}

/// Debounce applied between distance-derived states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionPolicy {
    /// Extra pixels a hand must travel past a cut point before the state
    /// changes. 0 reproduces the plain inequalities.
    pub dead_zone: f64,
    /// Consecutive frames a new state must be seen before it is reported.
    pub confirm_frames: u32,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            dead_zone: 0.0,
            confirm_frames: 1,
        }
    }
}

impl TransitionPolicy {
    pub fn validate(&self, boundary: &BoundaryReference) -> Result<(), ConfigError> {
        let limit = (boundary.warning_radius - boundary.danger_radius) / 2.0;
        if !self.dead_zone.is_finite() || self.dead_zone < 0.0 || self.dead_zone >= limit {
            return Err(ConfigError::DeadZone {
                dead_zone: self.dead_zone,
                limit,
            });
        }
        if self.confirm_frames == 0 {
            return Err(ConfigError::ConfirmFrames);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub distance: Option<f64>,
    pub state: TrackingState,
}

/// Maps a distance onto a state. Cut points shift by `dead_zone` away from
/// `previous`, so leaving a state takes a little more travel than entering.
pub fn state_for_distance(
    distance: f64,
    boundary: &BoundaryReference,
    previous: TrackingState,
    dead_zone: f64,
) -> TrackingState {
    let mut danger_cut = boundary.danger_radius;
    let mut warning_cut = boundary.warning_radius;
    match previous {
        TrackingState::Danger => danger_cut += dead_zone,
        TrackingState::Warning => {
            danger_cut -= dead_zone;
            warning_cut += dead_zone;
        }
        TrackingState::Safe => warning_cut -= dead_zone,
        TrackingState::NoHand => {}
    }

    if distance > warning_cut {
        TrackingState::Safe
    } else if distance >= danger_cut {
        TrackingState::Warning
    } else {
        TrackingState::Danger
    }
}

pub fn classify(
    centroid: Option<Point2D>,
    boundary: &BoundaryReference,
    previous: TrackingState,
    dead_zone: f64,
) -> Classification {
    match centroid {
        None => Classification {
            distance: None,
            state: TrackingState::NoHand,
        },
        Some(point) => {
            let distance = point.distance_to(&boundary.center);
            Classification {
                distance: Some(distance),
                state: state_for_distance(distance, boundary, previous, dead_zone),
            }
        }
    }
}

/// Holds back a change between hand states until it has been seen for
/// `confirm_frames` consecutive frames. `NoHand` passes through at once.
#[derive(Clone, Debug)]
pub struct TransitionFilter {
    confirm_frames: u32,
    current: TrackingState,
    pending: Option<(TrackingState, u32)>,
}

impl TransitionFilter {
    pub fn new(confirm_frames: u32) -> Self {
        Self {
            confirm_frames: confirm_frames.max(1),
            current: TrackingState::NoHand,
            pending: None,
        }
    }

    pub fn current(&self) -> TrackingState {
        self.current
    }

    pub fn update(&mut self, candidate: TrackingState) -> TrackingState {
        if candidate == self.current {
            self.pending = None;
            return self.current;
        }

        let immediate = !candidate.is_hand_present()
            || !self.current.is_hand_present()
            || self.confirm_frames <= 1;
        if immediate {
            self.current = candidate;
            self.pending = None;
            return self.current;
        }

        let seen = match self.pending {
            Some((state, count)) if state == candidate => count + 1,
            _ => 1,
        };
        if seen >= self.confirm_frames {
            self.current = candidate;
            self.pending = None;
        } else {
            self.pending = Some((candidate, seen));
        }
        self.current
    }

    pub fn reset(&mut self) {
        self.current = TrackingState::NoHand;
        self.pending = None;
    }
}
