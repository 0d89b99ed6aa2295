use anyhow::Result;
use hand_proximity::{
    Frame, HandTracker, TrackerConfig, TrackingState, TransitionPolicy, fps::FpsMeter,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::time::Instant;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const HAND_RADIUS: f64 = 40.0;
const STEPS: usize = 24;

fn main() -> Result<()> {
    env_logger::init();

    // Pass a dead zone in pixels to see the hysteresis at work.
    let dead_zone = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<f64>())
        .transpose()?
        .unwrap_or(0.0);

    let config = TrackerConfig {
        transition: TransitionPolicy {
            dead_zone,
            ..TransitionPolicy::default()
        },
        ..TrackerConfig::for_resolution(WIDTH, HEIGHT)
    };
    let mut tracker = HandTracker::new(config)?;
    let center = tracker.boundary().center;

    let start = (60.0, 60.0);
    let mut fps = FpsMeter::default();
    let mut last_state = TrackingState::NoHand;

    for step in 0..=STEPS {
        let t = step as f64 / STEPS as f64;
        let position = (
            start.0 + (center.x - start.0) * t,
            start.1 + (center.y - start.1) * t,
        );
        let frame = disk_frame(position);

        let started = Instant::now();
        let output = tracker.step(&frame)?;
        fps.record(started.elapsed());

        let marker = if output.state != last_state { "*" } else { " " };
        last_state = output.state;
        match output.distance {
            Some(distance) => println!(
                "{marker} step {step:>2} | hand ({:>5.1}, {:>5.1}) | {distance:>6.1}px | {}",
                position.0, position.1, output.state
            ),
            None => println!("{marker} step {step:>2} | {}", output.state),
        }
    }

    println!("tracked {} frames at {:.0} fps", STEPS + 1, fps.fps());
    Ok(())
}

fn disk_frame(center: (f64, f64)) -> Frame {
    let mut image = RgbImage::new(WIDTH, HEIGHT);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f64 - center.0;
        let dy = y as f64 - center.1;
        if dx * dx + dy * dy <= HAND_RADIUS * HAND_RADIUS {
            *pixel = Rgb([224, 172, 140]);
        }
    }
    Frame::from_image(DynamicImage::ImageRgb8(image))
}
