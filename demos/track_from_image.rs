use std::path::PathBuf;

use anyhow::{Context, Result};
use hand_proximity::{Frame, HandTracker, TrackerConfig, pipeline::render_overlay};
use image::{DynamicImage, Rgb, RgbImage};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().map(PathBuf::from);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tracked.png"));

    let frame = match &input {
        Some(path) => {
            let image = image::open(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Frame::from_image(image)
        }
        None => {
            println!("no image given, using a synthetic hand at (360, 200)");
            synthetic_hand(640, 480, (360.0, 200.0), 45.0)
        }
    };

    let (width, height) = frame.dimensions();
    let mut tracker = HandTracker::new(TrackerConfig::for_resolution(width, height))?;
    let (result, mask) = tracker.step_with_mask(&frame)?;

    match (result.centroid, result.distance) {
        (Some(centroid), Some(distance)) => println!(
            "{} | centroid ({:.1}, {:.1}) | distance {:.1}px | area {:.0}px²",
            result.state,
            centroid.x,
            centroid.y,
            distance,
            result.region_area.unwrap_or_default()
        ),
        _ => println!("{}", result.state),
    }

    render_overlay(&frame, &result, tracker.boundary(), true)
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("overlay written to {}", output.display());

    if let Some(mask) = mask {
        let mask_path = output.with_extension("mask.png");
        mask.save(&mask_path)
            .with_context(|| format!("failed to write {}", mask_path.display()))?;
        println!("mask written to {}", mask_path.display());
    }

    Ok(())
}

fn synthetic_hand(width: u32, height: u32, center: (f64, f64), radius: f64) -> Frame {
    let mut image = RgbImage::from_pixel(width, height, Rgb([30, 40, 60]));
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f64 - center.0;
        let dy = y as f64 - center.1;
        if dx * dx + dy * dy <= radius * radius {
            *pixel = Rgb([224, 172, 140]);
        }
    }
    Frame::from_image(DynamicImage::ImageRgb8(image))
}
