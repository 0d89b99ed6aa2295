use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result, anyhow, bail};
use hand_proximity::{
    BoundaryReference, Frame, HandTracker, TrackedFrame, TrackerConfig, TrackingOutput,
    pipeline::render_overlay,
};

const USAGE: &str = "\
usage: hand-proximity [--camera N] [--warning PX] [--danger PX] [--dead-zone PX]
                      [--confirm-frames N] [--min-area PX2] [--no-mirror]
                      [--snapshots DIR] [--list]
       hand-proximity image <in.png> [out.png] [options]";

#[cfg(feature = "camera-nokhwa")]
const FPS_REPORT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

#[derive(Debug, Default)]
struct Options {
    camera: u32,
    warning: Option<f64>,
    danger: Option<f64>,
    dead_zone: Option<f64>,
    confirm_frames: Option<u32>,
    min_area: Option<f64>,
    no_mirror: bool,
    snapshots: Option<PathBuf>,
    list: bool,
    positional: Vec<String>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--camera" => options.camera = parse_value(&arg, args.next())?,
                "--warning" => options.warning = Some(parse_value(&arg, args.next())?),
                "--danger" => options.danger = Some(parse_value(&arg, args.next())?),
                "--dead-zone" => options.dead_zone = Some(parse_value(&arg, args.next())?),
                "--confirm-frames" => {
                    options.confirm_frames = Some(parse_value(&arg, args.next())?)
                }
                "--min-area" => options.min_area = Some(parse_value(&arg, args.next())?),
                "--snapshots" => {
                    options.snapshots = Some(PathBuf::from(
                        args.next().ok_or_else(|| anyhow!("--snapshots needs a value"))?,
                    ))
                }
                "--no-mirror" => options.no_mirror = true,
                "--list" => options.list = true,
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ => options.positional.push(arg),
            }
        }

        Ok(options)
    }

    /// Defaults scaled to the frame, then overridden by whatever was passed.
    fn tracker_config(&self, width: u32, height: u32) -> TrackerConfig {
        let mut config = TrackerConfig::for_resolution(width, height);
        if let Some(warning) = self.warning {
            config.boundary.warning_radius = warning;
        }
        if let Some(danger) = self.danger {
            config.boundary.danger_radius = danger;
        }
        if let Some(dead_zone) = self.dead_zone {
            config.transition.dead_zone = dead_zone;
        }
        if let Some(confirm_frames) = self.confirm_frames {
            config.transition.confirm_frames = confirm_frames;
        }
        if let Some(min_area) = self.min_area {
            config.detector.region.min_area = min_area;
        }
        config
    }
}

fn parse_value<T>(flag: &str, value: Option<String>) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.ok_or_else(|| anyhow!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|err| anyhow!("invalid value {value:?} for {flag}: {err}"))
}

fn main() -> Result<()> {
    env_logger::init();

    let options = Options::parse(env::args().skip(1))?;
    if options.list {
        return list_cameras();
    }

    match options.positional.first().map(String::as_str) {
        Some("image") => {
            let input = options
                .positional
                .get(1)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("image mode needs an input path\n{USAGE}"))?;
            let output = options.positional.get(2).map(PathBuf::from);
            run_image(&input, output, &options)
        }
        Some(other) => bail!("unknown command {other}\n{USAGE}"),
        None => run_live(&options),
    }
}

fn run_image(input: &Path, output: Option<PathBuf>, options: &Options) -> Result<()> {
    let image =
        image::open(input).with_context(|| format!("failed to read {}", input.display()))?;
    let frame = Frame::from_image(image);
    let (width, height) = frame.dimensions();

    let mut tracker = HandTracker::new(options.tracker_config(width, height))?;
    let result = tracker.step(&frame)?;
    println!("{}", describe(&result));

    let output = output.unwrap_or_else(|| default_output_path(input));
    render_overlay(&frame, &result, tracker.boundary(), true)
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("annotated frame written to {}", output.display());
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("frame");
    input.with_file_name(format!("{stem}_tracked.png"))
}

fn describe(output: &TrackingOutput) -> String {
    match (output.centroid, output.distance) {
        (Some(centroid), Some(distance)) => format!(
            "{}: hand at ({:.1}, {:.1}), {:.1}px from center",
            output.state, centroid.x, centroid.y, distance
        ),
        _ => output.state.to_string(),
    }
}

#[cfg(feature = "camera-nokhwa")]
fn list_cameras() -> Result<()> {
    let cameras = hand_proximity::pipeline::available_cameras()?;
    if cameras.is_empty() {
        println!("no cameras found");
    }
    for camera in cameras {
        println!("{}", camera.label);
    }
    Ok(())
}

#[cfg(not(feature = "camera-nokhwa"))]
fn list_cameras() -> Result<()> {
    bail!("built without camera support (enable the camera-nokhwa feature)")
}

#[cfg(feature = "camera-nokhwa")]
fn run_live(options: &Options) -> Result<()> {
    use std::{fs, time::Instant};

    use crossbeam_channel::bounded;
    use hand_proximity::{
        TrackingState,
        fps::FpsMeter,
        pipeline::{
            CameraId, CaptureOptions, danger_flash_on, start_camera_stream, start_tracker,
        },
    };

    let (frame_tx, frame_rx) = bounded(1);
    let (result_tx, result_rx) = bounded(1);

    let capture = CaptureOptions {
        mirror: !options.no_mirror,
    };
    let stream = start_camera_stream(CameraId::Index(options.camera), capture, frame_tx)
        .with_context(|| format!("failed to open camera {}", options.camera))?;

    let (width, height) = stream.resolution();
    let config = options.tracker_config(width, height);
    let worker = start_tracker(config, frame_rx, result_tx)?;

    if let Some(dir) = &options.snapshots {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let started = Instant::now();
    let mut fps = FpsMeter::default();
    let mut last_frame = Instant::now();
    let mut last_report = Instant::now();
    let mut last_state = TrackingState::NoHand;

    for tracked in result_rx.iter() {
        let now = Instant::now();
        fps.record(now.duration_since(last_frame));
        last_frame = now;

        if now.duration_since(last_report) >= FPS_REPORT_INTERVAL {
            log::info!("{:.1} fps, {}", fps.fps(), describe(&tracked.output));
            last_report = now;
        }

        if tracked.output.state != last_state {
            last_state = tracked.output.state;
            if let Some(dir) = &options.snapshots {
                let flash_on = danger_flash_on(started.elapsed());
                if let Err(err) = save_snapshot(dir, &tracked, &config.boundary, flash_on) {
                    log::warn!("failed to save snapshot: {err:?}");
                }
            }
        }
    }

    println!(
        "session ended after {:.1}s, {:.1} fps over the last {} frames",
        started.elapsed().as_secs_f64(),
        fps.fps(),
        fps.len()
    );
    stream.stop();
    worker
        .join()
        .map_err(|_| anyhow!("tracker thread panicked"))
}

#[cfg(not(feature = "camera-nokhwa"))]
fn run_live(_options: &Options) -> Result<()> {
    bail!("built without camera support (enable the camera-nokhwa feature)")
}

#[cfg_attr(not(feature = "camera-nokhwa"), allow(dead_code))]
fn save_snapshot(
    dir: &Path,
    tracked: &TrackedFrame,
    boundary: &BoundaryReference,
    flash_on: bool,
) -> Result<()> {
    let output = &tracked.output;
    let stem = format!(
        "frame_{:06}_{}",
        output.frame_index,
        output.state.label().to_lowercase().replace(' ', "_")
    );

    let overlay_path = dir.join(format!("{stem}.png"));
    render_overlay(&tracked.frame, output, boundary, flash_on)
        .save(&overlay_path)
        .with_context(|| format!("failed to write {}", overlay_path.display()))?;

    if let Some(mask) = &tracked.mask {
        let mask_path = dir.join(format!("{stem}_mask.png"));
        mask.save(&mask_path)
            .with_context(|| format!("failed to write {}", mask_path.display()))?;
    }

    log::info!("snapshot {} saved", overlay_path.display());
    Ok(())
}
