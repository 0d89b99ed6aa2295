use crossbeam_channel::bounded;
use hand_proximity::{
    Frame, HandTracker, Point2D, TrackerConfig, TrackingState, pipeline::start_tracker,
};
use image::{DynamicImage, Rgb, RgbImage};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const SKIN: Rgb<u8> = Rgb([224, 172, 140]);
const BLUE: Rgb<u8> = Rgb([40, 60, 200]);

fn disk_frame(center: (f64, f64), radius: f64, color: Rgb<u8>) -> Frame {
    let mut image = RgbImage::new(WIDTH, HEIGHT);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f64 - center.0;
        let dy = y as f64 - center.1;
        if dx * dx + dy * dy <= radius * radius {
            *pixel = color;
        }
    }
    Frame::from_image(DynamicImage::ImageRgb8(image))
}

fn rect_frame(x0: u32, y0: u32, width: u32, height: u32) -> Frame {
    let mut image = RgbImage::new(WIDTH, HEIGHT);
    for y in y0..y0 + height {
        for x in x0..x0 + width {
            image.put_pixel(x, y, SKIN);
        }
    }
    Frame::from_image(DynamicImage::ImageRgb8(image))
}

fn black_frame() -> Frame {
    Frame::from_rgb(WIDTH, HEIGHT, vec![0; (WIDTH * HEIGHT * 3) as usize]).unwrap()
}

fn tracker() -> HandTracker {
    HandTracker::new(TrackerConfig::default()).unwrap()
}

fn rank(state: TrackingState) -> i32 {
    match state {
        TrackingState::Safe => 0,
        TrackingState::Warning => 1,
        TrackingState::Danger => 2,
        TrackingState::NoHand => panic!("hand lost during sweep"),
    }
}

#[test]
fn black_frame_has_no_hand() {
    let output = tracker().step(&black_frame()).unwrap();
    assert_eq!(output.centroid, None);
    assert_eq!(output.distance, None);
    assert_eq!(output.state, TrackingState::NoHand);
}

#[test]
fn centered_disk_is_danger() {
    let output = tracker()
        .step(&disk_frame((320.0, 240.0), 40.0, SKIN))
        .unwrap();
    assert_eq!(output.state, TrackingState::Danger);
    assert!(output.distance.unwrap() < 1.0);
    assert!(output.region_area.unwrap() >= 3000.0);
}

#[test]
fn disk_above_center_is_safe() {
    let output = tracker()
        .step(&disk_frame((320.0, 100.0), 40.0, SKIN))
        .unwrap();
    assert_eq!(output.state, TrackingState::Safe);
    assert!((output.distance.unwrap() - 140.0).abs() < 1.0);
}

#[test]
fn centroid_lands_near_disk_center() {
    let truth = Point2D::new(212.0, 331.0);
    let output = tracker()
        .step(&disk_frame((truth.x, truth.y), 45.0, SKIN))
        .unwrap();
    let centroid = output.centroid.unwrap();
    assert!(
        centroid.distance_to(&truth) <= 2.0,
        "centroid {centroid:?} too far from {truth:?}"
    );
}

#[test]
fn sweep_toward_center_escalates_without_skipping() {
    let mut tracker = tracker();
    let mut previous: Option<(f64, TrackingState)> = None;
    let mut seen = Vec::new();

    // 140px down to 0px in 7px steps, never landing on a cut point.
    for step in 0..=20 {
        let y = 100.0 + 7.0 * step as f64;
        let output = tracker.step(&disk_frame((320.0, y), 40.0, SKIN)).unwrap();
        let distance = output.distance.unwrap();

        if let Some((last_distance, last_state)) = previous {
            assert!(distance <= last_distance + 0.5);
            let jump = rank(output.state) - rank(last_state);
            assert!((0..=1).contains(&jump), "{last_state} -> {}", output.state);
        }
        if !seen.contains(&output.state) {
            seen.push(output.state);
        }
        previous = Some((distance, output.state));
    }

    assert_eq!(
        seen,
        vec![
            TrackingState::Safe,
            TrackingState::Warning,
            TrackingState::Danger
        ]
    );
}

#[test]
fn hand_entering_from_the_left_edge_is_tracked() {
    let output = tracker()
        .step(&disk_frame((0.0, 240.0), 80.0, SKIN))
        .unwrap();
    assert_eq!(output.state, TrackingState::Safe);
    let centroid = output.centroid.unwrap();
    assert!(centroid.x > 10.0 && centroid.x < 60.0, "{centroid:?}");
    assert!((centroid.y - 240.0).abs() < 2.0, "{centroid:?}");
}

#[test]
fn corner_block_is_tracked() {
    let output = tracker().step(&rect_frame(0, 380, 100, 100)).unwrap();
    assert_ne!(output.state, TrackingState::NoHand);
    let centroid = output.centroid.unwrap();
    assert!(
        centroid.distance_to(&Point2D::new(50.0, 430.0)) < 5.0,
        "{centroid:?}"
    );
}

#[test]
fn edge_to_edge_band_is_tracked() {
    let output = tracker().step(&rect_frame(0, 200, WIDTH, 80)).unwrap();
    assert_eq!(output.state, TrackingState::Danger);
    let centroid = output.centroid.unwrap();
    assert!(
        centroid.distance_to(&Point2D::new(320.0, 240.0)) < 2.0,
        "{centroid:?}"
    );
}

#[test]
fn fresh_trackers_agree_on_the_same_frame() {
    let frame = disk_frame((400.0, 260.0), 42.0, SKIN);
    let first = tracker().step(&frame).unwrap();
    let second = tracker().step(&frame).unwrap();
    assert_eq!(first, second);

    let mut repeated = tracker();
    repeated.step(&frame).unwrap();
    let again = repeated.step(&frame).unwrap();
    assert_eq!(again.centroid, first.centroid);
    assert_eq!(again.state, first.state);
    assert_eq!(again.frame_index, 1);
}

#[test]
fn non_skin_colors_are_ignored() {
    let output = tracker()
        .step(&disk_frame((320.0, 240.0), 60.0, BLUE))
        .unwrap();
    assert_eq!(output.state, TrackingState::NoHand);
}

#[test]
fn small_skin_patches_are_ignored() {
    let output = tracker()
        .step(&disk_frame((320.0, 240.0), 15.0, SKIN))
        .unwrap();
    assert_eq!(output.state, TrackingState::NoHand);
}

#[test]
fn mask_marks_the_hand() {
    let (output, mask) = tracker()
        .step_with_mask(&disk_frame((320.0, 240.0), 40.0, SKIN))
        .unwrap();
    let mask = mask.unwrap();
    assert_eq!(output.state, TrackingState::Danger);
    assert_eq!(mask.get_pixel(320, 240).0, [255]);
    assert_eq!(mask.get_pixel(10, 10).0, [0]);
}

#[test]
fn worker_thread_reports_proximity() {
    let (frame_tx, frame_rx) = bounded(1);
    let (result_tx, result_rx) = bounded(1);
    let worker = start_tracker(TrackerConfig::default(), frame_rx, result_tx).unwrap();

    frame_tx
        .send(disk_frame((320.0, 100.0), 40.0, SKIN))
        .unwrap();
    let tracked = result_rx.recv().unwrap();
    assert_eq!(tracked.output.state, TrackingState::Safe);
    assert!(tracked.mask.is_some());

    drop(frame_tx);
    worker.join().unwrap();
}
