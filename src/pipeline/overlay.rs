use std::time::Duration;

use image::RgbImage;

use crate::{
    proximity::BoundaryReference,
    types::{Frame, Point2D, TrackingOutput, TrackingState},
};

pub const BOUNDARY_LINE_THICKNESS: i32 = 2;
pub const HAND_MARKER_RADIUS: i32 = 10;
const HAND_RING_RADIUS: i32 = 12;
const CENTER_DOT_RADIUS: i32 = 5;
pub const STATE_BAR_HEIGHT: u32 = 60;
const STATE_BAR_KEEP: f32 = 0.3;
const STATE_SWATCH: (i32, i32, i32, i32) = (10, 10, 50, 50);
pub const DANGER_BANNER_HEIGHT: u32 = 50;
const DANGER_FLASH_HZ: f64 = 4.0;

const WARNING_RING_COLOR: [u8; 3] = [255, 255, 0];
const DANGER_RING_COLOR: [u8; 3] = [255, 0, 0];
const CENTER_COLOR: [u8; 3] = [255, 0, 255];
const HAND_COLOR: [u8; 3] = [0, 255, 0];
const RING_COLOR: [u8; 3] = [255, 255, 255];
const DISTANCE_LINE_COLOR: [u8; 3] = [0, 0, 255];

pub fn state_color(state: TrackingState) -> [u8; 3] {
    match state {
        TrackingState::Safe => [0, 255, 0],
        TrackingState::Warning => [255, 255, 0],
        TrackingState::Danger => [255, 0, 0],
        TrackingState::NoHand => [128, 128, 128],
    }
}

/// The DANGER banner blinks twice a second, lit for a quarter second at a time.
pub fn danger_flash_on(elapsed: Duration) -> bool {
    ((elapsed.as_secs_f64() * DANGER_FLASH_HZ) as u64) % 2 == 0
}

/// Copies `frame` and draws the boundary, the hand marker, the state bar
/// and, while `flash_on`, the DANGER banner.
pub fn render_overlay(
    frame: &Frame,
    output: &TrackingOutput,
    boundary: &BoundaryReference,
    flash_on: bool,
) -> RgbImage {
    let (width, height) = frame.dimensions();
    let mut buffer = frame.as_rgb().to_vec();

    draw_boundary(&mut buffer, width, height, boundary);
    if let Some(centroid) = output.centroid {
        draw_hand(&mut buffer, width, height, &centroid, &boundary.center);
    }
    draw_state_bar(&mut buffer, width, height, output.state);
    if output.state == TrackingState::Danger && flash_on {
        draw_danger_banner(&mut buffer, width, height);
    }

    RgbImage::from_raw(width, height, buffer).unwrap_or_else(|| RgbImage::new(width, height))
}

pub fn draw_boundary(buffer: &mut [u8], width: u32, height: u32, boundary: &BoundaryReference) {
    let center = boundary.center.to_pixel();
    draw_ring(
        buffer,
        width,
        height,
        center,
        boundary.warning_radius.round() as i32,
        BOUNDARY_LINE_THICKNESS,
        WARNING_RING_COLOR,
    );
    draw_ring(
        buffer,
        width,
        height,
        center,
        boundary.danger_radius.round() as i32,
        BOUNDARY_LINE_THICKNESS,
        DANGER_RING_COLOR,
    );
    draw_circle(buffer, width, height, center, CENTER_DOT_RADIUS, CENTER_COLOR);
}

pub fn draw_hand(buffer: &mut [u8], width: u32, height: u32, hand: &Point2D, center: &Point2D) {
    let hand_px = hand.to_pixel();
    draw_line(
        buffer,
        width,
        height,
        hand_px,
        center.to_pixel(),
        DISTANCE_LINE_COLOR,
        BOUNDARY_LINE_THICKNESS,
    );
    draw_circle(buffer, width, height, hand_px, HAND_MARKER_RADIUS, HAND_COLOR);
    draw_ring(
        buffer,
        width,
        height,
        hand_px,
        HAND_RING_RADIUS,
        BOUNDARY_LINE_THICKNESS,
        RING_COLOR,
    );
}

/// Darkens the top band and puts a state-colored swatch in its corner.
pub fn draw_state_bar(buffer: &mut [u8], width: u32, height: u32, state: TrackingState) {
    let rows = STATE_BAR_HEIGHT.min(height) as usize;
    let band = (rows * width as usize * 3).min(buffer.len());
    for value in &mut buffer[..band] {
        *value = (*value as f32 * STATE_BAR_KEEP).round() as u8;
    }

    let (x0, y0, x1, y1) = STATE_SWATCH;
    fill_rect(buffer, width, height, x0, y0, x1, y1, state_color(state));
}

pub fn draw_danger_banner(buffer: &mut [u8], width: u32, height: u32) {
    let w = width as i32;
    let h = height as i32;
    let banner = DANGER_BANNER_HEIGHT as i32;
    fill_rect(
        buffer,
        width,
        height,
        w / 10,
        h - banner - 10,
        w - w / 10,
        h - 10,
        DANGER_RING_COLOR,
    );
}

fn fill_rect(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: [u8; 3],
) {
    for y in y0.max(0)..y1.min(height as i32) {
        for x in x0.max(0)..x1.min(width as i32) {
            put_pixel_safe(buffer, width, height, x, y, color);
        }
    }
}

fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    p0: (i32, i32),
    p1: (i32, i32),
    color: [u8; 3],
    thickness: i32,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        put_pixel_safe(buffer, width, height, x0, y0, color);
        if radius > 0 {
            for ox in -radius..=radius {
                for oy in -radius..=radius {
                    if ox.abs() + oy.abs() <= radius {
                        put_pixel_safe(buffer, width, height, x0 + ox, y0 + oy, color);
                    }
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: [u8; 3],
) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_ring(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    thickness: i32,
    color: [u8; 3],
) {
    let (cx, cy) = center;
    let outer = radius + thickness / 2;
    let inner = (radius - (thickness - 1) / 2 - 1).max(0);
    for dy in -outer..=outer {
        for dx in -outer..=outer {
            let d2 = dx * dx + dy * dy;
            if d2 <= outer * outer && d2 > inner * inner {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 3]) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= width || uy >= height {
        return;
    }
    let idx = ((uy * width + ux) as usize) * 3;
    if idx + 2 < buffer.len() {
        buffer[idx..idx + 3].copy_from_slice(&color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame() -> Frame {
        Frame::from_rgb(640, 480, vec![100; 640 * 480 * 3]).unwrap()
    }

    fn output(state: TrackingState, centroid: Option<Point2D>) -> TrackingOutput {
        TrackingOutput {
            frame_index: 0,
            centroid,
            distance: centroid.map(|c| c.distance_to(&BoundaryReference::default().center)),
            state,
            region_area: None,
        }
    }

    #[test]
    fn flash_alternates_every_quarter_second() {
        assert!(danger_flash_on(Duration::from_millis(0)));
        assert!(!danger_flash_on(Duration::from_millis(300)));
        assert!(danger_flash_on(Duration::from_millis(600)));
    }

    #[test]
    fn boundary_rings_are_drawn() {
        let image = render_overlay(
            &gray_frame(),
            &output(TrackingState::NoHand, None),
            &BoundaryReference::default(),
            false,
        );
        assert_eq!(image.get_pixel(320 + 120, 240).0, WARNING_RING_COLOR);
        assert_eq!(image.get_pixel(320 + 50, 240).0, DANGER_RING_COLOR);
        assert_eq!(image.get_pixel(320, 240).0, CENTER_COLOR);
        assert_eq!(image.get_pixel(320 + 85, 240).0, [100, 100, 100]);
    }

    #[test]
    fn state_bar_dims_and_marks_state() {
        let image = render_overlay(
            &gray_frame(),
            &output(TrackingState::Safe, Some(Point2D::new(500.0, 240.0))),
            &BoundaryReference::default(),
            false,
        );
        assert_eq!(image.get_pixel(300, 30).0, [30, 30, 30]);
        assert_eq!(image.get_pixel(20, 20).0, state_color(TrackingState::Safe));
        assert_eq!(image.get_pixel(500, 240).0, HAND_COLOR);
    }

    #[test]
    fn danger_banner_follows_flash() {
        let boundary = BoundaryReference::default();
        let danger = output(TrackingState::Danger, Some(Point2D::new(320.0, 240.0)));
        let lit = render_overlay(&gray_frame(), &danger, &boundary, true);
        let dark = render_overlay(&gray_frame(), &danger, &boundary, false);
        assert_eq!(lit.get_pixel(320, 440).0, DANGER_RING_COLOR);
        assert_eq!(dark.get_pixel(320, 440).0, [100, 100, 100]);
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let frame = Frame::from_rgb(8, 8, vec![0; 8 * 8 * 3]).unwrap();
        let far = output(TrackingState::Safe, Some(Point2D::new(-50.0, 900.0)));
        let image = render_overlay(&frame, &far, &BoundaryReference::default(), true);
        assert_eq!(image.dimensions(), (8, 8));
    }
}
