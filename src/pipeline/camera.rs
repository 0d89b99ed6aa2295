use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Instant,
};

use anyhow::{Result, anyhow};
use crossbeam_channel::{Sender, TrySendError};
use nokhwa::{
    Buffer, Camera,
    pixel_format::RgbFormat,
    query,
    utils::{
        ApiBackend, CameraIndex, CameraInfo, FrameFormat, RequestedFormat, RequestedFormatType,
    },
};

use super::rgb_converter::{self, PixelLayout};
use crate::types::Frame;

pub use nokhwa::utils::CameraIndex as CameraId;

// Prefer pixel formats that are widely supported on macOS (the built-in cameras
// often reject YUYV even though Nokhwa reports it).
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::RAWRGB,
    FrameFormat::RAWBGR,
    FrameFormat::GRAY,
    FrameFormat::YUYV,
    FrameFormat::NV12,
    FrameFormat::MJPEG,
];

fn requested_formats() -> [RequestedFormat<'static>; 4] {
    [
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestFrameRate,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestResolution,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

#[derive(Clone, Debug)]
pub struct CameraDevice {
    pub index: CameraIndex,
    pub label: String,
}

#[derive(Clone, Copy, Debug)]
pub struct CaptureOptions {
    /// Flip frames horizontally, as a mirror would.
    pub mirror: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self { mirror: true }
    }
}

#[derive(Debug)]
pub struct CameraStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    resolution: (u32, u32),
}

impl CameraStream {
    /// Resolution negotiated when the device was opened.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn available_cameras() -> Result<Vec<CameraDevice>> {
    let cameras = query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|info| CameraDevice {
            index: info.index().clone(),
            label: format_camera_label(&info),
        })
        .collect())
}

fn format_camera_label(info: &CameraInfo) -> String {
    format!("{} ({})", info.human_name(), info.index())
}

fn build_camera(index: CameraIndex) -> Result<Camera> {
    let mut last_err = None;

    for requested in requested_formats() {
        match Camera::new(index.clone(), requested) {
            Ok(mut camera) => match camera.open_stream() {
                Ok(()) => return Ok(camera),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("failed to open camera with any supported format")))
}

fn layout_of(format: FrameFormat) -> PixelLayout {
    match format {
        FrameFormat::NV12 => PixelLayout::Nv12,
        FrameFormat::YUYV => PixelLayout::Yuyv,
        FrameFormat::MJPEG => PixelLayout::Mjpeg,
        FrameFormat::RAWRGB => PixelLayout::Rgb,
        FrameFormat::RAWBGR => PixelLayout::Bgr,
        FrameFormat::GRAY => PixelLayout::Gray,
    }
}

fn convert_camera_frame(buffer: &Buffer, mirror: bool) -> Result<Frame> {
    let resolution = buffer.resolution();
    rgb_converter::convert_buffer(
        layout_of(buffer.source_frame_format()),
        buffer.buffer(),
        resolution.width_x,
        resolution.height_y,
        mirror,
    )
}

pub fn start_camera_stream(
    index: CameraIndex,
    options: CaptureOptions,
    frame_tx: Sender<Frame>,
) -> Result<CameraStream> {
    // Fail fast before spawning the capture thread.
    let probe = build_camera(index.clone())?;
    let negotiated = probe.resolution();
    log::info!(
        "camera {} opened at {} ({})",
        index,
        negotiated,
        probe.frame_format()
    );
    drop(probe);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        let mut camera = match build_camera(index) {
            Ok(cam) => cam,
            Err(err) => {
                log::error!("failed to open camera: {err:?}");
                return;
            }
        };

        while !stop_flag.load(Ordering::Relaxed) {
            let frame_start = Instant::now();
            let buffer = match camera.frame() {
                Ok(buffer) => buffer,
                Err(err) => {
                    log::warn!(
                        "camera frame read failed (after {:?}): {err:?}",
                        frame_start.elapsed()
                    );
                    continue;
                }
            };

            let frame = match convert_camera_frame(&buffer, options.mirror) {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("failed to decode camera frame {err:?}");
                    continue;
                }
            };

            // Drop if the worker is busy; the tracker only wants fresh frames.
            if let Err(TrySendError::Disconnected(_)) = frame_tx.try_send(frame) {
                log::info!("frame receiver disconnected, stopping capture");
                break;
            }
        }

        if let Err(err) = camera.stop_stream() {
            log::warn!("failed to stop camera stream: {err:?}");
        }
    });

    Ok(CameraStream {
        stop,
        handle: Some(handle),
        resolution: (negotiated.width_x, negotiated.height_y),
    })
}
