#[cfg(feature = "camera-nokhwa")]
pub mod camera;
pub mod overlay;
pub mod rgb_converter;
pub mod worker;

// Re-exports for convenience
#[cfg(feature = "camera-nokhwa")]
pub use camera::{
    CameraDevice, CameraId, CameraStream, CaptureOptions, available_cameras, start_camera_stream,
};
pub use overlay::{danger_flash_on, render_overlay};
pub use rgb_converter::{PixelLayout, convert_buffer};
pub use worker::{recv_latest_frame, start_tracker};
