use std::convert::TryFrom;

use anyhow::{Result, anyhow};
use image::{RgbImage, imageops};
use rayon::prelude::*;
use yuv::{
    YuvBiPlanarImage, YuvConversionMode, YuvPackedImage, YuvRange, YuvStandardMatrix,
    yuv_nv12_to_rgb, yuyv422_to_rgb,
};
use zune_jpeg::{
    JpegDecoder,
    zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions},
};

use crate::types::Frame;

/// Pixel layouts a capture device may hand us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    Nv12,
    Yuyv,
    Mjpeg,
    Rgb,
    Bgr,
    Gray,
}

/// Decodes a raw capture buffer into an RGB frame, optionally mirrored so
/// that moving a hand right moves it right on screen.
pub fn convert_buffer(
    layout: PixelLayout,
    data: &[u8],
    width: u32,
    height: u32,
    mirror: bool,
) -> Result<Frame> {
    let (rgb, width, height) = match layout {
        PixelLayout::Nv12 => (nv12_to_rgb(data, width, height)?, width, height),
        PixelLayout::Yuyv => (yuyv_to_rgb(data, width, height)?, width, height),
        PixelLayout::Mjpeg => mjpeg_to_rgb(data)?,
        PixelLayout::Rgb => (rgb_like_to_rgb(data, width, height, false)?, width, height),
        PixelLayout::Bgr => (rgb_like_to_rgb(data, width, height, true)?, width, height),
        PixelLayout::Gray => (gray_to_rgb(data, width, height)?, width, height),
    };

    let rgb = if mirror {
        let mut image = RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| anyhow!("decoded buffer does not fit {width}x{height}"))?;
        imageops::flip_horizontal_in_place(&mut image);
        image.into_raw()
    } else {
        rgb
    };

    Ok(Frame::from_rgb(width, height, rgb)?)
}

fn nv12_to_rgb(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let y_plane_len = width as usize * height as usize;
    let uv_plane_len = y_plane_len / 2;

    if data.len() < y_plane_len + uv_plane_len {
        return Err(anyhow!(
            "NV12 buffer too small: got {}, expected {}",
            data.len(),
            y_plane_len + uv_plane_len
        ));
    }

    let y_plane = &data[..y_plane_len];
    let uv_plane = &data[y_plane_len..y_plane_len + uv_plane_len];
    let mut rgb = vec![0u8; y_plane_len * 3];

    let image = YuvBiPlanarImage {
        y_plane,
        y_stride: width,
        uv_plane,
        uv_stride: width,
        width,
        height,
    };

    yuv_nv12_to_rgb(
        &image,
        &mut rgb,
        width * 3,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
        YuvConversionMode::Balanced,
    )
    .map_err(|err| anyhow!("NV12→RGB failed: {err:?}"))?;

    Ok(rgb)
}

fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize * 2;
    if data.len() < expected_len {
        return Err(anyhow!(
            "YUYV buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let mut rgb = vec![0u8; (width as usize * height as usize) * 3];
    let packed = YuvPackedImage {
        yuy: data,
        yuy_stride: width * 2,
        width,
        height,
    };

    yuyv422_to_rgb(
        &packed,
        &mut rgb,
        width * 3,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
    )
    .map_err(|err| anyhow!("YUYV422→RGB failed: {err:?}"))?;

    Ok(rgb)
}

/// MJPEG carries its own dimensions, which win over the device's report.
fn mjpeg_to_rgb(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::RGB);
    let mut decoder = JpegDecoder::new_with_options(ZCursor::new(data), options);
    let rgb = decoder
        .decode()
        .map_err(|err| anyhow!("MJPEG decode failed: {err:?}"))?;

    let info = decoder
        .info()
        .ok_or_else(|| anyhow!("MJPEG decoder returned no image info"))?;
    let width =
        u32::try_from(info.width).map_err(|_| anyhow!("MJPEG width does not fit u32"))?;
    let height =
        u32::try_from(info.height).map_err(|_| anyhow!("MJPEG height does not fit u32"))?;
    let expected_len = usize::try_from(width)
        .and_then(|w| usize::try_from(height).map(|h| w * h * 3))
        .map_err(|_| anyhow!("MJPEG dimensions do not fit usize"))?;
    if rgb.len() < expected_len {
        return Err(anyhow!(
            "MJPEG decode produced too few bytes: got {}, expected {}",
            rgb.len(),
            expected_len
        ));
    }

    let mut rgb = rgb;
    rgb.truncate(expected_len);
    Ok((rgb, width, height))
}

fn rgb_like_to_rgb(data: &[u8], width: u32, height: u32, swap_rb: bool) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize * 3;
    if data.len() < expected_len {
        return Err(anyhow!(
            "RGB buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let source = &data[..expected_len];
    if !swap_rb {
        return Ok(source.to_vec());
    }

    let mut rgb = vec![0u8; expected_len];
    rgb.par_chunks_mut(3)
        .zip(source.par_chunks_exact(3))
        .for_each(|(dst, src)| {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        });

    Ok(rgb)
}

fn gray_to_rgb(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize;
    if data.len() < expected_len {
        return Err(anyhow!(
            "GRAY buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let mut rgb = vec![0u8; expected_len * 3];
    rgb.par_chunks_mut(3)
        .zip(data[..expected_len].par_iter().copied())
        .for_each(|(dst, value)| {
            dst.fill(value);
        });

    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_passes_through() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let frame = convert_buffer(PixelLayout::Rgb, &data, 2, 1, false).unwrap();
        assert_eq!(frame.as_rgb(), &data);
    }

    #[test]
    fn bgr_swaps_red_and_blue() {
        let frame = convert_buffer(PixelLayout::Bgr, &[10, 20, 30], 1, 1, false).unwrap();
        assert_eq!(frame.as_rgb(), &[30, 20, 10]);
    }

    #[test]
    fn gray_expands_to_three_channels() {
        let frame = convert_buffer(PixelLayout::Gray, &[7, 9], 2, 1, false).unwrap();
        assert_eq!(frame.as_rgb(), &[7, 7, 7, 9, 9, 9]);
    }

    #[test]
    fn mirror_flips_columns() {
        let data = [1u8, 1, 1, 2, 2, 2, 3, 3, 3];
        let frame = convert_buffer(PixelLayout::Rgb, &data, 3, 1, true).unwrap();
        assert_eq!(frame.as_rgb(), &[3, 3, 3, 2, 2, 2, 1, 1, 1]);
    }

    #[test]
    fn short_buffers_are_errors() {
        assert!(convert_buffer(PixelLayout::Rgb, &[0; 5], 2, 1, false).is_err());
        assert!(convert_buffer(PixelLayout::Yuyv, &[0; 3], 2, 1, false).is_err());
        assert!(convert_buffer(PixelLayout::Nv12, &[0; 4], 2, 2, false).is_err());
    }

    #[test]
    fn garbage_mjpeg_is_an_error() {
        assert!(convert_buffer(PixelLayout::Mjpeg, &[0, 1, 2, 3], 2, 2, false).is_err());
    }
}
