use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbImage, RgbaImage};
use std::path::Path;

use crate::error::PipelineError;

/// Convert a live RGBA capture to the 3-channel working image at a fixed resolution
pub fn frame_to_working(frame: &RgbaImage, width: u32, height: u32) -> RgbImage {
    let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
    if rgb.dimensions() == (width, height) {
        return rgb;
    }
    imageops::resize(&rgb, width, height, FilterType::Triangle)
}

/// Decode an image file at its native resolution as 3-channel RGB
pub fn load_source_file(path: &Path) -> Result<RgbImage, PipelineError> {
    let unreadable = |reason: String| PipelineError::SourceUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let img = ImageReader::open(path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .decode()
        .map_err(|e| unreadable(e.to_string()))?;

    Ok(img.to_rgb8())
}

/// Reject sources outside `min..=max` pixels on either axis
pub fn check_source_size(width: u32, height: u32, min: u32, max: u32) -> Result<(), PipelineError> {
    let in_range = |side: u32| side >= min && side <= max;
    if in_range(width) && in_range(height) {
        Ok(())
    } else {
        Err(PipelineError::InvalidSourceSize {
            width,
            height,
            min,
            max,
        })
    }
}
