//! Perspective rectification of quadrilateral text regions.
//!
//! A region is cropped to its clamped bounding box, its corners are mapped
//! onto an upright rectangle whose sides match the quad's top and left edge
//! lengths, and the crop is resampled through that homography. Samples that
//! fall outside the crop replicate the nearest edge pixel.

use image::{Rgb, RgbImage, imageops};
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use tracing::debug;

use crate::models::Quad;

/// Crops at least this much taller than wide are treated as vertical text
pub const VERTICAL_ASPECT_RATIO: f32 = 1.5;

/// Rectify `quad` out of `image` into an upright crop.
///
/// Returns `None` when there is nothing to crop: the clamped bounding box or
/// the target rectangle is degenerate, or the transform cannot be solved.
/// Crops with height >= 1.5 x width are rotated a quarter turn
/// counter-clockwise so the text reads left to right.
pub fn rectify(image: &RgbImage, quad: &Quad) -> Option<RgbImage> {
    let (min_x, min_y, max_x, max_y) = quad.bounds();

    let left = min_x.max(0);
    let top = min_y.max(0);
    let right = max_x.min(image.width() as i32);
    let bottom = max_y.min(image.height() as i32);

    if left >= right || top >= bottom {
        debug!(left, top, right, bottom, "Degenerate crop region");
        return None;
    }

    let crop = imageops::crop_imm(
        image,
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
    .to_image();

    let local = quad
        .points
        .map(|p| (p.x as f64 - left as f64, p.y as f64 - top as f64));

    let target_width = quad.top_left().distance(&quad.top_right()) as i32;
    let target_height = quad.top_left().distance(&quad.bottom_left()) as i32;

    if target_width <= 0 || target_height <= 0 {
        debug!(target_width, target_height, "Degenerate target rectangle");
        return None;
    }

    // A quad inside the image cannot have edges longer than width + height
    let max_side = image.width() as u64 + image.height() as u64;
    if target_width as u64 * target_height as u64 > max_side * max_side {
        debug!(target_width, target_height, "Target rectangle exceeds image extent");
        return None;
    }

    let (w, h) = (target_width as f64, target_height as f64);
    let target = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    let Some(transform) = perspective_transform(&local, &target) else {
        debug!("Perspective transform could not be solved");
        return None;
    };

    let rectified = warp_perspective(&crop, &transform, target_width as u32, target_height as u32)?;

    if rectified.width() == 0 || rectified.height() == 0 {
        return None;
    }

    if rectified.height() as f32 >= rectified.width() as f32 * VERTICAL_ASPECT_RATIO {
        debug!(
            width = rectified.width(),
            height = rectified.height(),
            "Rotating vertical crop"
        );
        Some(imageops::rotate270(&rectified))
    } else {
        Some(rectified)
    }
}

/// Solve the homography mapping each `src` point onto the matching `dst` point
pub(crate) fn perspective_transform(
    src: &[(f64, f64); 4],
    dst: &[(f64, f64); 4],
) -> Option<Matrix3<f64>> {
    let mut a = DMatrix::<f64>::zeros(8, 8);
    let mut b = DVector::<f64>::zeros(8);

    for i in 0..4 {
        let (sx, sy) = src[i];
        let (dx, dy) = dst[i];

        let row_x = [sx, sy, 1.0, 0.0, 0.0, 0.0, -sx * dx, -sy * dx];
        let row_y = [0.0, 0.0, 0.0, sx, sy, 1.0, -sx * dy, -sy * dy];
        for (col, (vx, vy)) in row_x.iter().zip(row_y.iter()).enumerate() {
            a[(i * 2, col)] = *vx;
            a[(i * 2 + 1, col)] = *vy;
        }
        b[i * 2] = dx;
        b[i * 2 + 1] = dy;
    }

    let solution = a.lu().solve(&b)?;
    if solution.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(Matrix3::new(
        solution[0],
        solution[1],
        solution[2],
        solution[3],
        solution[4],
        solution[5],
        solution[6],
        solution[7],
        1.0,
    ))
}

/// Resample `src` through `transform` into a `width` x `height` image.
///
/// Each destination pixel is mapped back through the inverse transform and
/// sampled bilinearly; coordinates outside `src` are clamped to its edges.
pub(crate) fn warp_perspective(
    src: &RgbImage,
    transform: &Matrix3<f64>,
    width: u32,
    height: u32,
) -> Option<RgbImage> {
    if src.width() == 0 || src.height() == 0 {
        return None;
    }

    let inverse = transform.try_inverse()?;
    let max_x = (src.width() - 1) as f64;
    let max_y = (src.height() - 1) as f64;

    let out = RgbImage::from_fn(width, height, |x, y| {
        let mapped = inverse * Vector3::new(x as f64, y as f64, 1.0);
        let (sx, sy) = if mapped.z.abs() > f64::EPSILON {
            (mapped.x / mapped.z, mapped.y / mapped.z)
        } else {
            (0.0, 0.0)
        };
        sample_replicate(src, sx.clamp(0.0, max_x), sy.clamp(0.0, max_y))
    });

    Some(out)
}

/// Bilinear sample at a position already clamped into the image
fn sample_replicate(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.get_pixel(x0, y0);
    let p10 = image.get_pixel(x1, y0);
    let p01 = image.get_pixel(x0, y1);
    let p11 = image.get_pixel(x1, y1);

    let mut out = [0u8; 3];
    for (c, channel) in out.iter_mut().enumerate() {
        let v = (1.0 - fx) * (1.0 - fy) * p00[c] as f64
            + fx * (1.0 - fy) * p10[c] as f64
            + (1.0 - fx) * fy * p01[c] as f64
            + fx * fy * p11[c] as f64;
        *channel = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}
