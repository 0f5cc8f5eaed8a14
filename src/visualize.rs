//! Diagnostic overlays for detected regions.
//!
//! Independent of recognition: callers pass the regions reported by the
//! pipeline and decide what to do with a failure to write the output.

use anyhow::Context;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::path::Path;
use tracing::debug;

use crate::models::RawRegion;

pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

pub const OUTLINE_THICKNESS: i32 = 2;

/// Draw every region as a closed polygon on a copy of `image`.
///
/// Points with fewer than two coordinates are ignored; regions left with
/// fewer than two points are not drawn.
pub fn render_outlines(image: &RgbImage, regions: &[RawRegion]) -> RgbImage {
    let mut canvas = image.clone();

    for region in regions {
        let points: Vec<(f32, f32)> = region
            .points
            .iter()
            .filter(|coords| coords.len() >= 2)
            .map(|coords| (coords[0] as f32, coords[1] as f32))
            .collect();

        if points.len() < 2 {
            continue;
        }

        for i in 0..points.len() {
            let start = points[i];
            let end = points[(i + 1) % points.len()];
            for t in 0..OUTLINE_THICKNESS {
                let offset = t as f32;
                draw_line_segment_mut(
                    &mut canvas,
                    (start.0 + offset, start.1),
                    (end.0 + offset, end.1),
                    OUTLINE_COLOR,
                );
                draw_line_segment_mut(
                    &mut canvas,
                    (start.0, start.1 + offset),
                    (end.0, end.1 + offset),
                    OUTLINE_COLOR,
                );
            }
        }
    }

    canvas
}

/// Render region outlines and write the annotated image to `output_path`
pub fn annotate(
    image: &RgbImage,
    regions: &[RawRegion],
    output_path: &Path,
) -> anyhow::Result<RgbImage> {
    let annotated = render_outlines(image, regions);
    annotated
        .save(output_path)
        .with_context(|| format!("Failed to save annotated image: {}", output_path.display()))?;
    debug!(
        regions = regions.len(),
        "Saved annotated image to {}",
        output_path.display()
    );
    Ok(annotated)
}
