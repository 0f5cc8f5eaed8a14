use crate::error::RegionRejection;
use crate::models::{Point, Quad, RawRegion};

/// Check raw detector output against the working image bounds.
///
/// Rules are applied in order and the first failure is reported:
/// exactly 4 points, exactly 2 coordinates per point, and every point inside
/// `[0, width) x [0, height)`.
pub fn validate(region: &RawRegion, width: u32, height: u32) -> Result<Quad, RegionRejection> {
    if region.points.len() != 4 {
        return Err(RegionRejection::WrongPointCount(region.points.len()));
    }

    if let Some((point, coords)) = region
        .points
        .iter()
        .enumerate()
        .find(|(_, coords)| coords.len() != 2)
    {
        return Err(RegionRejection::WrongCoordinateCount {
            point,
            len: coords.len(),
        });
    }

    let mut points = [Point::new(0, 0); 4];
    for (idx, coords) in region.points.iter().enumerate() {
        let (x, y) = (coords[0], coords[1]);
        let inside = x >= 0 && (x as i64) < width as i64 && y >= 0 && (y as i64) < height as i64;
        if !inside {
            return Err(RegionRejection::OutOfBounds {
                point: idx,
                x,
                y,
                width,
                height,
            });
        }
        points[idx] = Point::new(x, y);
    }

    Ok(Quad::new(points))
}
