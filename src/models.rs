use serde::Serialize;

/// Integer pixel coordinate in source-image space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx.hypot(dy)
    }
}

/// A validated text region: exactly four corners in the order
/// top-left, top-right, bottom-right, bottom-left.
///
/// Rectification relies on this order and never re-sorts the points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    pub fn from_corners(corners: [(i32, i32); 4]) -> Self {
        Self {
            points: corners.map(|(x, y)| Point::new(x, y)),
        }
    }

    pub fn top_left(&self) -> Point {
        self.points[0]
    }

    pub fn top_right(&self) -> Point {
        self.points[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.points[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.points[3]
    }

    /// Axis-aligned bounds as (min_x, min_y, max_x, max_y), unclamped
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let xs = self.points.map(|p| p.x);
        let ys = self.points.map(|p| p.y);
        (
            xs.into_iter().min().unwrap_or_default(),
            ys.into_iter().min().unwrap_or_default(),
            xs.into_iter().max().unwrap_or_default(),
            ys.into_iter().max().unwrap_or_default(),
        )
    }
}

/// Unvalidated region as emitted by a detector.
///
/// Each entry of `points` is one point given as a list of coordinates;
/// well-formed output has four points of two coordinates each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRegion {
    pub points: Vec<Vec<i32>>,
}

impl RawRegion {
    pub fn new(points: Vec<Vec<i32>>) -> Self {
        Self { points }
    }

    pub fn from_corners(corners: [(i32, i32); 4]) -> Self {
        Self {
            points: corners.iter().map(|&(x, y)| vec![x, y]).collect(),
        }
    }
}

impl From<Quad> for RawRegion {
    fn from(quad: Quad) -> Self {
        Self {
            points: quad.points.iter().map(|p| vec![p.x, p.y]).collect(),
        }
    }
}

/// Decoded text of one accepted region with its confidence in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    pub text: String,
    pub score: f32,
}

impl RecognitionResult {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}
