use serde::Serialize;

/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Corner geometry of a located QR code, in image pixel coordinates.
///
/// Corners are kept in the order the decoder reported them; nothing here
/// depends on that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QrGeometry {
    /// The four corner points
    pub corners: [Point; 4],
}

impl QrGeometry {
    /// Create geometry from four corners
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned bounding box as `(min, max)` corners
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut min = Point::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for c in &self.corners {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        (min, max)
    }

    /// Area of the axis-aligned bounding box in square pixels
    pub fn bounding_area(&self) -> f64 {
        let (min, max) = self.bounding_box();
        let w = (max.x - min.x).max(0.0) as f64;
        let h = (max.y - min.y).max(0.0) as f64;
        w * h
    }
}
