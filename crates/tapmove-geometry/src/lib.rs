#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library of 2D primitives for grid-based tabletop movement."]
#![doc = ""]
#![doc = "This crate provides world-space points and rectangles, parametric segment"]
#![doc = "intersection, and Cohen-Sutherland clipping of segments against rectangles."]

use core::fmt;
use libm::sqrt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::GeometryError;

/// Determinant magnitude below which two segments are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-4;

/// A point in world (scene pixel) coordinates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    /// World-space x coordinate.
    pub x: f64,
    /// World-space y coordinate.
    pub y: f64,
}

impl WorldPoint {
    /// Construct a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        WorldPoint { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: WorldPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        sqrt(dx * dx + dy * dy)
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn cross(&self, other: WorldPoint) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn sub(&self, other: WorldPoint) -> WorldPoint {
        WorldPoint::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// An axis-aligned rectangle anchored at its minimum corner.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Minimum x coordinate.
    pub x: f64,
    /// Minimum y coordinate.
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Rect {
    /// Construct a new rectangle.
    ///
    /// # Arguments
    ///
    /// * `x`, `y`: The minimum corner.
    /// * `width`, `height`: Extents, which must be non-negative.
    ///
    /// # Errors
    ///
    /// Returns `Err(GeometryError::NegativeExtent)` if either extent is negative.
    /// Returns `Err(GeometryError::NonFiniteCoordinate)` if any value is NaN or infinite.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeometryError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate("rectangle values must be finite"));
        }
        if width < 0.0 || height < 0.0 {
            return Err(GeometryError::NegativeExtent("width and height must be non-negative"));
        }
        Ok(Rect { x, y, width, height })
    }

    /// Build a rectangle from its center and extents, without validation.
    pub fn from_center(center: WorldPoint, width: f64, height: f64) -> Self {
        Rect {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    /// Maximum x coordinate.
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Maximum y coordinate.
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Center of the rectangle.
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns `true` if `p` lies inside or on the boundary.
    pub fn contains(&self, p: WorldPoint) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    /// Returns `true` if the two rectangles share an area greater than zero.
    /// Rectangles that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.max_x() && other.x < self.max_x() && self.y < other.max_y() && other.y < self.max_y()
    }

    /// Returns a copy grown by `margin` on every side. A negative margin shrinks it.
    pub fn expanded(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: (self.width + 2.0 * margin).max(0.0),
            height: (self.height + 2.0 * margin).max(0.0),
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect [{:.1}, {:.1}] {:.1}x{:.1}", self.x, self.y, self.width, self.height)
    }
}

/// Returns `true` if segment `p1-p2` intersects segment `p3-p4`.
///
/// Uses the parametric form `p1 + t(p2 - p1) = p3 + u(p4 - p3)` solved with
/// cross products. Touching endpoints count as an intersection. Segments
/// whose direction determinant is within [`PARALLEL_EPSILON`] of zero are
/// treated as non-intersecting, including collinear overlaps.
///
/// # Arguments
///
/// * `p1`, `p2`: Endpoints of the first segment.
/// * `p3`, `p4`: Endpoints of the second segment.
pub fn segments_intersect(p1: WorldPoint, p2: WorldPoint, p3: WorldPoint, p4: WorldPoint) -> bool {
    let d1 = p2.sub(p1);
    let d2 = p4.sub(p3);
    let det = d1.cross(d2);
    if det.abs() < PARALLEL_EPSILON {
        return false;
    }

    let offset = p3.sub(p1);
    let t = offset.cross(d2) / det;
    let u = offset.cross(d1) / det;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BELOW: u8 = 4;
const ABOVE: u8 = 8;

fn outcode(p: WorldPoint, rect: &Rect) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.x {
        code |= LEFT;
    } else if p.x > rect.max_x() {
        code |= RIGHT;
    }
    if p.y < rect.y {
        code |= BELOW;
    } else if p.y > rect.max_y() {
        code |= ABOVE;
    }
    code
}

/// Clips segment `a-b` to `rect` using the Cohen-Sutherland algorithm.
///
/// # Arguments
///
/// * `a`, `b`: Segment endpoints.
/// * `rect`: The clip rectangle.
///
/// # Returns
///
/// The portion of the segment inside the rectangle, or `None` if the segment
/// lies entirely outside it.
pub fn clip_segment_to_rect(a: WorldPoint, b: WorldPoint, rect: &Rect) -> Option<(WorldPoint, WorldPoint)> {
    let mut p0 = a;
    let mut p1 = b;
    let mut code0 = outcode(p0, rect);
    let mut code1 = outcode(p1, rect);

    loop {
        if code0 | code1 == INSIDE {
            return Some((p0, p1));
        }
        if code0 & code1 != INSIDE {
            return None;
        }

        // Move whichever endpoint is outside onto the rectangle boundary.
        let out = if code0 != INSIDE { code0 } else { code1 };
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let clipped = if out & ABOVE != 0 {
            WorldPoint::new(p0.x + dx * (rect.max_y() - p0.y) / dy, rect.max_y())
        } else if out & BELOW != 0 {
            WorldPoint::new(p0.x + dx * (rect.y - p0.y) / dy, rect.y)
        } else if out & RIGHT != 0 {
            WorldPoint::new(rect.max_x(), p0.y + dy * (rect.max_x() - p0.x) / dx)
        } else {
            WorldPoint::new(rect.x, p0.y + dy * (rect.x - p0.x) / dx)
        };

        if out == code0 {
            p0 = clipped;
            code0 = outcode(p0, rect);
        } else {
            p1 = clipped;
            code1 = outcode(p1, rect);
        }
    }
}

/// Length of the part of segment `a-b` that lies inside `rect`, or `0.0`.
pub fn clipped_length(a: WorldPoint, b: WorldPoint, rect: &Rect) -> f64 {
    match clip_segment_to_rect(a, b, rect) {
        Some((p0, p1)) => p0.distance_to(p1),
        None => 0.0,
    }
}
