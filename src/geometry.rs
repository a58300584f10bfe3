//! # Contour Geometry
//!
//! Geometric primitives backing the bounding-region detection stage: contour
//! points, axis-aligned bounding boxes, and minimum-area bounding rectangles
//! computed with rotating calipers over a convex hull.

use imageproc::point::Point as ImageProcPoint;
use serde::{Deserialize, Serialize};

/// A 2D point with integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a point from an imageproc contour point.
    pub fn from_imageproc_point(p: ImageProcPoint<i32>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// An axis-aligned integer rectangle in pixel coordinates.
///
/// `x`/`y` may be negative for boxes produced by transforming corner points;
/// such boxes fail the crop bounds check rather than being silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned bounds of a set of floating-point corner points, expanded
    /// outward to whole pixels.
    ///
    /// Coordinates within a small epsilon of a whole pixel are snapped first,
    /// so trigonometric noise from a rotation does not inflate the box.
    pub fn from_float_points(points: &[(f32, f32)]) -> Self {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let x0 = snap_to_pixel(min_x).floor() as i32;
        let y0 = snap_to_pixel(min_y).floor() as i32;
        let x1 = snap_to_pixel(max_x).ceil() as i32;
        let y1 = snap_to_pixel(max_y).ceil() as i32;

        Self {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0) as u32,
            height: (y1 - y0).max(0) as u32,
        }
    }

    /// Whether this box lies fully inside an image of the given dimensions.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && (self.x as i64 + self.width as i64) <= image_width as i64
            && (self.y as i64 + self.height as i64) <= image_height as i64
    }

    /// The four corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let x0 = self.x as f32;
        let y0 = self.y as f32;
        let x1 = (self.x + self.width as i32) as f32;
        let y1 = (self.y + self.height as i32) as f32;
        [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }
}

/// A minimum-area bounding rectangle with its own rotation.
///
/// `angle` follows the raw extractor convention: the orientation of the
/// `size.0` side measured in degrees in `[-90, 0)`, with `-90` meaning an
/// axis-aligned rectangle. The tilt estimator normalizes this into the
/// uniform `[0, 90)` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinAreaRect {
    /// Rectangle center in pixel coordinates
    pub center: (f32, f32),
    /// Side lengths (width, height)
    pub size: (f32, f32),
    /// Raw rotation angle in degrees
    pub angle: f32,
}

impl MinAreaRect {
    /// The four corner points of the rotated rectangle.
    ///
    /// Reconstructed from center, size, and angle; corners are returned in
    /// order around the rectangle so consecutive pairs form its edges.
    pub fn corner_points(&self) -> [(f32, f32); 4] {
        // The `size.0` side runs at `angle + 90` degrees.
        let theta = (self.angle + 90.0).to_radians();
        let (ux, uy) = (theta.cos(), theta.sin());
        let (vx, vy) = (-uy, ux);

        let (cx, cy) = self.center;
        let (hw, hh) = (self.size.0 / 2.0, self.size.1 / 2.0);

        [
            (cx - ux * hw - vx * hh, cy - uy * hw - vy * hh),
            (cx + ux * hw - vx * hh, cy + uy * hw - vy * hh),
            (cx + ux * hw + vx * hh, cy + uy * hw + vy * hh),
            (cx - ux * hw + vx * hh, cy - uy * hw + vy * hh),
        ]
    }
}

/// An ordered closed polygon approximating a connected foreground boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Boundary points in traversal order
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Builds a contour from imageproc contour points.
    pub fn from_imageproc_points(points: &[ImageProcPoint<i32>]) -> Self {
        Self {
            points: points
                .iter()
                .map(|p| Point::from_imageproc_point(*p))
                .collect(),
        }
    }

    /// Enclosed polygon area computed with the shoelace formula.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut sum = 0.0f64;
        let n = self.points.len();
        for i in 0..n {
            let j = (i + 1) % n;
            sum += self.points[i].x as f64 * self.points[j].y as f64;
            sum -= self.points[j].x as f64 * self.points[i].y as f64;
        }
        sum.abs() / 2.0
    }

    /// Axis-aligned bounding box of the contour points (pixel-inclusive).
    pub fn bounding_box(&self) -> BoundingBox {
        if self.points.is_empty() {
            return BoundingBox::new(0, 0, 0, 0);
        }

        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;

        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1).max(0) as u32,
            height: (max_y - min_y + 1).max(0) as u32,
        }
    }

    /// Minimum-area bounding rectangle via rotating calipers over the convex
    /// hull of the contour points.
    pub fn min_area_rect(&self) -> MinAreaRect {
        let float_points: Vec<(f32, f32)> = self
            .points
            .iter()
            .map(|p| (p.x as f32, p.y as f32))
            .collect();

        let hull = convex_hull(&float_points);
        if hull.len() < 3 {
            // Degenerate input collapses to its axis-aligned bounds.
            let bbox = self.bounding_box();
            return MinAreaRect {
                center: (
                    bbox.x as f32 + bbox.width as f32 / 2.0,
                    bbox.y as f32 + bbox.height as f32 / 2.0,
                ),
                size: (bbox.width as f32, bbox.height as f32),
                angle: -90.0,
            };
        }

        let mut min_area = f32::MAX;
        let mut best = MinAreaRect {
            center: (0.0, 0.0),
            size: (0.0, 0.0),
            angle: -90.0,
        };

        let n = hull.len();
        for i in 0..n {
            let j = (i + 1) % n;

            let edge_x = hull[j].0 - hull[i].0;
            let edge_y = hull[j].1 - hull[i].1;
            let edge_len = (edge_x * edge_x + edge_y * edge_y).sqrt();
            if edge_len < f32::EPSILON {
                continue;
            }

            // Unit vectors along and perpendicular to this hull edge.
            let nx = edge_x / edge_len;
            let ny = edge_y / edge_len;
            let px = -ny;
            let py = nx;

            let mut min_n = f32::MAX;
            let mut max_n = f32::MIN;
            let mut min_p = f32::MAX;
            let mut max_p = f32::MIN;

            for point in &hull {
                let rel_x = point.0 - hull[i].0;
                let rel_y = point.1 - hull[i].1;

                let proj_n = nx * rel_x + ny * rel_y;
                min_n = min_n.min(proj_n);
                max_n = max_n.max(proj_n);

                let proj_p = px * rel_x + py * rel_y;
                min_p = min_p.min(proj_p);
                max_p = max_p.max(proj_p);
            }

            let extent_n = max_n - min_n;
            let extent_p = max_p - min_p;
            let area = extent_n * extent_p;

            if area < min_area {
                min_area = area;

                let center_n = (min_n + max_n) / 2.0;
                let center_p = (min_p + max_p) / 2.0;
                let center = (
                    hull[i].0 + center_n * nx + center_p * px,
                    hull[i].1 + center_n * ny + center_p * py,
                );

                let edge_angle = f32::atan2(ny, nx).to_degrees();
                best = normalize_rect(center, extent_n, extent_p, edge_angle);
            }
        }

        best
    }
}

/// Folds a candidate rectangle into the raw angle convention.
///
/// The edge angle arrives in (-180, 180]; the rectangle is symmetric under
/// 90-degree steps, so the orientation is reduced to [0, 90) with side
/// lengths swapped when the fold crosses a quarter turn, then reported as
/// `orientation - 90` in [-90, 0).
fn normalize_rect(center: (f32, f32), extent_n: f32, extent_p: f32, edge_angle: f32) -> MinAreaRect {
    let mut orientation = edge_angle.rem_euclid(180.0);
    let mut size = (extent_n, extent_p);
    if orientation >= 90.0 {
        orientation -= 90.0;
        size = (size.1, size.0);
    }

    MinAreaRect {
        center,
        size,
        angle: orientation - 90.0,
    }
}

/// Convex hull of a point set using Graham's scan.
fn convex_hull(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut points = points.to_vec();

    // Anchor at the lowest point, leftmost on ties.
    let mut start_idx = 0;
    for i in 1..points.len() {
        if points[i].1 < points[start_idx].1
            || (points[i].1 == points[start_idx].1 && points[i].0 < points[start_idx].0)
        {
            start_idx = i;
        }
    }
    points.swap(0, start_idx);
    let start = points[0];

    // Sort the rest by polar angle around the anchor, nearer points first on
    // collinear runs.
    points[1..].sort_by(|a, b| {
        let cross = cross_product(start, *a, *b);
        if cross == 0.0 {
            let dist_a = (a.0 - start.0).powi(2) + (a.1 - start.1).powi(2);
            let dist_b = (b.0 - start.0).powi(2) + (b.1 - start.1).powi(2);
            dist_a
                .partial_cmp(&dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        } else if cross > 0.0 {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Greater
        }
    });

    let mut hull: Vec<(f32, f32)> = Vec::new();
    for point in points {
        while hull.len() > 1
            && cross_product(hull[hull.len() - 2], hull[hull.len() - 1], point) <= 0.0
        {
            hull.pop();
        }
        hull.push(point);
    }

    hull
}

/// Cross product of the vectors `p1->p2` and `p1->p3`; positive for a
/// counter-clockwise turn.
fn cross_product(p1: (f32, f32), p2: (f32, f32), p3: (f32, f32)) -> f32 {
    (p2.0 - p1.0) * (p3.1 - p1.1) - (p2.1 - p1.1) * (p3.0 - p1.0)
}

/// Rounds values that sit within epsilon of a whole pixel.
fn snap_to_pixel(v: f32) -> f32 {
    let nearest = v.round();
    if (v - nearest).abs() < 1e-3 {
        nearest
    } else {
        v
    }
}
