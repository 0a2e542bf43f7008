//! Planar geometry for routes and toll areas
//!
//! Routes are straight segments between two positions. Toll areas are convex
//! polygons, usually produced by buffering a zone center into a disc. All
//! lengths are in the same units as the input coordinates.

use std::f64::consts::FRAC_PI_2;

use serde::Serialize;
use thiserror::Error;

use super::types::{Position, GEOMETRY_EPSILON};

/// Errors raised while building geometric shapes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("polygon is not convex")]
    NonConvex,

    #[error("polygon has zero area")]
    ZeroArea,

    #[error("buffer radius must be positive, got {radius}")]
    NonPositiveRadius { radius: f64 },

    #[error("buffer needs at least one segment per quarter circle")]
    ZeroSegments,

    #[error("coordinate is not finite: ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },
}

fn check_finite(point: &Position) -> Result<(), GeometryError> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFiniteCoordinate {
            x: point.x,
            y: point.y,
        })
    }
}

/// A straight segment between two positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSegment {
    pub start: Position,
    pub end: Position,
}

impl LineSegment {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

/// The straight path a vehicle follows for one trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Route {
    pub start: Position,
    pub end: Position,
    length: f64,
}

impl Route {
    pub fn new(start: Position, end: Position) -> Result<Self, GeometryError> {
        check_finite(&start)?;
        check_finite(&end)?;
        Ok(Self {
            start,
            end,
            length: start.distance(&end),
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// A route whose endpoints coincide
    pub fn is_degenerate(&self) -> bool {
        self.length <= GEOMETRY_EPSILON
    }

    /// Point at the given fraction of the route, with the fraction clamped to [0, 1]
    pub fn interpolate(&self, fraction: f64) -> Position {
        if self.is_degenerate() || fraction.is_nan() {
            return self.start;
        }
        self.start.lerp(&self.end, fraction.clamp(0.0, 1.0))
    }

    pub fn as_segment(&self) -> LineSegment {
        LineSegment::new(self.start, self.end)
    }
}

/// A convex polygon stored counter-clockwise
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    vertices: Vec<Position>,
}

impl Polygon {
    /// Build a convex polygon from its vertices in either winding order
    pub fn new(mut vertices: Vec<Position>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices {
                count: vertices.len(),
            });
        }
        for vertex in &vertices {
            check_finite(vertex)?;
        }

        let area = signed_area(&vertices);
        if area.abs() <= GEOMETRY_EPSILON {
            return Err(GeometryError::ZeroArea);
        }
        if area < 0.0 {
            vertices.reverse();
        }

        let n = vertices.len();
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let c = vertices[(i + 2) % n];
            let turn = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
            if turn < -GEOMETRY_EPSILON {
                return Err(GeometryError::NonConvex);
            }
        }

        Ok(Self { vertices })
    }

    /// Approximate a disc of `radius` around `center` with `4 * quad_segs` vertices
    pub fn buffer(center: Position, radius: f64, quad_segs: u32) -> Result<Self, GeometryError> {
        check_finite(&center)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius { radius });
        }
        if quad_segs == 0 {
            return Err(GeometryError::ZeroSegments);
        }

        let count = 4 * quad_segs as usize;
        let step = FRAC_PI_2 / quad_segs as f64;
        let vertices = (0..count)
            .map(|i| {
                let angle = step * i as f64;
                Position::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            })
            .collect();

        Self::new(vertices)
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.vertices)
    }

    pub fn centroid(&self) -> Position {
        // Work relative to the first vertex to keep precision for geographic coordinates
        let origin = self.vertices[0];
        let n = self.vertices.len();
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let (ax, ay) = (self.vertices[i].x - origin.x, self.vertices[i].y - origin.y);
            let b = self.vertices[(i + 1) % n];
            let (bx, by) = (b.x - origin.x, b.y - origin.y);
            let cross = ax * by - bx * ay;
            cx += (ax + bx) * cross;
            cy += (ay + by) * cross;
        }
        let factor = 1.0 / (6.0 * self.area());
        Position::new(origin.x + cx * factor, origin.y + cy * factor)
    }

    /// Whether the point lies inside or on the boundary
    pub fn contains(&self, point: &Position) -> bool {
        self.edges()
            .all(|(a, b)| edge_side(&a, &b, point) >= -GEOMETRY_EPSILON)
    }

    /// The part of `route` lying inside this polygon
    ///
    /// Returns `None` when the route misses the polygon or only touches it,
    /// since a zero-length overlap carries no toll.
    pub fn intersect(&self, route: &Route) -> Option<LineSegment> {
        let origin = route.start;
        let dx = route.end.x - origin.x;
        let dy = route.end.y - origin.y;

        let mut t_enter = 0.0_f64;
        let mut t_exit = 1.0_f64;

        // Cyrus-Beck clipping against each edge's inward half-plane
        for (a, b) in self.edges() {
            let nx = -(b.y - a.y);
            let ny = b.x - a.x;
            let num = nx * (origin.x - a.x) + ny * (origin.y - a.y);
            let den = nx * dx + ny * dy;

            if den == 0.0 {
                if num < 0.0 {
                    return None;
                }
                continue;
            }

            let t = -num / den;
            if den > 0.0 {
                t_enter = t_enter.max(t);
            } else {
                t_exit = t_exit.min(t);
            }
            if t_enter > t_exit {
                return None;
            }
        }

        let segment = LineSegment::new(route.interpolate(t_enter), route.interpolate(t_exit));
        if segment.length() <= GEOMETRY_EPSILON {
            None
        } else {
            Some(segment)
        }
    }

    fn edges(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

fn signed_area(vertices: &[Position]) -> f64 {
    let origin = vertices[0];
    let n = vertices.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            (a.x - origin.x) * (b.y - origin.y) - (b.x - origin.x) * (a.y - origin.y)
        })
        .sum();
    twice / 2.0
}

/// Positive when `point` is left of the directed edge a -> b
fn edge_side(a: &Position, b: &Position, point: &Position) -> f64 {
    (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x)
}
