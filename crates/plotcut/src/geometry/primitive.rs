use kurbo::{CubicBez, Line, Point, QuadBez};
use serde::{Deserialize, Serialize};

/// One drawable piece of a subpath.
///
/// Endpoints are kept exactly as the input supplied them; continuity between
/// primitives is decided by exact comparison of these values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// A straight segment.
    Line(Line),
    /// A segment of a (possibly rotated) ellipse.
    Arc(EllipticalArc),
    /// A quadratic Bézier curve.
    QuadraticCurve(QuadBez),
    /// A cubic Bézier curve.
    CubicCurve(CubicBez),
}

/// An elliptical arc given by its endpoints and radii, as in SVG path data.
///
/// Center and sweep are not stored; the arc solver recovers them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipticalArc {
    pub start: Point,
    pub end: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Rotation of the ellipse's x axis, in degrees.
    pub rotation_degrees: f64,
}

impl Primitive {
    pub fn line(start: Point, end: Point) -> Self {
        Primitive::Line(Line::new(start, end))
    }

    pub fn arc(start: Point, end: Point, radius_x: f64, radius_y: f64, rotation_degrees: f64) -> Self {
        Primitive::Arc(EllipticalArc {
            start,
            end,
            radius_x,
            radius_y,
            rotation_degrees,
        })
    }

    pub fn quadratic(start: Point, control: Point, end: Point) -> Self {
        Primitive::QuadraticCurve(QuadBez::new(start, control, end))
    }

    pub fn cubic(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        Primitive::CubicCurve(CubicBez::new(start, control1, control2, end))
    }

    pub fn start(&self) -> Point {
        match self {
            Primitive::Line(line) => line.p0,
            Primitive::Arc(arc) => arc.start,
            Primitive::QuadraticCurve(quad) => quad.p0,
            Primitive::CubicCurve(cubic) => cubic.p0,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Primitive::Line(line) => line.p1,
            Primitive::Arc(arc) => arc.end,
            Primitive::QuadraticCurve(quad) => quad.p2,
            Primitive::CubicCurve(cubic) => cubic.p3,
        }
    }

    /// Short name for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Line(_) => "line",
            Primitive::Arc(_) => "arc",
            Primitive::QuadraticCurve(_) => "quadratic",
            Primitive::CubicCurve(_) => "cubic",
        }
    }
}
