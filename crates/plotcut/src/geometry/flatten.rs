use crate::error::GeometryError;
use crate::geometry::arc_solver::{self, EllipseFrame};
use crate::geometry::primitive::{EllipticalArc, Primitive};
use crate::types::BoundingBox;
use kurbo::{ParamCurve, Point};

/// Flatten a primitive into points, growing `bounds` to cover each of them.
///
/// Lines yield their two endpoints. Curves and arcs yield `resolution`
/// samples, evenly spaced in parameter (or angle) and including both ends.
pub fn flatten(
    primitive: &Primitive,
    resolution: usize,
    bounds: &mut BoundingBox,
) -> Result<Vec<Point>, GeometryError> {
    if resolution < 2 {
        return Err(GeometryError::InvalidResolution(resolution));
    }

    let points = match primitive {
        Primitive::Line(line) => vec![line.p0, line.p1],
        Primitive::Arc(arc) => flatten_arc(arc, resolution)?,
        Primitive::QuadraticCurve(quad) => sample(resolution, |t| quad.eval(t)),
        Primitive::CubicCurve(cubic) => sample(resolution, |t| cubic.eval(t)),
    };

    for point in &points {
        bounds.include(*point);
    }

    Ok(points)
}

fn flatten_arc(arc: &EllipticalArc, resolution: usize) -> Result<Vec<Point>, GeometryError> {
    let solution = arc_solver::solve(arc)?;
    let frame = EllipseFrame::new(arc.radius_x, arc.radius_y, arc.rotation_degrees);
    let sweep = solution.sweep();
    Ok(sample(resolution, |t| {
        frame.point_at(solution.center, solution.start_angle + sweep * t)
    }))
}

/// Evaluate `f` at `resolution` evenly spaced values of `t` in `[0, 1]`.
fn sample(resolution: usize, f: impl Fn(f64) -> Point) -> Vec<Point> {
    let last = (resolution - 1) as f64;
    (0..resolution).map(|i| f(i as f64 / last)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-6
    }

    #[test]
    fn test_line_flatten() {
        let mut bounds = BoundingBox::new();
        let line = Primitive::line(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let points = flatten(&line, 50, &mut bounds).unwrap();
        assert_eq!(points, vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.max_y, 10.0);
    }

    #[test]
    fn test_quadratic_midpoint() {
        let mut bounds = BoundingBox::new();
        let quad = Primitive::quadratic(Point::new(0.0, 0.0), Point::new(5.0, 10.0), Point::new(10.0, 0.0));
        let points = flatten(&quad, 3, &mut bounds).unwrap();
        assert_eq!(points.len(), 3);
        assert!(close(points[1], Point::new(5.0, 5.0)));
        assert_eq!(bounds.max_y, 5.0);
    }

    #[test]
    fn test_cubic_samples_include_endpoints() {
        let mut bounds = BoundingBox::new();
        let cubic = Primitive::cubic(
            Point::new(1.0, 1.0),
            Point::new(2.0, 8.0),
            Point::new(6.0, 8.0),
            Point::new(7.0, 1.0),
        );
        let points = flatten(&cubic, 20, &mut bounds).unwrap();
        assert_eq!(points.len(), 20);
        assert!(close(points[0], Point::new(1.0, 1.0)));
        assert!(close(points[19], Point::new(7.0, 1.0)));
        // Peak of this symmetric cubic is at t = 0.5: 0.125 + 3 + 3 + 0.125.
        assert!((bounds.max_y - 6.25).abs() < 0.1);
    }

    #[test]
    fn test_half_circle_arc() {
        let mut bounds = BoundingBox::new();
        let arc = Primitive::arc(Point::new(0.0, 10.0), Point::new(20.0, 10.0), 10.0, 10.0, 0.0);
        let points = flatten(&arc, 9, &mut bounds).unwrap();
        assert_eq!(points.len(), 9);
        assert!(close(points[0], Point::new(0.0, 10.0)));
        assert!(close(points[8], Point::new(20.0, 10.0)));
        for point in &points {
            let radius = point.distance(Point::new(10.0, 10.0));
            assert!((radius - 10.0).abs() < 1e-5, "point {point:?} off the circle");
        }
        assert!((bounds.max_x - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_arc_failure_propagates() {
        let mut bounds = BoundingBox::new();
        let arc = Primitive::arc(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0, 1.0, 0.0);
        assert!(flatten(&arc, 9, &mut bounds).is_err());
    }

    #[test]
    fn test_resolution_below_two_is_rejected() {
        let mut bounds = BoundingBox::new();
        let quad = Primitive::quadratic(Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0));
        assert_eq!(
            flatten(&quad, 1, &mut bounds),
            Err(GeometryError::InvalidResolution(1))
        );
    }

    fn point() -> impl Strategy<Value = Point> {
        (0.0..500.0f64, 0.0..500.0f64).prop_map(|(x, y)| Point::new(x, y))
    }

    proptest! {
        #[test]
        fn line_always_yields_its_endpoints(start in point(), end in point(), resolution in 2usize..64) {
            let mut bounds = BoundingBox::new();
            let points = flatten(&Primitive::line(start, end), resolution, &mut bounds).unwrap();
            prop_assert_eq!(points, vec![start, end]);
            prop_assert!(bounds.max_x >= start.x.max(end.x));
            prop_assert!(bounds.max_y >= start.y.max(end.y));
        }

        #[test]
        fn quadratic_yields_resolution_samples(
            start in point(), control in point(), end in point(), resolution in 2usize..64
        ) {
            let mut bounds = BoundingBox::new();
            let points = flatten(&Primitive::quadratic(start, control, end), resolution, &mut bounds).unwrap();
            prop_assert_eq!(points.len(), resolution);
            prop_assert!(close(points[0], start));
            prop_assert!(close(points[resolution - 1], end));
        }

        #[test]
        fn cubic_yields_resolution_samples(
            start in point(), c1 in point(), c2 in point(), end in point(), resolution in 2usize..64
        ) {
            let mut bounds = BoundingBox::new();
            let points = flatten(&Primitive::cubic(start, c1, c2, end), resolution, &mut bounds).unwrap();
            prop_assert_eq!(points.len(), resolution);
            prop_assert!(close(points[0], start));
            prop_assert!(close(points[resolution - 1], end));
            for p in &points {
                prop_assert!(bounds.max_x >= p.x && bounds.max_y >= p.y);
            }
        }
    }
}
