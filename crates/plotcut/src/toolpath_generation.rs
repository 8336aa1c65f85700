use crate::config::Config;
use crate::error::GeometryError;
use crate::geometry::{flatten, PathSet};
use crate::overcut::compensate;
use crate::types::{BoundingBox, ToolPoint, Toolpath};
use kurbo::Point;
use tracing::debug;

/// Walk `path_set` in order and build the tool point stream.
///
/// A primitive whose start differs from the previous primitive's end (the
/// walk begins at the origin) opens a new shape: its first point is raised.
/// Before moving on, the shape being left gets an overcut point past its
/// start, and one more overcut closes the final shape.
///
/// Any flattening failure aborts the whole walk.
pub fn assemble_toolpath(path_set: &PathSet, config: &Config) -> Result<Toolpath, GeometryError> {
    let resolution = config.machine.curve_resolution;
    if resolution < 2 {
        return Err(GeometryError::InvalidResolution(resolution));
    }
    let blade_offset = config.machine.blade_offset;

    let mut bounds = BoundingBox::new();
    let mut points: Vec<ToolPoint> = Vec::new();
    let mut previous_end = Point::ZERO;
    let mut pending_raise = false;
    let mut shape_start: Option<Point> = None;
    let mut last_flattened: Vec<Point> = Vec::new();

    for primitive in path_set.primitives() {
        if primitive.start() != previous_end {
            pending_raise = true;
            debug!(
                from = ?previous_end,
                to = ?primitive.start(),
                kind = primitive.kind(),
                "shape break"
            );
            if let Some(start) = shape_start {
                push_overcut(&mut points, &mut bounds, start, &last_flattened, blade_offset);
            }
            shape_start = Some(primitive.start());
        }
        // A path that begins exactly at the origin never breaks on its first primitive.
        if shape_start.is_none() {
            shape_start = Some(primitive.start());
        }

        let flattened = flatten(primitive, resolution, &mut bounds)?;
        for (index, point) in flattened.iter().enumerate() {
            points.push(ToolPoint {
                point: *point,
                raised: index == 0 && pending_raise,
            });
        }

        pending_raise = false;
        previous_end = primitive.end();
        last_flattened = flattened;
    }

    if let Some(start) = shape_start {
        push_overcut(&mut points, &mut bounds, start, &last_flattened, blade_offset);
    }

    Ok(Toolpath { points, bounds })
}

/// Append the overshoot that closes a shape, aimed along the heading of the
/// second-to-last flattened point of the previous primitive.
fn push_overcut(
    points: &mut Vec<ToolPoint>,
    bounds: &mut BoundingBox,
    shape_start: Point,
    last_flattened: &[Point],
    blade_offset: f64,
) {
    let Some(last_point) = last_flattened.len().checked_sub(2).map(|i| last_flattened[i]) else {
        return;
    };
    let overcut = compensate(shape_start, last_point, blade_offset);
    debug!(?shape_start, ?overcut, "overcut");
    bounds.include(overcut);
    points.push(ToolPoint::lowered(overcut));
}
