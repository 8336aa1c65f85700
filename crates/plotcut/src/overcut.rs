use kurbo::{Point, Vec2};

/// Point `offset` past `shape_start`, continuing the heading from `last_point`.
///
/// A drag knife trails its pivot, so stopping exactly at the closing point
/// leaves the shape uncut by roughly the blade offset. An offset of `0`
/// returns `shape_start` unchanged.
///
/// When the two points coincide there is no heading; `(1, 1)` is used as the
/// direction. It is not normalized and overshoots by `offset * √2`.
pub fn compensate(shape_start: Point, last_point: Point, offset: f64) -> Point {
    let distance = last_point.distance(shape_start);
    let direction = if distance == 0.0 {
        Vec2::new(1.0, 1.0)
    } else {
        (shape_start - last_point) / distance
    };
    shape_start + direction * offset
}
