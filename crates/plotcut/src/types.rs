use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A position the tool visits, plus how it gets there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolPoint {
    pub point: Point,
    /// The move into this point lifts the tool, travels, then lowers it.
    pub raised: bool,
}

impl ToolPoint {
    /// A point reached with the tool down, at working feed rate.
    pub fn lowered(point: Point) -> Self {
        Self {
            point,
            raised: false,
        }
    }

    /// A point reached by a lifted travel move.
    pub fn raised(point: Point) -> Self {
        Self {
            point,
            raised: true,
        }
    }
}

/// Running maximum corner of everything flattened so far.
///
/// Only the maximum is tracked; the minimum is the origin. Input paths are
/// expected to live in non-negative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the box so it contains `point`.
    pub fn include(&mut self, point: Point) {
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x
    }

    pub fn height(&self) -> f64 {
        self.max_y
    }
}

/// The assembled point stream for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toolpath {
    pub points: Vec<ToolPoint>,
    /// Extent of the unscaled points.
    pub bounds: BoundingBox,
}

impl Toolpath {
    /// Multiply every point by `scale`. Raised flags and bounds are kept.
    pub fn scaled(&self, scale: f64) -> Toolpath {
        let points = self
            .points
            .iter()
            .map(|tp| ToolPoint {
                point: Point::new(tp.point.x * scale, tp.point.y * scale),
                raised: tp.raised,
            })
            .collect();
        Toolpath {
            points,
            bounds: self.bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of lifted travel moves in the stream.
    pub fn raised_count(&self) -> usize {
        self.points.iter().filter(|tp| tp.raised).count()
    }
}

/// Represents the final, machine-specific G-code output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GCode {
    /// A list of G-code command strings.
    pub lines: Vec<String>,
}

impl GCode {
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_tracks_maximum_only() {
        let mut bounds = BoundingBox::new();
        bounds.include(Point::new(3.0, 7.0));
        bounds.include(Point::new(9.0, 2.0));
        bounds.include(Point::new(-4.0, -8.0));
        assert_eq!(bounds.max_x, 9.0);
        assert_eq!(bounds.max_y, 7.0);
    }

    #[test]
    fn test_bounding_box_starts_at_origin() {
        let mut bounds = BoundingBox::new();
        bounds.include(Point::new(-1.0, -1.0));
        assert_eq!(bounds, BoundingBox::default());
    }

    #[test]
    fn test_toolpath_scaled_keeps_flags() {
        let toolpath = Toolpath {
            points: vec![
                ToolPoint::raised(Point::new(2.0, 4.0)),
                ToolPoint::lowered(Point::new(6.0, 8.0)),
            ],
            bounds: BoundingBox {
                max_x: 6.0,
                max_y: 8.0,
            },
        };
        let scaled = toolpath.scaled(0.5);
        assert_eq!(scaled.points[0], ToolPoint::raised(Point::new(1.0, 2.0)));
        assert_eq!(scaled.points[1], ToolPoint::lowered(Point::new(3.0, 4.0)));
        assert_eq!(scaled.bounds, toolpath.bounds);
        assert_eq!(scaled.raised_count(), 1);
    }

    #[test]
    fn test_gcode_to_text() {
        let gcode = GCode {
            lines: vec!["G90".to_string(), "G21".to_string()],
        };
        assert_eq!(gcode.to_text(), "G90\nG21");
    }
}
