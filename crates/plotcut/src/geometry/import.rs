//! SVG import: every visible path in the document becomes one or more
//! subpaths, with curves kept as curves.

use crate::error::{ConvertError, Result};
use crate::geometry::{PathSet, Primitive, Subpath};
use kurbo::Point;
use std::fs;
use std::path::Path as StdPath;
use tracing::{debug, warn};

/// Trailing lines shorter than this are parser artefacts, not artwork.
const SLIVER_LENGTH: f64 = 0.001;

impl PathSet {
    /// Read and import an SVG file.
    pub fn from_svg_file<P: AsRef<StdPath>>(path: P) -> Result<Self> {
        let svg_path = path.as_ref();
        let data = fs::read(svg_path)?;
        Self::from_svg_data(&data).map_err(|err| match err {
            ConvertError::Import(message) => {
                ConvertError::Import(format!("{}: {}", svg_path.display(), message))
            }
            other => other,
        })
    }

    /// Import SVG document bytes.
    pub fn from_svg_data(data: &[u8]) -> Result<Self> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_data(data, &opt)
            .map_err(|err| ConvertError::Import(format!("failed to parse SVG: {}", err)))?;

        let mut path_set = PathSet::new();
        import_usvg_group(tree.root(), &mut path_set);
        trim_trailing_sliver(&mut path_set);

        debug!(
            subpaths = path_set.subpaths.len(),
            primitives = path_set.primitive_count(),
            "imported SVG"
        );
        Ok(path_set)
    }
}

fn import_usvg_group(group: &usvg::Group, path_set: &mut PathSet) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => {
                import_usvg_group(g, path_set);
            }
            usvg::Node::Path(path) => {
                if !path.is_visible() {
                    continue;
                }

                let Some(data) = path.data().clone().transform(path.abs_transform()) else {
                    warn!(id = path.id(), "skipping path with a degenerate transform");
                    continue;
                };

                path_set.subpaths.extend(convert_tiny_skia_path(&data));
            }
            usvg::Node::Image(_) => {
                // Raster content cannot be drawn
            }
            usvg::Node::Text(_) => {
                // Text nodes are already converted to paths by usvg
            }
        }
    }
}

/// Split a tiny-skia path into subpaths of primitives.
fn convert_tiny_skia_path(path: &tiny_skia_path::Path) -> Vec<Subpath> {
    let mut subpaths = Vec::new();
    let mut current = Subpath::default();
    let mut subpath_start = Point::ZERO;
    let mut cursor = Point::ZERO;

    for segment in path.segments() {
        match segment {
            tiny_skia_path::PathSegment::MoveTo(p) => {
                if !current.is_empty() {
                    subpaths.push(std::mem::take(&mut current));
                }
                cursor = to_point(p);
                subpath_start = cursor;
            }
            tiny_skia_path::PathSegment::LineTo(p) => {
                let end = to_point(p);
                current.push(Primitive::line(cursor, end));
                cursor = end;
            }
            tiny_skia_path::PathSegment::QuadTo(p1, p2) => {
                let end = to_point(p2);
                current.push(Primitive::quadratic(cursor, to_point(p1), end));
                cursor = end;
            }
            tiny_skia_path::PathSegment::CubicTo(p1, p2, p3) => {
                let end = to_point(p3);
                current.push(Primitive::cubic(cursor, to_point(p1), to_point(p2), end));
                cursor = end;
            }
            tiny_skia_path::PathSegment::Close => {
                if cursor != subpath_start {
                    current.push(Primitive::line(cursor, subpath_start));
                }
                cursor = subpath_start;
            }
        }
    }

    if !current.is_empty() {
        subpaths.push(current);
    }
    subpaths
}

fn to_point(p: tiny_skia_path::Point) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

/// Drop a near-zero-length line at the very end of the artwork.
fn trim_trailing_sliver(path_set: &mut PathSet) {
    let Some(last) = path_set.subpaths.last_mut() else {
        return;
    };
    if let Some(Primitive::Line(line)) = last.primitives.last() {
        if line.p0.distance(line.p1) < SLIVER_LENGTH {
            debug!(?line, "dropping trailing sliver");
            last.primitives.pop();
        }
    }
}
