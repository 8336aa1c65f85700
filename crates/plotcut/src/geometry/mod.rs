use serde::{Deserialize, Serialize};

pub mod arc_solver;
pub mod flatten;
mod import;
pub mod primitive;

// Re-export public types
pub use arc_solver::{ArcSolution, EllipseFrame};
pub use flatten::flatten;
pub use primitive::{EllipticalArc, Primitive};

/// An ordered run of primitives.
///
/// Consecutive primitives are usually endpoint-continuous, but nothing
/// enforces it; a gap is treated as a shape break by the assembler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    pub primitives: Vec<Primitive>,
}

impl Subpath {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self { primitives }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }
}

impl From<Vec<Primitive>> for Subpath {
    fn from(primitives: Vec<Primitive>) -> Self {
        Self::new(primitives)
    }
}

/// Everything to be drawn in one conversion, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSet {
    pub subpaths: Vec<Subpath>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subpath: Subpath) {
        self.subpaths.push(subpath);
    }

    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    /// Iterate over every primitive in drawing order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.subpaths.iter().flat_map(|subpath| subpath.primitives.iter())
    }

    pub fn primitive_count(&self) -> usize {
        self.subpaths.iter().map(Subpath::len).sum()
    }

    /// True when there is nothing to draw, even if empty subpaths are present.
    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }
}

impl From<Vec<Subpath>> for PathSet {
    fn from(subpaths: Vec<Subpath>) -> Self {
        Self { subpaths }
    }
}

impl FromIterator<Subpath> for PathSet {
    fn from_iter<I: IntoIterator<Item = Subpath>>(iter: I) -> Self {
        Self {
            subpaths: iter.into_iter().collect(),
        }
    }
}
