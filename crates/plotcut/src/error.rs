//! Error types for path conversion.
//!
//! Geometry problems abort a conversion. Configuration problems never reach
//! the caller through [`ConvertError`]; the loader in [`crate::config`]
//! resolves them by falling back to defaults.

use std::io;
use thiserror::Error;

/// Failures that make a path impossible to turn into a toolpath.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The arc has no usable ellipse (zero radius, coincident endpoints, NaN input).
    #[error("degenerate arc: {reason}")]
    DegenerateArc { reason: String },

    /// The arc solver ran out of iterations before the endpoints were matched.
    #[error("arc solver did not converge after {iterations} iterations (residual {residual:e})")]
    ArcDidNotConverge { iterations: usize, residual: f64 },

    /// A maximum extent was requested on an axis the path does not span.
    #[error("cannot scale a path with zero extent on the {axis} axis")]
    ZeroExtent { axis: Axis },

    /// A curve must be sampled at least at its two endpoints.
    #[error("curve resolution must be at least 2, got {0}")]
    InvalidResolution(usize),

    /// Feed rates are emitted verbatim and must be positive and finite.
    #[error("{name} feed rate must be positive, got {value}")]
    InvalidFeedrate { name: &'static str, value: f64 },
}

/// Errors surfaced by [`crate::convert`] and the SVG importer.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The input could not be parsed into paths.
    #[error("failed to import paths: {0}")]
    Import(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors while reading or writing a configuration file.
///
/// Parse problems are downgraded to defaults by the loader; only `Io` and
/// `Serialize` escape to callers of [`crate::Config::save_to_path`] and
/// [`crate::Config::load_from_path`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A coordinate axis, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
