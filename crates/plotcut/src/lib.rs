mod config;
mod error;
mod geometry;
mod overcut;
mod postprocessor;
mod scale;
mod toolpath_generation;
mod trajectory;
mod types;

pub use config::*;
pub use error::*;
pub use geometry::*;
pub use overcut::compensate;
pub use postprocessor::{format_number, post_process, HEADER};
pub use scale::compute_scale;
pub use toolpath_generation::assemble_toolpath;
pub use trajectory::{linear_moves, parse_trajectory, TrajectoryPoint};
pub use types::*;

use std::fs;
use std::path::Path;
use tracing::info;

/// Output of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub gcode: GCode,
    /// Scaled tool points, before the start offset is applied, with the
    /// unscaled bounds they were fitted from.
    pub toolpath: Toolpath,
    pub scale: f64,
}

impl Conversion {
    pub fn to_gcode_string(&self) -> String {
        self.gcode.to_text()
    }

    /// Write the program, one instruction per line.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut text = self.to_gcode_string();
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }
}

/// High-level function: paths → toolpath → scale → G-code.
///
/// Nothing is emitted unless every primitive flattens and the path can be
/// scaled; a failing conversion never yields partial output.
pub fn convert(path_set: &PathSet, config: &Config) -> Result<Conversion> {
    check_feedrates(config)?;
    let toolpath = assemble_toolpath(path_set, config)?;
    let scale = compute_scale(&toolpath.bounds, &config.max_extent())?;
    let toolpath = toolpath.scaled(scale);
    let gcode = post_process(&toolpath.points, config);

    info!(
        points = toolpath.len(),
        raised = toolpath.raised_count(),
        max_x = toolpath.bounds.max_x,
        max_y = toolpath.bounds.max_y,
        scale,
        lines = gcode.lines.len(),
        "converted paths"
    );

    Ok(Conversion {
        gcode,
        toolpath,
        scale,
    })
}

fn check_feedrates(config: &Config) -> Result<(), GeometryError> {
    let machine = &config.machine;
    for (name, value) in [
        ("normal", machine.normal_feedrate),
        ("travel", machine.travel_feedrate),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(GeometryError::InvalidFeedrate { name, value });
        }
    }
    Ok(())
}
