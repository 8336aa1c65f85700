//! Machine configuration and its TOML persistence.
//!
//! The file has three groups:
//!
//! ```toml
//! [machine]
//! normal_feedrate = 500
//! travel_feedrate = 4000
//! curve_resolution = 20
//! blade_offset = 0.0
//!
//! [gcode]
//! start = ["; start", "G21", "G90"]
//! end = ["; end"]
//! lift = ["G1 Z10"]
//! unlift = ["G1 Z0"]
//!
//! [point]
//! start_x = 1.0
//! start_y = 1.0
//! max_x = 100.0   # optional
//! max_y = 50.0    # optional
//! ```
//!
//! Loading never fails on content. Each field is read on its own and a bad
//! or missing value is replaced by its default with a warning.

use crate::error::ConfigError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::{debug, warn};

pub const DEFAULT_NORMAL_FEEDRATE: f64 = 500.0;
pub const DEFAULT_TRAVEL_FEEDRATE: f64 = 4000.0;
pub const DEFAULT_CURVE_RESOLUTION: usize = 20;
pub const DEFAULT_BLADE_OFFSET: f64 = 0.0;
pub const DEFAULT_START_X: f64 = 1.0;
pub const DEFAULT_START_Y: f64 = 1.0;

/// Feed rates and sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Feed rate while the tool is down.
    pub normal_feedrate: f64,
    /// Feed rate for lifted travel moves.
    pub travel_feedrate: f64,
    /// Samples per curve or arc, endpoints included.
    pub curve_resolution: usize,
    /// Drag-knife overshoot distance; `0` disables overcut.
    pub blade_offset: f64,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            normal_feedrate: DEFAULT_NORMAL_FEEDRATE,
            travel_feedrate: DEFAULT_TRAVEL_FEEDRATE,
            curve_resolution: DEFAULT_CURVE_RESOLUTION,
            blade_offset: DEFAULT_BLADE_OFFSET,
        }
    }
}

/// Literal instruction lines, emitted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcodeFragments {
    pub start: Vec<String>,
    pub end: Vec<String>,
    pub lift: Vec<String>,
    pub unlift: Vec<String>,
}

impl Default for GcodeFragments {
    fn default() -> Self {
        Self {
            start: default_start_gcode(),
            end: default_end_gcode(),
            lift: default_lift_gcode(),
            unlift: default_unlift_gcode(),
        }
    }
}

fn default_start_gcode() -> Vec<String> {
    [
        "; start",
        "M107 ; turn fan off",
        "G21 ; use millimeter",
        "G90 ; absolute coordinates",
        "M82 ; absolute E coordinates",
        "G92 E0 ; set E to 0",
        "G28 ; home xyz axes",
        "G1 F500 ; set feedrate",
        "",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_end_gcode() -> Vec<String> {
    vec!["; end".to_string()]
}

fn default_lift_gcode() -> Vec<String> {
    vec!["G1 Z10".to_string()]
}

fn default_unlift_gcode() -> Vec<String> {
    vec!["G1 Z0".to_string()]
}

/// Where the drawing lands on the machine and how large it may be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSettings {
    pub start_x: f64,
    pub start_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_y: Option<f64>,
}

impl Default for PointSettings {
    fn default() -> Self {
        Self {
            start_x: DEFAULT_START_X,
            start_y: DEFAULT_START_Y,
            max_x: None,
            max_y: None,
        }
    }
}

/// Optional per-axis size limit. `None` leaves the axis unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxExtent {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Everything a conversion needs besides the artwork.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub machine: MachineSettings,
    pub gcode: GcodeFragments,
    pub point: PointSettings,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset added to every emitted coordinate.
    pub fn start_offset(&self) -> Point {
        Point::new(self.point.start_x, self.point.start_y)
    }

    pub fn max_extent(&self) -> MaxExtent {
        MaxExtent {
            x: self.point.max_x,
            y: self.point.max_y,
        }
    }

    /// Load a configuration file. Missing files yield the default configuration.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text))
    }

    /// Persist the configuration as TOML, ensuring the directory exists.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build a configuration from TOML text, defaulting anything unusable.
    pub fn from_toml_str(text: &str) -> Self {
        match parse_table(text) {
            Ok(table) => Self::from_table(&table),
            Err(err) => {
                warn!(error = %err, "configuration is not valid TOML, using defaults");
                Self::default()
            }
        }
    }

    fn from_table(table: &Table) -> Self {
        Self {
            machine: group(table, "machine")
                .map(read_machine)
                .unwrap_or_default(),
            gcode: group(table, "gcode").map(read_gcode).unwrap_or_default(),
            point: group(table, "point").map(read_point).unwrap_or_default(),
        }
    }

    /// `<config dir>/plotcut/plotcut.toml`, when the platform has a config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("plotcut").join("plotcut.toml"))
    }

    /// Describe values a conversion cannot use. Empty when the config is sound.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let machine = &self.machine;

        if !is_positive(machine.normal_feedrate) {
            problems.push(format!(
                "normal feed rate must be positive, got {}",
                machine.normal_feedrate
            ));
        }
        if !is_positive(machine.travel_feedrate) {
            problems.push(format!(
                "travel feed rate must be positive, got {}",
                machine.travel_feedrate
            ));
        }
        if machine.curve_resolution < 2 {
            problems.push(format!(
                "curve resolution must be at least 2, got {}",
                machine.curve_resolution
            ));
        }
        if !(machine.blade_offset.is_finite() && machine.blade_offset >= 0.0) {
            problems.push(format!(
                "blade offset must be zero or positive, got {}",
                machine.blade_offset
            ));
        }
        if !(self.point.start_x.is_finite() && self.point.start_y.is_finite()) {
            problems.push("start point must be finite".to_string());
        }
        for (axis, max) in [("X", self.point.max_x), ("Y", self.point.max_y)] {
            if let Some(max) = max {
                if !is_positive(max) {
                    problems.push(format!("maximum {axis} extent must be positive, got {max}"));
                }
            }
        }

        problems
    }
}

fn parse_table(text: &str) -> Result<Table, ConfigError> {
    Ok(toml::from_str(text)?)
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn group<'a>(table: &'a Table, name: &str) -> Option<&'a Table> {
    match table.get(name) {
        Some(Value::Table(group)) => Some(group),
        Some(other) => {
            warn!(group = name, found = other.type_str(), "expected a table, using defaults");
            None
        }
        None => None,
    }
}

fn read_machine(table: &Table) -> MachineSettings {
    MachineSettings {
        normal_feedrate: read_number(table, "machine", "normal_feedrate", DEFAULT_NORMAL_FEEDRATE, is_positive),
        travel_feedrate: read_number(table, "machine", "travel_feedrate", DEFAULT_TRAVEL_FEEDRATE, is_positive),
        curve_resolution: read_resolution(table),
        blade_offset: read_number(table, "machine", "blade_offset", DEFAULT_BLADE_OFFSET, |v| {
            v.is_finite() && v >= 0.0
        }),
    }
}

fn read_gcode(table: &Table) -> GcodeFragments {
    GcodeFragments {
        start: read_lines(table, "start", default_start_gcode),
        end: read_lines(table, "end", default_end_gcode),
        lift: read_lines(table, "lift", default_lift_gcode),
        unlift: read_lines(table, "unlift", default_unlift_gcode),
    }
}

// Inside a present [point] group a missing start coordinate means 0.
fn read_point(table: &Table) -> PointSettings {
    PointSettings {
        start_x: read_number(table, "point", "start_x", 0.0, f64::is_finite),
        start_y: read_number(table, "point", "start_y", 0.0, f64::is_finite),
        max_x: read_optional_extent(table, "max_x"),
        max_y: read_optional_extent(table, "max_y"),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn read_number(
    table: &Table,
    group: &str,
    key: &str,
    default: f64,
    valid: impl Fn(f64) -> bool,
) -> f64 {
    let Some(value) = table.get(key) else {
        warn!(group, key, default, "missing configuration value, using default");
        return default;
    };
    match as_number(value) {
        Some(number) if valid(number) => number,
        _ => {
            warn!(group, key, %value, default, "invalid configuration value, using default");
            default
        }
    }
}

fn read_resolution(table: &Table) -> usize {
    let default = DEFAULT_CURVE_RESOLUTION;
    match table.get("curve_resolution") {
        Some(Value::Integer(i)) if *i >= 2 => usize::try_from(*i).unwrap_or(default),
        Some(value) => {
            warn!(
                key = "curve_resolution",
                %value,
                default,
                "curve resolution must be an integer of at least 2, using default"
            );
            default
        }
        None => {
            warn!(key = "curve_resolution", default, "missing configuration value, using default");
            default
        }
    }
}

fn read_optional_extent(table: &Table, key: &str) -> Option<f64> {
    let value = table.get(key)?;
    match as_number(value) {
        Some(number) if is_positive(number) => Some(number),
        _ => {
            warn!(group = "point", key, %value, "invalid maximum extent, leaving axis unconstrained");
            None
        }
    }
}

fn read_lines(table: &Table, key: &str, default: fn() -> Vec<String>) -> Vec<String> {
    let Some(value) = table.get(key) else {
        warn!(group = "gcode", key, "missing instruction fragment, using default");
        return default();
    };
    let lines = value.as_array().and_then(|items| {
        items
            .iter()
            .map(|item| item.as_str().map(String::from))
            .collect::<Option<Vec<String>>>()
    });
    match lines {
        Some(lines) => lines,
        None => {
            warn!(group = "gcode", key, %value, "instruction fragment must be a list of strings, using default");
            default()
        }
    }
}
