use crate::config::Config;
use crate::types::{GCode, ToolPoint};
use kurbo::Point;

/// Header comment placed before the configured start fragment.
pub const HEADER: &str = concat!("; generated by plotcut ", env!("CARGO_PKG_VERSION"));

/// Convert scaled tool points into G-code lines.
///
/// Every point becomes a `G1` move to `point + start_offset`. A raised point
/// is preceded by the lift fragment, a travel feed rate, the travel move
/// itself, the working feed rate and the unlift fragment.
pub fn post_process(points: &[ToolPoint], config: &Config) -> GCode {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(config.gcode.start.iter().cloned());

    let offset = config.start_offset().to_vec2();
    let travel = format!("G0 F{}", format_number(config.machine.travel_feedrate));
    let normal = format!("G0 F{}", format_number(config.machine.normal_feedrate));

    for tool_point in points {
        let target = linear_move(tool_point.point + offset);
        if tool_point.raised {
            lines.extend(config.gcode.lift.iter().cloned());
            lines.push(travel.clone());
            lines.push(target.clone());
            lines.push(normal.clone());
            lines.extend(config.gcode.unlift.iter().cloned());
        }
        lines.push(target);
    }

    lines.extend(config.gcode.end.iter().cloned());
    GCode { lines }
}

fn linear_move(point: Point) -> String {
    format!("G1 X{} Y{}", format_number(point.x), format_number(point.y))
}

/// Integral values print without a fractional part, everything else at
/// full round-trip precision. Negative zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}
