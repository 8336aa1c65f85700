//! Reads emitted G-code back into machine positions, for previewing output
//! and for checking it against the tool points that produced it.

use kurbo::Point;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Machine position after a motion command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Rapid,
    Linear,
    Home,
}

#[derive(Debug, Default)]
struct Words {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

fn coordinate_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"([XYZ])\s*([-+]?\d*\.?\d+)").expect("coordinate pattern is valid")
    })
}

fn axis_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[XYZ]").expect("axis pattern is valid"))
}

/// Drop the `;` comment and surrounding whitespace.
fn strip_comment(line: &str) -> &str {
    line.split(';').next().unwrap_or("").trim()
}

fn classify(code: &str) -> Option<(Command, &str)> {
    let mut parts = code.splitn(2, char::is_whitespace);
    let word = parts.next()?;
    let rest = parts.next().unwrap_or("");
    match word {
        "G0" | "G00" => Some((Command::Rapid, rest)),
        "G1" | "G01" => Some((Command::Linear, rest)),
        "G28" => Some((Command::Home, rest)),
        _ => None,
    }
}

fn coordinate_words(text: &str) -> Words {
    let mut words = Words::default();
    for caps in coordinate_regex().captures_iter(text) {
        let Ok(value) = caps[2].parse::<f64>() else {
            continue;
        };
        match &caps[1] {
            "X" => words.x = Some(value),
            "Y" => words.y = Some(value),
            _ => words.z = Some(value),
        }
    }
    words
}

/// Follow `G0`/`G1` moves and `G28` homing through a program.
///
/// Axes a move does not mention keep their previous value, starting from
/// the origin. A bare `G28` homes every axis. Lines that change nothing
/// (feed-rate only, other commands) add no point.
pub fn parse_trajectory<'a, I>(lines: I) -> Vec<TrajectoryPoint>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut position = TrajectoryPoint::default();
    let mut trajectory = Vec::new();

    for line in lines {
        let Some((command, rest)) = classify(strip_comment(line)) else {
            continue;
        };
        match command {
            Command::Rapid | Command::Linear => {
                let words = coordinate_words(rest);
                if words.x.is_none() && words.y.is_none() && words.z.is_none() {
                    continue;
                }
                position.x = words.x.unwrap_or(position.x);
                position.y = words.y.unwrap_or(position.y);
                position.z = words.z.unwrap_or(position.z);
            }
            Command::Home => {
                let axes: Vec<&str> = axis_regex().find_iter(rest).map(|m| m.as_str()).collect();
                if axes.is_empty() {
                    position = TrajectoryPoint::default();
                }
                for axis in axes {
                    match axis {
                        "X" => position.x = 0.0,
                        "Y" => position.y = 0.0,
                        _ => position.z = 0.0,
                    }
                }
            }
        }
        trajectory.push(position);
    }

    trajectory
}

/// XY targets of every `G1` that names both axes, in order.
pub fn linear_moves<'a, I>(lines: I) -> Vec<Point>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let (command, rest) = classify(strip_comment(line))?;
            if command != Command::Linear {
                return None;
            }
            let words = coordinate_words(rest);
            Some(Point::new(words.x?, words.y?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_keep_unmentioned_axes() {
        let trajectory = parse_trajectory(["G1 X10 Y5", "G1 Z3", "G0 X-2.5"]);
        assert_eq!(
            trajectory,
            vec![
                TrajectoryPoint { x: 10.0, y: 5.0, z: 0.0 },
                TrajectoryPoint { x: 10.0, y: 5.0, z: 3.0 },
                TrajectoryPoint { x: -2.5, y: 5.0, z: 3.0 },
            ]
        );
    }

    #[test]
    fn test_feed_only_and_comment_lines_are_ignored() {
        let trajectory = parse_trajectory(["; X99 Y99", "G0 F4000", "G1 F500 ; set feedrate", "M107", ""]);
        assert!(trajectory.is_empty());
    }

    #[test]
    fn test_comment_words_are_not_coordinates() {
        let trajectory = parse_trajectory(["G1 X1 Y2 ; Z is untouched"]);
        assert_eq!(trajectory, vec![TrajectoryPoint { x: 1.0, y: 2.0, z: 0.0 }]);
    }

    #[test]
    fn test_g28_homing() {
        let trajectory = parse_trajectory(["G1 X5 Y6 Z7", "G28 X", "G28 ; home xyz axes"]);
        assert_eq!(trajectory[1], TrajectoryPoint { x: 0.0, y: 6.0, z: 7.0 });
        assert_eq!(trajectory[2], TrajectoryPoint::default());
    }

    #[test]
    fn test_other_g_codes_are_not_moves() {
        let trajectory = parse_trajectory(["G17", "G10 X5", "G21"]);
        assert!(trajectory.is_empty());
    }

    #[test]
    fn test_linear_moves_need_both_axes() {
        let moves = linear_moves(["G1 X1 Y2", "G1 Z10", "G0 X5 Y5", "G1 X0.5 Y-0.25", "G1 X3"]);
        assert_eq!(moves, vec![Point::new(1.0, 2.0), Point::new(0.5, -0.25)]);
    }
}
