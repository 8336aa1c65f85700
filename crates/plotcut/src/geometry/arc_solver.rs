//! Recovers the center and angular span of an endpoint-parameterized arc.
//!
//! The unknowns are `(center_x, center_y, angle1, angle2)`. The residual is
//! the offset of `center + R(angle)` from each endpoint, where `R` is the
//! rotated radius vector. Two ellipses generally pass through both endpoints;
//! the fixed seed (center at the chord midpoint, angles `0` and `π/2`) makes
//! the pick deterministic. Fallback seeds are only tried when that one stalls.
//!
//! The system is solved with a damped Gauss-Newton (Levenberg-Marquardt)
//! iteration. The Jacobian is singular when the chord is a full diameter, so
//! plain Newton steps are not enough there; the damping keeps each step
//! bounded and the iteration count keeps the solve finite.

use crate::error::GeometryError;
use crate::geometry::primitive::EllipticalArc;
use kurbo::{Point, Vec2};
use nalgebra::{Matrix4, Vector4};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use tracing::trace;

/// Upper bound on accepted steps before the residual is acceptable.
pub const MAX_ITERATIONS: usize = 200;

/// Upper bound on extra steps taken after the residual is acceptable.
const MAX_REFINEMENT_STEPS: usize = 60;

/// Upper bound on damping increases while looking for one downhill step.
const MAX_DAMPING_RETRIES: usize = 60;

/// Residual accepted as a solution, relative to the magnitude of the inputs.
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Residual at which refinement stops, in units of `f64::EPSILON · magnitude`.
const REFINEMENT_ULPS: f64 = 4.0;

const INITIAL_DAMPING: f64 = 1e-3;

/// Center and angular span of a solved arc.
///
/// `end_angle >= start_angle` always holds; sampling from start to end sweeps
/// in the increasing-angle direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSolution {
    pub center: Point,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcSolution {
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

/// The ellipse's shape without its position.
#[derive(Debug, Clone, Copy)]
pub struct EllipseFrame {
    radius_x: f64,
    radius_y: f64,
    cos_rotation: f64,
    sin_rotation: f64,
}

impl EllipseFrame {
    pub fn new(radius_x: f64, radius_y: f64, rotation_degrees: f64) -> Self {
        let (sin_rotation, cos_rotation) = rotation_degrees.to_radians().sin_cos();
        Self {
            radius_x,
            radius_y,
            cos_rotation,
            sin_rotation,
        }
    }

    /// `(radius_x·cos θ, radius_y·sin θ)` rotated by the ellipse rotation.
    pub fn radius_vector(&self, theta: f64) -> Vec2 {
        let (sin, cos) = theta.sin_cos();
        self.rotate(self.radius_x * cos, self.radius_y * sin)
    }

    /// Derivative of [`Self::radius_vector`] with respect to θ.
    fn radius_derivative(&self, theta: f64) -> Vec2 {
        let (sin, cos) = theta.sin_cos();
        self.rotate(-self.radius_x * sin, self.radius_y * cos)
    }

    fn rotate(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new(
            x * self.cos_rotation - y * self.sin_rotation,
            x * self.sin_rotation + y * self.cos_rotation,
        )
    }

    /// Map into the frame where this ellipse is a unit circle.
    fn world_to_unit(&self, v: Vec2) -> Vec2 {
        let x = v.x * self.cos_rotation + v.y * self.sin_rotation;
        let y = -v.x * self.sin_rotation + v.y * self.cos_rotation;
        Vec2::new(x / self.radius_x, y / self.radius_y)
    }

    /// Inverse of [`Self::world_to_unit`].
    fn unit_to_world(&self, v: Vec2) -> Point {
        self.rotate(v.x * self.radius_x, v.y * self.radius_y).to_point()
    }

    /// Point on the ellipse centered at `center`.
    pub fn point_at(&self, center: Point, theta: f64) -> Point {
        center + self.radius_vector(theta)
    }
}

/// Solve for the center and angles of `arc`.
///
/// The first attempt starts from the midpoint seed. If it stalls, the
/// solve is restarted from the mirrored angles and then from the two
/// closed-form candidates of the unit-circle frame; the first attempt that
/// converges wins.
pub fn solve(arc: &EllipticalArc) -> Result<ArcSolution, GeometryError> {
    validate(arc)?;

    let problem = ArcProblem {
        frame: EllipseFrame::new(arc.radius_x, arc.radius_y, arc.rotation_degrees),
        start: arc.start,
        end: arc.end,
    };
    let magnitude = [arc.start.x, arc.start.y, arc.end.x, arc.end.y, arc.radius_x, arc.radius_y]
        .iter()
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));

    let midpoint = arc.start.midpoint(arc.end);
    let mut seeds = vec![
        Vector4::new(midpoint.x, midpoint.y, 0.0, FRAC_PI_2),
        Vector4::new(midpoint.x, midpoint.y, PI, PI + FRAC_PI_2),
    ];
    seeds.extend(problem.closed_form_candidates());

    let mut best_iterations = 0;
    let mut best_residual = f64::INFINITY;
    for (attempt, seed) in seeds.into_iter().enumerate() {
        match problem.solve_from(seed, magnitude) {
            Ok(solution) => return Ok(solution),
            Err(GeometryError::ArcDidNotConverge {
                iterations,
                residual,
            }) => {
                trace!(attempt, iterations, residual, "arc solver seed failed");
                if residual < best_residual {
                    best_iterations = iterations;
                    best_residual = residual;
                }
            }
            Err(other) => return Err(other),
        }
    }

    Err(GeometryError::ArcDidNotConverge {
        iterations: best_iterations,
        residual: best_residual,
    })
}

/// Residual system for one arc.
struct ArcProblem {
    frame: EllipseFrame,
    start: Point,
    end: Point,
}

impl ArcProblem {
    fn residual(&self, v: &Vector4<f64>) -> Vector4<f64> {
        let center = Point::new(v[0], v[1]);
        let at_start = self.frame.point_at(center, v[2]) - self.start;
        let at_end = self.frame.point_at(center, v[3]) - self.end;
        Vector4::new(at_start.x, at_start.y, at_end.x, at_end.y)
    }

    fn jacobian(&self, v: &Vector4<f64>) -> Matrix4<f64> {
        let d1 = self.frame.radius_derivative(v[2]);
        let d2 = self.frame.radius_derivative(v[3]);
        Matrix4::new(
            1.0, 0.0, d1.x, 0.0, //
            0.0, 1.0, d1.y, 0.0, //
            1.0, 0.0, 0.0, d2.x, //
            0.0, 1.0, 0.0, d2.y,
        )
    }

    /// Exact centers and angles when the ellipse maps to a unit circle.
    ///
    /// Empty when the radii are too small to span the chord.
    fn closed_form_candidates(&self) -> Vec<Vector4<f64>> {
        let a = self.frame.world_to_unit(self.start.to_vec2());
        let b = self.frame.world_to_unit(self.end.to_vec2());
        let chord = b - a;
        let half = chord.hypot() / 2.0;
        if half == 0.0 || half > 1.0 {
            return Vec::new();
        }

        let middle = a.lerp(b, 0.5);
        let normal = Vec2::new(-chord.y, chord.x) / chord.hypot();
        let height = (1.0 - half * half).max(0.0).sqrt();

        [middle + normal * height, middle - normal * height]
            .into_iter()
            .map(|unit_center| {
                let center = self.frame.unit_to_world(unit_center);
                let start_angle = (a - unit_center).atan2();
                let end_angle = (b - unit_center).atan2();
                Vector4::new(center.x, center.y, start_angle, end_angle)
            })
            .collect()
    }

    /// Damped Gauss-Newton from `seed`.
    ///
    /// Steps continue past the acceptance bound while downhill steps are
    /// still found, so ill-conditioned arcs land near machine precision.
    fn solve_from(&self, seed: Vector4<f64>, magnitude: f64) -> Result<ArcSolution, GeometryError> {
        let tolerance = RELATIVE_TOLERANCE * magnitude;
        let floor = REFINEMENT_ULPS * f64::EPSILON * magnitude;

        let mut state = Iterate::new(self, seed);

        for iteration in 0..MAX_ITERATIONS {
            if state.f.amax() <= tolerance {
                trace!(iteration, residual = state.f.amax(), "arc solver converged");
                return Ok(finish(self.refine(state, floor)));
            }

            let stepped = self.step(&mut state);
            trace!(iteration, residual = state.f.amax(), damping = state.damping, "arc solver step");

            if !stepped {
                return Err(GeometryError::ArcDidNotConverge {
                    iterations: iteration,
                    residual: state.f.amax(),
                });
            }
        }

        if state.f.amax() <= tolerance {
            return Ok(finish(self.refine(state, floor)));
        }

        Err(GeometryError::ArcDidNotConverge {
            iterations: MAX_ITERATIONS,
            residual: state.f.amax(),
        })
    }

    fn refine(&self, mut state: Iterate, floor: f64) -> Vector4<f64> {
        for _ in 0..MAX_REFINEMENT_STEPS {
            if state.f.amax() <= floor || !self.step(&mut state) {
                break;
            }
        }
        trace!(residual = state.f.amax(), "arc solver refined");
        state.v
    }

    /// Take one downhill step, raising the damping until one is found.
    fn step(&self, state: &mut Iterate) -> bool {
        let j = self.jacobian(&state.v);
        let jt = j.transpose();
        let normal = jt * j;
        let gradient = jt * state.f;

        for _ in 0..MAX_DAMPING_RETRIES {
            let mut damped = normal;
            for i in 0..4 {
                damped[(i, i)] += state.damping * (normal[(i, i)] + f64::EPSILON);
            }

            if let Some(step) = damped.lu().solve(&(-gradient)) {
                let candidate = state.v + step;
                let candidate_f = self.residual(&candidate);
                let candidate_cost = candidate_f.norm_squared();
                if candidate_cost < state.cost {
                    state.v = candidate;
                    state.f = candidate_f;
                    state.cost = candidate_cost;
                    state.damping /= 3.0;
                    return true;
                }
            }
            state.damping *= 2.0;
        }
        false
    }
}

struct Iterate {
    v: Vector4<f64>,
    f: Vector4<f64>,
    cost: f64,
    damping: f64,
}

impl Iterate {
    fn new(problem: &ArcProblem, v: Vector4<f64>) -> Self {
        let f = problem.residual(&v);
        Self {
            v,
            f,
            cost: f.norm_squared(),
            damping: INITIAL_DAMPING,
        }
    }
}

fn validate(arc: &EllipticalArc) -> Result<(), GeometryError> {
    let values = [
        arc.start.x,
        arc.start.y,
        arc.end.x,
        arc.end.y,
        arc.radius_x,
        arc.radius_y,
        arc.rotation_degrees,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(GeometryError::DegenerateArc {
            reason: "non-finite coordinate or radius".to_string(),
        });
    }
    if arc.radius_x <= 0.0 || arc.radius_y <= 0.0 {
        return Err(GeometryError::DegenerateArc {
            reason: format!("radius ({}, {}) is not positive", arc.radius_x, arc.radius_y),
        });
    }
    if arc.start == arc.end {
        return Err(GeometryError::DegenerateArc {
            reason: "start and end coincide".to_string(),
        });
    }
    Ok(())
}

/// Wrap both angles into `[0, 2π)` and make the span increase.
fn finish(v: Vector4<f64>) -> ArcSolution {
    let start_angle = v[2].rem_euclid(TAU);
    let mut end_angle = v[3].rem_euclid(TAU);
    if end_angle < start_angle {
        end_angle += TAU;
    }
    ArcSolution {
        center: Point::new(v[0], v[1]),
        start_angle,
        end_angle,
    }
}
