//! rampsim-descent
//!
//! Trajectory solver for a cart released at the top of a curved ramp and
//! rolling out on flat ground. Two phases, two schemes:
//!
//! - **Ramp**: the curve is cut into `ceil(width/step)` straight pieces.
//!   Each piece is uniformly accelerated motion along its incline:
//!
//!     a  = g·sin(θ) − kp·v/m        (gravity component minus drag)
//!     vf = sqrt(vi² + 2·a·dx)
//!     dt = (vf − vi)/a
//!
//!   and the exit velocity is re-aimed along the *next* piece's incline.
//!   The last piece's outgoing angle is 0: the cart leaves horizontally.
//! - **Ground**: fixed-step forward Euler of a linear-drag particle,
//!   `a = −k·v/m`. Position and velocity advance from the *current*
//!   values — do not reorder the update, captures were reduced against
//!   series produced exactly this way.
//!
//! `simulate_descent` splices the phases into one timeline with `t = 0`
//! at the ramp/ground junction (ramp times run negative).
//!
//! Conventions:
//! - Horizontal offset `x`: crest at `−width`, ramp foot at 0, ground
//!   positions continue from 0.
//! - Vertical velocity is negative while the cart descends.

use log::debug;
use nalgebra::Vector2;

use rampsim_core::{ensure_positive, KinematicSeries, PhysicalParams, SimError};
use rampsim_models::ShapeFn;

/// Default discretisation of the ramp curve [m].
pub const DEFAULT_RAMP_STEP: f64 = 0.001;
/// Default ground-phase time step [s].
pub const DEFAULT_GROUND_STEP: f64 = 0.001;

/// Below this magnitude a piece's acceleration is treated as zero and the
/// piece as uniform motion (the MRUA time formula divides by `a`).
const ACCEL_EPS: f64 = 1e-12;

/// Ramp geometry plus the discretisation used to integrate over it.
/// Immutable once a run starts.
pub struct RampProfile<'a> {
    /// Crest height [m]
    pub height: f64,
    /// Horizontal extent [m]
    pub width: f64,
    /// Horizontal discretisation step [m]; must be well below `width`
    pub step: f64,
    /// Height curve (see `rampsim-models`)
    pub shape: &'a ShapeFn,
}

impl RampProfile<'_> {
    fn validate(&self) -> Result<(), SimError> {
        ensure_positive("height", self.height)?;
        ensure_positive("width", self.width)?;
        ensure_positive("step", self.step)?;
        // At least two samples, so the angle lookahead always has a
        // second point.
        if self.step >= self.width {
            return Err(SimError::InvalidParameter {
                name: "step",
                value: self.step,
            });
        }
        Ok(())
    }
}

/// Per-sample output of the ramp phase.
#[derive(Clone, Debug)]
pub struct RampTrajectory {
    /// Horizontal positions [m], from `−width` up to the foot
    pub x: Vec<f64>,
    /// Profile heights [m]
    pub y: Vec<f64>,
    /// Velocity components (horizontal, vertical) [m/s]
    pub velocity: Vec<Vector2<f64>>,
    /// Signed along-slope acceleration [m/s²]
    pub accel: Vec<f64>,
    /// Ramp-local time [s], 0 at release
    pub t: Vec<f64>,
}

impl RampTrajectory {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Scalar speed at sample `i`.
    pub fn speed(&self, i: usize) -> f64 {
        self.velocity[i].norm()
    }

    /// Horizontal speed on leaving the ramp. The last piece's outgoing
    /// angle is 0, so this is the full exit speed and the ground phase's
    /// initial condition.
    pub fn exit_speed(&self) -> f64 {
        self.velocity.last().map_or(0.0, |v| v.x)
    }

    /// Time spent on the ramp [s].
    pub fn duration(&self) -> f64 {
        self.t.last().copied().unwrap_or(0.0)
    }
}

/// Per-sample output of the ground phase.
#[derive(Clone, Debug)]
pub struct GroundTrajectory {
    /// Position [m], re-based to 0 at the ramp foot
    pub x: Vec<f64>,
    /// Speed [m/s]
    pub v: Vec<f64>,
    /// Acceleration [m/s²] (always ≤ 0: drag only)
    pub a: Vec<f64>,
    /// Time [s] from the junction
    pub t: Vec<f64>,
}

/// Both phases of one run plus the spliced timeline.
#[derive(Clone, Debug)]
pub struct Descent {
    pub ramp: RampTrajectory,
    pub ground: GroundTrajectory,
    /// Concatenated `(t, x, y, v, a)` series; ramp time shifted so that
    /// `t = 0` is the junction.
    pub series: KinematicSeries,
}

/// Integrate the ramp phase.
///
/// Discretises the profile at `x = −width + i·step`, then walks the
/// pieces with the MRUA update described in the crate docs. The first
/// sample fixes the incline of the piece ahead and records `a = g`
/// (released from rest, so drag plays no part yet).
///
/// Fails with `NumericDomain` when drag overwhelms gravity on some piece
/// (the square-root operand goes negative — physically, the cart would
/// stop before the foot). Nothing is clamped; no NaN escapes.
pub fn simulate_ramp(
    profile: &RampProfile,
    phys: &PhysicalParams,
) -> Result<RampTrajectory, SimError> {
    profile.validate()?;
    phys.validate()?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (profile.width / profile.step).ceil() as usize;

    let xs: Vec<f64> = (0..n)
        .map(|i| -profile.width + i as f64 * profile.step)
        .collect();
    let ys: Vec<f64> = xs.iter().map(|&x| (profile.shape)(x)).collect();

    let mut velocity = vec![Vector2::zeros(); n];
    let mut accel = vec![0.0; n];
    let mut t = vec![0.0; n];

    let mut vf = 0.0;
    accel[0] = phys.gravity;
    let mut angle = ((ys[0] - ys[1]) / (xs[1] - xs[0])).atan();

    for i in 1..n {
        let vi = vf;
        // Straight-line length of the piece between samples i-1 and i.
        let dx = ((xs[i] - xs[i - 1]).powi(2) + (ys[i] - ys[i - 1]).powi(2)).sqrt();
        let a = phys.gravity * angle.sin() - (phys.ramp_drag * vi) / phys.mass;
        accel[i] = a;

        let (dt, v_next) = mrua_piece(vi, a, dx, i)?;
        vf = v_next;
        t[i] = t[i - 1] + dt;

        // Incline of the piece ahead; past the last piece the ramp hands
        // over to flat ground.
        angle = if i == n - 1 {
            0.0
        } else {
            ((ys[i] - ys[i + 1]) / (xs[i + 1] - xs[i])).atan()
        };
        velocity[i] = Vector2::new(vf * angle.cos(), -vf * angle.sin());
    }

    debug!(
        "ramp integrated: {} pieces, exit speed {:.4} m/s after {:.4} s",
        n,
        vf,
        t.last().copied().unwrap_or(0.0)
    );

    Ok(RampTrajectory {
        x: xs,
        y: ys,
        velocity,
        accel,
        t,
    })
}

/// Integrate the ground phase from the given initial speed.
///
/// Forward Euler with the current-value update order (see crate docs);
/// sample count is `ceil(end_time/dt)` with `t[i] = i·dt`, position
/// re-based to 0 at the junction.
pub fn simulate_ground(
    initial_speed: f64,
    phys: &PhysicalParams,
    dt: f64,
) -> Result<GroundTrajectory, SimError> {
    phys.validate()?;
    ensure_positive("dt", dt)?;
    if initial_speed < 0.0 {
        return Err(SimError::InvalidParameter {
            name: "initial_speed",
            value: initial_speed,
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (phys.end_time / dt).ceil() as usize;

    let t: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
    let mut x = vec![0.0; n];
    let mut v = vec![0.0; n];
    let mut a = vec![0.0; n];

    v[0] = initial_speed;
    for i in 0..n - 1 {
        a[i] = -(phys.ground_drag * v[i]) / phys.mass;
        v[i + 1] = v[i] + a[i] * dt;
        x[i + 1] = x[i] + v[i] * dt;
    }
    // The stepping loop stops one short; give the final sample its
    // acceleration too so the exported column has no hole.
    a[n - 1] = -(phys.ground_drag * v[n - 1]) / phys.mass;

    Ok(GroundTrajectory { x, v, a, t })
}

/// Run both phases and splice them into one series.
pub fn simulate_descent(
    profile: &RampProfile,
    phys: &PhysicalParams,
    ground_dt: f64,
) -> Result<Descent, SimError> {
    let ramp = simulate_ramp(profile, phys)?;
    let ground = simulate_ground(ramp.exit_speed(), phys, ground_dt)?;

    let mut series = KinematicSeries::with_capacity(ramp.len() + ground.t.len());
    let t_exit = ramp.duration();
    for i in 0..ramp.len() {
        series.push(
            ramp.t[i] - t_exit,
            ramp.x[i],
            ramp.y[i],
            ramp.velocity[i].norm(),
            ramp.accel[i],
        );
    }
    for i in 0..ground.t.len() {
        series.push(ground.t[i], ground.x[i], 0.0, ground.v[i], ground.a[i]);
    }

    Ok(Descent {
        ramp,
        ground,
        series,
    })
}

/* ------------------------------- internals ------------------------------- */

/// Solve one straight piece as uniformly accelerated motion: exit speed
/// and time spent, from entry speed `vi`, acceleration `a`, length `dx`.
fn mrua_piece(vi: f64, a: f64, dx: f64, piece: usize) -> Result<(f64, f64), SimError> {
    if a.abs() < ACCEL_EPS {
        if vi <= 0.0 {
            return Err(SimError::NumericDomain {
                what: format!("cart stalled on piece {piece}: no acceleration and no speed"),
            });
        }
        // Uniform motion; the MRUA formula would divide by zero.
        return Ok((dx / vi, vi));
    }

    let operand = 2.0 * a * dx + vi * vi;
    if operand < 0.0 {
        return Err(SimError::NumericDomain {
            what: format!("drag overwhelms gravity on piece {piece}: vf² = {operand:.6e}"),
        });
    }
    let vf = operand.sqrt();
    Ok(((vf - vi) / a, vf))
}

/* --------------------------------- tests --------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rampsim_core::STANDARD_GRAVITY;
    use rampsim_models::exponential_height;

    fn phys(ramp_drag: f64, ground_drag: f64) -> PhysicalParams {
        PhysicalParams {
            mass: 0.382,
            gravity: STANDARD_GRAVITY,
            ramp_drag,
            ground_drag,
            end_time: 5.0,
        }
    }

    fn profile(shape: &ShapeFn) -> RampProfile<'_> {
        RampProfile {
            height: 1.0,
            width: 0.5,
            step: 0.001,
            shape,
        }
    }

    #[test]
    fn sample_count_is_ceil_width_over_step() {
        let shape = |x: f64| exponential_height(x, 1.0, 0.5);
        let traj = simulate_ramp(&profile(&shape), &phys(0.0, 0.0)).unwrap();
        let expected = (0.5f64 / 0.001).ceil() as usize;
        assert_eq!(traj.len(), expected);
        assert_relative_eq!(traj.x[0], -0.5);
        assert!(*traj.x.last().unwrap() < 1e-9);
    }

    #[test]
    fn frictionless_ramp_conserves_energy() {
        // With kp = 0 the per-piece update telescopes the height drops
        // exactly, so exit kinetic energy equals m·g·(y_start − y_end)
        // to rounding error, independent of step.
        let shape = |x: f64| exponential_height(x, 1.0, 0.5);
        let p = phys(0.0, 0.0);
        let traj = simulate_ramp(&profile(&shape), &p).unwrap();

        let drop = traj.y[0] - traj.y.last().unwrap();
        let kinetic = 0.5 * p.mass * traj.exit_speed().powi(2);
        assert_relative_eq!(kinetic, p.mass * p.gravity * drop, max_relative = 1e-9);
    }

    #[test]
    fn exit_speed_monotone_in_ramp_drag() {
        let shape = |x: f64| exponential_height(x, 1.0, 0.5);
        let mut last = f64::INFINITY;
        for kp in [0.0, 0.05, 0.1, 0.2, 0.4] {
            let exit = simulate_ramp(&profile(&shape), &phys(kp, 0.0))
                .unwrap()
                .exit_speed();
            assert!(
                exit <= last,
                "exit speed rose from {last} to {exit} at kp = {kp}"
            );
            last = exit;
        }
    }

    #[test]
    fn overwhelming_drag_is_a_domain_error() {
        let shape = |x: f64| exponential_height(x, 1.0, 0.5);
        let result = simulate_ramp(&profile(&shape), &phys(50.0, 0.0));
        assert!(matches!(result, Err(SimError::NumericDomain { .. })));
    }

    #[test]
    fn ramp_rejects_step_wider_than_ramp() {
        let shape = |x: f64| exponential_height(x, 1.0, 0.5);
        let bad = RampProfile {
            height: 1.0,
            width: 0.5,
            step: 0.5,
            shape: &shape,
        };
        assert!(matches!(
            simulate_ramp(&bad, &phys(0.0, 0.0)),
            Err(SimError::InvalidParameter { name: "step", .. })
        ));
    }

    #[test]
    fn ground_without_drag_moves_uniformly() {
        let traj = simulate_ground(3.0, &phys(0.0, 0.0), 0.01).unwrap();
        for (i, &v) in traj.v.iter().enumerate() {
            assert_relative_eq!(v, 3.0, max_relative = 1e-12);
            assert_relative_eq!(traj.x[i], 3.0 * traj.t[i], max_relative = 1e-9);
        }
    }

    #[test]
    fn ground_update_order_is_explicit_euler() {
        // One hand-checked step: v1 = v0 + a0·dt, x1 = x0 + v0·dt with the
        // *current* values (x1 must not see v1).
        let p = PhysicalParams {
            mass: 2.0,
            gravity: STANDARD_GRAVITY,
            ramp_drag: 0.0,
            ground_drag: 1.0,
            end_time: 0.02,
        };
        let traj = simulate_ground(4.0, &p, 0.01).unwrap();
        let a0 = -(1.0 * 4.0) / 2.0; // −2 m/s²
        assert_relative_eq!(traj.a[0], a0);
        assert_relative_eq!(traj.v[1], 4.0 + a0 * 0.01);
        assert_relative_eq!(traj.x[1], 0.0 + 4.0 * 0.01);
    }

    #[test]
    fn ground_fills_the_final_acceleration_sample() {
        let traj = simulate_ground(3.0, &phys(0.0, 0.22), 0.01).unwrap();
        let last_v = *traj.v.last().unwrap();
        assert_relative_eq!(
            *traj.a.last().unwrap(),
            -(0.22 * last_v) / 0.382,
            max_relative = 1e-12
        );
    }

    #[test]
    fn ground_rejects_bad_steps() {
        assert!(simulate_ground(3.0, &phys(0.0, 0.1), 0.0).is_err());
        let mut p = phys(0.0, 0.1);
        p.end_time = -1.0;
        assert!(simulate_ground(3.0, &p, 0.01).is_err());
    }
}
