//! rampsim-core
//!
//! Shared building blocks for the ramp-descent workspace:
//! - Physical parameter set (mass, gravity, drag coefficients, run length)
//! - Kinematic sample series (`t, x, y, v, a` columns)
//! - Energy projection (potential / kinetic / total)
//! - The error taxonomy every solver entry point reports through
//!
//! Everything here is a plain value type over `f64`; the integrators in
//! `rampsim-descent` are pure functions of these.

use thiserror::Error;

/// Classroom gravity [m/s²]; the measured runs were reduced with this value.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Errors shared by the solvers and the calibration routines.
#[derive(Debug, Error)]
pub enum SimError {
    /// A parameter is outside the range the solvers can work with
    /// (non-positive step, width, mass, elapsed time, ...).
    #[error("parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A square root or logarithm left its domain. For the ramp solver
    /// this means the trial drag would stop the cart before the foot.
    #[error("numeric domain error: {what}")]
    NumericDomain { what: String },

    /// The calibration search exhausted its trial budget.
    #[error("no convergence after {trials} trials")]
    Convergence { trials: usize },
}

/// Fail with `InvalidParameter` unless `value` is strictly positive.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<(), SimError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

/// Physical constants of one simulation run. Immutable once a run starts;
/// the front end rebuilds the whole series on any change rather than
/// patching a running one.
#[derive(Clone, Copy, Debug)]
pub struct PhysicalParams {
    /// Cart mass [kg]
    pub mass: f64,
    /// Gravitational acceleration [m/s²]
    pub gravity: f64,
    /// Velocity-proportional drag on the ramp [kg/s]
    pub ramp_drag: f64,
    /// Velocity-proportional drag on the flat ground [kg/s]
    pub ground_drag: f64,
    /// Ground-phase duration [s]
    pub end_time: f64,
}

impl PhysicalParams {
    /// Check the members the integrators divide by or integrate over.
    /// Drag coefficients may be zero (a frictionless run is a valid
    /// experiment) but never negative.
    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("mass", self.mass)?;
        ensure_positive("gravity", self.gravity)?;
        ensure_positive("end_time", self.end_time)?;
        if self.ramp_drag < 0.0 {
            return Err(SimError::InvalidParameter {
                name: "ramp_drag",
                value: self.ramp_drag,
            });
        }
        if self.ground_drag < 0.0 {
            return Err(SimError::InvalidParameter {
                name: "ground_drag",
                value: self.ground_drag,
            });
        }
        Ok(())
    }
}

/* ------------------------------ series ------------------------------ */

/// One row per sample: time, horizontal and vertical position, speed,
/// acceleration. Simulated output and tracker captures share this shape
/// (and the 5-column text format in `rampsim-io`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KinematicSeries {
    /// Time [s]; negative on the ramp, 0 at the ramp/ground junction
    pub t: Vec<f64>,
    /// Horizontal position [m]
    pub x: Vec<f64>,
    /// Height [m]
    pub y: Vec<f64>,
    /// Speed magnitude [m/s]
    pub v: Vec<f64>,
    /// Acceleration [m/s²]
    pub a: Vec<f64>,
}

impl KinematicSeries {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            v: Vec::with_capacity(n),
            a: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn push(&mut self, t: f64, x: f64, y: f64, v: f64, a: f64) {
        self.t.push(t);
        self.x.push(x);
        self.y.push(y);
        self.v.push(v);
        self.a.push(a);
    }

    /// A single all-zero sample; what loaders fall back to when a capture
    /// file is missing.
    pub fn zero_sample() -> Self {
        let mut series = Self::with_capacity(1);
        series.push(0.0, 0.0, 0.0, 0.0, 0.0);
        series
    }
}

/// Potential / kinetic / total energy columns. No state of its own: a
/// pointwise projection of a `KinematicSeries`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnergySeries {
    /// `m·g·y` [J]
    pub potential: Vec<f64>,
    /// `m·v²/2` [J]
    pub kinetic: Vec<f64>,
    /// Sum of the two [J]
    pub total: Vec<f64>,
}

impl EnergySeries {
    pub fn from_kinematics(mass: f64, gravity: f64, series: &KinematicSeries) -> Self {
        let potential: Vec<f64> = series.y.iter().map(|&y| mass * gravity * y).collect();
        let kinetic: Vec<f64> = series.v.iter().map(|&v| mass * v * v / 2.0).collect();
        let total = potential
            .iter()
            .zip(&kinetic)
            .map(|(p, k)| p + k)
            .collect();
        Self {
            potential,
            kinetic,
            total,
        }
    }
}

/* ------------------------------- tests ------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn positive_check_accepts_and_rejects() {
        assert!(ensure_positive("step", 0.001).is_ok());
        assert!(matches!(
            ensure_positive("step", 0.0),
            Err(SimError::InvalidParameter { name: "step", .. })
        ));
        assert!(ensure_positive("mass", -1.0).is_err());
    }

    #[test]
    fn params_validate_rejects_negative_drag() {
        let good = PhysicalParams {
            mass: 0.382,
            gravity: STANDARD_GRAVITY,
            ramp_drag: 0.0,
            ground_drag: 0.1,
            end_time: 20.0,
        };
        assert!(good.validate().is_ok());

        let bad = PhysicalParams {
            ramp_drag: -0.01,
            ..good
        };
        assert!(matches!(
            bad.validate(),
            Err(SimError::InvalidParameter {
                name: "ramp_drag",
                ..
            })
        ));
    }

    #[test]
    fn energy_projection_pointwise() {
        let mut series = KinematicSeries::default();
        series.push(0.0, 0.0, 1.5, 2.0, 0.0);
        series.push(1.0, 1.0, 0.0, 3.0, 0.0);

        let energy = EnergySeries::from_kinematics(2.0, 10.0, &series);
        assert_relative_eq!(energy.potential[0], 30.0);
        assert_relative_eq!(energy.kinetic[0], 4.0);
        assert_relative_eq!(energy.total[0], 34.0);
        assert_relative_eq!(energy.potential[1], 0.0);
        assert_relative_eq!(energy.kinetic[1], 9.0);
    }

    #[test]
    fn zero_sample_is_one_row_of_zeroes() {
        let series = KinematicSeries::zero_sample();
        assert_eq!(series.len(), 1);
        assert_eq!(series.t[0], 0.0);
        assert_eq!(series.v[0], 0.0);
    }
}
