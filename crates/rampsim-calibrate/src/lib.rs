//! rampsim-calibrate
//!
//! Recovers the two drag coefficients from observed speeds.
//!
//! - On the ramp there is no closed form (the drag term couples into the
//!   piecewise integration), so the coefficient is found by walking a
//!   trial value up from zero until the simulated exit speed first drops
//!   to the observed one. Increasing drag strictly decreases exit speed,
//!   which is what makes the walk terminate.
//! - On the ground the linear-drag ODE has the exact solution
//!   `v(t) = v₀·e^(−k·t/m)`, inverted directly.

use log::debug;

use rampsim_core::{ensure_positive, PhysicalParams, SimError};
use rampsim_descent::{simulate_ramp, RampProfile};

/// Trial budget for the ramp search. `trials × trial_step` spans far more
/// than any physically plausible drag coefficient; hitting the budget
/// means the step is degenerate or the target speed unreachable.
pub const MAX_TRIALS: usize = 100_000;

/// Find the ramp drag coefficient [kg/s] whose simulated exit speed first
/// drops to `observed_exit_speed`.
///
/// Linear search from 0 in increments of `trial_step`, returning the
/// first trial at or below the target — deliberately not the closest
/// one, matching how the coefficient has always been read off. The
/// `ramp_drag` field of `phys` is ignored; everything else is used as-is.
///
/// Cost is one full ramp integration per trial. Fails with `Convergence`
/// past [`MAX_TRIALS`]; integrator errors propagate (a high trial drag
/// stalls the cart when the target is unreachably low).
pub fn ramp_drag_from_exit_speed(
    observed_exit_speed: f64,
    profile: &RampProfile,
    phys: &PhysicalParams,
    trial_step: f64,
) -> Result<f64, SimError> {
    ensure_positive("observed_exit_speed", observed_exit_speed)?;
    ensure_positive("trial_step", trial_step)?;

    let mut trial = PhysicalParams {
        ramp_drag: 0.0,
        ..*phys
    };
    for i in 0..=MAX_TRIALS {
        let exit = simulate_ramp(profile, &trial)?.exit_speed();
        if exit <= observed_exit_speed {
            debug!(
                "ramp drag settled at {} kg/s after {} trials (exit {:.4} m/s)",
                trial.ramp_drag,
                i + 1,
                exit
            );
            return Ok(trial.ramp_drag);
        }
        trial.ramp_drag += trial_step;
    }
    Err(SimError::Convergence { trials: MAX_TRIALS })
}

/// Ground drag coefficient [kg/s] from two observed speeds and the time
/// between them: `k = (−m/t)·ln(v_t/v₀)`.
///
/// Both speeds must be strictly positive (domain of the logarithm).
pub fn ground_drag_from_decay(
    initial_speed: f64,
    speed_at_time: f64,
    elapsed: f64,
    mass: f64,
) -> Result<f64, SimError> {
    ensure_positive("elapsed", elapsed)?;
    ensure_positive("mass", mass)?;
    if initial_speed <= 0.0 || speed_at_time <= 0.0 {
        return Err(SimError::NumericDomain {
            what: format!(
                "log of a non-positive speed ratio ({speed_at_time} / {initial_speed})"
            ),
        });
    }
    Ok((-mass / elapsed) * (speed_at_time / initial_speed).ln())
}

/* --------------------------------- tests --------------------------------- */
