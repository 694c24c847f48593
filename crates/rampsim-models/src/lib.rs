//! rampsim-models
//!
//! Height profiles for the curved ramp, as plain functions of the
//! horizontal offset `x` in `[-width, 0]` (the ramp foot sits at the
//! origin, the crest at `x = -width`). Both curves are normalised so the
//! crest height is `height`.
//!
//! Two candidates were fitted against the measured ramp:
//!   - `exponential_height` — the closer fit; this is what the simulation
//!     tools use.
//!   - `parabolic_height` — the simpler alternative, kept for comparison
//!     runs.
//!
//! Solvers accept any `ShapeFn`, so callers pass closures over these:
//! `|x| exponential_height(x, 1.0, 0.55)`.

/// Shape function type: horizontal offset [m] -> height [m].
pub type ShapeFn = dyn Fn(f64) -> f64 + Send + Sync;

/// Decay rate of the exponential fit; larger means a steeper crest.
pub const EXP_STEEPNESS: f64 = 3.5;

/// Exponential profile `h·e^(−3.5·x/w − 3.5)`.
///
/// Equals `h` at the crest (`x = −w`) and `h·e^(−3.5)` (about 3% of `h`)
/// at the foot — the measured ramp never quite reaches the floor, and the
/// fit keeps that residual.
pub fn exponential_height(x: f64, height: f64, width: f64) -> f64 {
    height * ((-EXP_STEEPNESS * x) / width - EXP_STEEPNESS).exp()
}

/// Parabolic profile `(h/w²)·x²`: crest at `x = −w`, floor exactly at the
/// foot.
pub fn parabolic_height(x: f64, height: f64, width: f64) -> f64 {
    (height / (width * width)) * x * x
}
