//! rampsim-io
//!
//! The workspace's data boundary:
//! - the 5-column whitespace text format shared by simulation exports and
//!   the tracker's experimental captures (`t x y v a`, one row per
//!   sample, round-trip safe)
//! - the settings JSON document the front-end tools persist between runs
//!
//! A missing capture file is non-fatal: loaders fall back to a single
//! zero sample and keep going, so a bare checkout still runs. A missing
//! settings file materialises the defaults on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rampsim_core::{KinematicSeries, PhysicalParams};

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 5 columns (t x y v a), found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: std::num::ParseFloatError,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/* ----------------------------- capture files ----------------------------- */

/// Parse a capture from its text form. Blank lines are skipped; anything
/// else must be 5 whitespace-separated floats.
pub fn parse_series(text: &str) -> Result<KinematicSeries, DataError> {
    let mut series = KinematicSeries::default();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() != 5 {
            return Err(DataError::ColumnCount {
                line: idx + 1,
                found: cols.len(),
            });
        }
        let mut row = [0.0_f64; 5];
        for (slot, col) in row.iter_mut().zip(&cols) {
            *slot = col.parse().map_err(|source| DataError::Parse {
                line: idx + 1,
                source,
            })?;
        }
        series.push(row[0], row[1], row[2], row[3], row[4]);
    }
    Ok(series)
}

/// Read a capture file.
pub fn read_series(path: impl AsRef<Path>) -> Result<KinematicSeries, DataError> {
    let text = fs::read_to_string(path)?;
    parse_series(&text)
}

/// Like [`read_series`], but a missing file yields the single zero sample
/// the tools substitute for an absent capture. Other errors propagate.
pub fn read_series_or_fallback(path: impl AsRef<Path>) -> Result<KinematicSeries, DataError> {
    match read_series(&path) {
        Err(DataError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "capture file {} is missing; using a zero sample",
                path.as_ref().display()
            );
            Ok(KinematicSeries::zero_sample())
        }
        other => other,
    }
}

/// Write a series in the capture format to any sink. Floats are rendered
/// with their shortest round-trip representation, so reading the output
/// back reproduces the arrays bit for bit.
pub fn write_series_to(out: &mut impl Write, series: &KinematicSeries) -> Result<(), DataError> {
    let mut buf = ryu::Buffer::new();
    for i in 0..series.len() {
        out.write_all(buf.format(series.t[i]).as_bytes())?;
        out.write_all(b" ")?;
        out.write_all(buf.format(series.x[i]).as_bytes())?;
        out.write_all(b" ")?;
        out.write_all(buf.format(series.y[i]).as_bytes())?;
        out.write_all(b" ")?;
        out.write_all(buf.format(series.v[i]).as_bytes())?;
        out.write_all(b" ")?;
        out.write_all(buf.format(series.a[i]).as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Write a series as a capture file.
pub fn write_series(path: impl AsRef<Path>, series: &KinematicSeries) -> Result<(), DataError> {
    let file = fs::File::create(path)?;
    let mut out = BufWriter::new(file);
    write_series_to(&mut out, series)?;
    out.flush()?;
    Ok(())
}

/// Rows with `t ≤ t_end`, for overlaying a capture on a simulation of the
/// same duration.
pub fn filter_to_window(series: &KinematicSeries, t_end: f64) -> KinematicSeries {
    let mut out = KinematicSeries::default();
    for i in 0..series.len() {
        if series.t[i] <= t_end {
            out.push(
                series.t[i],
                series.x[i],
                series.y[i],
                series.v[i],
                series.a[i],
            );
        }
    }
    out
}

/* ------------------------------- settings ------------------------------- */

/// The persisted simulation parameters, with the JSON keys the historical
/// settings files use. `options` holds display toggles the engine never
/// reads; they ride along so front-end state survives a round-trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Cart mass [kg]
    pub m: f64,
    /// Ground drag [kg/s]
    pub k: f64,
    /// Ramp drag [kg/s]
    pub kp: f64,
    /// Ground-phase duration [s]
    #[serde(rename = "Fin")]
    pub fin: f64,
    /// Ramp height [m]
    pub hp: f64,
    /// Ramp width [m]
    pub lp: f64,
    /// Gravity [m/s²]
    pub g: f64,
    /// Display options (front-end state, opaque to the engine)
    #[serde(default)]
    pub options: BTreeMap<String, bool>,
}

impl Default for Settings {
    fn default() -> Self {
        let options = [
            ("[Exp]", false),
            ("x(t)", true),
            ("v(t)", true),
            ("a(t)", true),
            ("y(t)", false),
            ("Ec(t)", true),
            ("Ep(t)", true),
            ("Et(t)", true),
        ]
        .into_iter()
        .map(|(name, on)| (name.to_owned(), on))
        .collect();

        Self {
            m: 0.5,
            k: 0.22,
            kp: 0.0,
            fin: 20.0,
            hp: 1.0,
            lp: 0.55,
            g: 9.81,
            options,
        }
    }
}

impl Settings {
    /// Engine-side view of the scalar parameters.
    pub fn physical_params(&self) -> PhysicalParams {
        PhysicalParams {
            mass: self.m,
            gravity: self.g,
            ramp_drag: self.kp,
            ground_drag: self.k,
            end_time: self.fin,
        }
    }
}

/// Read the settings document. A missing file writes the defaults and
/// returns them (first run); anything else propagates.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, DataError> {
    match fs::read_to_string(&path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let settings = Settings::default();
            save_settings(&path, &settings)?;
            Ok(settings)
        }
        Err(e) => Err(e.into()),
    }
}

/// Persist the settings document (called after every parameter change).
pub fn save_settings(path: impl AsRef<Path>, settings: &Settings) -> Result<(), DataError> {
    let text = serde_json::to_string_pretty(settings)?;
    fs::write(path, text)?;
    Ok(())
}

/* --------------------------------- tests --------------------------------- */
