// crates/rampsim-cli/src/main.rs
//
// Command-line front end: `simulate` runs a full descent from the settings
// document and exports the spliced series; `calibrate` recovers both drag
// coefficients from observed speeds, like the coefficient-finder script
// the plots were reduced with.

use std::env;

use anyhow::{bail, Context, Result};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rampsim_calibrate::{ground_drag_from_decay, ramp_drag_from_exit_speed};
use rampsim_descent::{simulate_descent, RampProfile, DEFAULT_GROUND_STEP, DEFAULT_RAMP_STEP};
use rampsim_io::{load_settings, write_series, Settings};
use rampsim_models::exponential_height;

const USAGE: &str = "\
usage:
  rampsim simulate  [settings.json] [out.txt]
  rampsim calibrate <exit_speed> <speed_at_time> <elapsed> [settings.json]";

/// Trial increment for the ramp drag search [kg/s].
const TRIAL_STEP: f64 = 0.01;

fn main() -> Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("simulate") => simulate(&args[1..]),
        Some("calibrate") => calibrate(&args[1..]),
        _ => bail!("{USAGE}"),
    }
}

fn simulate(args: &[String]) -> Result<()> {
    let settings_path = args.first().map_or("settings.json", String::as_str);
    let out_path = args.get(1).map_or("simulation.txt", String::as_str);

    let settings =
        load_settings(settings_path).with_context(|| format!("reading {settings_path}"))?;
    let shape = move |x: f64| exponential_height(x, settings.hp, settings.lp);
    let profile = RampProfile {
        height: settings.hp,
        width: settings.lp,
        step: DEFAULT_RAMP_STEP,
        shape: &shape,
    };

    let descent = simulate_descent(&profile, &settings.physical_params(), DEFAULT_GROUND_STEP)
        .context("simulating the descent")?;

    info!(
        "exit speed {:.3} m/s; {} samples over {:.3}..{:.3} s",
        descent.ramp.exit_speed(),
        descent.series.len(),
        descent.series.t.first().copied().unwrap_or(0.0),
        descent.series.t.last().copied().unwrap_or(0.0),
    );

    write_series(out_path, &descent.series).with_context(|| format!("writing {out_path}"))?;
    info!("series exported to {out_path}");
    Ok(())
}

fn calibrate(args: &[String]) -> Result<()> {
    let [exit_speed, speed_at_time, elapsed] = parse_speeds(args)?;
    let settings = match args.get(3) {
        Some(path) => load_settings(path).with_context(|| format!("reading {path}"))?,
        None => Settings::default(),
    };

    let ground = ground_drag_from_decay(exit_speed, speed_at_time, elapsed, settings.m)
        .context("ground drag")?;

    let shape = move |x: f64| exponential_height(x, settings.hp, settings.lp);
    let profile = RampProfile {
        height: settings.hp,
        width: settings.lp,
        step: DEFAULT_RAMP_STEP,
        shape: &shape,
    };
    let ramp = ramp_drag_from_exit_speed(
        exit_speed,
        &profile,
        &settings.physical_params(),
        TRIAL_STEP,
    )
    .context("ramp drag")?;

    println!("k  = {ground:.4} kg/s (ground)");
    println!("kp = {ramp:.4} kg/s (ramp)");
    Ok(())
}

fn parse_speeds(args: &[String]) -> Result<[f64; 3]> {
    let (Some(v0), Some(vt), Some(t)) = (args.first(), args.get(1), args.get(2)) else {
        bail!("{USAGE}");
    };
    Ok([
        v0.parse().with_context(|| format!("exit speed `{v0}`"))?,
        vt.parse().with_context(|| format!("speed at time `{vt}`"))?,
        t.parse().with_context(|| format!("elapsed time `{t}`"))?,
    ])
}
