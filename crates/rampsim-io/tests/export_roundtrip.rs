// Round-trip check against a real simulated series: exporting the spliced
// descent timeline and loading it back through the capture reader must
// reproduce every column exactly (ryu writes shortest round-trip floats).

use rampsim_core::PhysicalParams;
use rampsim_descent::{simulate_descent, RampProfile};
use rampsim_io::{filter_to_window, read_series, write_series};
use rampsim_models::exponential_height;

#[test]
fn simulated_series_survives_export_and_reload() {
    let phys = PhysicalParams {
        mass: 0.382,
        gravity: 9.81,
        ramp_drag: 0.3,
        ground_drag: 0.1,
        end_time: 2.0,
    };
    let shape = |x: f64| exponential_height(x, 1.0, 0.5);
    let profile = RampProfile {
        height: 1.0,
        width: 0.5,
        step: 0.005,
        shape: &shape,
    };
    let descent = simulate_descent(&profile, &phys, 0.01).unwrap();

    let mut path = std::env::temp_dir();
    path.push(format!("rampsim-export-{}.txt", std::process::id()));

    write_series(&path, &descent.series).unwrap();
    let back = read_series(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(back, descent.series);

    // A reloaded capture can be windowed against a shorter run, exactly
    // like experimental data is.
    let windowed = filter_to_window(&back, 1.0);
    assert!(windowed.len() < back.len());
    assert!(windowed.t.iter().all(|&t| t <= 1.0));
    assert_eq!(windowed.t[0], back.t[0]);
}
