use aeropolar::config::mission::{default_global_inputs, default_phase_info, EXTERNAL_AERO_NAME};
use aeropolar::logging;
use aeropolar::mission::{MissionWiring, PhaseConfig, UserOption};
use aeropolar::polar::{load_structured_file, ColumnMap};
use aeropolar::subsystems::ExternalAeroAdapter;
use csv::Writer;
use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

const DEFAULT_POLAR: &str = "data/sample_polar.csv";
const SAMPLES_PER_PHASE: usize = 5;
const ANGLE_OF_ATTACK: f64 = 2.0; // deg

fn endpoints(config: &PhaseConfig, name: &str) -> Option<(f64, f64)> {
    let options = config.user_options.as_ref()?;
    match (options.get(&format!("initial_{}", name))?, options.get(&format!("final_{}", name))?) {
        (UserOption::Quantity(start, _), UserOption::Quantity(end, _)) => Some((*start, *end)),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init().map_err(|e| e.to_string())?;

    let polar_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_POLAR.to_string());
    let table = load_structured_file(&polar_path, &ColumnMap::default())?;
    let axes = table.axes().clone();
    info!(path = %polar_path, shape = %table.shape(), "Polar table loaded");

    let adapter = ExternalAeroAdapter::new(EXTERNAL_AERO_NAME, table);
    let inputs = default_global_inputs();
    let wiring = MissionWiring::pre_mission(&[&adapter], &inputs)?;

    let phase_info = default_phase_info(&axes);
    let phases = wiring.resolve_mission(&phase_info)?;

    let output_dir = Path::new("output");
    fs::create_dir_all(output_dir)?;
    let file = File::create(output_dir.join("polar_profile.csv"))?;
    let mut writer = Writer::from_writer(file);
    writer.write_record([
        "Phase",
        "Altitude (ft)",
        "Mach",
        "Alpha (deg)",
        "CL",
        "CD",
        "L/D",
    ])?;

    for (name, aero) in &phases {
        let Some(interpolator) = aero.interpolator() else {
            info!(phase = %name, "Phase uses computed aerodynamics");
            continue;
        };
        let config = phase_info.get(name).ok_or("phase vanished from phase info")?;
        let (Some(altitude), Some(mach)) = (endpoints(config, "altitude"), endpoints(config, "mach")) else {
            continue;
        };

        for i in 0..SAMPLES_PER_PHASE {
            let f = i as f64 / (SAMPLES_PER_PHASE - 1) as f64;
            let h = altitude.0 + (altitude.1 - altitude.0) * f;
            let m = mach.0 + (mach.1 - mach.0) * f;
            let point = interpolator.lookup(h, m, ANGLE_OF_ATTACK)?;

            writer.write_record(&[
                name.clone(),
                format!("{:.0}", h),
                format!("{:.3}", m),
                ANGLE_OF_ATTACK.to_string(),
                format!("{:.5}", point.lift_coefficient),
                format!("{:.5}", point.drag_coefficient),
                format!("{:.2}", point.lift_to_drag()),
            ])?;
        }
        info!(phase = %name, samples = SAMPLES_PER_PHASE, "Phase polar sampled");
    }

    writer.flush()?;
    info!("Polar profile has been written to output/polar_profile.csv");

    Ok(())
}
