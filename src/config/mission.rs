use crate::constants::CORE_AERODYNAMICS;
use crate::mission::{
    AeroData, AeroMethod, PhaseConfig, PhaseInfo, SubsystemOptions, UserOption, POST_MISSION, PRE_MISSION,
};
use crate::polar::PolarAxes;
use crate::subsystems::GlobalInputs;

pub const EXTERNAL_AERO_NAME: &str = "external_aero";

pub const CRUISE_ALTITUDE: f64 = 32_000.0; // ft
pub const CRUISE_MACH: f64 = 0.72;

fn quantity(value: f64, unit: &str) -> UserOption {
    UserOption::Quantity(value, unit.to_string())
}

fn bounds(lower: f64, upper: f64, unit: &str) -> UserOption {
    UserOption::Bounds((lower, upper), unit.to_string())
}

fn flight_phase(
    axes: &PolarAxes,
    mach: (f64, f64),
    altitude: (f64, f64),
    altitude_bounds: (f64, f64),
    duration_bounds: (f64, f64),
) -> PhaseConfig {
    let mut config = PhaseConfig::default();
    config.subsystem_options.insert(
        CORE_AERODYNAMICS.to_string(),
        SubsystemOptions {
            method: AeroMethod::SolvedAlpha,
            aero_data: Some(AeroData::from_axes(axes)),
            training_data: true,
        },
    );

    let options = [
        ("optimize_mach", UserOption::Flag(false)),
        ("optimize_altitude", UserOption::Flag(false)),
        ("num_segments", UserOption::Integer(5)),
        ("order", UserOption::Integer(3)),
        ("initial_mach", quantity(mach.0, "unitless")),
        ("final_mach", quantity(mach.1, "unitless")),
        ("initial_altitude", quantity(altitude.0, "ft")),
        ("final_altitude", quantity(altitude.1, "ft")),
        ("altitude_bounds", bounds(altitude_bounds.0, altitude_bounds.1, "ft")),
        ("duration_bounds", bounds(duration_bounds.0, duration_bounds.1, "min")),
        ("throttle_enforcement", UserOption::Text("path_constraint".to_string())),
    ];
    config.user_options = Some(options.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
    config
}

/// Climb, cruise and descent phases interpolating on the pre-mission polar.
pub fn default_phase_info(axes: &PolarAxes) -> PhaseInfo {
    let mut info = PhaseInfo::new();
    info.insert(PRE_MISSION, PhaseConfig::default());
    info.insert(
        "climb",
        flight_phase(axes, (0.2, CRUISE_MACH), (0.0, CRUISE_ALTITUDE), (0.0, 34_000.0), (64.0, 192.0)),
    );
    info.insert(
        "cruise",
        flight_phase(
            axes,
            (CRUISE_MACH, CRUISE_MACH),
            (CRUISE_ALTITUDE, CRUISE_ALTITUDE),
            (23_000.0, 38_000.0),
            (56.5, 169.5),
        ),
    );
    info.insert(
        "descent",
        flight_phase(axes, (CRUISE_MACH, 0.36), (CRUISE_ALTITUDE, 500.0), (0.0, 38_000.0), (29.0, 87.0)),
    );
    info.insert(POST_MISSION, PhaseConfig::default());
    info
}

pub fn default_global_inputs() -> GlobalInputs {
    GlobalInputs::new()
        .with("aircraft:wing:area", 1370.0, "ft**2")
        .with("mission:design:range", 1906.0, "nmi")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::check_phase_info;

    #[test]
    fn test_default_phase_info_is_valid() {
        let axes = PolarAxes::new(vec![0.0, 40_000.0], vec![0.2, 0.8], vec![-2.0, 10.0]).unwrap();
        let info = default_phase_info(&axes);
        assert!(check_phase_info(&info).is_ok());

        let flight: Vec<&str> = info.flight_phases().map(|(n, _)| n).collect();
        assert_eq!(flight, vec!["climb", "cruise", "descent"]);
    }
}
