use crate::constants::CORE_AERODYNAMICS;
use crate::polar::{PolarAxes, StructuredPolar, TableResult};
use crate::subsystems::{BuilderError, BuilderResult};
use crate::units::{Dimension, Unit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Interpolation strategy a phase uses for its aerodynamics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AeroMethod {
    /// Built-in aerodynamics of the host; no polar consumed
    Computed,
    LowSpeed,
    Tabular,
    SolvedAlpha,
}

impl AeroMethod {
    pub fn uses_table(&self) -> bool {
        !matches!(self, AeroMethod::Computed)
    }
}

impl fmt::Display for AeroMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AeroMethod::Computed => write!(f, "computed"),
            AeroMethod::LowSpeed => write!(f, "low_speed"),
            AeroMethod::Tabular => write!(f, "tabular"),
            AeroMethod::SolvedAlpha => write!(f, "solved_alpha"),
        }
    }
}

/// Axis data a phase interpolates on, optionally with its own coefficients
/// (row-major, angle of attack fastest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroData {
    pub altitude: Vec<f64>,
    pub mach: Vec<f64>,
    pub angle_of_attack: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lift: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag: Option<Vec<f64>>,
}

impl AeroData {
    pub fn from_axes(axes: &PolarAxes) -> Self {
        Self {
            altitude: axes.altitude().to_vec(),
            mach: axes.mach().to_vec(),
            angle_of_attack: axes.angle_of_attack().to_vec(),
            lift: None,
            drag: None,
        }
    }

    pub fn from_table(table: &StructuredPolar) -> Self {
        Self {
            lift: Some(table.lift().iter().copied().collect()),
            drag: Some(table.drag().iter().copied().collect()),
            ..Self::from_axes(table.axes())
        }
    }

    pub fn axes(&self) -> TableResult<PolarAxes> {
        PolarAxes::new(self.altitude.clone(), self.mach.clone(), self.angle_of_attack.clone())
    }

}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemOptions {
    pub method: AeroMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aero_data: Option<AeroData>,
    /// Polar arrives through a pre-mission connection instead of `aero_data`
    #[serde(default)]
    pub training_data: bool,
}

/// A phase option as written in phase info files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserOption {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Quantity(f64, String),
    Bounds((f64, f64), String),
    Series(Vec<f64>, String),
}

impl UserOption {
    pub fn unit(&self) -> Option<&str> {
        match self {
            UserOption::Quantity(_, unit) | UserOption::Bounds(_, unit) | UserOption::Series(_, unit) => {
                Some(unit.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subsystem_options: BTreeMap<String, SubsystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_options: Option<BTreeMap<String, UserOption>>,
    /// Remaining top-level keys, e.g. `include_takeoff` on `pre_mission`
    #[serde(flatten)]
    pub options: BTreeMap<String, UserOption>,
}

impl PhaseConfig {
    pub fn aerodynamics(&self) -> Option<&SubsystemOptions> {
        self.subsystem_options.get(CORE_AERODYNAMICS)
    }
}

pub const PRE_MISSION: &str = "pre_mission";
pub const POST_MISSION: &str = "post_mission";

/// Ordered phase name -> configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseInfo {
    phases: Vec<(String, PhaseConfig)>,
}

impl PhaseInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends or replaces a phase, keeping first-insertion order.
    pub fn insert(&mut self, name: &str, config: PhaseConfig) {
        match self.phases.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = config,
            None => self.phases.push((name.to_string(), config)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PhaseConfig> {
        self.phases.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PhaseConfig> {
        self.phases.iter_mut().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhaseConfig)> {
        self.phases.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Every phase except `pre_mission` and `post_mission`.
    pub fn flight_phases(&self) -> impl Iterator<Item = (&str, &PhaseConfig)> {
        self.iter().filter(|(name, _)| *name != PRE_MISSION && *name != POST_MISSION)
    }

    pub fn from_json_str(json: &str) -> BuilderResult<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut info = PhaseInfo::new();
        for (name, value) in map {
            info.insert(&name, serde_json::from_value(value)?);
        }
        Ok(info)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> BuilderResult<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn to_json_string(&self) -> BuilderResult<String> {
        let mut map = serde_json::Map::new();
        for (name, config) in &self.phases {
            map.insert(name.clone(), serde_json::to_value(config)?);
        }
        Ok(serde_json::to_string_pretty(&serde_json::Value::Object(map))?)
    }
}

fn invalid(message: String) -> BuilderError {
    BuilderError::InvalidPhaseInfo(message)
}

/// Validates aerodynamics options and the units of altitude/mach user options.
pub fn check_phase_info(info: &PhaseInfo) -> BuilderResult<()> {
    for (phase, config) in info.iter() {
        for (subsystem, options) in &config.subsystem_options {
            check_subsystem_options(phase, subsystem, options)?;
        }
        if let Some(user_options) = &config.user_options {
            for (key, option) in user_options {
                check_user_option(phase, key, option)?;
            }
        }
    }
    Ok(())
}

fn check_subsystem_options(phase: &str, subsystem: &str, options: &SubsystemOptions) -> BuilderResult<()> {
    if !options.method.uses_table() {
        return Ok(());
    }
    let aero_data = options.aero_data.as_ref().ok_or_else(|| {
        invalid(format!(
            "Subsystem {} in phase {} uses {} aerodynamics but has no aero_data.",
            subsystem, phase, options.method
        ))
    })?;

    if options.training_data {
        aero_data.axes()?;
        return Ok(());
    }

    match (&aero_data.lift, &aero_data.drag) {
        (Some(lift), Some(drag)) => {
            StructuredPolar::from_flat(aero_data.axes()?, lift.clone(), drag.clone())?;
            Ok(())
        }
        _ => Err(invalid(format!(
            "Subsystem {} in phase {} has training_data = false, so aero_data needs lift and drag.",
            subsystem, phase
        ))),
    }
}

/// Dimension required for a user option, if it is one of the checked keys.
fn expected_dimension(key: &str) -> Option<Dimension> {
    let is_quantity = key.starts_with("initial_") || key.starts_with("final_") || key.ends_with("_bounds");
    if !is_quantity {
        return None;
    }
    if key.contains("altitude") {
        Some(Dimension::Length)
    } else if key.contains("mach") {
        Some(Dimension::Dimensionless)
    } else {
        None
    }
}

fn check_user_option(phase: &str, key: &str, option: &UserOption) -> BuilderResult<()> {
    let Some(dimension) = expected_dimension(key) else {
        return Ok(());
    };
    let unit = option.unit().ok_or_else(|| {
        invalid(format!("Key {} in phase {} must be a (value, unit) pair.", key, phase))
    })?;
    match unit.parse::<Unit>() {
        Ok(parsed) if parsed.dimension() == dimension => Ok(()),
        _ => Err(invalid(format!(
            "Key {} in phase {} has an invalid unit {}.",
            key, phase, unit
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PHASE_INFO_JSON: &str = r#"{
        "pre_mission": {"include_takeoff": false, "optimize_mass": true},
        "climb": {
            "subsystem_options": {
                "core_aerodynamics": {
                    "method": "solved_alpha",
                    "aero_data": {"altitude": [0, 20000], "mach": [0.3, 0.8], "angle_of_attack": [0, 4]},
                    "training_data": true
                }
            },
            "user_options": {
                "optimize_mach": false,
                "num_segments": 5,
                "initial_mach": [0.3, "unitless"],
                "initial_altitude": [0.0, "ft"],
                "altitude_bounds": [[0.0, 34000.0], "ft"],
                "throttle_enforcement": "path_constraint",
                "duration_bounds": [[64.0, 192.0], "min"]
            }
        },
        "cruise": {
            "subsystem_options": {"core_aerodynamics": {"method": "computed"}},
            "user_options": {"initial_altitude": [32000.0, "ft"]}
        },
        "post_mission": {"include_landing": false}
    }"#;

    fn sample() -> PhaseInfo {
        PhaseInfo::from_json_str(PHASE_INFO_JSON).unwrap()
    }

    #[test]
    fn test_parse_preserves_order_and_options() {
        let info = sample();
        let names: Vec<&str> = info.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["pre_mission", "climb", "cruise", "post_mission"]);

        let flight: Vec<&str> = info.flight_phases().map(|(n, _)| n).collect();
        assert_eq!(flight, vec!["climb", "cruise"]);

        let climb = info.get("climb").unwrap();
        let aero = climb.aerodynamics().unwrap();
        assert_eq!(aero.method, AeroMethod::SolvedAlpha);
        assert!(aero.training_data);

        let user = climb.user_options.as_ref().unwrap();
        assert_eq!(user["optimize_mach"], UserOption::Flag(false));
        assert_eq!(user["num_segments"], UserOption::Integer(5));
        assert_eq!(user["altitude_bounds"], UserOption::Bounds((0.0, 34000.0), "ft".to_string()));

        assert!(check_phase_info(&info).is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_phases() {
        let info = sample();
        let json = info.to_json_string().unwrap();
        let reparsed = PhaseInfo::from_json_str(&json).unwrap();
        assert_eq!(reparsed, info);

        let pre = reparsed.get(PRE_MISSION).unwrap();
        assert_eq!(pre.options["include_takeoff"], UserOption::Flag(false));
        assert_eq!(pre.options["optimize_mass"], UserOption::Flag(true));
        assert!(json.contains("include_landing"));
    }

    #[test]
    fn test_flight_phase_without_user_options() {
        let mut info = sample();
        info.insert("descent", PhaseConfig::default());
        let flight: Vec<&str> = info.flight_phases().map(|(n, _)| n).collect();
        assert_eq!(flight, vec!["climb", "cruise", "descent"]);
    }

    #[test]
    fn test_incorrect_unit() {
        let mut info = sample();
        let climb = info.get_mut("climb").unwrap();
        climb.user_options.as_mut().unwrap().insert(
            "initial_altitude".to_string(),
            UserOption::Quantity(10.668e3, "invalid_unit".to_string()),
        );
        match check_phase_info(&info) {
            Err(BuilderError::InvalidPhaseInfo(message)) => assert_eq!(
                message,
                "Key initial_altitude in phase climb has an invalid unit invalid_unit."
            ),
            other => panic!("expected InvalidPhaseInfo, got {:?}", other),
        }
    }

    #[test_case("initial_altitude", UserOption::Number(10.668e3); "bare float altitude")]
    #[test_case("final_mach", UserOption::Quantity(0.8, "ft".to_string()); "length unit on mach")]
    #[test_case("altitude_bounds", UserOption::Bounds((0.0, 1.0), "deg".to_string()); "angle unit on altitude")]
    fn test_bad_user_options_rejected(key: &str, option: UserOption) {
        let mut info = sample();
        info.get_mut("climb")
            .unwrap()
            .user_options
            .as_mut()
            .unwrap()
            .insert(key.to_string(), option);
        assert!(matches!(check_phase_info(&info), Err(BuilderError::InvalidPhaseInfo(_))));
    }

    #[test]
    fn test_tabular_without_data_rejected() {
        let mut info = sample();
        info.get_mut("cruise").unwrap().subsystem_options.insert(
            CORE_AERODYNAMICS.to_string(),
            SubsystemOptions {
                method: AeroMethod::Tabular,
                aero_data: None,
                training_data: false,
            },
        );
        assert!(matches!(check_phase_info(&info), Err(BuilderError::InvalidPhaseInfo(_))));
    }

    #[test]
    fn test_in_phase_table_checked() {
        let mut data = AeroData::from_axes(&PolarAxes::new(vec![0.0], vec![0.3, 0.8], vec![0.0, 4.0]).unwrap());
        let options = |data: AeroData| SubsystemOptions {
            method: AeroMethod::Tabular,
            aero_data: Some(data),
            training_data: false,
        };

        // axes only
        assert!(check_subsystem_options("cruise", CORE_AERODYNAMICS, &options(data.clone())).is_err());

        data.lift = Some(vec![0.1, 0.5, 0.2]);
        data.drag = Some(vec![0.01, 0.03, 0.02, 0.04]);
        assert!(matches!(
            check_subsystem_options("cruise", CORE_AERODYNAMICS, &options(data.clone())),
            Err(BuilderError::Table(_))
        ));

        data.lift = Some(vec![0.1, 0.5, 0.2, 0.6]);
        assert!(check_subsystem_options("cruise", CORE_AERODYNAMICS, &options(data)).is_ok());
    }
}
