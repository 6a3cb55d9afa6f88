pub mod phase_info;
pub mod wiring;

pub use phase_info::{check_phase_info, AeroData, AeroMethod, PhaseConfig, PhaseInfo, SubsystemOptions, UserOption, POST_MISSION, PRE_MISSION};
pub use wiring::{Connection, MissionWiring, PhaseAero};
