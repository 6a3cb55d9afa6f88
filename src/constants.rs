// Canonical variable names published to mission consumers
pub mod aircraft {
    pub mod design {
        pub const LIFT_POLAR: &str = "aircraft:design:lift_polar";
        pub const DRAG_POLAR: &str = "aircraft:design:drag_polar";
        pub const ZERO_LIFT_DRAG: &str = "aircraft:design:zero_lift_drag";
        pub const INDUCED_DRAG_FACTOR: &str = "aircraft:design:induced_drag_factor";
    }
}

pub mod dynamic {
    pub mod mission {
        pub const ALTITUDE: &str = "altitude";
        pub const MACH: &str = "mach";
        pub const ANGLE_OF_ATTACK: &str = "alpha";
    }
}

// Subsystem options key of the mission aerodynamics
pub const CORE_AERODYNAMICS: &str = "core_aerodynamics";

// Canonical data source columns
pub const COL_ALTITUDE: &str = "altitude";
pub const COL_MACH: &str = "mach";
pub const COL_ANGLE_OF_ATTACK: &str = "angle_of_attack";
pub const COL_LIFT_COEFFICIENT: &str = "lift_coefficient";
pub const COL_DRAG_COEFFICIENT: &str = "drag_coefficient";

// Local output names of the external aerodynamics adapter
pub const DRAG_TABLE: &str = "drag_table";
pub const LIFT_TABLE: &str = "lift_table";

// Units
pub const FT_PER_M: f64 = 1.0 / 0.3048;
pub const PI: f64 = std::f64::consts::PI;
