use crate::constants::{FT_PER_M, PI};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical dimension of a tagged quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Length,
    Angle,
    Dimensionless,
}

/// Units a polar data source may be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Feet,
    Meters,
    Degrees,
    Radians,
    Unitless,
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Feet | Unit::Meters => Dimension::Length,
            Unit::Degrees | Unit::Radians => Dimension::Angle,
            Unit::Unitless => Dimension::Dimensionless,
        }
    }

    /// Engineering unit values of this dimension are normalised to.
    pub fn engineering(dimension: Dimension) -> Unit {
        match dimension {
            Dimension::Length => Unit::Feet,
            Dimension::Angle => Unit::Degrees,
            Dimension::Dimensionless => Unit::Unitless,
        }
    }

    /// Converts `value` from this unit into the engineering unit of its dimension.
    pub fn to_engineering(&self, value: f64) -> f64 {
        match self {
            Unit::Meters => value * FT_PER_M,
            Unit::Radians => value * 180.0 / PI,
            Unit::Feet | Unit::Degrees | Unit::Unitless => value,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Feet => "ft",
            Unit::Meters => "m",
            Unit::Degrees => "deg",
            Unit::Radians => "rad",
            Unit::Unitless => "unitless",
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ft" | "feet" => Ok(Unit::Feet),
            "m" | "meter" | "meters" => Ok(Unit::Meters),
            "deg" | "degree" | "degrees" => Ok(Unit::Degrees),
            "rad" | "radian" | "radians" => Ok(Unit::Radians),
            "" | "unitless" | "none" | "-" => Ok(Unit::Unitless),
            _ => Err(s.trim().to_string()),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol().to_string()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test_case(Unit::Meters, 3048.0, 10_000.0; "meters to feet")]
    #[test_case(Unit::Feet, 10_000.0, 10_000.0; "feet unchanged")]
    #[test_case(Unit::Radians, PI / 2.0, 90.0; "radians to degrees")]
    #[test_case(Unit::Unitless, 0.8, 0.8; "unitless unchanged")]
    fn test_to_engineering(unit: Unit, value: f64, expected: f64) {
        assert_abs_diff_eq!(unit.to_engineering(value), expected, epsilon = 1e-9);
    }

    #[test_case("ft" => Ok(Unit::Feet))]
    #[test_case(" DEG " => Ok(Unit::Degrees))]
    #[test_case("" => Ok(Unit::Unitless))]
    #[test_case("furlong" => Err("furlong".to_string()))]
    fn test_parse(s: &str) -> Result<Unit, String> {
        s.parse()
    }
}
