use super::table_errors::{TableError, TableResult};
use crate::units::Dimension;
use std::fmt;

/// Independent variables of a polar table, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Axis {
    Altitude,
    Mach,
    AngleOfAttack,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Altitude => crate::constants::COL_ALTITUDE,
            Axis::Mach => crate::constants::COL_MACH,
            Axis::AngleOfAttack => crate::constants::COL_ANGLE_OF_ATTACK,
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Axis::Altitude => Dimension::Length,
            Axis::Mach => Dimension::Dimensionless,
            Axis::AngleOfAttack => Dimension::Angle,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Checks that `values` is non-empty, finite and strictly ascending.
pub fn check_axis(axis: Axis, values: &[f64]) -> TableResult<()> {
    if values.is_empty() {
        return Err(TableError::EmptyAxis { axis });
    }
    check_finite(axis.name(), values)?;

    for (i, pair) in values.windows(2).enumerate() {
        if pair[0] >= pair[1] {
            return Err(TableError::UnorderedAxis {
                axis,
                index: i + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }
    Ok(())
}

pub(crate) fn check_finite(what: &str, values: &[f64]) -> TableResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(TableError::NonFiniteValue {
            what: what.to_string(),
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
