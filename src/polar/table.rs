use super::axis::{check_axis, check_finite, Axis};
use super::table_errors::{TableError, TableResult};
use crate::constants::{COL_DRAG_COEFFICIENT, COL_LIFT_COEFFICIENT};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Validated breakpoints of a structured polar grid.
///
/// Axis order is fixed as altitude (ft) -> mach -> angle of attack (deg) and
/// every axis is strictly ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxes")]
pub struct PolarAxes {
    altitude: Vec<f64>,
    mach: Vec<f64>,
    angle_of_attack: Vec<f64>,
}

#[derive(Deserialize)]
struct RawAxes {
    altitude: Vec<f64>,
    mach: Vec<f64>,
    angle_of_attack: Vec<f64>,
}

impl TryFrom<RawAxes> for PolarAxes {
    type Error = TableError;

    fn try_from(raw: RawAxes) -> Result<Self, Self::Error> {
        PolarAxes::new(raw.altitude, raw.mach, raw.angle_of_attack)
    }
}

impl PolarAxes {
    pub fn new(altitude: Vec<f64>, mach: Vec<f64>, angle_of_attack: Vec<f64>) -> TableResult<Self> {
        check_axis(Axis::Altitude, &altitude)?;
        check_axis(Axis::Mach, &mach)?;
        check_axis(Axis::AngleOfAttack, &angle_of_attack)?;

        Ok(Self {
            altitude,
            mach,
            angle_of_attack,
        })
    }

    pub fn altitude(&self) -> &[f64] {
        &self.altitude
    }

    pub fn mach(&self) -> &[f64] {
        &self.mach
    }

    pub fn angle_of_attack(&self) -> &[f64] {
        &self.angle_of_attack
    }

    pub fn values(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Altitude => &self.altitude,
            Axis::Mach => &self.mach,
            Axis::AngleOfAttack => &self.angle_of_attack,
        }
    }

    /// (n_altitude, n_mach, n_angle_of_attack)
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.altitude.len(), self.mach.len(), self.angle_of_attack.len())
    }

    /// Number of cells of the full factorial grid.
    pub fn grid_len(&self) -> usize {
        let (a, m, k) = self.dims();
        a * m * k
    }

    pub fn shape(&self) -> PolarShape {
        let (a, m, k) = self.dims();
        PolarShape::new(vec![a, m, k])
    }
}

/// Dimension list of a table as reported to the host for buffer allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolarShape {
    dims: Vec<usize>,
}

impl PolarShape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<PolarShape> for Vec<usize> {
    fn from(shape: PolarShape) -> Self {
        shape.dims
    }
}

impl fmt::Display for PolarShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "({})", dims.join(", "))
    }
}

/// Full factorial lift/drag table on a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPolar {
    axes: PolarAxes,
    lift: Array3<f64>,
    drag: Array3<f64>,
}

impl StructuredPolar {
    /// Builds a table from flat coefficient samples in row-major order
    /// (altitude slowest, angle of attack fastest).
    pub fn new(
        altitude: Vec<f64>,
        mach: Vec<f64>,
        angle_of_attack: Vec<f64>,
        lift: Vec<f64>,
        drag: Vec<f64>,
    ) -> TableResult<Self> {
        let axes = PolarAxes::new(altitude, mach, angle_of_attack)?;
        Self::from_flat(axes, lift, drag)
    }

    pub fn from_flat(axes: PolarAxes, lift: Vec<f64>, drag: Vec<f64>) -> TableResult<Self> {
        let lift = reshape(&axes, lift, COL_LIFT_COEFFICIENT)?;
        let drag = reshape(&axes, drag, COL_DRAG_COEFFICIENT)?;
        Self::from_arrays(axes, lift, drag)
    }

    /// Builds a table from coefficient arrays that are already shaped
    /// `(n_altitude, n_mach, n_angle_of_attack)`.
    pub fn from_arrays(axes: PolarAxes, lift: Array3<f64>, drag: Array3<f64>) -> TableResult<Self> {
        check_grid(&axes, &lift, COL_LIFT_COEFFICIENT)?;
        check_grid(&axes, &drag, COL_DRAG_COEFFICIENT)?;

        debug!(shape = %axes.shape(), "Structured polar validated");
        Ok(Self { axes, lift, drag })
    }

    pub fn axes(&self) -> &PolarAxes {
        &self.axes
    }

    pub fn lift(&self) -> &Array3<f64> {
        &self.lift
    }

    pub fn drag(&self) -> &Array3<f64> {
        &self.drag
    }

    pub fn shape(&self) -> PolarShape {
        self.axes.shape()
    }

    pub fn into_parts(self) -> (PolarAxes, Array3<f64>, Array3<f64>) {
        (self.axes, self.lift, self.drag)
    }
}

fn reshape(axes: &PolarAxes, values: Vec<f64>, what: &str) -> TableResult<Array3<f64>> {
    let actual = values.len();
    Array3::from_shape_vec(axes.dims(), values).map_err(|_| TableError::ShapeMismatch {
        what: what.to_string(),
        expected: axes.grid_len(),
        actual,
    })
}

fn check_grid(axes: &PolarAxes, values: &Array3<f64>, what: &str) -> TableResult<()> {
    let (a, m, k) = axes.dims();
    if values.shape() != [a, m, k] {
        return Err(TableError::ShapeMismatch {
            what: format!("{} {:?} against grid ({}, {}, {})", what, values.shape(), a, m, k),
            expected: axes.grid_len(),
            actual: values.len(),
        });
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(TableError::NonFiniteValue {
            what: what.to_string(),
            index,
            value: values.iter().nth(index).copied().unwrap_or(f64::NAN),
        }),
        None => Ok(()),
    }
}

/// Scattered polar samples: five parallel arrays, one entry per point.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstructuredPolar {
    altitude: Vec<f64>,
    mach: Vec<f64>,
    angle_of_attack: Vec<f64>,
    lift: Vec<f64>,
    drag: Vec<f64>,
}

impl UnstructuredPolar {
    pub fn new(
        altitude: Vec<f64>,
        mach: Vec<f64>,
        angle_of_attack: Vec<f64>,
        lift: Vec<f64>,
        drag: Vec<f64>,
    ) -> TableResult<Self> {
        let expected = altitude.len();
        let columns: [(&str, &[f64]); 5] = [
            (Axis::Altitude.name(), altitude.as_slice()),
            (Axis::Mach.name(), mach.as_slice()),
            (Axis::AngleOfAttack.name(), angle_of_attack.as_slice()),
            (COL_LIFT_COEFFICIENT, lift.as_slice()),
            (COL_DRAG_COEFFICIENT, drag.as_slice()),
        ];
        for (name, values) in columns {
            if values.len() != expected {
                return Err(TableError::ShapeMismatch {
                    what: name.to_string(),
                    expected,
                    actual: values.len(),
                });
            }
            check_finite(name, values)?;
        }

        Ok(Self {
            altitude,
            mach,
            angle_of_attack,
            lift,
            drag,
        })
    }

    pub fn len(&self) -> usize {
        self.altitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitude.is_empty()
    }

    pub fn altitude(&self) -> &[f64] {
        &self.altitude
    }

    pub fn mach(&self) -> &[f64] {
        &self.mach
    }

    pub fn angle_of_attack(&self) -> &[f64] {
        &self.angle_of_attack
    }

    pub fn lift(&self) -> &[f64] {
        &self.lift
    }

    pub fn drag(&self) -> &[f64] {
        &self.drag
    }

    pub fn shape(&self) -> PolarShape {
        PolarShape::new(vec![self.len()])
    }

    /// Recovers the regular grid behind a full factorial sample set given in
    /// any row order.
    pub fn to_structured(&self) -> TableResult<StructuredPolar> {
        let axes = PolarAxes::new(
            distinct_sorted(&self.altitude),
            distinct_sorted(&self.mach),
            distinct_sorted(&self.angle_of_attack),
        )?;
        let cells = axes.grid_len();
        if self.len() != cells {
            return Err(TableError::ShapeMismatch {
                what: "structured grid".to_string(),
                expected: cells,
                actual: self.len(),
            });
        }

        let dims = axes.dims();
        let mut lift = Array3::<f64>::zeros(dims);
        let mut drag = Array3::<f64>::zeros(dims);
        let mut filled = Array3::from_elem(dims, false);

        for n in 0..self.len() {
            let cell = match (
                grid_index(axes.altitude(), self.altitude[n]),
                grid_index(axes.mach(), self.mach[n]),
                grid_index(axes.angle_of_attack(), self.angle_of_attack[n]),
            ) {
                (Some(i), Some(j), Some(l)) => [i, j, l],
                _ => {
                    return Err(TableError::ShapeMismatch {
                        what: format!("grid point of sample {}", n),
                        expected: cells,
                        actual: self.len(),
                    })
                }
            };
            filled[cell] = true;
            lift[cell] = self.lift[n];
            drag[cell] = self.drag[n];
        }

        // Duplicated points leave other cells empty
        let distinct = filled.iter().filter(|f| **f).count();
        if distinct != cells {
            return Err(TableError::ShapeMismatch {
                what: "distinct grid points".to_string(),
                expected: cells,
                actual: distinct,
            });
        }

        StructuredPolar::from_arrays(axes, lift, drag)
    }
}

fn distinct_sorted(values: &[f64]) -> Vec<f64> {
    // `+ 0.0` folds -0.0 into 0.0 so both land on one breakpoint
    let mut sorted: Vec<f64> = values.iter().map(|v| v + 0.0).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup_by(|a, b| a.total_cmp(b).is_eq());
    sorted
}

fn grid_index(breakpoints: &[f64], value: f64) -> Option<usize> {
    let value = value + 0.0;
    breakpoints.binary_search_by(|b| b.total_cmp(&value)).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Structured,
    Unstructured,
}

/// A polar in either supported layout.
#[derive(Debug, Clone, PartialEq)]
pub enum PolarTable {
    Structured(StructuredPolar),
    Unstructured(UnstructuredPolar),
}

impl PolarTable {
    pub fn layout(&self) -> Layout {
        match self {
            PolarTable::Structured(_) => Layout::Structured,
            PolarTable::Unstructured(_) => Layout::Unstructured,
        }
    }

    pub fn shape(&self) -> PolarShape {
        match self {
            PolarTable::Structured(table) => table.shape(),
            PolarTable::Unstructured(table) => table.shape(),
        }
    }

    pub fn len(&self) -> usize {
        self.shape().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Structured view of the table, regridding scattered samples if needed.
    pub fn to_structured(&self) -> TableResult<StructuredPolar> {
        match self {
            PolarTable::Structured(table) => Ok(table.clone()),
            PolarTable::Unstructured(table) => table.to_structured(),
        }
    }
}

impl From<StructuredPolar> for PolarTable {
    fn from(table: StructuredPolar) -> Self {
        PolarTable::Structured(table)
    }
}

impl From<UnstructuredPolar> for PolarTable {
    fn from(table: UnstructuredPolar) -> Self {
        PolarTable::Unstructured(table)
    }
}
