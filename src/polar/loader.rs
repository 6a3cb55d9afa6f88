use super::table::{StructuredPolar, UnstructuredPolar};
use super::table_errors::{TableError, TableResult};
use crate::constants::*;
use crate::units::{Dimension, Unit};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Accepted header names for one canonical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub aliases: Vec<String>,
    /// Used when the header cell carries no `(unit)` suffix
    #[serde(default)]
    pub unit: Option<Unit>,
}

impl ColumnSpec {
    pub fn new(aliases: &[&str]) -> Self {
        Self {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    fn matches(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Maps data source headers onto the five canonical polar columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub altitude: ColumnSpec,
    pub mach: ColumnSpec,
    pub angle_of_attack: ColumnSpec,
    pub lift_coefficient: ColumnSpec,
    pub drag_coefficient: ColumnSpec,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            altitude: ColumnSpec::new(&[COL_ALTITUDE, "alt", "h"]),
            mach: ColumnSpec::new(&[COL_MACH, "m"]),
            angle_of_attack: ColumnSpec::new(&[COL_ANGLE_OF_ATTACK, "alpha", "aoa"]),
            lift_coefficient: ColumnSpec::new(&[COL_LIFT_COEFFICIENT, "cl"]),
            drag_coefficient: ColumnSpec::new(&[COL_DRAG_COEFFICIENT, "cd"]),
        }
    }
}

impl ColumnMap {
    fn columns(&self) -> [(&'static str, Dimension, &ColumnSpec); 5] {
        [
            (COL_ALTITUDE, Dimension::Length, &self.altitude),
            (COL_MACH, Dimension::Dimensionless, &self.mach),
            (COL_ANGLE_OF_ATTACK, Dimension::Angle, &self.angle_of_attack),
            (COL_LIFT_COEFFICIENT, Dimension::Dimensionless, &self.lift_coefficient),
            (COL_DRAG_COEFFICIENT, Dimension::Dimensionless, &self.drag_coefficient),
        ]
    }
}

/// A header cell resolved to its position and unit.
#[derive(Debug, Clone, Copy)]
struct ResolvedColumn {
    index: usize,
    unit: Unit,
}

/// Splits `Altitude (ft)` into `("Altitude", Some("ft"))`.
fn split_header(cell: &str) -> (&str, Option<&str>) {
    let cell = cell.trim();
    match (cell.rfind('('), cell.ends_with(')')) {
        (Some(open), true) => (cell[..open].trim(), Some(cell[open + 1..cell.len() - 1].trim())),
        _ => (cell, None),
    }
}

fn resolve_columns(headers: &StringRecord, map: &ColumnMap) -> TableResult<[ResolvedColumn; 5]> {
    let mut resolved = [ResolvedColumn {
        index: 0,
        unit: Unit::Unitless,
    }; 5];

    for (slot, (canonical, dimension, spec)) in map.columns().into_iter().enumerate() {
        let (index, header_unit) = headers
            .iter()
            .enumerate()
            .find_map(|(i, cell)| {
                let (name, unit) = split_header(cell);
                spec.matches(name).then_some((i, unit))
            })
            .ok_or_else(|| TableError::MissingColumn(canonical.to_string()))?;

        let unit = match header_unit {
            Some(text) => text.parse::<Unit>().map_err(|unit| TableError::UnknownUnit {
                column: canonical.to_string(),
                unit,
            })?,
            None => spec.unit.unwrap_or_else(|| Unit::engineering(dimension)),
        };
        if unit.dimension() != dimension {
            return Err(TableError::IncompatibleUnit {
                column: canonical.to_string(),
                unit: unit.to_string(),
                expected: format!("{:?}", dimension).to_lowercase(),
            });
        }

        debug!(column = canonical, index, %unit, "Resolved polar column");
        resolved[slot] = ResolvedColumn { index, unit };
    }

    Ok(resolved)
}

/// Reads scattered polar samples from CSV. Values are normalised to
/// ft / unitless / deg.
pub fn load_polar<R: Read>(reader: R, map: &ColumnMap) -> TableResult<UnstructuredPolar> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(reader);

    let columns = resolve_columns(rdr.headers()?, map)?;
    let mut data: [Vec<f64>; 5] = Default::default();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        for ((canonical, _, _), (column, values)) in
            map.columns().iter().zip(columns.iter().zip(data.iter_mut()))
        {
            let cell = record.get(column.index).unwrap_or_default();
            let value = cell.parse::<f64>().map_err(|_| TableError::InvalidValue {
                row: row + 1,
                column: canonical.to_string(),
                value: cell.to_string(),
            })?;
            values.push(column.unit.to_engineering(value));
        }
    }

    let [altitude, mach, angle_of_attack, lift, drag] = data;
    UnstructuredPolar::new(altitude, mach, angle_of_attack, lift, drag)
}

pub fn load_polar_file<P: AsRef<Path>>(path: P, map: &ColumnMap) -> TableResult<UnstructuredPolar> {
    let path = path.as_ref();
    let table = load_polar(File::open(path)?, map)?;
    info!(path = %path.display(), samples = table.len(), "Loaded polar data");
    Ok(table)
}

/// Reads a full factorial polar and regrids it.
pub fn load_structured<R: Read>(reader: R, map: &ColumnMap) -> TableResult<StructuredPolar> {
    load_polar(reader, map)?.to_structured()
}

pub fn load_structured_file<P: AsRef<Path>>(path: P, map: &ColumnMap) -> TableResult<StructuredPolar> {
    load_polar_file(path, map)?.to_structured()
}
