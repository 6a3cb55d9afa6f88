use super::axis::Axis;
use std::io;
use thiserror::Error;

pub type TableResult<T> = Result<T, TableError>;

/// Errors raised while loading or validating a polar table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("shape mismatch for {what}: expected {expected} samples, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("{axis} axis is not strictly ascending at index {index} ({previous} -> {value})")]
    UnorderedAxis {
        axis: Axis,
        index: usize,
        previous: f64,
        value: f64,
    },

    #[error("{axis} axis is empty")]
    EmptyAxis { axis: Axis },

    #[error("non-finite value {value} in {what} at index {index}")]
    NonFiniteValue {
        what: String,
        index: usize,
        value: f64,
    },

    #[error("{axis} = {value} is outside the table range [{min}, {max}]")]
    OutOfBounds {
        axis: Axis,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("data source has no column for {0}")]
    MissingColumn(String),

    #[error("column {column} has unknown unit '{unit}'")]
    UnknownUnit { column: String, unit: String },

    #[error("column {column} is tagged '{unit}', which is not a valid unit for {expected}")]
    IncompatibleUnit {
        column: String,
        unit: String,
        expected: String,
    },

    #[error("invalid value '{value}' in column {column} at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
