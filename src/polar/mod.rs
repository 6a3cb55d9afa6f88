pub mod axis;
pub mod interpolate;
pub mod loader;
pub mod table;
pub mod table_errors;

pub use axis::Axis;
pub use interpolate::{Extrapolation, PolarInterpolator, PolarPoint};
pub use loader::{load_polar, load_polar_file, load_structured, load_structured_file, ColumnMap, ColumnSpec};
pub use table::{Layout, PolarAxes, PolarShape, PolarTable, StructuredPolar, UnstructuredPolar};
pub use table_errors::{TableError, TableResult};
