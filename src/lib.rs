//! External aerodynamic polar tables for mission analysis.
//!
//! A [`polar::StructuredPolar`] is loaded and validated once, handed to an
//! [`subsystems::ExternalAeroAdapter`], and published during pre-mission
//! wiring under canonical names that mission phases interpolate on.

pub mod config;
pub mod constants;
pub mod logging;
pub mod mission;
pub mod polar;
pub mod subsystems;
pub mod units;
