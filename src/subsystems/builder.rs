use super::builder_errors::BuilderResult;
use crate::polar::PolarAxes;
use crate::units::Unit;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Output values keyed by the builder's local output names.
pub type OutputValues = BTreeMap<String, ArrayD<f64>>;

/// Tag the host dispatches mission-analysis handling on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Aerodynamics,
    Generic,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Capability::Aerodynamics => write!(f, "Aerodynamics"),
            Capability::Generic => write!(f, "Generic"),
        }
    }
}

/// An output a builder promises to produce, declared before any values exist.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDecl {
    pub name: String,
    pub shape: Vec<usize>,
    pub units: Unit,
}

/// A named scalar of the global aircraft configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub units: String,
}

/// Global configuration handed to every builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalInputs {
    values: BTreeMap<String, Quantity>,
}

impl GlobalInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: f64, units: &str) {
        self.values.insert(
            name.to_string(),
            Quantity {
                value,
                units: units.to_string(),
            },
        );
    }

    pub fn with(mut self, name: &str, value: f64, units: &str) -> Self {
        self.set(name, value, units);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.values.get(name)
    }

    pub fn value_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).map(|q| q.value).unwrap_or(default)
    }
}

pub trait SubsystemBuilder {
    fn name(&self) -> &str;

    fn capability(&self) -> Capability {
        Capability::Generic
    }

    /// Aerodynamics view of this builder, present when tagged `Aerodynamics`.
    fn as_aerodynamics(&self) -> Option<&dyn AerodynamicsSubsystemBuilder> {
        None
    }
}

/// A subsystem that supplies lift/drag polars to mission phases.
pub trait AerodynamicsSubsystemBuilder: SubsystemBuilder {
    /// Declares output names and shapes so the host can allocate buffers.
    /// Must be deterministic for a given table.
    fn build_pre_mission(&self, inputs: &GlobalInputs) -> BuilderResult<Vec<OutputDecl>>;

    /// Produces values for every declared output, with the declared shapes.
    fn compute(&self, inputs: &GlobalInputs) -> BuilderResult<OutputValues>;

    /// (local name, canonical name) pairs.
    fn mission_outputs(&self) -> Vec<(String, String)>;

    /// Breakpoints the published tables are laid out on.
    fn axes(&self) -> &PolarAxes;
}
