use super::phase_info::{check_phase_info, AeroMethod, PhaseConfig, PhaseInfo};
use crate::constants::aircraft::design::{DRAG_POLAR, LIFT_POLAR};
use crate::polar::{Extrapolation, PolarAxes, PolarInterpolator, PolarShape, StructuredPolar};
use crate::subsystems::{
    AerodynamicsSubsystemBuilder, BuilderError, BuilderResult, Capability, GlobalInputs, OutputDecl,
    SubsystemBuilder,
};
use ndarray::{Array3, ArrayD, Ix3, IxDyn};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A pre-mission output published under its canonical name.
#[derive(Debug, Clone)]
pub struct Connection {
    pub source: String,
    pub local_name: String,
    pub axes: PolarAxes,
    pub value: ArrayD<f64>,
}

/// Aerodynamics a flight phase evaluates with.
#[derive(Debug, Clone)]
pub enum PhaseAero {
    /// Host built-in aerodynamics
    Computed,
    Tabular {
        method: AeroMethod,
        interpolator: PolarInterpolator,
    },
}

impl PhaseAero {
    pub fn interpolator(&self) -> Option<&PolarInterpolator> {
        match self {
            PhaseAero::Computed => None,
            PhaseAero::Tabular { interpolator, .. } => Some(interpolator),
        }
    }
}

/// Host side of the pre-mission handshake: allocates buffers from declared
/// shapes, fills them from `compute`, and serves them by canonical name.
#[derive(Debug, Clone)]
pub struct MissionWiring {
    connections: BTreeMap<String, Connection>,
    extrapolation: Extrapolation,
}

impl Default for MissionWiring {
    fn default() -> Self {
        Self {
            connections: BTreeMap::new(),
            extrapolation: Extrapolation::Linear,
        }
    }
}

impl MissionWiring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Runs the pre-mission phase for every builder in order.
    pub fn pre_mission(builders: &[&dyn SubsystemBuilder], inputs: &GlobalInputs) -> BuilderResult<Self> {
        let mut wiring = Self::new();
        wiring.add_pre_mission(builders, inputs)?;
        Ok(wiring)
    }

    pub fn add_pre_mission(&mut self, builders: &[&dyn SubsystemBuilder], inputs: &GlobalInputs) -> BuilderResult<()> {
        for builder in builders {
            match (builder.capability(), builder.as_aerodynamics()) {
                (Capability::Aerodynamics, Some(aero)) => self.wire_aerodynamics(aero, inputs)?,
                (Capability::Aerodynamics, None) => {
                    return Err(BuilderError::violation(
                        builder.name(),
                        "*",
                        "tagged Aerodynamics but exposes no aerodynamics interface",
                    ))
                }
                (capability, _) => {
                    debug!(builder = builder.name(), %capability, "No mission aerodynamics handling")
                }
            }
        }
        Ok(())
    }

    fn wire_aerodynamics(&mut self, builder: &dyn AerodynamicsSubsystemBuilder, inputs: &GlobalInputs) -> BuilderResult<()> {
        let name = builder.name();
        let decls = builder.build_pre_mission(inputs)?;
        let aliases: BTreeMap<String, String> = builder.mission_outputs().into_iter().collect();

        // Resolve canonical names and allocate before any values exist
        let mut buffers: BTreeMap<String, (OutputDecl, String, ArrayD<f64>)> = BTreeMap::new();
        for decl in decls {
            let canonical = aliases
                .get(&decl.name)
                .ok_or_else(|| BuilderError::violation(name, &decl.name, "declared output has no canonical name"))?
                .clone();
            if self.connections.contains_key(&canonical) || buffers.values().any(|(_, c, _)| *c == canonical) {
                return Err(BuilderError::violation(
                    name,
                    &decl.name,
                    format!("{} is already published", canonical),
                ));
            }
            let buffer = ArrayD::zeros(IxDyn(&decl.shape));
            debug!(builder = name, output = %decl.name, %canonical, shape = ?decl.shape, "Allocated output");
            buffers.insert(decl.name.clone(), (decl, canonical, buffer));
        }

        let mut produced = builder.compute(inputs)?;
        for (local, (decl, _, buffer)) in buffers.iter_mut() {
            let value = produced
                .remove(local)
                .ok_or_else(|| BuilderError::violation(name, local, "declared output was not produced"))?;
            if value.shape() != decl.shape.as_slice() {
                return Err(BuilderError::violation(
                    name,
                    local,
                    format!(
                        "declared shape {}, produced {}",
                        PolarShape::new(decl.shape.clone()),
                        PolarShape::new(value.shape().to_vec())
                    ),
                ));
            }
            buffer.assign(&value);
        }
        if let Some(extra) = produced.keys().next() {
            return Err(BuilderError::violation(name, extra, "produced output was never declared"));
        }

        let axes = builder.axes();
        for (local, (_, canonical, value)) in buffers {
            info!(builder = name, output = %local, %canonical, shape = ?value.shape(), "Published pre-mission output");
            self.connections.insert(
                canonical,
                Connection {
                    source: name.to_string(),
                    local_name: local,
                    axes: axes.clone(),
                    value,
                },
            );
        }
        Ok(())
    }

    pub fn connection(&self, canonical: &str) -> Option<&Connection> {
        self.connections.get(canonical)
    }

    pub fn value(&self, canonical: &str) -> Option<&ArrayD<f64>> {
        self.connection(canonical).map(|c| &c.value)
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(|k| k.as_str())
    }

    /// Resolves the polar one flight phase interpolates on.
    pub fn resolve_phase(&self, phase: &str, config: &PhaseConfig) -> BuilderResult<PhaseAero> {
        let Some(options) = config.aerodynamics() else {
            return Ok(PhaseAero::Computed);
        };
        if !options.method.uses_table() {
            return Ok(PhaseAero::Computed);
        }

        let aero_data = options.aero_data.as_ref().ok_or_else(|| {
            BuilderError::InvalidPhaseInfo(format!("phase {} has no aero_data", phase))
        })?;
        let axes = aero_data.axes()?;

        let table = if options.training_data {
            if options.method != AeroMethod::SolvedAlpha {
                debug!(phase, method = %options.method, "training_data with a non solved_alpha method");
            }
            StructuredPolar::from_arrays(
                axes.clone(),
                self.connected_table(phase, LIFT_POLAR, &axes)?,
                self.connected_table(phase, DRAG_POLAR, &axes)?,
            )?
        } else {
            match (&aero_data.lift, &aero_data.drag) {
                (Some(lift), Some(drag)) => StructuredPolar::from_flat(axes, lift.clone(), drag.clone())?,
                _ => {
                    return Err(BuilderError::InvalidPhaseInfo(format!(
                        "phase {} has training_data = false but no coefficients in aero_data",
                        phase
                    )))
                }
            }
        };

        info!(phase, method = %options.method, shape = %table.shape(), "Phase polar resolved");
        Ok(PhaseAero::Tabular {
            method: options.method,
            interpolator: PolarInterpolator::with_extrapolation(table, self.extrapolation),
        })
    }

    /// Checks the phase info and resolves every flight phase in order.
    pub fn resolve_mission(&self, info: &PhaseInfo) -> BuilderResult<Vec<(String, PhaseAero)>> {
        check_phase_info(info)?;
        info.flight_phases()
            .map(|(phase, config)| -> BuilderResult<(String, PhaseAero)> {
                Ok((phase.to_string(), self.resolve_phase(phase, config)?))
            })
            .collect()
    }

    fn connected_table(&self, phase: &str, canonical: &str, axes: &PolarAxes) -> BuilderResult<Array3<f64>> {
        let connection = self
            .connection(canonical)
            .ok_or_else(|| BuilderError::MissingConnection(canonical.to_string()))?;

        if connection.axes != *axes {
            return Err(BuilderError::violation(
                &connection.source,
                canonical,
                format!("phase {} aero_data breakpoints differ from the published table", phase),
            ));
        }
        connection
            .value
            .clone()
            .into_dimensionality::<Ix3>()
            .map_err(|e| BuilderError::violation(&connection.source, canonical, e.to_string()))
    }
}
