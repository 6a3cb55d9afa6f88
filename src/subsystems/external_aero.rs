use super::builder::{
    AerodynamicsSubsystemBuilder, Capability, GlobalInputs, OutputDecl, OutputValues, SubsystemBuilder,
};
use super::builder_errors::{BuilderError, BuilderResult};
use crate::constants::aircraft::design::{DRAG_POLAR, INDUCED_DRAG_FACTOR, LIFT_POLAR, ZERO_LIFT_DRAG};
use crate::constants::{DRAG_TABLE, LIFT_TABLE};
use crate::polar::{PolarAxes, PolarShape, StructuredPolar};
use crate::units::Unit;
use ndarray::Array3;
use tracing::debug;

/// Lift and drag coefficient arrays on one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarPair {
    pub lift: Array3<f64>,
    pub drag: Array3<f64>,
}

/// Source of the table values an adapter publishes.
pub trait PolarGenerator {
    fn generate(&self, axes: &PolarAxes, inputs: &GlobalInputs) -> BuilderResult<PolarPair>;
}

impl<F> PolarGenerator for F
where
    F: Fn(&PolarAxes, &GlobalInputs) -> BuilderResult<PolarPair>,
{
    fn generate(&self, axes: &PolarAxes, inputs: &GlobalInputs) -> BuilderResult<PolarPair> {
        self(axes, inputs)
    }
}

/// Pass-through of a pre-loaded table.
#[derive(Debug, Clone)]
pub struct StaticPolar {
    values: PolarPair,
}

impl PolarGenerator for StaticPolar {
    fn generate(&self, _axes: &PolarAxes, _inputs: &GlobalInputs) -> BuilderResult<PolarPair> {
        Ok(self.values.clone())
    }
}

/// Parabolic drag polar with Prandtl-Glauert lift correction.
///
/// `CL = cl_alpha (alpha - alpha_zero_lift) / sqrt(1 - M^2)`,
/// `CD = CD0 + k CL^2`. CD0 and k may be overridden through
/// [`GlobalInputs`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPolarModel {
    pub cl_alpha: f64,        // per deg
    pub alpha_zero_lift: f64, // deg
    pub cd0: f64,
    pub induced_factor: f64,
}

impl Default for DragPolarModel {
    fn default() -> Self {
        Self {
            cl_alpha: 0.1,
            alpha_zero_lift: -2.0,
            cd0: 0.022,
            induced_factor: 0.045,
        }
    }
}

const MAX_CORRECTED_MACH: f64 = 0.95;

impl PolarGenerator for DragPolarModel {
    fn generate(&self, axes: &PolarAxes, inputs: &GlobalInputs) -> BuilderResult<PolarPair> {
        let cd0 = inputs.value_or(ZERO_LIFT_DRAG, self.cd0);
        let k = inputs.value_or(INDUCED_DRAG_FACTOR, self.induced_factor);

        let mut lift = Array3::zeros(axes.dims());
        let mut drag = Array3::zeros(axes.dims());
        for (j, mach) in axes.mach().iter().enumerate() {
            let beta = (1.0 - mach.min(MAX_CORRECTED_MACH).powi(2)).sqrt();
            for (l, alpha) in axes.angle_of_attack().iter().enumerate() {
                let cl = self.cl_alpha * (alpha - self.alpha_zero_lift) / beta;
                for i in 0..axes.altitude().len() {
                    lift[[i, j, l]] = cl;
                    drag[[i, j, l]] = cd0 + k * cl * cl;
                }
            }
        }
        Ok(PolarPair { lift, drag })
    }
}

/// Aerodynamics subsystem publishing an externally supplied polar.
pub struct ExternalAeroAdapter<G: PolarGenerator = StaticPolar> {
    name: String,
    axes: PolarAxes,
    generator: G,
}

impl ExternalAeroAdapter<StaticPolar> {
    pub fn new(name: &str, table: StructuredPolar) -> Self {
        let (axes, lift, drag) = table.into_parts();
        Self::with_generator(
            name,
            axes,
            StaticPolar {
                values: PolarPair { lift, drag },
            },
        )
    }
}

impl<G: PolarGenerator> ExternalAeroAdapter<G> {
    pub fn with_generator(name: &str, axes: PolarAxes, generator: G) -> Self {
        Self {
            name: name.to_string(),
            axes,
            generator,
        }
    }

    pub fn output_shape(&self) -> PolarShape {
        self.axes.shape()
    }

    fn check_shape(&self, output: &str, values: &Array3<f64>) -> BuilderResult<()> {
        let declared = self.output_shape();
        if values.shape() != declared.dims() {
            let produced = PolarShape::new(values.shape().to_vec());
            return Err(BuilderError::violation(
                &self.name,
                output,
                format!("declared shape {}, produced {}", declared, produced),
            ));
        }
        Ok(())
    }
}

impl<G: PolarGenerator> SubsystemBuilder for ExternalAeroAdapter<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        Capability::Aerodynamics
    }

    fn as_aerodynamics(&self) -> Option<&dyn AerodynamicsSubsystemBuilder> {
        Some(self)
    }
}

impl<G: PolarGenerator> AerodynamicsSubsystemBuilder for ExternalAeroAdapter<G> {
    fn build_pre_mission(&self, _inputs: &GlobalInputs) -> BuilderResult<Vec<OutputDecl>> {
        let shape: Vec<usize> = self.output_shape().into();
        debug!(builder = %self.name, shape = ?shape, "Declaring polar outputs");

        Ok([DRAG_TABLE, LIFT_TABLE]
            .iter()
            .map(|name| OutputDecl {
                name: name.to_string(),
                shape: shape.clone(),
                units: Unit::Unitless,
            })
            .collect())
    }

    fn compute(&self, inputs: &GlobalInputs) -> BuilderResult<OutputValues> {
        let PolarPair { lift, drag } = self.generator.generate(&self.axes, inputs)?;
        self.check_shape(DRAG_TABLE, &drag)?;
        self.check_shape(LIFT_TABLE, &lift)?;

        let mut outputs = OutputValues::new();
        outputs.insert(DRAG_TABLE.to_string(), drag.into_dyn());
        outputs.insert(LIFT_TABLE.to_string(), lift.into_dyn());
        Ok(outputs)
    }

    fn mission_outputs(&self) -> Vec<(String, String)> {
        vec![
            (DRAG_TABLE.to_string(), DRAG_POLAR.to_string()),
            (LIFT_TABLE.to_string(), LIFT_POLAR.to_string()),
        ]
    }

    fn axes(&self) -> &PolarAxes {
        &self.axes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Ix3;

    fn scenario_a() -> StructuredPolar {
        let lift: Vec<f64> = (0..36).map(|i| 0.1 + i as f64 * 0.02).collect();
        let drag: Vec<f64> = (0..36).map(|i| 0.02 + i as f64 * 0.001).collect();
        StructuredPolar::new(
            vec![0.0, 10_000.0, 20_000.0],
            vec![0.3, 0.6, 0.8],
            vec![-2.0, 0.0, 2.0, 4.0],
            lift,
            drag,
        )
        .unwrap()
    }

    #[test]
    fn test_declared_shape_matches_computed() {
        let table = scenario_a();
        let adapter = ExternalAeroAdapter::new("external_aero", table.clone());
        let inputs = GlobalInputs::new();

        let decls = adapter.build_pre_mission(&inputs).unwrap();
        assert_eq!(decls.len(), 2);
        for decl in &decls {
            assert_eq!(decl.shape, vec![3, 3, 4]);
        }

        let outputs = adapter.compute(&inputs).unwrap();
        assert_eq!(outputs[LIFT_TABLE].shape(), &[3, 3, 4]);
        assert_eq!(outputs[DRAG_TABLE].shape(), &[3, 3, 4]);
        assert_eq!(outputs[LIFT_TABLE], table.lift().clone().into_dyn());
        assert_eq!(outputs[DRAG_TABLE], table.drag().clone().into_dyn());
    }

    #[test]
    fn test_declaration_is_deterministic() {
        let adapter = ExternalAeroAdapter::new("external_aero", scenario_a());
        let inputs = GlobalInputs::new().with("aircraft:wing:area", 1370.0, "ft**2");
        assert_eq!(
            adapter.build_pre_mission(&inputs).unwrap(),
            adapter.build_pre_mission(&GlobalInputs::new()).unwrap()
        );
    }

    #[test]
    fn test_mission_outputs_use_canonical_names() {
        let adapter = ExternalAeroAdapter::new("external_aero", scenario_a());
        assert_eq!(adapter.capability(), Capability::Aerodynamics);
        assert!(adapter.as_aerodynamics().is_some());
        assert_eq!(
            adapter.mission_outputs(),
            vec![
                (DRAG_TABLE.to_string(), DRAG_POLAR.to_string()),
                (LIFT_TABLE.to_string(), LIFT_POLAR.to_string()),
            ]
        );
    }

    #[test]
    fn test_generator_with_wrong_shape_is_rejected() {
        let axes = scenario_a().axes().clone();
        let adapter = ExternalAeroAdapter::with_generator(
            "widened",
            axes,
            |_: &PolarAxes, _: &GlobalInputs| -> BuilderResult<PolarPair> {
                Ok(PolarPair {
                    lift: Array3::zeros((3, 3, 5)),
                    drag: Array3::zeros((3, 3, 5)),
                })
            },
        );
        match adapter.compute(&GlobalInputs::new()) {
            Err(BuilderError::ContractViolation { builder, detail, .. }) => {
                assert_eq!(builder, "widened");
                assert!(detail.contains("(3, 3, 4)"));
                assert!(detail.contains("(3, 3, 5)"));
            }
            other => panic!("expected ContractViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_drag_polar_model_reads_inputs() {
        let axes = scenario_a().axes().clone();
        let adapter = ExternalAeroAdapter::with_generator("parabolic", axes, DragPolarModel::default());
        let inputs = GlobalInputs::new().with(ZERO_LIFT_DRAG, 0.03, "unitless");
        let outputs = adapter.compute(&inputs).unwrap();
        let lift = outputs[LIFT_TABLE].view().into_dimensionality::<Ix3>().unwrap();
        let drag = outputs[DRAG_TABLE].view().into_dimensionality::<Ix3>().unwrap();

        // alpha = -2 deg is zero lift, so CD = CD0 at every altitude and mach
        assert_abs_diff_eq!(lift[[1, 2, 0]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(drag[[2, 1, 0]], 0.03, epsilon = 1e-12);

        let beta = (1.0_f64 - 0.3 * 0.3).sqrt();
        let cl = 0.1 * 6.0 / beta;
        assert_abs_diff_eq!(lift[[0, 0, 3]], cl, epsilon = 1e-12);
        assert_abs_diff_eq!(drag[[0, 0, 3]], 0.03 + 0.045 * cl * cl, epsilon = 1e-12);
    }
}
