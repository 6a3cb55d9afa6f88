pub mod builder;
pub mod builder_errors;
pub mod external_aero;

pub use builder::{
    AerodynamicsSubsystemBuilder, Capability, GlobalInputs, OutputDecl, OutputValues, Quantity,
    SubsystemBuilder,
};
pub use builder_errors::{BuilderError, BuilderResult};
pub use external_aero::{DragPolarModel, ExternalAeroAdapter, PolarGenerator, PolarPair, StaticPolar};
