//! ef-model: compartmental epidemic model definitions.
//!
//! Contains:
//! - compartment (labels + per-variant ordering)
//! - params (user-facing disease parameters and the derived rates)
//! - controls (intervention coefficients and the transmission factor)
//! - state (integer initial populations)
//! - model (the three SEIR variants as an [`ef_solver::OdeSystem`])

pub mod compartment;
pub mod controls;
pub mod error;
pub mod model;
pub mod params;
pub mod state;

pub use compartment::Compartment;
pub use controls::{Control, InterventionControls};
pub use error::{ModelError, ModelResult};
pub use model::{ModelVariant, SeirModel, Variant};
pub use params::{DiseaseParams, Rates};
pub use state::InitialState;
