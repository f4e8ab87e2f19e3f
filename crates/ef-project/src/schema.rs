//! Scenario schema definitions.

use ef_model::{DiseaseParams, InitialState, InterventionControls, Variant};
use ef_solver::{Method, SolverOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    pub variant: Variant,
    #[serde(default)]
    pub disease: DiseaseParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<InterventionControls>,
    pub initial: InitialState,
    pub time: TimeDef,
    #[serde(default)]
    pub solver: SolverDef,
}

/// Horizon in days and the number of evenly spaced evaluation points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeDef {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    /// Falls back to the variant's usual method when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    pub max_step: f64,
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        let defaults = SolverOptions::default();
        Self {
            method: None,
            max_step: 1.0,
            rtol: defaults.rtol,
            atol: defaults.atol,
            max_steps: defaults.max_steps,
        }
    }
}

impl SolverDef {
    pub fn to_options(&self) -> SolverOptions {
        SolverOptions::default()
            .with_max_step(self.max_step)
            .with_tolerances(self.rtol, self.atol)
            .with_max_steps(self.max_steps)
    }
}

impl Scenario {
    /// Method this scenario runs with.
    pub fn method(&self) -> Method {
        self.solver
            .method
            .unwrap_or_else(|| self.variant.default_method())
    }
}
