//! Independent runs fanned out across threads.

use crate::error::{SimError, SimResult};
use crate::grid::TimeGrid;
use crate::sim::{SimOptions, integrate};
use crate::trajectory::Trajectory;
use ef_model::{Control, InitialState, ModelVariant, SeirModel};
use rayon::prelude::*;

/// One self-contained simulation of a sweep.
#[derive(Clone, Debug)]
pub struct SweepCase {
    pub label: String,
    pub model: SeirModel,
    pub initial: InitialState,
    pub grid: TimeGrid,
    pub options: SimOptions,
}

impl SweepCase {
    pub fn run(&self) -> SimResult<Trajectory> {
        integrate(&self.model, &self.initial, &self.grid, &self.options)
    }
}

/// Run every case in parallel. Results come back in input order.
pub fn run_sweep(cases: &[SweepCase]) -> Vec<SimResult<Trajectory>> {
    tracing::debug!(cases = cases.len(), "running sweep");
    cases.par_iter().map(SweepCase::run).collect()
}

/// Cases varying one intervention coefficient of a controlled base case.
pub fn control_sweep(base: &SweepCase, control: Control, values: &[f64]) -> SimResult<Vec<SweepCase>> {
    let Some(controls) = base.model.model_variant().controls().copied() else {
        return Err(SimError::config(format!(
            "sweeping {control} needs a controlled model, got {}",
            base.model.variant()
        )));
    };
    values
        .iter()
        .map(|&value| -> SimResult<SweepCase> {
            let variant = ModelVariant::Controlled(controls.with(control, value));
            Ok(SweepCase {
                label: format!("{control}={value}"),
                model: SeirModel::new(variant, *base.model.rates())?,
                initial: base.initial,
                grid: base.grid.clone(),
                options: base.options.clone(),
            })
        })
        .collect()
}
