//! Simulation results.

use crate::anomaly::Anomaly;
use ef_model::{Compartment, Variant};
use ef_solver::SolverStats;
use nalgebra::DVector;

/// State of every compartment at every evaluation instant.
///
/// Built once by the integrator and never mutated.
#[derive(Clone, Debug)]
pub struct Trajectory {
    variant: Variant,
    population: f64,
    times: Vec<f64>,
    states: Vec<DVector<f64>>,
    stats: SolverStats,
    anomalies: Vec<Anomaly>,
}

impl Trajectory {
    pub(crate) fn new(
        variant: Variant,
        population: f64,
        times: Vec<f64>,
        states: Vec<DVector<f64>>,
        stats: SolverStats,
        anomalies: Vec<Anomaly>,
    ) -> Self {
        Self {
            variant,
            population,
            times,
            states,
            stats,
            anomalies,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn compartments(&self) -> &'static [Compartment] {
        self.variant.compartments()
    }

    /// N of the model that produced this trajectory.
    pub fn population(&self) -> f64 {
        self.population
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<&DVector<f64>> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[DVector<f64>] {
        &self.states
    }

    /// Last sampled state.
    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.states.last()
    }

    /// Time series of one compartment, `None` if the variant lacks it.
    pub fn series(&self, compartment: Compartment) -> Option<Vec<f64>> {
        let k = self.variant.index_of(compartment)?;
        Some(self.states.iter().map(|y| y[k]).collect())
    }

    /// `(time, value)` of the first maximum of a compartment.
    pub fn peak(&self, compartment: Compartment) -> Option<(f64, f64)> {
        let k = self.variant.index_of(compartment)?;
        let mut best: Option<(f64, f64)> = None;
        for (&t, y) in self.times.iter().zip(&self.states) {
            if best.is_none_or(|(_, v)| y[k] > v) {
                best = Some((t, y[k]));
            }
        }
        best
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }
}
