//! Initial compartment populations.

use crate::compartment::Compartment;
use crate::error::{ModelError, ModelResult};
use crate::model::Variant;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Whole-person counts at t0. Compartments absent from a variant must be zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialState {
    pub susceptible: u64,
    pub exposed: u64,
    pub infectious: u64,
    pub recovered: u64,
    pub asymptomatic: u64,
    pub hospitalized: u64,
    pub deceased: u64,
}

impl InitialState {
    pub fn get(&self, compartment: Compartment) -> u64 {
        match compartment {
            Compartment::Susceptible => self.susceptible,
            Compartment::Exposed => self.exposed,
            Compartment::Infectious => self.infectious,
            Compartment::Recovered => self.recovered,
            Compartment::Asymptomatic => self.asymptomatic,
            Compartment::Hospitalized => self.hospitalized,
            Compartment::Deceased => self.deceased,
        }
    }

    /// Sum over all seven fields, widened so it cannot overflow.
    pub fn total(&self) -> u128 {
        Compartment::ALL
            .iter()
            .map(|&c| u128::from(self.get(c)))
            .sum()
    }

    /// Reject initial populations summing above `population`.
    pub fn validate(&self, population: u64) -> ModelResult<()> {
        let total = self.total();
        if total > u128::from(population) {
            return Err(ModelError::InvalidInitialState {
                what: format!("initial populations sum to {total}, above N = {population}"),
            });
        }
        Ok(())
    }

    /// State vector in the variant's compartment order.
    pub fn to_vector(&self, variant: Variant) -> ModelResult<DVector<f64>> {
        let order = variant.compartments();
        if let Some(&missing) = Compartment::ALL
            .iter()
            .find(|&&c| !order.contains(&c) && self.get(c) != 0)
        {
            return Err(ModelError::DimensionMismatch {
                what: format!(
                    "{} model has no {} compartment, initial count is {}",
                    variant,
                    missing,
                    self.get(missing)
                ),
            });
        }
        Ok(DVector::from_iterator(
            order.len(),
            order.iter().map(|&c| self.get(c) as f64),
        ))
    }
}
