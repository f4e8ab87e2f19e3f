//! Disease parameters and the rate constants derived from them.

use crate::error::ModelResult;
use ef_core::{ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};

/// User-facing disease description.
///
/// Periods are in days and converted to rates by reciprocal. The defaults
/// describe an outbreak in a UK-sized population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseParams {
    /// Total population N.
    pub population: u64,
    /// Basic reproduction number R0.
    pub reproduction_number: f64,
    /// Mean time from exposure to infectiousness, days.
    pub incubation_period: f64,
    /// Mean infectious period, days.
    pub infectious_period: f64,
    /// δ: removal rate from Infectious into hospital care.
    pub hospitalization_rate: f64,
    /// μ: death rate of hospitalized cases.
    pub death_rate: f64,
    /// α_a: rate at which infectious cases seed the asymptomatic pool.
    pub asymptomatic_rate: f64,
    /// ρ: transfer rate from Asymptomatic to Hospitalized.
    pub asymptomatic_transfer_rate: f64,
}

impl Default for DiseaseParams {
    fn default() -> Self {
        Self {
            population: 67_000_000,
            reproduction_number: 2.4,
            incubation_period: 5.1,
            infectious_period: 3.3,
            hospitalization_rate: 0.01,
            death_rate: 0.001,
            asymptomatic_rate: 0.05,
            asymptomatic_transfer_rate: 0.02,
        }
    }
}

impl DiseaseParams {
    pub fn validate(&self) -> ModelResult<()> {
        if self.population == 0 {
            return Err(ef_core::CoreError::InvalidArg {
                what: "population must be positive",
            }
            .into());
        }
        ensure_positive(self.reproduction_number, "reproduction_number")?;
        ensure_positive(self.incubation_period, "incubation_period")?;
        ensure_positive(self.infectious_period, "infectious_period")?;
        ensure_non_negative(self.hospitalization_rate, "hospitalization_rate")?;
        ensure_non_negative(self.death_rate, "death_rate")?;
        ensure_non_negative(self.asymptomatic_rate, "asymptomatic_rate")?;
        ensure_non_negative(
            self.asymptomatic_transfer_rate,
            "asymptomatic_transfer_rate",
        )?;
        Ok(())
    }

    /// Validate and convert to the rate constants the model reads.
    pub fn rates(&self) -> ModelResult<Rates> {
        self.validate()?;
        let alpha = 1.0 / self.incubation_period;
        let gamma = 1.0 / self.infectious_period;
        let rates = Rates {
            population: self.population as f64,
            beta: self.reproduction_number * gamma,
            alpha,
            gamma,
            delta: self.hospitalization_rate,
            mu: self.death_rate,
            alpha_a: self.asymptomatic_rate,
            rho: self.asymptomatic_transfer_rate,
        };
        rates.validate()?;
        Ok(rates)
    }
}

/// Rate constants (per day) read by the right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    /// N, the normalisation constant of the force of infection.
    pub population: f64,
    pub beta: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub delta: f64,
    pub mu: f64,
    pub alpha_a: f64,
    pub rho: f64,
}

impl Rates {
    /// Every rate finite and >= 0, population finite and > 0.
    pub fn validate(&self) -> ModelResult<()> {
        ensure_positive(self.population, "population")?;
        for (value, what) in [
            (self.beta, "beta"),
            (self.alpha, "alpha"),
            (self.gamma, "gamma"),
            (self.delta, "delta"),
            (self.mu, "mu"),
            (self.alpha_a, "alpha_a"),
            (self.rho, "rho"),
        ] {
            ensure_non_negative(value, what)?;
        }
        Ok(())
    }

    /// Same rates with transmission switched off.
    pub fn without_transmission(self) -> Self {
        Self { beta: 0.0, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelError;

    #[test]
    fn default_rates_match_uk_constants() {
        let rates = DiseaseParams::default().rates().unwrap();
        assert_eq!(rates.population, 67_000_000.0);
        assert!((rates.alpha - 1.0 / 5.1).abs() < 1e-15);
        assert!((rates.gamma - 1.0 / 3.3).abs() < 1e-15);
        assert!((rates.beta - 2.4 / 3.3).abs() < 1e-15);
        assert_eq!(rates.mu, 0.001);
    }

    #[test]
    fn rejects_out_of_domain_inputs() {
        let zero_r0 = DiseaseParams {
            reproduction_number: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            zero_r0.rates(),
            Err(ModelError::InvalidParameter(_))
        ));

        let negative = DiseaseParams {
            death_rate: -0.1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let empty = DiseaseParams {
            population: 0,
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let nan_period = DiseaseParams {
            infectious_period: f64::NAN,
            ..Default::default()
        };
        assert!(nan_period.validate().is_err());
    }

    #[test]
    fn zero_beta_is_expressible_directly() {
        let rates = DiseaseParams::default().rates().unwrap().without_transmission();
        assert_eq!(rates.beta, 0.0);
        assert!(rates.validate().is_ok());
    }
}
