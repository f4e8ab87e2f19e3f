//! Intervention effectiveness coefficients.

use crate::error::{ModelError, ModelResult};
use ef_core::ensure_unit_interval;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One intervention layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    ContactTracing,
    Quarantine,
    MaskWearing,
    Vaccination,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::ContactTracing,
        Control::Quarantine,
        Control::MaskWearing,
        Control::Vaccination,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Control::ContactTracing => "contact_tracing",
            Control::Quarantine => "quarantine",
            Control::MaskWearing => "mask_wearing",
            Control::Vaccination => "vaccination",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Control::ALL
            .into_iter()
            .find(|c| c.name() == key)
            .ok_or_else(|| ModelError::UnknownName {
                kind: "control",
                name: s.to_string(),
            })
    }
}

/// Effectiveness of each intervention layer, each in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionControls {
    pub contact_tracing: f64,
    pub quarantine: f64,
    pub mask_wearing: f64,
    pub vaccination: f64,
}

impl Default for InterventionControls {
    fn default() -> Self {
        Self {
            contact_tracing: 0.8,
            quarantine: 0.7,
            mask_wearing: 0.6,
            vaccination: 0.9,
        }
    }
}

impl InterventionControls {
    /// Every coefficient zero: κ = 1.
    pub fn none() -> Self {
        Self {
            contact_tracing: 0.0,
            quarantine: 0.0,
            mask_wearing: 0.0,
            vaccination: 0.0,
        }
    }

    pub fn get(&self, control: Control) -> f64 {
        match control {
            Control::ContactTracing => self.contact_tracing,
            Control::Quarantine => self.quarantine,
            Control::MaskWearing => self.mask_wearing,
            Control::Vaccination => self.vaccination,
        }
    }

    /// Copy with one coefficient replaced.
    pub fn with(mut self, control: Control, value: f64) -> Self {
        match control {
            Control::ContactTracing => self.contact_tracing = value,
            Control::Quarantine => self.quarantine = value,
            Control::MaskWearing => self.mask_wearing = value,
            Control::Vaccination => self.vaccination = value,
        }
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        for control in Control::ALL {
            ensure_unit_interval(self.get(control), control.name())
                .map_err(ModelError::InvalidControl)?;
        }
        Ok(())
    }

    /// κ = 1 − u_c·u_q·u_m·u_v, the multiplier on the transmission term.
    pub fn transmission_factor(&self) -> ModelResult<f64> {
        self.validate()?;
        let product = self.contact_tracing * self.quarantine * self.mask_wearing * self.vaccination;
        ensure_unit_interval(1.0 - product, "transmission factor").map_err(ModelError::InvalidControl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factor() {
        let kappa = InterventionControls::default().transmission_factor().unwrap();
        assert!((kappa - (1.0 - 0.8 * 0.7 * 0.6 * 0.9)).abs() < 1e-15);
    }

    #[test]
    fn all_ones_blocks_transmission() {
        let full = InterventionControls {
            contact_tracing: 1.0,
            quarantine: 1.0,
            mask_wearing: 1.0,
            vaccination: 1.0,
        };
        assert_eq!(full.transmission_factor().unwrap(), 0.0);
        assert_eq!(InterventionControls::none().transmission_factor().unwrap(), 1.0);
    }

    #[test]
    fn out_of_range_coefficient_is_rejected() {
        let bad = InterventionControls::default().with(Control::Quarantine, 1.2);
        assert!(matches!(
            bad.transmission_factor(),
            Err(ModelError::InvalidControl(_))
        ));
        let nan = InterventionControls::default().with(Control::Vaccination, f64::NAN);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn control_names_parse() {
        assert_eq!("mask-wearing".parse::<Control>().unwrap(), Control::MaskWearing);
        assert_eq!("Vaccination".parse::<Control>().unwrap(), Control::Vaccination);
        assert!("curfew".parse::<Control>().is_err());
    }
}
