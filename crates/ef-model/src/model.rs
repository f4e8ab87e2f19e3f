//! The SEIR model family.

use crate::compartment::Compartment;
use crate::controls::InterventionControls;
use crate::error::{ModelError, ModelResult};
use crate::params::{DiseaseParams, Rates};
use ef_solver::{Method, OdeSystem};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model topology without its control settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Basic,
    Extended,
    Controlled,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Basic, Variant::Extended, Variant::Controlled];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Basic => "basic",
            Variant::Extended => "extended",
            Variant::Controlled => "controlled",
        }
    }

    /// Compartments in state-vector order.
    pub fn compartments(self) -> &'static [Compartment] {
        match self {
            Variant::Basic => &Compartment::BASIC,
            Variant::Extended | Variant::Controlled => &Compartment::EXTENDED,
        }
    }

    pub fn dim(self) -> usize {
        self.compartments().len()
    }

    pub fn index_of(self, compartment: Compartment) -> Option<usize> {
        self.compartments().iter().position(|&c| c == compartment)
    }

    /// Solver family each variant is normally run with.
    pub fn default_method(self) -> Method {
        match self {
            Variant::Basic | Variant::Controlled => Method::Lsoda,
            Variant::Extended => Method::Bdf,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == key)
            .ok_or_else(|| ModelError::UnknownName {
                kind: "variant",
                name: s.to_string(),
            })
    }
}

/// Model topology together with its intervention settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelVariant {
    Basic,
    Extended,
    Controlled(InterventionControls),
}

impl ModelVariant {
    pub fn variant(&self) -> Variant {
        match self {
            ModelVariant::Basic => Variant::Basic,
            ModelVariant::Extended => Variant::Extended,
            ModelVariant::Controlled(_) => Variant::Controlled,
        }
    }

    pub fn controls(&self) -> Option<&InterventionControls> {
        match self {
            ModelVariant::Controlled(controls) => Some(controls),
            _ => None,
        }
    }

    /// κ applied to the transmission term.
    pub fn transmission_factor(&self) -> ModelResult<f64> {
        match self {
            ModelVariant::Basic | ModelVariant::Extended => Ok(1.0),
            ModelVariant::Controlled(controls) => controls.transmission_factor(),
        }
    }
}

/// A validated compartmental model, ready to hand to a solver.
///
/// N is carried in [`Rates::population`] so that models with different
/// populations can run side by side.
#[derive(Clone, Debug, PartialEq)]
pub struct SeirModel {
    variant: ModelVariant,
    rates: Rates,
    kappa: f64,
}

impl SeirModel {
    pub fn new(variant: ModelVariant, rates: Rates) -> ModelResult<Self> {
        rates.validate()?;
        let kappa = variant.transmission_factor()?;
        Ok(Self {
            variant,
            rates,
            kappa,
        })
    }

    pub fn from_params(variant: ModelVariant, params: &DiseaseParams) -> ModelResult<Self> {
        Self::new(variant, params.rates()?)
    }

    pub fn model_variant(&self) -> &ModelVariant {
        &self.variant
    }

    pub fn variant(&self) -> Variant {
        self.variant.variant()
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }

    pub fn transmission_factor(&self) -> f64 {
        self.kappa
    }

    pub fn compartments(&self) -> &'static [Compartment] {
        self.variant().compartments()
    }

    pub fn default_method(&self) -> Method {
        self.variant().default_method()
    }

    fn basic_rhs(&self, y: &DVector<f64>) -> DVector<f64> {
        let r = &self.rates;
        let (s, e, i) = (y[0], y[1], y[2]);
        let infection = r.beta * s * i / r.population;
        DVector::from_vec(vec![
            -infection,
            infection - r.alpha * e,
            r.alpha * e - r.gamma * i,
            r.gamma * i,
        ])
    }

    fn extended_rhs(&self, y: &DVector<f64>) -> DVector<f64> {
        let r = &self.rates;
        let (s, e, i, a, h) = (y[0], y[1], y[2], y[4], y[5]);
        let infection = self.kappa * r.beta * s * (i + a) / r.population;
        DVector::from_vec(vec![
            -infection,
            infection - r.alpha * e,
            r.alpha * e - r.gamma * i - r.delta * i,
            r.gamma * i,
            r.alpha_a * i - r.gamma * a - r.rho * a,
            r.rho * a - r.mu * h,
            r.mu * h,
        ])
    }
}

impl OdeSystem for SeirModel {
    fn dim(&self) -> usize {
        self.variant().dim()
    }

    // Autonomous: `t` is unused. Negative inputs are not clamped.
    fn rhs(&self, _t: f64, y: &DVector<f64>) -> DVector<f64> {
        match self.variant {
            ModelVariant::Basic => self.basic_rhs(y),
            ModelVariant::Extended | ModelVariant::Controlled(_) => self.extended_rhs(y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> Rates {
        DiseaseParams::default().rates().unwrap()
    }

    #[test]
    fn dimensions_follow_variant() {
        let basic = SeirModel::new(ModelVariant::Basic, rates()).unwrap();
        let extended = SeirModel::new(ModelVariant::Extended, rates()).unwrap();
        assert_eq!(basic.dim(), 4);
        assert_eq!(extended.dim(), 7);
        assert_eq!(Variant::Controlled.index_of(Compartment::Deceased), Some(6));
        assert_eq!(Variant::Basic.index_of(Compartment::Asymptomatic), None);
    }

    #[test]
    fn default_methods() {
        assert_eq!(Variant::Basic.default_method(), Method::Lsoda);
        assert_eq!(Variant::Extended.default_method(), Method::Bdf);
        assert_eq!(Variant::Controlled.default_method(), Method::Lsoda);
    }

    #[test]
    fn basic_rhs_by_hand() {
        let r = rates();
        let model = SeirModel::new(ModelVariant::Basic, r).unwrap();
        let y = DVector::from_vec(vec![66_900_000.0, 10_000.0, 10.0, 0.0]);
        let dy = model.rhs(0.0, &y);
        let infection = r.beta * 66_900_000.0 * 10.0 / 67_000_000.0;
        assert!((dy[0] + infection).abs() < 1e-9);
        assert!((dy[1] - (infection - r.alpha * 10_000.0)).abs() < 1e-9);
        assert!((dy[3] - r.gamma * 10.0).abs() < 1e-12);
        assert!(dy.sum().abs() < 1e-9);
    }

    #[test]
    fn asymptomatic_cases_transmit() {
        let model = SeirModel::new(ModelVariant::Extended, rates()).unwrap();
        let y = DVector::from_vec(vec![1.0e6, 0.0, 0.0, 0.0, 100.0, 0.0, 0.0]);
        let dy = model.rhs(0.0, &y);
        assert!(dy[0] < 0.0);
        assert!(dy[1] > 0.0);
    }

    #[test]
    fn controls_scale_transmission_only() {
        let r = rates();
        let extended = SeirModel::new(ModelVariant::Extended, r).unwrap();
        let controlled =
            SeirModel::new(ModelVariant::Controlled(InterventionControls::default()), r).unwrap();
        let kappa = controlled.transmission_factor();
        let y = DVector::from_vec(vec![6.0e7, 1.0e4, 1.0e3, 0.0, 50.0, 5.0, 0.0]);
        let a = extended.rhs(0.0, &y);
        let b = controlled.rhs(0.0, &y);
        assert!((b[0] - kappa * a[0]).abs() < 1e-6);
        for k in 2..7 {
            assert_eq!(a[k], b[k]);
        }
    }

    #[test]
    fn invalid_controls_fail_construction() {
        let bad = InterventionControls {
            mask_wearing: -0.1,
            ..Default::default()
        };
        assert!(SeirModel::new(ModelVariant::Controlled(bad), rates()).is_err());
    }

    #[test]
    fn negative_state_is_not_clamped() {
        let model = SeirModel::new(ModelVariant::Basic, rates()).unwrap();
        let y = DVector::from_vec(vec![-10.0, 0.0, 5.0, 0.0]);
        let dy = model.rhs(0.0, &y);
        assert!(dy[0] > 0.0);
    }

    #[test]
    fn variant_names_round_trip() {
        for v in Variant::ALL {
            assert_eq!(v.to_string().parse::<Variant>().unwrap(), v);
        }
        assert!("sir".parse::<Variant>().is_err());
    }
}
