//! Property tests on the model right-hand sides.

use ef_model::{DiseaseParams, InterventionControls, ModelVariant, Rates, SeirModel};
use ef_solver::OdeSystem;
use nalgebra::DVector;
use proptest::prelude::*;

fn rates_strategy() -> impl Strategy<Value = Rates> {
    (
        1.0e3..1.0e8f64,
        0.0..3.0f64,
        0.05..1.0f64,
        0.05..1.0f64,
        0.0..0.1f64,
        0.0..0.01f64,
        0.0..0.2f64,
        0.0..0.1f64,
    )
        .prop_map(|(population, beta, alpha, gamma, delta, mu, alpha_a, rho)| Rates {
            population,
            beta,
            alpha,
            gamma,
            delta,
            mu,
            alpha_a,
            rho,
        })
}

fn state(dim: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..1.0e6f64, dim)
}

fn controls_strategy() -> impl Strategy<Value = InterventionControls> {
    (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64).prop_map(|(c, q, m, v)| {
        InterventionControls {
            contact_tracing: c,
            quarantine: q,
            mask_wearing: m,
            vaccination: v,
        }
    })
}

proptest! {
    #[test]
    fn basic_flows_conserve_population(rates in rates_strategy(), y in state(4)) {
        let model = SeirModel::new(ModelVariant::Basic, rates).unwrap();
        let dy = model.rhs(0.0, &DVector::from_vec(y.clone()));
        let scale = dy.iter().map(|v| v.abs()).fold(1.0, f64::max);
        prop_assert!(dy.sum().abs() <= 1e-12 * scale);
    }

    #[test]
    fn extended_net_flow_matches_open_terms(rates in rates_strategy(), y in state(7)) {
        // δ·I leaves the system and α_a·I enters A without a matching outflow;
        // γ·A leaves A without reaching R.
        let model = SeirModel::new(ModelVariant::Extended, rates).unwrap();
        let dy = model.rhs(0.0, &DVector::from_vec(y.clone()));
        let expected = (rates.alpha_a - rates.delta) * y[2] - rates.gamma * y[4];
        let scale = dy.iter().map(|v| v.abs()).fold(1.0, f64::max);
        prop_assert!((dy.sum() - expected).abs() <= 1e-10 * scale);
    }

    #[test]
    fn susceptible_never_grows(
        rates in rates_strategy(),
        controls in controls_strategy(),
        y in state(7),
    ) {
        let model = SeirModel::new(ModelVariant::Controlled(controls), rates).unwrap();
        let dy = model.rhs(0.0, &DVector::from_vec(y));
        prop_assert!(dy[0] <= 0.0);
    }

    #[test]
    fn transmission_factor_stays_in_unit_interval(controls in controls_strategy()) {
        let kappa = controls.transmission_factor().unwrap();
        prop_assert!((0.0..=1.0).contains(&kappa));
    }

    #[test]
    fn rhs_ignores_time(t in -1.0e3..1.0e3f64, y in state(7)) {
        let model = SeirModel::from_params(ModelVariant::Extended, &DiseaseParams::default()).unwrap();
        let y = DVector::from_vec(y);
        prop_assert_eq!(model.rhs(t, &y), model.rhs(0.0, &y));
    }
}

#[test]
fn controlled_with_no_interventions_equals_extended() {
    let rates = DiseaseParams::default().rates().unwrap();
    let extended = SeirModel::new(ModelVariant::Extended, rates).unwrap();
    let open = SeirModel::new(ModelVariant::Controlled(InterventionControls::none()), rates).unwrap();
    let y = DVector::from_vec(vec![6.6e7, 1.0e4, 1.0e3, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(extended.rhs(0.0, &y), open.rhs(0.0, &y));
}
