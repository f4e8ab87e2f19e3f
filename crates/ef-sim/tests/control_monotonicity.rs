//! Stronger interventions never raise the infectious peak.

use ef_model::{
    Compartment, Control, DiseaseParams, InitialState, InterventionControls, ModelVariant,
    SeirModel,
};
use ef_sim::{SimOptions, TimeGrid, integrate};
use ef_solver::{Method, SolverOptions};
use proptest::prelude::*;

fn peak_infectious(controls: InterventionControls, grid: &TimeGrid) -> f64 {
    let model =
        SeirModel::from_params(ModelVariant::Controlled(controls), &DiseaseParams::default())
            .unwrap();
    let initial = InitialState {
        susceptible: 67_000_000 - 100_000,
        exposed: 10_000,
        infectious: 1_000,
        ..Default::default()
    };
    let options = SimOptions {
        method: Method::Rk45,
        solver: SolverOptions::default()
            .with_max_step(1.0)
            .with_tolerances(1e-6, 1e-3),
        ..SimOptions::default()
    };
    integrate(&model, &initial, grid, &options)
        .unwrap()
        .peak(Compartment::Infectious)
        .unwrap()
        .1
}

fn control_strategy() -> impl Strategy<Value = Control> {
    prop::sample::select(Control::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn raising_one_coefficient_never_raises_peak(
        base in (0.1..=1.0f64, 0.1..=1.0f64, 0.1..=1.0f64, 0.1..=1.0f64),
        control in control_strategy(),
        low in 0.0..0.9f64,
        delta in 0.05..0.1f64,
    ) {
        let grid = TimeGrid::linspace(0.0, 200.0, 2001).unwrap();
        let controls = InterventionControls {
            contact_tracing: base.0,
            quarantine: base.1,
            mask_wearing: base.2,
            vaccination: base.3,
        };
        let weak = peak_infectious(controls.with(control, low), &grid);
        let strong = peak_infectious(controls.with(control, low + delta), &grid);
        prop_assert!(
            strong <= weak * (1.0 + 1e-4),
            "{control}: {low} -> {weak}, {} -> {strong}",
            low + delta
        );
    }
}

#[test]
fn default_controls_flatten_the_curve() {
    let grid = TimeGrid::linspace(0.0, 200.0, 201).unwrap();
    let open = peak_infectious(InterventionControls::none(), &grid);
    let controlled = peak_infectious(InterventionControls::default(), &grid);
    assert!(controlled < open);
}
