//! Integration of an epidemic model onto an evaluation grid.

use crate::anomaly::{AnomalyConfig, scan};
use crate::error::{SimError, SimResult};
use crate::grid::TimeGrid;
use crate::trajectory::Trajectory;
use ef_model::{InitialState, SeirModel, Variant};
use ef_solver::{Method, OdeSolver, OdeSystem, SolverOptions};
use nalgebra::DVector;

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Solver family.
    pub method: Method,
    /// Tolerances, step bounds and budgets handed to the solver.
    pub solver: SolverOptions,
    /// Thresholds for the post-hoc scan.
    pub anomaly: AnomalyConfig,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            method: Method::default(),
            solver: SolverOptions::default().with_max_step(1.0),
            anomaly: AnomalyConfig::default(),
        }
    }
}

impl SimOptions {
    /// The variant's usual method with internal steps capped at one day.
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            method: variant.default_method(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

/// Integrate `model` from integer initial populations.
pub fn integrate(
    model: &SeirModel,
    initial: &InitialState,
    grid: &TimeGrid,
    options: &SimOptions,
) -> SimResult<Trajectory> {
    let y0 = initial.to_vector(model.variant())?;
    integrate_vector(model, &y0, grid, options)
}

/// Integrate `model` from a raw state vector in the variant's compartment order.
pub fn integrate_vector(
    model: &SeirModel,
    y0: &DVector<f64>,
    grid: &TimeGrid,
    options: &SimOptions,
) -> SimResult<Trajectory> {
    check_initial_vector(model, y0)?;
    options.solver.validate().map_err(|e| SimError::config(e.to_string()))?;
    let solver = options.method.solver(options.solver.clone());
    integrate_with(solver.as_ref(), model, y0, grid, &options.anomaly)
}

/// Integrate with any solver implementation.
pub fn integrate_with(
    solver: &dyn OdeSolver,
    model: &SeirModel,
    y0: &DVector<f64>,
    grid: &TimeGrid,
    anomaly: &AnomalyConfig,
) -> SimResult<Trajectory> {
    check_initial_vector(model, y0)?;

    tracing::debug!(
        variant = %model.variant(),
        solver = solver.name(),
        points = grid.len(),
        start = grid.start(),
        end = grid.end(),
        "starting integration"
    );

    let solution = solver.solve(model, grid.span(), y0, grid.points())?;

    if solution.t.len() != grid.len() || solution.y.len() != grid.len() {
        return Err(SimError::IntegrationFailure(
            ef_solver::SolverError::InvalidArg {
                what: format!(
                    "{} returned {} points for a grid of {}",
                    solver.name(),
                    solution.y.len(),
                    grid.len()
                ),
            },
        ));
    }
    if let Some(bad) = solution.y.iter().find(|y| y.len() != model.dim()) {
        return Err(SimError::IntegrationFailure(
            ef_solver::SolverError::InvalidArg {
                what: format!(
                    "{} returned a state of dimension {}, expected {}",
                    solver.name(),
                    bad.len(),
                    model.dim()
                ),
            },
        ));
    }

    let anomalies = scan(
        model.compartments(),
        &solution.t,
        &solution.y,
        model.rates().population,
        anomaly,
    );
    for a in &anomalies {
        tracing::warn!(variant = %model.variant(), "numerical anomaly: {a}");
    }

    tracing::info!(
        variant = %model.variant(),
        solver = solver.name(),
        steps = solution.stats.n_steps,
        rejected = solution.stats.n_rejected,
        anomalies = anomalies.len(),
        "integration complete"
    );

    Ok(Trajectory::new(
        model.variant(),
        model.rates().population,
        solution.t,
        solution.y,
        solution.stats,
        anomalies,
    ))
}

fn check_initial_vector(model: &SeirModel, y0: &DVector<f64>) -> SimResult<()> {
    if y0.len() != model.dim() {
        return Err(SimError::config(format!(
            "{} model expects {} compartments, initial state has {}",
            model.variant(),
            model.dim(),
            y0.len()
        )));
    }
    for (&c, &v) in model.compartments().iter().zip(y0.iter()) {
        if !v.is_finite() || v < 0.0 {
            return Err(SimError::config(format!(
                "initial {c} must be finite and non-negative, got {v}"
            )));
        }
    }
    let population = model.rates().population;
    let total = y0.sum();
    if total > population {
        return Err(SimError::config(format!(
            "initial populations sum to {total}, above N = {population}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ef_model::{DiseaseParams, ModelVariant};

    fn basic_model() -> SeirModel {
        SeirModel::from_params(ModelVariant::Basic, &DiseaseParams::default()).unwrap()
    }

    #[test]
    fn options_follow_variant() {
        assert_eq!(SimOptions::for_variant(Variant::Extended).method, Method::Bdf);
        assert_eq!(SimOptions::for_variant(Variant::Basic).method, Method::Lsoda);
        assert_eq!(SimOptions::default().solver.max_step, 1.0);
    }

    #[test]
    fn wrong_dimension_is_rejected_before_solving() {
        let grid = TimeGrid::linspace(0.0, 10.0, 5).unwrap();
        let y0 = DVector::from_element(7, 1.0);
        let err = integrate_vector(&basic_model(), &y0, &grid, &SimOptions::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn raw_vector_above_population_is_rejected_before_solving() {
        let params = DiseaseParams {
            population: 1000,
            ..Default::default()
        };
        let model = SeirModel::from_params(ModelVariant::Basic, &params).unwrap();
        let grid = TimeGrid::linspace(0.0, 10.0, 5).unwrap();
        let y0 = DVector::from_vec(vec![5000.0, 10.0, 10.0, 0.0]);

        let err = integrate_vector(&model, &y0, &grid, &SimOptions::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));

        let solver = ef_solver::Rk45::default();
        let err = integrate_with(&solver, &model, &y0, &grid, &AnomalyConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));

        let at_capacity = DVector::from_vec(vec![980.0, 10.0, 10.0, 0.0]);
        assert!(integrate_vector(&model, &at_capacity, &grid, &SimOptions::default()).is_ok());
    }

    #[test]
    fn negative_initial_value_is_rejected() {
        let grid = TimeGrid::linspace(0.0, 10.0, 5).unwrap();
        let y0 = DVector::from_vec(vec![100.0, -1.0, 0.0, 0.0]);
        assert!(integrate_vector(&basic_model(), &y0, &grid, &SimOptions::default()).is_err());
    }

    #[test]
    fn bad_solver_options_are_configuration_errors() {
        let grid = TimeGrid::linspace(0.0, 10.0, 5).unwrap();
        let options = SimOptions {
            solver: SolverOptions::default().with_tolerances(-1.0, 1e-6),
            ..SimOptions::default()
        };
        let initial = InitialState {
            susceptible: 1000,
            infectious: 1,
            ..Default::default()
        };
        let err = integrate(&basic_model(), &initial, &grid, &options).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }
}
