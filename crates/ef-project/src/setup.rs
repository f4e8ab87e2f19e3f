//! Turning a scenario into something runnable.

use crate::schema::Scenario;
use crate::validate::validate_scenario;
use crate::{ProjectError, ProjectResult};
use ef_model::{InitialState, ModelVariant, SeirModel, Variant};
use ef_sim::{SimOptions, SimResult, SweepCase, TimeGrid, Trajectory, integrate};

/// A validated scenario with its model, grid and options built.
#[derive(Clone, Debug)]
pub struct ScenarioSetup {
    pub name: String,
    pub model: SeirModel,
    pub initial: InitialState,
    pub grid: TimeGrid,
    pub options: SimOptions,
}

impl Scenario {
    pub fn build(&self) -> ProjectResult<ScenarioSetup> {
        validate_scenario(self)?;

        let variant = match self.variant {
            Variant::Basic => ModelVariant::Basic,
            Variant::Extended => ModelVariant::Extended,
            Variant::Controlled => {
                let controls = self.controls.ok_or_else(|| ProjectError::Build {
                    what: "controlled scenario without controls".to_string(),
                })?;
                ModelVariant::Controlled(controls)
            }
        };
        let model = SeirModel::from_params(variant, &self.disease)?;
        let grid = TimeGrid::linspace(self.time.start, self.time.end, self.time.points)?;
        let options = SimOptions {
            method: self.method(),
            solver: self.solver.to_options(),
            ..SimOptions::default()
        };

        Ok(ScenarioSetup {
            name: self.name.clone(),
            model,
            initial: self.initial,
            grid,
            options,
        })
    }
}

impl ScenarioSetup {
    pub fn run(&self) -> SimResult<Trajectory> {
        integrate(&self.model, &self.initial, &self.grid, &self.options)
    }

    pub fn sweep_case(&self) -> SweepCase {
        SweepCase {
            label: self.name.clone(),
            model: self.model.clone(),
            initial: self.initial,
            grid: self.grid.clone(),
            options: self.options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::presets;
    use ef_solver::Method;

    #[test]
    fn build_uses_scenario_settings() {
        let setup = presets::extended().build().unwrap();
        assert_eq!(setup.grid.len(), 200);
        assert_eq!(setup.options.method, Method::Bdf);
        assert_eq!(setup.options.solver.max_step, 1.0);
        assert!((setup.model.rates().beta - 5.0 / 3.3).abs() < 1e-12);
    }

    #[test]
    fn build_rejects_invalid_scenario() {
        let mut s = presets::basic();
        s.time.points = 1;
        assert!(s.build().is_err());
    }
}
