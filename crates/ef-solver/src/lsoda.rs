//! Automatic stiffness switching.

use crate::bdf::BdfStepper;
use crate::dense::DenseSegment;
use crate::error::SolverResult;
use crate::options::SolverOptions;
use crate::rk45::Rk45Stepper;
use crate::solve::{OdeSolver, Solution, SolverStats, drive, validate_problem};
use crate::stepper::Stepper;
use crate::system::{OdeSystem, TimeSpan};
use nalgebra::DVector;

enum Active {
    NonStiff(Rk45Stepper),
    Stiff(BdfStepper),
}

/// Starts on Dormand-Prince and hands over to BDF for the rest of the
/// horizon once the explicit method keeps hitting its stability boundary.
pub(crate) struct LsodaStepper {
    active: Active,
    t_bound: f64,
    options: SolverOptions,
}

impl LsodaStepper {
    pub(crate) fn new(
        system: &dyn OdeSystem,
        t0: f64,
        y0: DVector<f64>,
        t_bound: f64,
        options: &SolverOptions,
        stats: &mut SolverStats,
    ) -> Self {
        let rk = Rk45Stepper::new(system, t0, y0, t_bound, options, stats);
        Self {
            active: Active::NonStiff(rk),
            t_bound,
            options: SolverOptions {
                first_step: None,
                ..options.clone()
            },
        }
    }
}

impl Stepper for LsodaStepper {
    fn t(&self) -> f64 {
        match &self.active {
            Active::NonStiff(rk) => rk.t(),
            Active::Stiff(bdf) => bdf.t(),
        }
    }

    fn y(&self) -> &DVector<f64> {
        match &self.active {
            Active::NonStiff(rk) => rk.y(),
            Active::Stiff(bdf) => bdf.y(),
        }
    }

    fn step(
        &mut self,
        system: &dyn OdeSystem,
        stats: &mut SolverStats,
    ) -> SolverResult<DenseSegment> {
        let segment = match &mut self.active {
            Active::NonStiff(rk) => rk.step(system, stats)?,
            Active::Stiff(bdf) => return bdf.step(system, stats),
        };

        let handover = match &self.active {
            Active::NonStiff(rk) if rk.is_stiff() && rk.t() < self.t_bound => {
                Some((rk.t(), rk.y().clone()))
            }
            _ => None,
        };
        if let Some((t, y)) = handover {
            tracing::debug!(t, "stiffness detected, switching from RK45 to BDF");
            let bdf = BdfStepper::new(system, t, y, self.t_bound, &self.options, stats);
            self.active = Active::Stiff(bdf);
            stats.stiff_switch_at = Some(t);
        }

        Ok(segment)
    }
}

/// Solver that picks the explicit or implicit family automatically.
#[derive(Clone, Debug, Default)]
pub struct Lsoda {
    pub options: SolverOptions,
}

impl Lsoda {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }
}

impl OdeSolver for Lsoda {
    fn name(&self) -> &'static str {
        "LSODA"
    }

    fn solve(
        &self,
        system: &dyn OdeSystem,
        span: TimeSpan,
        y0: &DVector<f64>,
        t_eval: &[f64],
    ) -> SolverResult<Solution> {
        validate_problem(system, span, y0, t_eval, &self.options)?;
        let mut stats = SolverStats::default();
        let mut stepper = LsodaStepper::new(
            system,
            span.start,
            y0.clone(),
            span.end,
            &self.options,
            &mut stats,
        );
        drive(&mut stepper, system, span, y0, t_eval, &self.options, stats)
    }
}
