//! Explicit Dormand-Prince 5(4) integrator.

use crate::dense::DenseSegment;
use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::solve::{OdeSolver, Solution, SolverStats, drive, validate_problem};
use crate::stepper::{Stepper, min_step, scaled_rms, select_initial_step};
use crate::system::{OdeSystem, TimeSpan};
use nalgebra::DVector;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Hairer's stability-boundary test for DOPRI5.
const STIFFNESS_THRESHOLD: f64 = 3.25;
const STIFF_STEPS_TO_SWITCH: usize = 15;
const NONSTIFF_STEPS_TO_RESET: usize = 6;

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];
const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];
/// Difference between the embedded 4th-order and the 5th-order weights.
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

/// Counts consecutive steps whose `h * |lambda|` estimate sits outside the
/// explicit stability region.
#[derive(Clone, Debug, Default)]
struct StiffnessDetector {
    stiff_steps: usize,
    nonstiff_steps: usize,
    stiff: bool,
}

impl StiffnessDetector {
    fn observe(&mut self, h: f64, h_lambda_num: f64, h_lambda_den: f64) {
        if h_lambda_den <= 0.0 {
            return;
        }
        let h_lambda = h * (h_lambda_num / h_lambda_den).sqrt();
        if h_lambda > STIFFNESS_THRESHOLD {
            self.nonstiff_steps = 0;
            self.stiff_steps += 1;
            if self.stiff_steps >= STIFF_STEPS_TO_SWITCH {
                self.stiff = true;
            }
        } else {
            self.nonstiff_steps += 1;
            if self.nonstiff_steps == NONSTIFF_STEPS_TO_RESET {
                self.stiff_steps = 0;
            }
        }
    }
}

pub(crate) struct Rk45Stepper {
    t: f64,
    y: DVector<f64>,
    f: DVector<f64>,
    t_bound: f64,
    h_abs: f64,
    rtol: f64,
    atol: f64,
    max_step: f64,
    stiffness: StiffnessDetector,
}

impl Rk45Stepper {
    pub(crate) fn new(
        system: &dyn OdeSystem,
        t0: f64,
        y0: DVector<f64>,
        t_bound: f64,
        options: &SolverOptions,
        stats: &mut SolverStats,
    ) -> Self {
        let f = system.rhs(t0, &y0);
        stats.n_rhs_evals += 1;
        let h_abs = match options.first_step {
            Some(h) => h,
            None => select_initial_step(system, t0, &y0, &f, t_bound, 4, options, stats),
        }
        .min(options.max_step);

        Self {
            t: t0,
            y: y0,
            f,
            t_bound,
            h_abs,
            rtol: options.rtol,
            atol: options.atol,
            max_step: options.max_step,
            stiffness: StiffnessDetector::default(),
        }
    }

    /// True once the stiffness test has fired.
    pub(crate) fn is_stiff(&self) -> bool {
        self.stiffness.stiff
    }

    /// Evaluate all stages for a step of size `h`.
    ///
    /// Returns `(k, y_new, y_stage6)` where `k[6] = f(t + h, y_new)`.
    fn stages(
        &self,
        system: &dyn OdeSystem,
        h: f64,
        stats: &mut SolverStats,
    ) -> (Vec<DVector<f64>>, DVector<f64>, DVector<f64>) {
        let n = self.y.len();
        let mut k: Vec<DVector<f64>> = Vec::with_capacity(7);
        k.push(self.f.clone());

        let mut y_stage = self.y.clone();
        for s in 1..6 {
            let mut dy = DVector::zeros(n);
            for (j, kj) in k.iter().enumerate().take(s) {
                dy += kj * (A[s][j] * h);
            }
            y_stage = &self.y + dy;
            k.push(system.rhs(self.t + C[s] * h, &y_stage));
        }

        let mut dy = DVector::zeros(n);
        for (j, kj) in k.iter().enumerate() {
            dy += kj * (B[j] * h);
        }
        let y_new = &self.y + dy;
        k.push(system.rhs(self.t + h, &y_new));
        stats.n_rhs_evals += 6;

        (k, y_new, y_stage)
    }
}

impl Stepper for Rk45Stepper {
    fn t(&self) -> f64 {
        self.t
    }

    fn y(&self) -> &DVector<f64> {
        &self.y
    }

    fn step(
        &mut self,
        system: &dyn OdeSystem,
        stats: &mut SolverStats,
    ) -> SolverResult<DenseSegment> {
        let t = self.t;
        let n = self.y.len();
        let min_step = min_step(t);
        let mut h_abs = self.h_abs.min(self.max_step).max(min_step);
        let mut rejected = false;

        loop {
            if h_abs < min_step {
                return Err(SolverError::StepSizeTooSmall { t });
            }

            let t_new = (t + h_abs).min(self.t_bound);
            let h = t_new - t;
            h_abs = h.abs();

            let (k, y_new, y_stage6) = self.stages(system, h, stats);

            let scale = DVector::from_fn(n, |i, _| {
                self.atol + self.y[i].abs().max(y_new[i].abs()) * self.rtol
            });
            let mut err = DVector::zeros(n);
            for (j, kj) in k.iter().enumerate() {
                err += kj * (E[j] * h);
            }
            let err_norm = scaled_rms(&err, &scale);

            if err_norm < 1.0 {
                let mut factor = if err_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
                };
                if rejected {
                    factor = factor.min(1.0);
                }
                self.h_abs = h_abs * factor;

                let num = (&k[6] - &k[5]).norm_squared();
                let den = (&y_new - &y_stage6).norm_squared();
                self.stiffness.observe(h, num, den);

                let f_new = k[6].clone();
                let segment = DenseSegment::Hermite {
                    t_old: t,
                    t_new,
                    y_old: std::mem::replace(&mut self.y, y_new.clone()),
                    y_new,
                    f_old: std::mem::replace(&mut self.f, f_new.clone()),
                    f_new,
                };
                self.t = t_new;
                return Ok(segment);
            }

            // Rejected (or NaN error estimate): shrink and retry.
            let factor = if err_norm.is_finite() {
                (SAFETY * err_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
            } else {
                MIN_FACTOR
            };
            h_abs *= factor;
            rejected = true;
            stats.n_rejected += 1;
            tracing::trace!(t, h_abs, err_norm, "rk45 step rejected");
        }
    }
}

/// Explicit Runge-Kutta 5(4) solver (Dormand-Prince pair).
#[derive(Clone, Debug, Default)]
pub struct Rk45 {
    pub options: SolverOptions,
}

impl Rk45 {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }
}

impl OdeSolver for Rk45 {
    fn name(&self) -> &'static str {
        "RK45"
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
        let mut stepper = Rk45Stepper::new(
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
