//! Solver configuration and method selection.

use crate::bdf::Bdf;
use crate::error::{SolverError, SolverResult};
use crate::lsoda::Lsoda;
use crate::rk45::Rk45;
use crate::solve::OdeSolver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Solver family selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Explicit Dormand-Prince 5(4).
    Rk45,
    /// Implicit variable-order BDF, for stiff systems.
    Bdf,
    /// Automatic stiffness switching (RK45, then BDF once stiff).
    #[default]
    Lsoda,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Rk45, Method::Bdf, Method::Lsoda];

    pub fn name(self) -> &'static str {
        match self {
            Method::Rk45 => "rk45",
            Method::Bdf => "bdf",
            Method::Lsoda => "lsoda",
        }
    }

    /// Build the concrete solver for this method.
    pub fn solver(self, options: SolverOptions) -> Box<dyn OdeSolver> {
        match self {
            Method::Rk45 => Box::new(Rk45::new(options)),
            Method::Bdf => Box::new(Bdf::new(options)),
            Method::Lsoda => Box::new(Lsoda::new(options)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rk45" => Ok(Method::Rk45),
            "bdf" => Ok(Method::Bdf),
            "lsoda" => Ok(Method::Lsoda),
            other => Err(SolverError::InvalidArg {
                what: format!("unknown method '{other}' (expected rk45, bdf or lsoda)"),
            }),
        }
    }
}

/// Options shared by all solvers.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverOptions {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Upper bound on the internal step size
    pub max_step: f64,
    /// Initial step; chosen automatically when `None`
    pub first_step: Option<f64>,
    /// Maximum number of accepted steps (safety limit)
    pub max_steps: usize,
    /// Optional wall-clock ceiling for one integration
    pub max_wall_time: Option<Duration>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_step: f64::INFINITY,
            first_step: None,
            max_steps: 100_000,
            max_wall_time: None,
        }
    }
}

impl SolverOptions {
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn validate(&self) -> SolverResult<()> {
        if !self.rtol.is_finite() || self.rtol < 100.0 * f64::EPSILON {
            return Err(SolverError::InvalidArg {
                what: format!("rtol must be finite and >= 100 * EPS, got {}", self.rtol),
            });
        }
        if !self.atol.is_finite() || self.atol < 0.0 {
            return Err(SolverError::InvalidArg {
                what: format!("atol must be finite and non-negative, got {}", self.atol),
            });
        }
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(SolverError::InvalidArg {
                what: format!("max_step must be positive, got {}", self.max_step),
            });
        }
        if let Some(h) = self.first_step {
            if !h.is_finite() || h <= 0.0 {
                return Err(SolverError::InvalidArg {
                    what: format!("first_step must be finite and positive, got {h}"),
                });
            }
        }
        if self.max_steps == 0 {
            return Err(SolverError::InvalidArg {
                what: "max_steps must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_options_defaults() {
        let opts = SolverOptions::default();
        assert_eq!(opts.rtol, 1e-3);
        assert_eq!(opts.atol, 1e-6);
        assert!(opts.max_step.is_infinite());
        assert_eq!(opts.max_steps, 100_000);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn solver_options_invalid() {
        assert!(SolverOptions::default().with_max_step(0.0).validate().is_err());
        assert!(
            SolverOptions::default()
                .with_tolerances(0.0, 1e-6)
                .validate()
                .is_err()
        );
        assert!(
            SolverOptions::default()
                .with_tolerances(1e-3, -1.0)
                .validate()
                .is_err()
        );
        assert!(SolverOptions::default().with_max_steps(0).validate().is_err());
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("BDF".parse::<Method>().unwrap(), Method::Bdf);
        assert_eq!("lsoda".parse::<Method>().unwrap(), Method::Lsoda);
        assert!("radau".parse::<Method>().is_err());
        for m in Method::ALL {
            assert_eq!(m.name().parse::<Method>().unwrap(), m);
        }
    }
}
