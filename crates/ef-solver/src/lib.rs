//! Adaptive-step ODE solvers for initial value problems.
//!
//! This crate integrates systems `dy/dt = f(t, y)` over a fixed horizon and
//! reports the state at caller-chosen instants, independent of the internal
//! step sequence. Three solver families are provided:
//!
//! - [`Rk45`]: explicit Dormand-Prince 5(4) for non-stiff problems
//! - [`Bdf`]: implicit variable-order backward differentiation formulas
//! - [`Lsoda`]: starts explicit, switches to BDF once stiffness is detected
//!
//! Callers depend on the [`OdeSystem`] and [`OdeSolver`] traits only, so any
//! implementation can be injected.

pub mod bdf;
pub mod dense;
pub mod error;
pub mod jacobian;
pub mod lsoda;
pub mod newton;
pub mod options;
pub mod rk45;
pub mod solve;
pub mod system;

mod stepper;

pub use bdf::Bdf;
pub use dense::DenseSegment;
pub use error::{SolverError, SolverResult};
pub use lsoda::Lsoda;
pub use newton::NewtonConfig;
pub use options::{Method, SolverOptions};
pub use rk45::Rk45;
pub use solve::{OdeSolver, Solution, SolverStats, solve_ivp};
pub use system::{FnSystem, OdeSystem, TimeSpan};
