//! Epidemic simulation on top of the adaptive solvers.
//!
//! Provides:
//! - Evaluation grids independent of the solver's internal steps
//! - `integrate` / `integrate_with` / `integrate_vector` producing immutable trajectories
//! - Post-hoc anomaly scan (negative compartments, population drift)
//! - Named aggregate series grouped into display panels
//! - Parallel parameter sweeps

pub mod aggregate;
pub mod anomaly;
pub mod error;
pub mod grid;
pub mod sim;
pub mod sweep;
pub mod trajectory;

pub use aggregate::{NamedSeries, Panel, infected, panels};
pub use anomaly::{Anomaly, AnomalyConfig, DriftReference, scan};
pub use error::{SimError, SimResult};
pub use grid::TimeGrid;
pub use sim::{SimOptions, integrate, integrate_vector, integrate_with};
pub use sweep::{SweepCase, control_sweep, run_sweep};
pub use trajectory::Trajectory;
