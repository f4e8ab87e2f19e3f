//! Post-hoc validity checks on a finished trajectory.
//!
//! The model right-hand sides never clamp, so an aggressive step can carry a
//! compartment below zero, and the seven-compartment flows are not closed.
//! Both show up here as advisory anomalies rather than failures.

use ef_core::relative_difference;
use ef_model::Compartment;
use nalgebra::DVector;
use serde::Serialize;
use std::fmt;

/// What the summed compartments are compared against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriftReference {
    /// Total of the first sampled state.
    #[default]
    Initial,
    /// The model's population N.
    Population,
}

/// Thresholds of the anomaly scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnomalyConfig {
    /// A compartment is flagged once it drops below `-negative_tolerance`.
    pub negative_tolerance: f64,
    /// Relative deviation of the total population from the drift reference.
    pub population_rel_tol: f64,
    pub drift_reference: DriftReference,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            negative_tolerance: 0.0,
            population_rel_tol: 1e-3,
            drift_reference: DriftReference::Initial,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// First evaluation instant at which the compartment went negative.
    NegativeCompartment {
        time: f64,
        compartment: Compartment,
        value: f64,
    },
    /// Worst deviation of the summed compartments from the drift reference.
    PopulationDrift {
        time: f64,
        total: f64,
        expected: f64,
        relative: f64,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::NegativeCompartment {
                time,
                compartment,
                value,
            } => write!(f, "{compartment} negative at t = {time}: {value}"),
            Anomaly::PopulationDrift {
                time,
                total,
                expected,
                relative,
            } => write!(
                f,
                "population {total} differs from expected {expected} by {:.3}% at t = {time}",
                relative * 100.0
            ),
        }
    }
}

/// Scan sampled states, laid out in `compartments` order, of a model with
/// `population` people.
pub fn scan(
    compartments: &[Compartment],
    times: &[f64],
    states: &[DVector<f64>],
    population: f64,
    config: &AnomalyConfig,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for (k, &compartment) in compartments.iter().enumerate() {
        let first_negative = times
            .iter()
            .zip(states)
            .map(|(&t, y)| (t, y[k]))
            .find(|&(_, v)| v < -config.negative_tolerance);
        if let Some((time, value)) = first_negative {
            anomalies.push(Anomaly::NegativeCompartment {
                time,
                compartment,
                value,
            });
        }
    }

    let Some(initial) = states.first().map(|y| y.sum()) else {
        return anomalies;
    };
    let expected = match config.drift_reference {
        DriftReference::Initial => initial,
        DriftReference::Population => population,
    };
    let mut worst: Option<(f64, f64, f64)> = None;
    for (&time, y) in times.iter().zip(states) {
        let total = y.sum();
        let relative = relative_difference(total, expected, expected);
        if worst.is_none_or(|(_, _, r)| relative > r) {
            worst = Some((time, total, relative));
        }
    }
    if let Some((time, total, relative)) = worst {
        if relative > config.population_rel_tol {
            anomalies.push(Anomaly::PopulationDrift {
                time,
                total,
                expected,
                relative,
            });
        }
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(rows: &[[f64; 4]]) -> Vec<DVector<f64>> {
        rows.iter().map(|r| DVector::from_row_slice(r)).collect()
    }

    #[test]
    fn clean_trajectory_has_no_anomalies() {
        let ys = states(&[[90.0, 5.0, 5.0, 0.0], [80.0, 8.0, 7.0, 5.0]]);
        let found = scan(&Compartment::BASIC, &[0.0, 1.0], &ys, 100.0, &AnomalyConfig::default());
        assert!(found.is_empty());
    }

    #[test]
    fn first_negative_value_only() {
        let ys = states(&[
            [90.0, 5.0, 5.0, 0.0],
            [95.0, -1.0, 5.0, 1.0],
            [96.0, -2.0, 3.0, 3.0],
        ]);
        let found = scan(
            &Compartment::BASIC,
            &[0.0, 1.0, 2.0],
            &ys,
            100.0,
            &AnomalyConfig::default(),
        );
        assert_eq!(
            found,
            vec![Anomaly::NegativeCompartment {
                time: 1.0,
                compartment: Compartment::Exposed,
                value: -1.0,
            }]
        );
    }

    #[test]
    fn drift_reports_worst_point() {
        let ys = states(&[
            [90.0, 5.0, 5.0, 0.0],
            [90.0, 5.0, 5.0, 1.0],
            [90.0, 5.0, 5.0, 3.0],
            [90.0, 5.0, 5.0, 2.0],
        ]);
        let found = scan(
            &Compartment::BASIC,
            &[0.0, 1.0, 2.0, 3.0],
            &ys,
            100.0,
            &AnomalyConfig::default(),
        );
        match found.as_slice() {
            [Anomaly::PopulationDrift { time, total, .. }] => {
                assert_eq!(*time, 2.0);
                assert_eq!(*total, 103.0);
            }
            other => panic!("unexpected anomalies: {other:?}"),
        }
    }

    #[test]
    fn negative_tolerance_suppresses_roundoff() {
        let ys = states(&[[90.0, 5.0, 5.0, 0.0], [90.0, 5.0, 5.0 + 1e-9, -1e-9]]);
        let config = AnomalyConfig {
            negative_tolerance: 1e-6,
            ..Default::default()
        };
        assert!(scan(&Compartment::BASIC, &[0.0, 1.0], &ys, 100.0, &config).is_empty());
    }

    #[test]
    fn drift_against_population_flags_unassigned_people() {
        // Constant total of 100 in a population of 200.
        let ys = states(&[[90.0, 5.0, 5.0, 0.0], [80.0, 8.0, 7.0, 5.0]]);
        let times = [0.0, 1.0];
        assert!(scan(&Compartment::BASIC, &times, &ys, 200.0, &AnomalyConfig::default()).is_empty());

        let config = AnomalyConfig {
            drift_reference: DriftReference::Population,
            ..Default::default()
        };
        match scan(&Compartment::BASIC, &times, &ys, 200.0, &config).as_slice() {
            [Anomaly::PopulationDrift { expected, relative, .. }] => {
                assert_eq!(*expected, 200.0);
                assert!((relative - 0.5).abs() < 1e-12);
            }
            other => panic!("unexpected anomalies: {other:?}"),
        }
    }
}
