//! Rendering trajectories for stdout.

use ef_model::{Compartment, Variant};
use ef_sim::{Anomaly, Panel, Trajectory, panels};
use ef_solver::{Method, SolverStats};
use serde::Serialize;

#[derive(Serialize)]
struct SeriesReport {
    compartment: Compartment,
    values: Vec<f64>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    name: &'a str,
    variant: Variant,
    method: Method,
    population: f64,
    times: &'a [f64],
    series: Vec<SeriesReport>,
    panels: Vec<Panel>,
    anomalies: &'a [Anomaly],
    stats: &'a SolverStats,
}

/// One row per evaluation instant, one column per compartment.
pub fn to_csv(trajectory: &Trajectory) -> String {
    let mut csv = String::from("time");
    for c in trajectory.compartments() {
        csv.push(',');
        csv.push_str(&c.label().to_lowercase());
    }
    csv.push('\n');
    for (t, y) in trajectory.times().iter().zip(trajectory.states()) {
        csv.push_str(&t.to_string());
        for v in y.iter() {
            csv.push(',');
            csv.push_str(&v.to_string());
        }
        csv.push('\n');
    }
    csv
}

pub fn to_json(name: &str, method: Method, trajectory: &Trajectory) -> serde_json::Result<String> {
    let report = RunReport {
        name,
        variant: trajectory.variant(),
        method,
        population: trajectory.population(),
        times: trajectory.times(),
        series: trajectory
            .compartments()
            .iter()
            .filter_map(|&compartment| {
                trajectory
                    .series(compartment)
                    .map(|values| SeriesReport {
                        compartment,
                        values,
                    })
            })
            .collect(),
        panels: panels(trajectory),
        anomalies: trajectory.anomalies(),
        stats: trajectory.stats(),
    };
    serde_json::to_string_pretty(&report)
}
