//! Composite series grouped the way the result figures are laid out.
//!
//! "Infected" in the population panel is everything except Susceptible,
//! Recovered included. That grouping is kept as is so plots line up with
//! previously published figures; use [`Trajectory::series`] for the raw
//! compartments.

use crate::trajectory::Trajectory;
use ef_model::{Compartment, Variant};
use serde::Serialize;

/// One labelled line of a panel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: &'static str,
    pub values: Vec<f64>,
}

/// A titled group of series sharing one set of axes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Panel {
    pub title: &'static str,
    pub series: Vec<NamedSeries>,
}

/// E + I + R, plus A when the variant has it.
pub fn infected(trajectory: &Trajectory) -> Vec<f64> {
    let members: &[Compartment] = match trajectory.variant() {
        Variant::Basic => &[
            Compartment::Exposed,
            Compartment::Infectious,
            Compartment::Recovered,
        ],
        Variant::Extended | Variant::Controlled => &[
            Compartment::Exposed,
            Compartment::Infectious,
            Compartment::Recovered,
            Compartment::Asymptomatic,
        ],
    };
    let idx: Vec<usize> = members
        .iter()
        .filter_map(|&c| trajectory.variant().index_of(c))
        .collect();
    trajectory
        .states()
        .iter()
        .map(|y| idx.iter().map(|&k| y[k]).sum())
        .collect()
}

fn named(trajectory: &Trajectory, name: &'static str, compartment: Compartment) -> Option<NamedSeries> {
    trajectory
        .series(compartment)
        .map(|values| NamedSeries { name, values })
}

/// Panels for the rendering collaborator: population dynamics, disease
/// states, and severe cases for the seven-compartment variants.
pub fn panels(trajectory: &Trajectory) -> Vec<Panel> {
    let mut population = Vec::new();
    population.extend(named(trajectory, "Susceptible", Compartment::Susceptible));
    population.push(NamedSeries {
        name: "Infected",
        values: infected(trajectory),
    });

    let disease_states = [
        ("Exposed", Compartment::Exposed),
        ("Infectious", Compartment::Infectious),
        ("Recovered", Compartment::Recovered),
        ("Asymptomatic", Compartment::Asymptomatic),
    ]
    .into_iter()
    .filter_map(|(name, c)| named(trajectory, name, c))
    .collect();

    let mut out = vec![
        Panel {
            title: "Population Dynamics",
            series: population,
        },
        Panel {
            title: "Disease States",
            series: disease_states,
        },
    ];

    if trajectory.variant() != Variant::Basic {
        let severe = [
            ("Hospitalized", Compartment::Hospitalized),
            ("Dead", Compartment::Deceased),
        ]
        .into_iter()
        .filter_map(|(name, c)| named(trajectory, name, c))
        .collect();
        out.push(Panel {
            title: "Severe Cases",
            series: severe,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::tests::sample;

    #[test]
    fn infected_counts_recovered() {
        let traj = sample();
        assert_eq!(infected(&traj), vec![3.0, 10.0, 20.0, 25.0]);
    }

    #[test]
    fn basic_layout_has_two_panels() {
        let p = panels(&sample());
        let titles: Vec<_> = p.iter().map(|p| p.title).collect();
        assert_eq!(titles, ["Population Dynamics", "Disease States"]);
        let names: Vec<_> = p[1].series.iter().map(|s| s.name).collect();
        assert_eq!(names, ["Exposed", "Infectious", "Recovered"]);
    }
}
