//! Built-in scenarios for a UK-sized outbreak.

use crate::schema::{Scenario, SolverDef, TimeDef};
use crate::{ProjectError, ProjectResult};
use ef_model::{DiseaseParams, InitialState, InterventionControls, Variant};
use ef_solver::Method;

pub const PRESET_NAMES: [&str; 3] = ["basic", "extended", "controlled"];

const POPULATION: u64 = 67_000_000;

pub fn preset(name: &str) -> ProjectResult<Scenario> {
    match name.trim().to_ascii_lowercase().as_str() {
        "basic" => Ok(basic()),
        "extended" => Ok(extended()),
        "controlled" => Ok(controlled()),
        _ => Err(ProjectError::UnknownPreset {
            name: name.to_string(),
        }),
    }
}

fn seed(infectious: u64) -> InitialState {
    InitialState {
        susceptible: POPULATION - 100_000,
        exposed: 10_000,
        infectious,
        ..Default::default()
    }
}

/// Four compartments, R0 = 2.4, ten initial infectious cases.
pub fn basic() -> Scenario {
    Scenario {
        version: 1,
        name: "uk-basic".to_string(),
        variant: Variant::Basic,
        disease: DiseaseParams::default(),
        controls: None,
        initial: seed(10),
        time: TimeDef {
            start: 0.0,
            end: 200.0,
            points: 100,
        },
        solver: SolverDef {
            method: Some(Method::Lsoda),
            ..Default::default()
        },
    }
}

/// Seven compartments, R0 = 5, solved with BDF.
pub fn extended() -> Scenario {
    Scenario {
        version: 1,
        name: "uk-extended".to_string(),
        variant: Variant::Extended,
        disease: DiseaseParams {
            reproduction_number: 5.0,
            ..Default::default()
        },
        controls: None,
        initial: seed(1_000),
        time: TimeDef {
            start: 0.0,
            end: 200.0,
            points: 200,
        },
        solver: SolverDef {
            method: Some(Method::Bdf),
            ..Default::default()
        },
    }
}

/// Seven compartments under contact tracing, quarantine, masks and vaccination.
pub fn controlled() -> Scenario {
    Scenario {
        version: 1,
        name: "uk-controlled".to_string(),
        variant: Variant::Controlled,
        disease: DiseaseParams::default(),
        controls: Some(InterventionControls::default()),
        initial: seed(1_000),
        time: TimeDef {
            start: 0.0,
            end: 200.0,
            points: 200,
        },
        solver: SolverDef {
            method: Some(Method::Lsoda),
            ..Default::default()
        },
    }
}
