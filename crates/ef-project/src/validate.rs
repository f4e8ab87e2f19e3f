//! Scenario validation logic.

use crate::schema::Scenario;
use ef_model::Variant;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing section: {section} ({reason})")]
    MissingSection { section: String, reason: String },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: impl ToString) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "''", "scenario name must not be empty"));
    }

    scenario
        .disease
        .validate()
        .map_err(|e| invalid("disease", scenario.name.as_str(), e))?;

    match (scenario.variant, &scenario.controls) {
        (Variant::Controlled, None) => {
            return Err(ValidationError::MissingSection {
                section: "controls".to_string(),
                reason: "the controlled variant needs intervention coefficients".to_string(),
            });
        }
        (Variant::Controlled, Some(controls)) => {
            controls
                .transmission_factor()
                .map_err(|e| invalid("controls", format!("{controls:?}"), e))?;
        }
        (variant, Some(_)) => {
            return Err(ValidationError::Unsupported {
                feature: format!("controls on the {variant} variant"),
                reason: "intervention coefficients only apply to the controlled variant"
                    .to_string(),
            });
        }
        (_, None) => {}
    }

    scenario
        .initial
        .validate(scenario.disease.population)
        .map_err(|e| invalid("initial", scenario.initial.total(), e))?;
    scenario
        .initial
        .to_vector(scenario.variant)
        .map_err(|e| invalid("initial", scenario.variant, e))?;

    let time = &scenario.time;
    if !time.start.is_finite() || !time.end.is_finite() || time.start >= time.end {
        return Err(invalid(
            "time",
            format!("[{}, {}]", time.start, time.end),
            "start must precede end and both must be finite",
        ));
    }
    if time.points < 2 {
        return Err(invalid(
            "time.points",
            time.points,
            "at least two evaluation points are needed",
        ));
    }

    let solver = &scenario.solver;
    if solver.max_steps == 0 {
        return Err(invalid("solver.max_steps", 0, "must be positive"));
    }
    solver
        .to_options()
        .validate()
        .map_err(|e| invalid("solver", scenario.method(), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn presets_are_valid() {
        for name in presets::PRESET_NAMES {
            validate_scenario(&presets::preset(name).unwrap()).unwrap();
        }
    }

    #[test]
    fn future_version_is_rejected() {
        let mut s = presets::basic();
        s.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn controls_only_on_controlled_variant() {
        let mut s = presets::basic();
        s.controls = Some(Default::default());
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::Unsupported { .. })
        ));

        let mut c = presets::controlled();
        c.controls = None;
        assert!(matches!(
            validate_scenario(&c),
            Err(ValidationError::MissingSection { .. })
        ));
    }

    #[test]
    fn out_of_domain_values_are_rejected() {
        let mut s = presets::basic();
        s.disease.reproduction_number = -1.0;
        assert!(validate_scenario(&s).is_err());

        let mut s = presets::basic();
        s.time.end = s.time.start;
        assert!(validate_scenario(&s).is_err());

        let mut s = presets::basic();
        s.initial.susceptible = s.disease.population;
        assert!(validate_scenario(&s).is_err());

        let mut s = presets::basic();
        s.initial.asymptomatic = 1;
        assert!(validate_scenario(&s).is_err());

        let mut s = presets::controlled();
        if let Some(c) = s.controls.as_mut() {
            c.vaccination = 1.5;
        }
        assert!(validate_scenario(&s).is_err());

        let mut s = presets::extended();
        s.solver.rtol = 0.0;
        assert!(validate_scenario(&s).is_err());
    }
}
