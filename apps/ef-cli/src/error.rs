use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Project(#[from] ef_project::ProjectError),

    #[error(transparent)]
    Sim(#[from] ef_sim::SimError),

    #[error(transparent)]
    Model(#[from] ef_model::ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid arguments: {what}")]
    BadArgs { what: String },
}

pub type CliResult<T> = Result<T, CliError>;
