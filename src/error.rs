use thiserror::Error;

pub type StampResult<T> = Result<T, StampError>;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Order sheet error: {0}")]
    Sheet(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("No six-digit date in file name '{0}'")]
    DateToken(String),
}
