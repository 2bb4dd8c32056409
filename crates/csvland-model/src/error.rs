use thiserror::Error;

/// Errors raised while deriving model values that would make a run invalid.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("target table name is empty")]
    EmptyTableName,

    #[error("column '{column}' collides with the injected column '{reserved}'")]
    ReservedColumn { column: String, reserved: &'static str },
}

pub type Result<T> = std::result::Result<T, ModelError>;
