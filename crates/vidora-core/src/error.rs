use thiserror::Error;

use vidora_db::StoreError;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed id, or one that names no user where a user is required.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Zero or several targets, or an unsupported kind, polarity or query shape.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CoreError {
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::InvalidReference(_) | CoreError::InvalidTarget(_) => 400,
            CoreError::Conflict(_) => 409,
            CoreError::NotFound(_) => 404,
            CoreError::StoreUnavailable(_) => 503,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        if err.is_constraint_violation() {
            CoreError::Conflict(err.to_string())
        } else {
            CoreError::StoreUnavailable(err.to_string())
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
