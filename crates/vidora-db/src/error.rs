use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// A write that must touch a row touched none.
    #[error("Write had no effect: {0}")]
    NoRowsAffected(String),
}

impl StoreError {
    /// True for UNIQUE / CHECK / FOREIGN KEY failures.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fail with `NoRowsAffected` unless exactly one row changed.
pub fn expect_one(affected: usize, what: &str) -> StoreResult<()> {
    if affected == 1 {
        Ok(())
    } else {
        Err(StoreError::NoRowsAffected(format!(
            "{} affected {} rows",
            what, affected
        )))
    }
}
