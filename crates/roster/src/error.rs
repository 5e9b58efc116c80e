//! Roster-level error types.

use thiserror::Error;

/// Errors produced while registering or listing students.
#[derive(Debug, Error)]
pub enum RosterError {
    // ------ Validation errors ------

    /// The email does not look like an address.
    #[error("email '{0}' is not valid")]
    InvalidEmail(String),

    /// A required field is blank.
    #[error("{0}")]
    Validation(String),

    // ------ Registration errors ------

    /// Another student already uses this email (seen by the pre-insert
    /// check or by the store's unique constraint).
    #[error("email '{0}' is already taken")]
    EmailTaken(String),

    /// The insert reported something other than exactly one row.
    #[error("insert affected {0} rows, expected 1")]
    UnexpectedRowCount(u64),

    /// Persistence error from the db crate.
    #[error("database error: {0}")]
    Database(#[from] db::DbError),
}
