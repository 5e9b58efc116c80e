//! Typed error type for the db crate.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// The store could not be reached, or a statement failed for a reason
    /// other than a constraint. Never retried here.
    #[error("database error: {0}")]
    Connectivity(#[source] sqlx::Error),

    /// A fetched row does not have the expected shape.
    #[error("cannot map column '{column}': {reason}")]
    Mapping { column: String, reason: String },

    /// A write was rejected by a store-level constraint (unique, foreign key, …).
    #[error("constraint violation{}: {message}", .constraint.as_deref().map(|c| format!(" on '{c}'")).unwrap_or_default())]
    ConstraintViolation {
        constraint: Option<String>,
        message: String,
    },

    /// An existence check did not produce a boolean.
    #[error("query did not evaluate to a boolean: {0}")]
    Evaluation(String),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    pub(crate) fn mapping(column: &str, reason: impl Into<String>) -> Self {
        Self::Mapping {
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Name of the violated constraint, when the store reported one.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::ConstraintViolation { constraint, .. } => constraint.as_deref(),
            _ => None,
        }
    }
}

/// Splits sqlx failures into constraint violations and everything else so
/// callers can tell "duplicate" apart from "store is down".
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::ColumnDecode { index, source } = &err {
            return Self::Mapping {
                column: index.clone(),
                reason: source.to_string(),
            };
        }
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return Self::ConstraintViolation {
                        constraint: db_err.constraint().map(str::to_owned),
                        message: db_err.message().to_owned(),
                    };
                }
                _ => {}
            }
        }
        Self::Connectivity(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_connectivity() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_connectivity());
        assert!(!err.is_constraint_violation());
        assert_eq!(err.constraint(), None);
    }

    #[test]
    fn constraint_violation_display_names_the_constraint() {
        let err = DbError::ConstraintViolation {
            constraint: Some("student_email_unique".into()),
            message: "duplicate key value".into(),
        };
        assert_eq!(
            err.to_string(),
            "constraint violation on 'student_email_unique': duplicate key value"
        );
        assert_eq!(err.constraint(), Some("student_email_unique"));

        let anonymous = DbError::ConstraintViolation {
            constraint: None,
            message: "null value".into(),
        };
        assert_eq!(anonymous.to_string(), "constraint violation: null value");
    }
}
