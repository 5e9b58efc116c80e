//! Student registration and lookup.
//!
//! `StudentRoster` is the caller the repository expects:
//! 1. Validates the incoming student.
//! 2. Consults `is_email_taken` before inserting (the fast path).
//! 3. Inserts under a freshly generated (or caller-chosen) ID.
//! 4. Treats a unique-constraint violation on email as "already taken",
//!    since a concurrent registration can slip between steps 2 and 3.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use db::repository::students;
use db::{Gender, QueryExecutor, Student, StudentCourse};

use crate::validate::{validate_email, validate_name};
use crate::RosterError;

/// Name of the store constraint guarding email uniqueness.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "student_email_unique";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A student as submitted for registration, before it has an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
}

impl NewStudent {
    /// Trim the fields and check them; returns the student to store.
    fn into_student(self, student_id: Uuid) -> Result<Student, RosterError> {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let email = self.email.trim().to_string();

        validate_name("first_name", &first_name).map_err(RosterError::Validation)?;
        validate_name("last_name", &last_name).map_err(RosterError::Validation)?;
        validate_email(&email).map_err(|_| RosterError::InvalidEmail(email.clone()))?;

        Ok(Student {
            student_id,
            first_name,
            last_name,
            email,
            gender: self.gender,
        })
    }
}

// ---------------------------------------------------------------------------
// StudentRoster
// ---------------------------------------------------------------------------

/// Stateless front for the student repository.
///
/// Holds only the executor, so one instance can be shared by concurrent
/// callers.
pub struct StudentRoster<E> {
    executor: E,
}

impl<E: QueryExecutor> StudentRoster<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, RosterError> {
        Ok(students::select_all_students(&self.executor).await?)
    }

    pub async fn is_email_taken(&self, email: &str) -> Result<bool, RosterError> {
        Ok(students::is_email_taken(&self.executor, email.trim()).await?)
    }

    /// Register a student under a new random ID.
    pub async fn register_student(&self, new: NewStudent) -> Result<Student, RosterError> {
        self.register_student_with_id(Uuid::new_v4(), new).await
    }

    /// Register a student under `student_id`.
    ///
    /// # Errors
    /// `Validation`/`InvalidEmail` for bad input, `EmailTaken` when the
    /// email is in use, `Database` for anything the store reports.
    #[instrument(skip(self, new))]
    pub async fn register_student_with_id(
        &self,
        student_id: Uuid,
        new: NewStudent,
    ) -> Result<Student, RosterError> {
        let student = new.into_student(student_id)?;

        if students::is_email_taken(&self.executor, &student.email).await? {
            return Err(RosterError::EmailTaken(student.email));
        }

        let affected = match students::insert_student(&self.executor, student_id, &student).await {
            Ok(affected) => affected,
            Err(err) if err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) => {
                warn!("email uniqueness enforced by the store after a passing check");
                return Err(RosterError::EmailTaken(student.email));
            }
            Err(err) => return Err(err.into()),
        };

        if affected != 1 {
            return Err(RosterError::UnexpectedRowCount(affected));
        }

        info!("registered student");
        Ok(student)
    }

    pub async fn courses_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<StudentCourse>, RosterError> {
        Ok(students::select_all_students_courses(&self.executor, student_id).await?)
    }
}
