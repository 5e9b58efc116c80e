//! Value objects produced by the row mappers.
//!
//! These mirror the `student` and `student_course ⋈ course` projections.
//! The `course` table has no standalone type: this layer only ever sees
//! course data through a student's enrollments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// gender
// ---------------------------------------------------------------------------

/// Closed set of values accepted by the `gender` enum type in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Canonical (uppercase) form, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    /// Case-insensitive; anything outside the three labels is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Male, Self::Female, Self::Other]
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown gender: {s}"))
    }
}

// ---------------------------------------------------------------------------
// student
// ---------------------------------------------------------------------------

/// A row of the `student` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all students.
    pub email: String,
    pub gender: Gender,
}

// ---------------------------------------------------------------------------
// student_course
// ---------------------------------------------------------------------------

/// One enrollment of a student, joined with the course it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCourse {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub description: String,
    pub department: String,
    pub teacher_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `None` while the enrollment is ongoing or ungraded.
    pub grade: Option<i32>,
}
