//! Student and enrollment repository functions.
//!
//! Each function is a single round trip through the given executor. None of
//! them check uniqueness on their own: callers registering a student must
//! consult [`is_email_taken`] first, and still be ready for a
//! `DbError::ConstraintViolation` from [`insert_student`] if another writer
//! got there in between.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    executor::{QueryExecutor, Value},
    mappers::{map_student, map_student_course},
    models::{Student, StudentCourse},
    DbError,
};

const SELECT_ALL_STUDENTS: &str = r#"
    SELECT student_id, first_name, last_name, email, gender
    FROM student
"#;

const INSERT_STUDENT: &str = r#"
    INSERT INTO student (student_id, first_name, last_name, email, gender)
    VALUES ($1, $2, $3, $4, $5::gender)
"#;

const EMAIL_EXISTS: &str = r#"
    SELECT EXISTS (
        SELECT 1
        FROM student
        WHERE email = $1
    )
"#;

const SELECT_STUDENT_COURSES: &str = r#"
    SELECT
        student.student_id,
        course.course_id,
        course.name,
        course.description,
        course.department,
        course.teacher_name,
        student_course.start_date,
        student_course.end_date,
        student_course.grade
    FROM student
    JOIN student_course USING (student_id)
    JOIN course USING (course_id)
    WHERE student.student_id = $1
"#;

/// Return every student, in whatever order the store yields them.
#[instrument(skip(executor))]
pub async fn select_all_students<E>(executor: &E) -> Result<Vec<Student>, DbError>
where
    E: QueryExecutor + ?Sized,
{
    let rows = executor.fetch_all(SELECT_ALL_STUDENTS, &[]).await?;
    let students = rows.iter().map(map_student).collect::<Result<Vec<_>, _>>()?;
    debug!(count = students.len(), "selected students");
    Ok(students)
}

/// Insert `student` under `new_student_id`; `student.student_id` is ignored.
///
/// Returns the number of rows affected (1 on success).
#[instrument(skip(executor, student))]
pub async fn insert_student<E>(
    executor: &E,
    new_student_id: Uuid,
    student: &Student,
) -> Result<u64, DbError>
where
    E: QueryExecutor + ?Sized,
{
    let params = [
        Value::Uuid(new_student_id),
        Value::from(student.first_name.as_str()),
        Value::from(student.last_name.as_str()),
        Value::from(student.email.as_str()),
        Value::from(student.gender.as_str()),
    ];
    let affected = executor.execute(INSERT_STUDENT, &params).await?;
    debug!(affected, "inserted student");
    Ok(affected)
}

/// Whether any student already uses `email`.
///
/// # Errors
/// `DbError::Evaluation` when the query yields no boolean at all.
#[instrument(skip_all)]
pub async fn is_email_taken<E>(executor: &E, email: &str) -> Result<bool, DbError>
where
    E: QueryExecutor + ?Sized,
{
    let rows = executor.fetch_all(EMAIL_EXISTS, &[Value::from(email)]).await?;
    let taken = match rows.first().and_then(|row| row.value_at(0)) {
        Some(Value::Bool(taken)) => *taken,
        Some(other) => {
            return Err(DbError::Evaluation(format!(
                "existence check returned {other:?}"
            )))
        }
        None => return Err(DbError::Evaluation("existence check returned no rows".into())),
    };
    debug!(email, taken, "checked email");
    Ok(taken)
}

/// Return the enrollments of `student_id` joined with their courses.
///
/// An unknown student and a student without enrollments both yield an
/// empty list.
#[instrument(skip(executor))]
pub async fn select_all_students_courses<E>(
    executor: &E,
    student_id: Uuid,
) -> Result<Vec<StudentCourse>, DbError>
where
    E: QueryExecutor + ?Sized,
{
    let rows = executor
        .fetch_all(SELECT_STUDENT_COURSES, &[Value::Uuid(student_id)])
        .await?;
    let courses = rows
        .iter()
        .map(map_student_course)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = courses.len(), "selected student courses");
    Ok(courses)
}
