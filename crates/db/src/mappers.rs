//! Row mappers: pure `&Row -> Result<T, DbError>` functions.
//!
//! A mapper either builds the whole value or fails with
//! [`DbError::Mapping`]; there are no defaults for absent columns except
//! `grade`, whose null is meaningful.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    executor::{Row, Value},
    models::{Gender, Student, StudentCourse},
    DbError,
};

/// Map one row of the `student` projection.
pub fn map_student(row: &Row) -> Result<Student, DbError> {
    Ok(Student {
        student_id: uuid_column(row, "student_id")?,
        first_name: text_column(row, "first_name")?,
        last_name: text_column(row, "last_name")?,
        email: text_column(row, "email")?,
        gender: gender_column(row, "gender")?,
    })
}

/// Map one row of the `student ⋈ student_course ⋈ course` projection.
pub fn map_student_course(row: &Row) -> Result<StudentCourse, DbError> {
    Ok(StudentCourse {
        student_id: uuid_column(row, "student_id")?,
        course_id: uuid_column(row, "course_id")?,
        name: text_column(row, "name")?,
        description: text_column(row, "description")?,
        department: text_column(row, "department")?,
        teacher_name: text_column(row, "teacher_name")?,
        start_date: date_column(row, "start_date")?,
        end_date: date_column(row, "end_date")?,
        grade: grade_column(row, "grade")?,
    })
}

// ---------------------------------------------------------------------------
// column readers
// ---------------------------------------------------------------------------

fn uuid_column(row: &Row, column: &str) -> Result<Uuid, DbError> {
    match row.get(column)? {
        Value::Uuid(id) => Ok(*id),
        Value::Text(raw) => Uuid::parse_str(raw)
            .map_err(|e| DbError::mapping(column, format!("bad uuid {raw:?}: {e}"))),
        other => Err(unexpected(column, "uuid", other)),
    }
}

fn text_column(row: &Row, column: &str) -> Result<String, DbError> {
    match row.get(column)? {
        Value::Text(text) => Ok(text.clone()),
        other => Err(unexpected(column, "text", other)),
    }
}

fn gender_column(row: &Row, column: &str) -> Result<Gender, DbError> {
    text_column(row, column)?
        .parse()
        .map_err(|e: String| DbError::mapping(column, e))
}

fn date_column(row: &Row, column: &str) -> Result<NaiveDate, DbError> {
    match row.get(column)? {
        Value::Date(date) => Ok(*date),
        Value::Text(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| DbError::mapping(column, format!("bad date {raw:?}: {e}"))),
        other => Err(unexpected(column, "date", other)),
    }
}

/// Null is "no grade"; anything else must be an integer.
fn grade_column(row: &Row, column: &str) -> Result<Option<i32>, DbError> {
    match row.get(column)? {
        Value::Null => Ok(None),
        Value::Int(grade) => i32::try_from(*grade)
            .map(Some)
            .map_err(|_| DbError::mapping(column, format!("grade {grade} out of range"))),
        Value::Text(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| DbError::mapping(column, format!("non-numeric grade {raw:?}"))),
        other => Err(unexpected(column, "integer", other)),
    }
}

fn unexpected(column: &str, expected: &str, found: &Value) -> DbError {
    if found.is_null() {
        DbError::mapping(column, "unexpected null")
    } else {
        DbError::mapping(column, format!("expected {expected}, found {found:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADA: &str = "3f2c1a7e-9b0d-4c5e-8f6a-1b2c3d4e5f60";
    const ALGORITHMS: &str = "a1b2c3d4-0000-4000-8000-000000000001";

    fn student_row() -> Row {
        Row::new()
            .with("student_id", ADA)
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("email", "ada@x.io")
            .with("gender", "FEMALE")
    }

    fn enrollment_row(grade: Value) -> Row {
        Row::new()
            .with("student_id", Uuid::parse_str(ADA).unwrap())
            .with("course_id", ALGORITHMS)
            .with("name", "Algorithms")
            .with("description", "Sorting, searching and graphs")
            .with("department", "CS")
            .with("teacher_name", "Turing")
            .with("start_date", NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
            .with("end_date", "2024-05-10")
            .with("grade", grade)
    }

    fn assert_mapping_error<T: std::fmt::Debug>(result: Result<T, DbError>, expected_column: &str) {
        match result {
            Err(DbError::Mapping { column, .. }) => assert_eq!(column, expected_column),
            other => panic!("expected mapping error on {expected_column}, got {other:?}"),
        }
    }

    #[test]
    fn student_row_maps_every_field() {
        let student = map_student(&student_row()).unwrap();
        assert_eq!(
            student,
            Student {
                student_id: Uuid::parse_str(ADA).unwrap(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@x.io".into(),
                gender: Gender::Female,
            }
        );
    }

    #[test]
    fn gender_comes_from_the_gender_column() {
        // A first name that happens to be a valid gender label must not leak in.
        let row = Row::new()
            .with("student_id", ADA)
            .with("first_name", "OTHER")
            .with("last_name", "Lovelace")
            .with("email", "ada@x.io")
            .with("gender", "MALE");
        assert_eq!(map_student(&row).unwrap().gender, Gender::Male);
    }

    #[test]
    fn student_with_bad_identifier_fails() {
        let row = Row::new()
            .with("student_id", "not-a-uuid")
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("email", "ada@x.io")
            .with("gender", "FEMALE");
        assert_mapping_error(map_student(&row), "student_id");
    }

    #[test]
    fn student_with_unknown_gender_fails() {
        let row = Row::new()
            .with("student_id", ADA)
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("email", "ada@x.io")
            .with("gender", "UNKNOWN");
        assert_mapping_error(map_student(&row), "gender");
    }

    #[test]
    fn student_with_null_email_fails() {
        let row = Row::new()
            .with("student_id", ADA)
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("email", Value::Null)
            .with("gender", "FEMALE");
        assert_mapping_error(map_student(&row), "email");
    }

    #[test]
    fn null_grade_maps_to_no_grade() {
        let course = map_student_course(&enrollment_row(Value::Null)).unwrap();
        assert_eq!(course.grade, None);
        assert_eq!(course.name, "Algorithms");
        assert_eq!(course.department, "CS");
        assert_eq!(course.teacher_name, "Turing");
        assert_eq!(course.course_id, Uuid::parse_str(ALGORITHMS).unwrap());
        assert_eq!(course.start_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(course.end_date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
    }

    #[test]
    fn textual_and_integer_grades_parse() {
        let from_text = map_student_course(&enrollment_row("87".into())).unwrap();
        assert_eq!(from_text.grade, Some(87));

        let from_int = map_student_course(&enrollment_row(Value::Int(92))).unwrap();
        assert_eq!(from_int.grade, Some(92));
    }

    #[test]
    fn non_numeric_grade_fails() {
        assert_mapping_error(map_student_course(&enrollment_row("A+".into())), "grade");
        assert_mapping_error(
            map_student_course(&enrollment_row(Value::Int(i64::MAX))),
            "grade",
        );
    }

    #[test]
    fn unparseable_date_fails() {
        let row = Row::new()
            .with("student_id", ADA)
            .with("course_id", ALGORITHMS)
            .with("name", "Algorithms")
            .with("description", "")
            .with("department", "CS")
            .with("teacher_name", "Turing")
            .with("start_date", "2024-01-10")
            .with("end_date", "10/05/2024")
            .with("grade", Value::Null);
        assert_mapping_error(map_student_course(&row), "end_date");
    }
}
