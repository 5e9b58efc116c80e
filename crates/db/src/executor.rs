//! The query execution seam.
//!
//! Repository functions never talk to sqlx directly: they hand SQL text and
//! an ordered parameter list to a [`QueryExecutor`] and get back either
//! [`Row`]s or an affected-row count. `DbPool` is the production executor;
//! [`crate::mock::MockExecutor`] stands in for it in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row as _, TypeInfo};
use tracing::trace;
use uuid::Uuid;

use crate::{DbError, DbPool};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A bound parameter or a decoded column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One fetched record, addressable by column name or position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style, used by tests and the mock).
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.push((column.to_string(), value.into()));
        self
    }

    /// Look up a column by name; a missing column is a mapping failure.
    pub fn get(&self, column: &str) -> Result<&Value, DbError> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| DbError::mapping(column, "column not present in row"))
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// QueryExecutor
// ---------------------------------------------------------------------------

/// Runs one SQL statement with positional parameters.
///
/// Errors are already classified (`Connectivity` vs `ConstraintViolation`)
/// and are passed through unchanged by the repository.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a read and return every row.
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError>;

    /// Run a write and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError>;
}

#[async_trait]
impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
        (**self).fetch_all(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        (**self).execute(sql, params).await
    }
}

#[async_trait]
impl QueryExecutor for DbPool {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
        let rows = bind_all(sqlx::query(sql), params).fetch_all(self).await?;
        trace!(rows = rows.len(), "fetched rows");
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        let result = bind_all(sqlx::query(sql), params).execute(self).await?;
        Ok(result.rows_affected())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Uuid(v) => query.bind(*v),
            Value::Date(v) => query.bind(*v),
        };
    }
    query
}

fn decode_row(pg_row: &PgRow) -> Result<Row, DbError> {
    let mut row = Row::new();
    for (index, column) in pg_row.columns().iter().enumerate() {
        let value = decode_column(pg_row, index, column.type_info().name())?;
        row.columns.push((column.name().to_string(), value));
    }
    Ok(row)
}

/// Decode by Postgres type name. Types without a native mapping (e.g. the
/// `gender` enum) are read as text.
fn decode_column(row: &PgRow, index: usize, type_name: &str) -> Result<Value, DbError> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)?
            .map(|v| Value::Int(v.into())),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)?
            .map(|v| Value::Int(v.into())),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::Int),
        "UUID" => row.try_get::<Option<Uuid>, _>(index)?.map(Value::Uuid),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(index)?.map(Value::Date),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(index)?.map(Value::Text)
        }
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)?
            .map(Value::Text),
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lookup_by_name_and_position() {
        let row = Row::new().with("exists", true).with("email", "ada@x.io");

        assert_eq!(row.get("email").unwrap(), &Value::Text("ada@x.io".into()));
        assert_eq!(row.value_at(0), Some(&Value::Bool(true)));
        assert_eq!(row.value_at(2), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn missing_column_is_a_mapping_error() {
        let err = Row::new().get("grade").unwrap_err();
        assert!(matches!(err, DbError::Mapping { ref column, .. } if column == "grade"));
    }

    #[test]
    fn optional_values_convert_to_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(87)), Value::Int(87));
    }
}
