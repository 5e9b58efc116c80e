//! Repository functions — one function per database operation.
//!
//! Every function takes a `&impl QueryExecutor` (usually the `DbPool`) and
//! returns a `Result<T, DbError>`. No business logic — SQL, binding and
//! row mapping only.

pub mod students;
