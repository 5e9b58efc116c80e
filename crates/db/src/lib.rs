//! `db` crate — data-access layer for students and their enrollments.
//!
//! Provides the query executor seam, value objects, row mappers and one
//! repository function per statement. No business logic lives here.

pub mod error;
pub mod executor;
pub mod mappers;
pub mod mock;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::DbError;
pub use executor::{QueryExecutor, Row, Value};
pub use models::{Gender, Student, StudentCourse};
pub use pool::DbPool;
