//! `roster` crate — caller-side policy around the student repository:
//! input validation, the check-then-insert registration flow and ID
//! generation.

pub mod error;
pub mod roster;
pub mod validate;

pub use error::RosterError;
pub use roster::{NewStudent, StudentRoster};
