//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTOs its repository needs.

pub mod chapter;
pub mod coins;
pub mod paragraph;
pub mod story;
