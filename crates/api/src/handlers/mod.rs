//! Request handlers.

pub mod coins;
pub mod stories;
