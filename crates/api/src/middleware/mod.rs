//! Request middleware: the authentication extractor.

pub mod auth;

pub use auth::AuthUser;
