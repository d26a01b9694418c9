//! Application services.

pub mod auth;
pub mod uploads;

pub use auth::AuthService;
