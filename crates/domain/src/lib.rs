//! Domain layer for the Family Hub backend.
//!
//! This crate contains:
//! - Domain models (User, Family, CalendarItem, Chat, Message)
//! - Pure domain services (membership roles, ledger aggregation, messaging index)
//! - The domain error taxonomy

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
