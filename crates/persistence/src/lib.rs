//! Persistence layer for the Family Hub backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - The in-process change hub for family-scoped push notifications

pub mod changes;
pub mod db;
pub mod entities;
pub mod repositories;
