//! Shared utilities and common types for the Family Hub backend.
//!
//! This crate provides functionality used across the other crates:
//! - JWT token issuing and validation
//! - Password hashing with Argon2id
//! - Common validation logic
//! - Pagination query types

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
