//! Shared utilities and common types for the SLA monitor backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - JWT issue and verification for operator sessions
//! - Common validation logic

pub mod jwt;
pub mod password;
pub mod validation;
