//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories via Diesel, plus in-memory
//!   equivalents.
//! - **security**: Argon2id password hashing.
//!
//! Adapters translate between domain types and infrastructure representations
//! and contain no business logic.

pub mod persistence;
pub mod security;
