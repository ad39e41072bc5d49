//! Domain model for department and employee records.
//!
//! # Responsibility
//! - Define the shared entity metadata every record carries.
//! - Define concrete records and the rule sets that validate their inputs.
//!
//! # Invariants
//! - Every record is identified by a stable `EntityId`.
//! - Deletion is represented by a `deleted_at` tombstone, never hard delete.

pub mod department;
pub mod employee;
pub mod entity;
pub mod validation;
