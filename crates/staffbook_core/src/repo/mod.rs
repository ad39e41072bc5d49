//! Repository layer: generic soft-delete persistence over SQLite.
//!
//! # Responsibility
//! - Mediate all persistent access to one record table per repository.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every read starts from the live set (`deleted_at IS NULL`); caller
//!   predicates are composed after it, never instead of it.
//! - Absence is reported as `None`; storage failures propagate as `RepoError`.

pub mod department_repo;
pub mod employee_repo;
pub mod error;
pub mod page;
pub mod query;
pub mod record;
pub mod repository;
