//! Record use-case services.
//!
//! # Responsibility
//! - Validate inputs, call repositories, and turn absence into `NotFound`.
//! - Own the entity-specific filter logic handed to paged reads.
//!
//! # Invariants
//! - Services never bypass repository soft-delete visibility.
//! - Services stay generic over the `Repository` contract.

pub mod department_service;
pub mod employee_service;
pub mod error;
pub mod seed;
