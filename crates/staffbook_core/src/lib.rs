//! Core record store for employees and departments.
//! Soft-delete visibility and paging rules live here and nowhere else.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use bootstrap::{bootstrap, BootstrapError};
pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{CreateDepartment, Department, UpdateDepartment};
pub use model::employee::{CreateEmployee, Employee, UpdateEmployee};
pub use model::entity::{Entity, EntityId, EntityMeta};
pub use model::validation::{FieldError, Validate, ValidationErrors};
pub use repo::department_repo::SqliteDepartmentRepository;
pub use repo::employee_repo::SqliteEmployeeRepository;
pub use repo::error::{RepoError, RepoResult};
pub use repo::page::{PagedQuery, PaginatedResult};
pub use repo::query::{LiveQuery, Predicate, SortDirection};
pub use repo::record::Record;
pub use repo::repository::{Repository, SqliteRepository};
pub use service::department_service::{DepartmentFilter, DepartmentPagedQuery, DepartmentService};
pub use service::employee_service::{
    EmployeeFilter, EmployeePagedQuery, EmployeeService, EmployeeView,
};
pub use service::error::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
