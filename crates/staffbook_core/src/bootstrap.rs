//! Process startup: logging, connection, optional seeding.

use crate::config::CoreConfig;
use crate::db::{open_with_config, DbError};
use crate::logging::{init_logging_from_config, LoggingError};
use crate::repo::department_repo::SqliteDepartmentRepository;
use crate::repo::error::RepoError;
use crate::service::seed::seed_departments;
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Starts logging, opens the configured store and seeds it when enabled.
pub fn bootstrap(config: &CoreConfig) -> Result<Connection, BootstrapError> {
    init_logging_from_config(&config.logging)?;
    let conn = open_with_config(&config.database)?;

    if config.seed_departments {
        let mut departments = SqliteDepartmentRepository::try_new(&conn)?;
        seed_departments(&mut departments)?;
    }

    Ok(conn)
}
