//! Repository error type.

use crate::db::DbError;
use crate::model::entity::EntityId;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    /// Any failure reported by the store, passed through unchanged.
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted {table} data: {message}")]
    InvalidData {
        table: &'static str,
        message: String,
    },
    /// A caller-composed filter was rejected.
    #[error("invalid filter on `{table}`: {message}")]
    InvalidFilter {
        table: &'static str,
        message: String,
    },
    /// An update or soft delete matched no stored row.
    #[error("write to `{table}` matched no row with id {id}")]
    StaleWrite { table: &'static str, id: EntityId },
    #[error("connection schema version {actual_version} is older than required {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn invalid_filter(table: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            table,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
